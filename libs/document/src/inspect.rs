//! Shape discovery from sample instances
//!
//! Sibling values with the same name are merged: a JSON array or a repeated
//! XML element becomes one `ZeroToMany` descriptor whose children are the
//! union of what every occurrence carries.

use crate::json::json_to_value;
use crate::xml::{NodeId, XmlDocument};
use crate::Document;
use fieldmap_model::{Cardinality, FieldDescriptor, FieldType, SchemaProvider};
use serde_json::Value as Json;

/// Describe the shape of `doc`.
pub fn inspect(doc: &Document) -> FieldDescriptor {
    match doc {
        Document::Json(root) => inspect_json(root),
        Document::Xml(xml) => inspect_xml(xml),
    }
}

/// A [`SchemaProvider`] backed by one sample document.
#[derive(Debug, Clone)]
pub struct InstanceSchemaProvider {
    document: Document,
}

impl InstanceSchemaProvider {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SchemaProvider for InstanceSchemaProvider {
    fn describe(&self) -> Option<FieldDescriptor> {
        Some(inspect(&self.document))
    }
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn inspect_json(root: &Json) -> FieldDescriptor {
    let mut descriptor = json_descriptor("", "", vec![root]);
    descriptor.path = "/".to_string();
    descriptor.cardinality = Cardinality::ZeroToOne;
    descriptor
}

fn json_descriptor(name: &str, parent: &str, values: Vec<&Json>) -> FieldDescriptor {
    let many = values.iter().any(|v| v.is_array());
    let items: Vec<&Json> = values
        .into_iter()
        .flat_map(|v| match v {
            Json::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect();

    let path = if many {
        format!("{}/{}<>", parent, name)
    } else {
        format!("{}/{}", parent, name)
    };

    let base = path.trim_end_matches('/');
    let objects: Vec<_> = items.iter().filter_map(|v| v.as_object()).collect();
    let (field_type, children) = if objects.is_empty() {
        let field_type = items
            .iter()
            .find_map(|v| json_to_value(v))
            .map(|v| v.field_type())
            .unwrap_or(FieldType::Any);
        (field_type, Vec::new())
    } else {
        let mut keys = Vec::new();
        for obj in &objects {
            for key in obj.keys() {
                push_unique(&mut keys, key.as_str());
            }
        }
        let children = keys
            .into_iter()
            .map(|key| {
                let values = objects.iter().filter_map(|obj| obj.get(key)).collect();
                json_descriptor(key, base, values)
            })
            .collect();
        (FieldType::Complex, children)
    };

    FieldDescriptor {
        name: name.to_string(),
        path,
        field_type,
        cardinality: if many {
            Cardinality::ZeroToMany
        } else {
            Cardinality::ZeroToOne
        },
        children,
    }
}

fn inspect_xml(xml: &XmlDocument) -> FieldDescriptor {
    match xml.root() {
        Some(root) => {
            let name = xml.element(root).name.qualified();
            xml_descriptor(xml, &name, "", &[root], false)
        }
        None => FieldDescriptor {
            name: String::new(),
            path: "/".to_string(),
            field_type: FieldType::Complex,
            cardinality: Cardinality::ZeroToOne,
            children: Vec::new(),
        },
    }
}

fn xml_descriptor(
    xml: &XmlDocument,
    name: &str,
    parent: &str,
    nodes: &[NodeId],
    many: bool,
) -> FieldDescriptor {
    let path = if many {
        format!("{}/{}<>", parent, name)
    } else {
        format!("{}/{}", parent, name)
    };

    let mut attributes = Vec::new();
    let mut elements = Vec::new();
    for node in nodes {
        let element = xml.element(*node);
        for attr in &element.attributes {
            push_unique(&mut attributes, attr.name.local.as_str());
        }
        for child in element.children() {
            push_unique(&mut elements, xml.element(*child).name.local.as_str());
        }
    }

    let mut children: Vec<FieldDescriptor> = attributes
        .into_iter()
        .map(|attr| FieldDescriptor {
            name: attr.to_string(),
            path: format!("{}/@{}", path, attr),
            field_type: FieldType::String,
            cardinality: Cardinality::ZeroToOne,
            children: Vec::new(),
        })
        .collect();

    for local in elements {
        let mut qualified = None;
        let mut repeated = false;
        let mut matched = Vec::new();
        for node in nodes {
            let before = matched.len();
            for child in xml.children(*node) {
                let name = &xml.element(child).name;
                if name.local == local {
                    qualified.get_or_insert_with(|| name.qualified());
                    matched.push(child);
                }
            }
            repeated |= matched.len() - before > 1;
        }
        let child_name = qualified.unwrap_or_else(|| local.to_string());
        children.push(xml_descriptor(xml, &child_name, &path, &matched, repeated));
    }

    let field_type = if children.is_empty() {
        FieldType::String
    } else {
        FieldType::Complex
    };

    FieldDescriptor {
        name: name.to_string(),
        path,
        field_type,
        cardinality: if many {
            Cardinality::ZeroToMany
        } else {
            Cardinality::ZeroToOne
        },
        children,
    }
}
