//! XML document accessor
//!
//! The first path segment names the root element. Leaf values are element
//! text or attribute values; every value is read as a string and converted by
//! the engine. Names match on local name, and a path prefix the document
//! declares must also match the element's namespace. A prefix the document
//! does not declare matches on local name alone; the caller's namespace map
//! only qualifies names created by writes.

mod tree;

pub use tree::{NamespaceDecl, NodeId, QName, XmlAttribute, XmlDocument, XmlElement};

use crate::error::Result;
use crate::{wrong_format, Document, DocumentAccessor, DocumentFormat};
use fieldmap_model::{Diagnostic, DiagnosticCode, FieldValue, Value};
use fieldmap_path::{PathExpression, PathSegment};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct XmlAccessor {
    /// Prefix → URI declared on written documents when a path uses the prefix
    namespaces: BTreeMap<String, String>,
    issues: Vec<Diagnostic>,
}

impl XmlAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces(namespaces: BTreeMap<String, String>) -> Self {
        Self {
            namespaces,
            issues: Vec::new(),
        }
    }

    fn matches(&self, doc: &XmlDocument, name: &QName, seg: &PathSegment) -> bool {
        if name.local != seg.name {
            return false;
        }
        match seg.prefix.as_deref().and_then(|prefix| doc.namespace_uri(prefix)) {
            Some(uri) => name.namespace.as_deref() == Some(uri),
            None => true,
        }
    }

    fn matching_children(&self, doc: &XmlDocument, parent: NodeId, seg: &PathSegment) -> Vec<NodeId> {
        doc.children(parent)
            .filter(|child| self.matches(doc, &doc.element(*child).name, seg))
            .collect()
    }

    /// Element addressed by the non-attribute segments of `path`, indexes
    /// defaulting to the first match.
    fn find_element(&self, doc: &XmlDocument, path: &PathExpression) -> Option<NodeId> {
        let mut segments = path.segments().filter(|s| !s.attribute);
        let root = doc.root()?;
        let first = segments.next()?;
        if !self.matches(doc, &doc.element(root).name, first) || first.index.unwrap_or(0) != 0 {
            return None;
        }

        let mut current = root;
        for seg in segments {
            current = self
                .matching_children(doc, current, seg)
                .get(seg.index.unwrap_or(0))
                .copied()?;
        }
        Some(current)
    }

    fn lookup(&self, doc: &XmlDocument, path: &PathExpression) -> Option<String> {
        let element = doc.element(self.find_element(doc, path)?);
        let text = match path.last_segment() {
            Some(seg) if seg.attribute => element
                .attributes
                .iter()
                .find(|a| self.matches(doc, &a.name, seg))
                .map(|a| a.value.clone()),
            _ => element.text.clone(),
        };
        text.filter(|text| !text.trim().is_empty())
    }

    /// Name to create for `seg`, declaring its namespace on the root when the
    /// prefix comes from the caller's map.
    fn qualify(&mut self, doc: &mut XmlDocument, seg: &PathSegment, path: &PathExpression) -> QName {
        let Some(prefix) = seg.prefix.as_deref() else {
            return QName::local(&seg.name);
        };
        if let Some(uri) = doc.namespace_uri(prefix) {
            return QName::prefixed(prefix, &seg.name, uri);
        }
        if let Some(uri) = self.namespaces.get(prefix) {
            doc.declare_namespace(Some(prefix), uri);
            return QName::prefixed(prefix, &seg.name, uri.as_str());
        }

        self.issues.push(
            Diagnostic::warning(
                DiagnosticCode::UndeclaredPrefix,
                format!("namespace prefix '{}' is not declared, writing '{}' unqualified", prefix, seg.name),
            )
            .with_path(path),
        );
        QName::local(&seg.name)
    }

    fn placement(&mut self, path: &PathExpression, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(%path, %reason, "xml write not placed");
        self.issues
            .push(Diagnostic::error(DiagnosticCode::Placement, reason).with_path(path));
    }

    fn place(&mut self, doc: &mut XmlDocument, path: &PathExpression, value: Option<&Value>) {
        let mut segments = path.segments();
        let Some(first) = segments.next() else {
            self.placement(path, "cannot write a value to the document itself");
            return;
        };
        if first.attribute {
            self.placement(path, "the root of an XML document must be an element");
            return;
        }

        let mut current = match doc.root() {
            Some(root) if self.matches(doc, &doc.element(root).name, first) => root,
            Some(root) => {
                let existing = doc.element(root).name.qualified();
                self.placement(
                    path,
                    format!("root element '{}' does not match '{}'", existing, first.qualified_name()),
                );
                return;
            }
            None => {
                let name = self.qualify(doc, first, path);
                doc.set_root(name)
            }
        };

        for seg in segments {
            if seg.attribute {
                if let Some(value) = value {
                    let name = self.qualify(doc, seg, path);
                    doc.set_attribute(current, name, value.to_string());
                }
                return;
            }
            current = self.descend(doc, current, seg, path);
        }

        if let Some(value) = value {
            doc.element_mut(current).text = Some(value.to_string());
        }
    }

    /// Child of `parent` addressed by `seg`, created when missing.
    fn descend(
        &mut self,
        doc: &mut XmlDocument,
        parent: NodeId,
        seg: &PathSegment,
        path: &PathExpression,
    ) -> NodeId {
        let existing = self.matching_children(doc, parent, seg);
        let wanted = match (seg.is_collection(), seg.index) {
            (true, None) => None,
            (_, Some(index)) => Some(index),
            (false, None) => Some(0),
        };

        match wanted {
            Some(index) if index < existing.len() => existing[index],
            Some(index) => {
                let name = self.qualify(doc, seg, path);
                let mut created = parent;
                for _ in existing.len()..=index {
                    created = doc.append_child(parent, name.clone());
                }
                created
            }
            None => {
                let name = self.qualify(doc, seg, path);
                doc.append_child(parent, name)
            }
        }
    }
}

impl DocumentAccessor for XmlAccessor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xml
    }

    fn read(&self, doc: &Document, field: &mut FieldValue) -> Result<()> {
        let xml = doc
            .as_xml()
            .ok_or_else(|| wrong_format(DocumentFormat::Xml, doc))?;
        field.value = self.lookup(xml, &field.path).map(Value::String);
        tracing::trace!(path = %field.path, resolved = field.value.is_some(), "xml read");
        Ok(())
    }

    fn collection_count(
        &self,
        doc: &Document,
        path: &PathExpression,
        position: usize,
    ) -> Result<usize> {
        let xml = doc
            .as_xml()
            .ok_or_else(|| wrong_format(DocumentFormat::Xml, doc))?;
        let Some(seg) = path.get(position) else {
            return Ok(0);
        };

        if position == 0 {
            let root_matches = xml
                .root()
                .is_some_and(|root| self.matches(xml, &xml.element(root).name, seg));
            return Ok(usize::from(root_matches));
        }

        Ok(self
            .find_element(xml, &path.truncate(position))
            .map(|parent| self.matching_children(xml, parent, seg).len())
            .unwrap_or(0))
    }

    fn write(&mut self, field: &FieldValue, doc: Option<Document>) -> Result<Document> {
        let mut xml = match doc {
            None => XmlDocument::new(),
            Some(Document::Xml(xml)) => xml,
            Some(other) => return Err(wrong_format(DocumentFormat::Xml, &other)),
        };
        self.place(&mut xml, &field.path, field.value.as_ref());
        Ok(Document::Xml(xml))
    }

    fn take_issues(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.issues)
    }
}
