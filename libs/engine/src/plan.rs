//! Compiled mapping plans
//!
//! A [`MappingPlan`] is the read-only, executable form of a
//! [`MappingSpec`](fieldmap_model::MappingSpec): every field path is parsed,
//! every mapping has a stable label for diagnostics, and shape problems are
//! found once instead of on every pass. Plans are `Send + Sync` and can be
//! executed any number of times.

use fieldmap_model::{Action, CollectionType, FieldType, FieldValue, LookupTable, MappingType};
use fieldmap_path::PathExpression;
use std::collections::BTreeMap;

/// Executable mapping spec
#[derive(Debug, Clone, Default)]
pub struct MappingPlan {
    pub name: Option<String>,
    pub mappings: Vec<PlannedMapping>,
    pub lookup_tables: Vec<LookupTable>,
    /// Spec namespaces merged over the engine configuration
    pub namespaces: BTreeMap<String, String>,
}

impl MappingPlan {
    pub fn lookup_table(&self, name: &str) -> Option<&LookupTable> {
        self.lookup_tables.iter().find(|t| t.name == name)
    }

    /// Number of mappings, nested ones included.
    pub fn mapping_count(&self) -> usize {
        fn count(mappings: &[PlannedMapping]) -> usize {
            mappings.iter().map(|m| 1 + count(&m.children)).sum()
        }
        count(&self.mappings)
    }

    /// Mappings whose shape is invalid; they are skipped at execution.
    pub fn invalid_mappings(&self) -> Vec<&PlannedMapping> {
        fn collect<'a>(mappings: &'a [PlannedMapping], out: &mut Vec<&'a PlannedMapping>) {
            for m in mappings {
                if m.invalid.is_some() {
                    out.push(m);
                }
                collect(&m.children, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.mappings, &mut out);
        out
    }
}

/// A field with its path parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedField {
    pub path: PathExpression,
    pub field_type: Option<FieldType>,
    pub doc_id: Option<String>,
    pub index: Option<usize>,
    pub actions: Vec<Action>,
}

impl PlannedField {
    /// Fresh per-pass value holder for this field.
    pub fn value(&self) -> FieldValue {
        FieldValue {
            path: self.path.clone(),
            field_type: self.field_type,
            value: None,
            doc_id: self.doc_id.clone(),
            index: self.index,
        }
    }

    fn map_path(&self, f: impl Fn(&PathExpression) -> PathExpression) -> Self {
        Self {
            path: f(&self.path),
            ..self.clone()
        }
    }
}

/// A mapping ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMapping {
    /// Declared id, or the 1-based position (`"2"`, `"2.1"` for nested)
    pub label: String,
    pub mapping_type: MappingType,
    pub inputs: Vec<PlannedField>,
    pub outputs: Vec<PlannedField>,
    pub lookup_table: Option<String>,
    pub delimiter: Option<String>,
    pub collection_type: Option<CollectionType>,
    pub collection_size: Option<usize>,
    pub children: Vec<PlannedMapping>,
    /// Why the mapping cannot run, when its shape is wrong
    pub invalid: Option<String>,
}

impl PlannedMapping {
    /// Shape check for one mapping (children are checked separately).
    pub(crate) fn shape_error(&self) -> Option<String> {
        let (inputs, outputs) = (self.inputs.len(), self.outputs.len());
        if self.mapping_type != MappingType::Collection && !self.children.is_empty() {
            return Some(format!("{} cannot carry nested mappings", self.mapping_type));
        }
        match self.mapping_type {
            MappingType::Map if inputs != 1 || outputs != 1 => Some(format!(
                "MAP needs one input and one output, found {} and {}",
                inputs, outputs
            )),
            MappingType::Combine if inputs == 0 || outputs != 1 => Some(format!(
                "COMBINE needs at least one input and one output, found {} and {}",
                inputs, outputs
            )),
            MappingType::Separate if inputs != 1 || outputs == 0 => Some(format!(
                "SEPARATE needs one input and at least one output, found {} and {}",
                inputs, outputs
            )),
            MappingType::Lookup if inputs != 1 || outputs != 1 => Some(format!(
                "LOOKUP needs one input and one output, found {} and {}",
                inputs, outputs
            )),
            MappingType::Lookup if self.lookup_table.is_none() => {
                Some("LOOKUP without a lookup table name".to_string())
            }
            MappingType::Collection if self.children.is_empty() => {
                Some("COLLECTION without nested mappings".to_string())
            }
            MappingType::Map
            | MappingType::Combine
            | MappingType::Separate
            | MappingType::Lookup
            | MappingType::Collection => None,
        }
    }

    /// Every input field of this mapping and its descendants.
    pub fn all_inputs(&self) -> Vec<&PlannedField> {
        let mut out: Vec<&PlannedField> = self.inputs.iter().collect();
        for child in &self.children {
            out.extend(child.all_inputs());
        }
        out
    }

    /// Every output field of this mapping and its descendants.
    pub fn all_outputs(&self) -> Vec<&PlannedField> {
        let mut out: Vec<&PlannedField> = self.outputs.iter().collect();
        for child in &self.children {
            out.extend(child.all_outputs());
        }
        out
    }

    /// Copy for one iteration of an enclosing COLLECTION.
    ///
    /// Plain mappings get `index` in every unindexed collection segment. A
    /// nested COLLECTION only gets it in the outermost one, throughout its
    /// subtree, so it can expand the next level itself.
    pub fn for_iteration(&self, index: usize) -> Self {
        if self.mapping_type == MappingType::Collection {
            self.map_paths(&|p| p.with_first_collection_index(index))
        } else {
            self.map_paths(&|p| p.with_collection_index(index))
        }
    }

    fn map_paths(&self, f: &dyn Fn(&PathExpression) -> PathExpression) -> Self {
        Self {
            inputs: self.inputs.iter().map(|x| x.map_path(f)).collect(),
            outputs: self.outputs.iter().map(|x| x.map_path(f)).collect(),
            children: self.children.iter().map(|c| c.map_paths(f)).collect(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(path: &str) -> PlannedField {
        PlannedField {
            path: PathExpression::parse(path).unwrap(),
            field_type: None,
            doc_id: None,
            index: None,
            actions: Vec::new(),
        }
    }

    fn mapping(mapping_type: MappingType, inputs: &[&str], outputs: &[&str]) -> PlannedMapping {
        PlannedMapping {
            label: "1".into(),
            mapping_type,
            inputs: inputs.iter().map(|p| field(p)).collect(),
            outputs: outputs.iter().map(|p| field(p)).collect(),
            lookup_table: None,
            delimiter: None,
            collection_type: None,
            collection_size: None,
            children: Vec::new(),
            invalid: None,
        }
    }

    #[test]
    fn test_shape_errors() {
        assert!(mapping(MappingType::Map, &["/a"], &["/b"]).shape_error().is_none());
        assert!(mapping(MappingType::Map, &["/a", "/c"], &["/b"]).shape_error().is_some());
        assert!(mapping(MappingType::Combine, &[], &["/b"]).shape_error().is_some());
        assert!(mapping(MappingType::Separate, &["/a"], &[]).shape_error().is_some());
        assert!(mapping(MappingType::Lookup, &["/a"], &["/b"]).shape_error().is_some());
        assert!(mapping(MappingType::Collection, &[], &[]).shape_error().is_some());
    }

    #[test]
    fn test_iteration_substitution() {
        let mut outer = mapping(MappingType::Collection, &[], &[]);
        let inner = mapping(MappingType::Map, &["/orders<>/lines<>/sku"], &["/out<>/sku"]);
        outer.children.push(inner.clone());

        let plain = inner.for_iteration(3);
        assert_eq!(plain.inputs[0].path.to_string(), "/orders<3>/lines<3>/sku");
        assert_eq!(plain.outputs[0].path.to_string(), "/out<3>/sku");

        let nested = outer.for_iteration(1);
        assert_eq!(
            nested.children[0].inputs[0].path.to_string(),
            "/orders<1>/lines<>/sku"
        );
    }
}
