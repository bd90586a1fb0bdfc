//! Schema discovery capability
//!
//! The engine never inspects native objects itself. Anything able to describe
//! a document's shape implements [`SchemaProvider`] and returns a declarative
//! descriptor tree.

use crate::value::FieldType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    ZeroToOne,
    ZeroToMany,
}

/// Describes one field and, for complex fields, its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub path: String,
    pub field_type: FieldType,
    pub cardinality: Cardinality,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    /// This descriptor and all descendants, depth-first.
    pub fn walk(&self) -> Vec<&FieldDescriptor> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    pub fn find(&self, path: &str) -> Option<&FieldDescriptor> {
        self.walk().into_iter().find(|d| d.path == path)
    }
}

pub trait SchemaProvider {
    /// Root descriptor of the described document, if any.
    fn describe(&self) -> Option<FieldDescriptor>;
}
