//! Declared fields and per-pass field values

use crate::action::Action;
use crate::value::{FieldType, Value};
use fieldmap_path::{PathExpression, Result as PathResult};
use serde::{Deserialize, Serialize};

/// A field as declared inside a [`Mapping`](crate::Mapping).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Field {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Value of a field during one processing pass.
///
/// `field_type` is the declared (or, after actions, the effective) type;
/// `value` is `None` until read, and stays `None` when the path does not
/// resolve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValue {
    pub path: PathExpression,
    pub field_type: Option<FieldType>,
    pub value: Option<Value>,
    pub doc_id: Option<String>,
    pub index: Option<usize>,
}

impl FieldValue {
    pub fn new(path: PathExpression) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Parse `path` and build an empty field value.
    pub fn parse(path: &str) -> PathResult<Self> {
        Ok(Self::new(PathExpression::parse(path)?))
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_serde_camel_case() {
        let field: Field = serde_json::from_str(
            r#"{ "path": "/a/b", "fieldType": "INTEGER", "docId": "src", "index": 2 }"#,
        )
        .unwrap();
        assert_eq!(field.field_type, Some(FieldType::Integer));
        assert_eq!(field.doc_id.as_deref(), Some("src"));
        assert_eq!(field.index, Some(2));
        assert!(field.actions.is_empty());
    }
}
