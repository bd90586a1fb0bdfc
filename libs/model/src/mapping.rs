//! Mapping specification model
//!
//! This is the in-memory form of a mapping spec. Persisted formats are handled
//! by whoever deserializes it; the model only derives `serde` traits.

use crate::field::Field;
use crate::value::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a [`Mapping`] moves values from inputs to outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingType {
    #[default]
    Map,
    Combine,
    Separate,
    Lookup,
    Collection,
}

impl std::fmt::Display for MappingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Map => "MAP",
            Self::Combine => "COMBINE",
            Self::Separate => "SEPARATE",
            Self::Lookup => "LOOKUP",
            Self::Collection => "COLLECTION",
        };
        f.write_str(s)
    }
}

/// Declared kind of collection iterated by a COLLECTION mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionType {
    #[default]
    Array,
    List,
    Map,
}

/// One declared transformation unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub mapping_type: MappingType,
    #[serde(default)]
    pub input_fields: Vec<Field>,
    #[serde(default)]
    pub output_fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_type: Option<CollectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_size: Option<usize>,
    /// Nested mappings, COLLECTION only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<Mapping>,
}

impl Mapping {
    pub fn map(input: Field, output: Field) -> Self {
        Self {
            mapping_type: MappingType::Map,
            input_fields: vec![input],
            output_fields: vec![output],
            ..Default::default()
        }
    }

    pub fn combine(inputs: Vec<Field>, output: Field) -> Self {
        Self {
            mapping_type: MappingType::Combine,
            input_fields: inputs,
            output_fields: vec![output],
            ..Default::default()
        }
    }

    pub fn separate(input: Field, outputs: Vec<Field>) -> Self {
        Self {
            mapping_type: MappingType::Separate,
            input_fields: vec![input],
            output_fields: outputs,
            ..Default::default()
        }
    }

    pub fn lookup(input: Field, output: Field, table: impl Into<String>) -> Self {
        Self {
            mapping_type: MappingType::Lookup,
            input_fields: vec![input],
            output_fields: vec![output],
            lookup_table_name: Some(table.into()),
            ..Default::default()
        }
    }

    pub fn collection(collection_type: CollectionType, mappings: Vec<Mapping>) -> Self {
        Self {
            mapping_type: MappingType::Collection,
            collection_type: Some(collection_type),
            mappings,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_collection_size(mut self, size: usize) -> Self {
        self.collection_size = Some(size);
        self
    }

    pub fn with_input(mut self, field: Field) -> Self {
        self.input_fields.push(field);
        self
    }
}

/// One source → target substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub source_value: String,
    #[serde(default = "default_lookup_type")]
    pub source_type: FieldType,
    pub target_value: String,
    #[serde(default = "default_lookup_type")]
    pub target_type: FieldType,
}

fn default_lookup_type() -> FieldType {
    FieldType::String
}

impl LookupEntry {
    pub fn new(source_value: impl Into<String>, target_value: impl Into<String>) -> Self {
        Self {
            source_value: source_value.into(),
            source_type: FieldType::String,
            target_value: target_value.into(),
            target_type: FieldType::String,
        }
    }

    pub fn with_target_type(mut self, target_type: FieldType) -> Self {
        self.target_type = target_type;
        self
    }
}

/// Named, ordered list of substitutions used by LOOKUP mappings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<LookupEntry>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_entry(mut self, entry: LookupEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// First entry whose source value equals `key`.
    pub fn find(&self, key: &str) -> Option<&LookupEntry> {
        self.entries.iter().find(|e| e.source_value == key)
    }
}

/// A complete mapping specification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_tables: Vec<LookupTable>,
    /// Namespace prefix → URI, used when writing prefixed XML paths
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, String>,
}

impl MappingSpec {
    pub fn new(mappings: Vec<Mapping>) -> Self {
        Self {
            mappings,
            ..Default::default()
        }
    }

    pub fn with_lookup_table(mut self, table: LookupTable) -> Self {
        self.lookup_tables.push(table);
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn lookup_table(&self, name: &str) -> Option<&LookupTable> {
        self.lookup_tables.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_first_match_wins() {
        let table = LookupTable::new("colors")
            .with_entry(LookupEntry::new("R", "Red"))
            .with_entry(LookupEntry::new("R", "Rouge"))
            .with_entry(LookupEntry::new("G", "Green"));

        assert_eq!(table.find("R").unwrap().target_value, "Red");
        assert_eq!(table.find("G").unwrap().target_value, "Green");
        assert!(table.find("B").is_none());
    }

    #[test]
    fn test_spec_deserialize() {
        let spec: MappingSpec = serde_json::from_str(
            r#"{
                "mappings": [
                    {
                        "mappingType": "COMBINE",
                        "delimiter": " ",
                        "inputFields": [
                            { "path": "/first", "index": 0 },
                            { "path": "/last", "index": 1 }
                        ],
                        "outputFields": [ { "path": "/name" } ]
                    },
                    {
                        "mappingType": "COLLECTION",
                        "collectionType": "LIST",
                        "mappings": [
                            {
                                "inputFields": [ { "path": "/items<>/id" } ],
                                "outputFields": [ { "path": "/lines<>/id" } ]
                            }
                        ]
                    }
                ],
                "lookupTables": [
                    { "name": "t", "entries": [ { "sourceValue": "a", "targetValue": "b" } ] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(spec.mappings.len(), 2);
        assert_eq!(spec.mappings[0].mapping_type, MappingType::Combine);
        assert_eq!(spec.mappings[1].collection_type, Some(CollectionType::List));
        assert_eq!(spec.mappings[1].mappings[0].mapping_type, MappingType::Map);
        let entry = &spec.lookup_table("t").unwrap().entries[0];
        assert_eq!(entry.target_type, FieldType::String);
    }
}
