//! Document accessors for JSON and XML trees.
//!
//! Every format implements the same [`DocumentAccessor`] contract:
//! - `read` resolves a path and stores the scalar in the field value
//!   (unresolvable paths leave it `None`)
//! - `collection_count` counts matching siblings at one segment of a path
//! - `write` walks the path, creating nodes as needed; explicit indexes pad
//!   the collection with empty placeholders, unindexed collection segments
//!   append a new sibling
//!
//! Placement problems while writing are not errors; they are collected as
//! diagnostics and drained with [`DocumentAccessor::take_issues`].

pub mod error;
pub mod inspect;
pub mod json;
pub mod xml;

pub use error::{DocumentError, Result};
pub use inspect::{inspect, InstanceSchemaProvider};
pub use json::JsonAccessor;
pub use xml::{NodeId, QName, XmlAccessor, XmlAttribute, XmlDocument, XmlElement};

use fieldmap_model::{Diagnostic, FieldValue};
use fieldmap_path::PathExpression;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Xml,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(DocumentError::InvalidArgument(format!(
                "unknown document format '{}'",
                other
            ))),
        }
    }
}

/// A fully materialized tree document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Json(serde_json::Value),
    Xml(XmlDocument),
}

impl Document {
    pub fn parse(format: DocumentFormat, input: &str) -> Result<Self> {
        match format {
            DocumentFormat::Json => Ok(Self::Json(serde_json::from_str(input)?)),
            DocumentFormat::Xml => Ok(Self::Xml(XmlDocument::parse(input)?)),
        }
    }

    pub fn format(&self) -> DocumentFormat {
        match self {
            Self::Json(_) => DocumentFormat::Json,
            Self::Xml(_) => DocumentFormat::Xml,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Self::Xml(x) => Some(x),
            Self::Json(_) => None,
        }
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        match self {
            Self::Json(v) => Ok(serde_json::to_string_pretty(v)?),
            Self::Xml(x) => x.to_xml_string(),
        }
    }
}

/// Path-based access to one document format.
///
/// Accessors carry per-invocation state (pending issues, namespace map) and
/// must not be shared between concurrent passes.
pub trait DocumentAccessor: Send {
    fn format(&self) -> DocumentFormat;

    /// Resolve `field.path` in `doc` and store the result in `field.value`.
    fn read(&self, doc: &Document, field: &mut FieldValue) -> Result<()>;

    fn read_all(&self, doc: &Document, fields: &mut [FieldValue]) -> Result<()> {
        for field in fields.iter_mut() {
            self.read(doc, field)?;
        }
        Ok(())
    }

    /// Number of siblings matching the segment at `position` along `path`.
    fn collection_count(&self, doc: &Document, path: &PathExpression, position: usize)
        -> Result<usize>;

    /// Write `field` into `doc`, creating the document when `None`.
    fn write(&mut self, field: &FieldValue, doc: Option<Document>) -> Result<Document>;

    fn write_all(&mut self, fields: &[FieldValue], doc: Option<Document>) -> Result<Document> {
        let mut doc = doc;
        for field in fields {
            doc = Some(self.write(field, doc)?);
        }
        doc.ok_or_else(|| {
            DocumentError::InvalidArgument("no fields to write and no document supplied".into())
        })
    }

    /// Drain placement diagnostics collected by writes.
    fn take_issues(&mut self) -> Vec<Diagnostic>;
}

/// Build the accessor for `format`. `namespaces` maps output prefixes to URIs.
pub fn accessor_for(
    format: DocumentFormat,
    namespaces: &BTreeMap<String, String>,
) -> Box<dyn DocumentAccessor> {
    match format {
        DocumentFormat::Json => Box::new(JsonAccessor::new()),
        DocumentFormat::Xml => Box::new(XmlAccessor::with_namespaces(namespaces.clone())),
    }
}

pub(crate) fn wrong_format(expected: DocumentFormat, got: &Document) -> DocumentError {
    DocumentError::InvalidArgument(format!(
        "expected a {} document, got {}",
        expected,
        got.format()
    ))
}
