//! JSON document accessor
//!
//! The first path segment is a key of the root object. Collection segments are
//! backed by arrays; placeholders created by indexed writes are `null`.
//! JSON has no attributes, so attribute segments address plain properties.

use crate::error::Result;
use crate::{wrong_format, Document, DocumentAccessor, DocumentFormat};
use fieldmap_model::{Diagnostic, DiagnosticCode, FieldValue, Value};
use fieldmap_path::{PathExpression, PathSegment};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value as Json};
use std::str::FromStr;

#[derive(Debug, Default)]
pub struct JsonAccessor {
    issues: Vec<Diagnostic>,
}

impl JsonAccessor {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolve a segment against an object, trying the prefixed key first.
fn child<'a>(obj: &'a Map<String, Json>, seg: &PathSegment) -> Option<&'a Json> {
    if seg.prefix.is_some() {
        if let Some(v) = obj.get(&seg.qualified_name()) {
            return Some(v);
        }
    }
    obj.get(&seg.name)
}

/// Pick the element addressed by `seg` out of a resolved property.
fn select<'a>(value: &'a Json, seg: &PathSegment) -> Option<&'a Json> {
    let index = seg.index.unwrap_or(0);
    match value {
        Json::Array(items) => items.get(index),
        other if index == 0 => Some(other),
        _ => None,
    }
}

fn lookup<'a>(root: &'a Json, path: &PathExpression) -> Option<&'a Json> {
    let mut current = root;
    for seg in path.segments() {
        let property = child(current.as_object()?, seg)?;
        current = select(property, seg)?;
    }
    Some(current)
}

/// Native value of a JSON scalar; `null`, objects and arrays yield `None`.
pub fn json_to_value(json: &Json) -> Option<Value> {
    match json {
        Json::Bool(b) => Some(Value::Boolean(*b)),
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(match i32::try_from(i) {
                    Ok(small) => Value::Integer(small),
                    Err(_) => Value::Long(i),
                });
            }
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(Value::Decimal)
                .ok()
                .or_else(|| n.as_f64().map(Value::Double))
        }
        Json::Null | Json::Object(_) | Json::Array(_) => None,
    }
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Boolean(b) => Json::Bool(*b),
        Value::Byte(v) => Json::from(*v),
        Value::Short(v) => Json::from(*v),
        Value::Integer(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Float(v) => float_to_json(&v.to_string()),
        Value::Double(v) => Number::from_f64(*v)
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(v.to_string())),
        Value::Decimal(d) => float_to_json(&d.normalize().to_string()),
        other => Json::String(other.to_string()),
    }
}

fn float_to_json(text: &str) -> Json {
    Number::from_str(text)
        .map(Json::Number)
        .unwrap_or_else(|_| Json::String(text.to_string()))
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn ensure_array(slot: &mut Json) -> &mut Vec<Json> {
    if !slot.is_array() {
        let existing = slot.take();
        *slot = Json::Array(if existing.is_null() {
            Vec::new()
        } else {
            vec![existing]
        });
    }
    match slot {
        Json::Array(items) => items,
        _ => unreachable!("slot was just replaced with an array"),
    }
}

/// Walk `path` from `root`, creating objects and arrays as needed, and store
/// `value` at the leaf.
fn place(root: &mut Json, path: &PathExpression, value: Json) -> std::result::Result<(), String> {
    let last = path.len().saturating_sub(1);
    let mut current = root;

    for (position, seg) in path.segments().enumerate() {
        if current.is_null() {
            *current = Json::Object(Map::new());
        }
        let obj = match current {
            Json::Object(obj) => obj,
            other => {
                return Err(format!(
                    "cannot descend into {} at segment '{}'",
                    kind(other),
                    seg
                ));
            }
        };

        if seg.is_collection() {
            let items = ensure_array(obj.entry(seg.name.clone()).or_insert(Json::Null));
            let index = match seg.index {
                Some(index) => {
                    while items.len() <= index {
                        items.push(Json::Null);
                    }
                    index
                }
                None => {
                    items.push(Json::Null);
                    items.len() - 1
                }
            };
            if position == last {
                items[index] = value;
                return Ok(());
            }
            current = &mut items[index];
        } else {
            if position == last {
                obj.insert(seg.name.clone(), value);
                return Ok(());
            }
            current = obj.entry(seg.name.clone()).or_insert(Json::Null);
        }
    }
    Ok(())
}

impl DocumentAccessor for JsonAccessor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn read(&self, doc: &Document, field: &mut FieldValue) -> Result<()> {
        let root = doc
            .as_json()
            .ok_or_else(|| wrong_format(DocumentFormat::Json, doc))?;
        field.value = lookup(root, &field.path).and_then(json_to_value);
        tracing::trace!(path = %field.path, resolved = field.value.is_some(), "json read");
        Ok(())
    }

    fn collection_count(
        &self,
        doc: &Document,
        path: &PathExpression,
        position: usize,
    ) -> Result<usize> {
        let root = doc
            .as_json()
            .ok_or_else(|| wrong_format(DocumentFormat::Json, doc))?;
        let parent = lookup(root, &path.truncate(position));
        let property = parent
            .and_then(Json::as_object)
            .zip(path.get(position))
            .and_then(|(obj, seg)| child(obj, seg));

        Ok(match property {
            Some(Json::Array(items)) => items.len(),
            Some(Json::Null) | None => 0,
            Some(_) => 1,
        })
    }

    fn write(&mut self, field: &FieldValue, doc: Option<Document>) -> Result<Document> {
        let mut root = match doc {
            None => Json::Object(Map::new()),
            Some(Document::Json(root)) => root,
            Some(other) => return Err(wrong_format(DocumentFormat::Json, &other)),
        };
        let value = field.value.as_ref().map(value_to_json).unwrap_or(Json::Null);

        if field.path.is_root() {
            root = value;
        } else if let Err(reason) = place(&mut root, &field.path, value) {
            tracing::debug!(path = %field.path, %reason, "json write not placed");
            self.issues
                .push(Diagnostic::error(DiagnosticCode::Placement, reason).with_path(&field.path));
        }
        Ok(Document::Json(root))
    }

    fn take_issues(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.issues)
    }
}
