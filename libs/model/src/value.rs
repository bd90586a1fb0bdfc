//! Field types and scalar values
//!
//! [`FieldType`] is the format-independent semantic type of a field.
//! [`Value`] is the native scalar read from, or written to, a document.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Any,
    Boolean,
    Byte,
    Char,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Date,
    Time,
    DateTime,
    Complex,
    None,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        FieldType::Any,
        FieldType::Boolean,
        FieldType::Byte,
        FieldType::Char,
        FieldType::Short,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Float,
        FieldType::Double,
        FieldType::Decimal,
        FieldType::String,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Complex,
        FieldType::None,
    ];

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, FieldType::Float | FieldType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || self == FieldType::Decimal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Any => "ANY",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Byte => "BYTE",
            FieldType::Char => "CHAR",
            FieldType::Short => "SHORT",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Decimal => "DECIMAL",
            FieldType::String => "STRING",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "DATE_TIME",
            FieldType::Complex => "COMPLEX",
            FieldType::None => "NONE",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown field type: {0}")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

/// Native scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
}

impl Value {
    /// Type inferred from the native representation.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Boolean(_) => FieldType::Boolean,
            Value::Byte(_) => FieldType::Byte,
            Value::Char(_) => FieldType::Char,
            Value::Short(_) => FieldType::Short,
            Value::Integer(_) => FieldType::Integer,
            Value::Long(_) => FieldType::Long,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::Decimal(_) => FieldType::Decimal,
            Value::String(_) => FieldType::String,
            Value::Date(_) => FieldType::Date,
            Value::Time(_) => FieldType::Time,
            Value::DateTime(_) => FieldType::DateTime,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral value widened to `i64`, for the integral variants only.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Integer(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}
