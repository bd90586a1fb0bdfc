//! Type conversion registry
//!
//! Maps `(source, target)` type pairs to a converter and the concern that
//! classifies how safe the conversion is. The registry is built once and then
//! shared read-only, typically behind an `Arc`.

use crate::converters;
use crate::error::Result;
use fieldmap_model::{ConversionConcern, FieldType, Value};
use std::collections::HashMap;
use std::fmt;

/// Converter function: takes a value, returns it in the converter's target
/// type or refuses it.
pub type ConvertFn = fn(&Value) -> Result<Value>;

/// A registered conversion between two field types.
#[derive(Clone, Copy)]
pub struct Converter {
    pub source: FieldType,
    pub target: FieldType,
    pub concern: ConversionConcern,
    convert: ConvertFn,
}

impl Converter {
    pub fn new(
        source: FieldType,
        target: FieldType,
        concern: ConversionConcern,
        convert: ConvertFn,
    ) -> Self {
        Self {
            source,
            target,
            concern,
            convert,
        }
    }

    pub fn convert(&self, value: &Value) -> Result<Value> {
        (self.convert)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("concern", &self.concern)
            .finish_non_exhaustive()
    }
}

/// Result of [`TypeConversionRegistry::convert`].
///
/// `value` is `None` exactly when `concern` is `Unsupported`.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub value: Option<Value>,
    pub concern: ConversionConcern,
    /// Converter refusal, when there was one
    pub reason: Option<String>,
}

impl Conversion {
    fn pass(value: &Value) -> Self {
        Self {
            value: Some(value.clone()),
            concern: ConversionConcern::None,
            reason: None,
        }
    }

    fn unsupported(reason: String) -> Self {
        Self {
            value: None,
            concern: ConversionConcern::Unsupported,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeConversionRegistry {
    converters: HashMap<(FieldType, FieldType), Converter>,
}

fn target_fn(target: FieldType) -> Option<ConvertFn> {
    let f: ConvertFn = match target {
        FieldType::Boolean => converters::to_boolean,
        FieldType::Byte => converters::to_byte,
        FieldType::Char => converters::to_char,
        FieldType::Short => converters::to_short,
        FieldType::Integer => converters::to_integer,
        FieldType::Long => converters::to_long,
        FieldType::Float => converters::to_float,
        FieldType::Double => converters::to_double,
        FieldType::Decimal => converters::to_decimal,
        FieldType::String => converters::to_string,
        FieldType::Date => converters::to_date,
        FieldType::Time => converters::to_time,
        FieldType::DateTime => converters::to_date_time,
        FieldType::Any | FieldType::Complex | FieldType::None => return None,
    };
    Some(f)
}

fn integral_rank(t: FieldType) -> u8 {
    match t {
        FieldType::Byte => 0,
        FieldType::Short => 1,
        FieldType::Integer => 2,
        _ => 3,
    }
}

/// Concern of the built-in converter for a pair, `None` when no built-in
/// converter exists.
fn builtin_concern(source: FieldType, target: FieldType) -> Option<ConversionConcern> {
    use ConversionConcern::{Format, None as Safe, Range};
    use FieldType::*;

    let concern = match (source, target) {
        (s, String) if target_fn(s).is_some() => Safe,
        (String, t) if target_fn(t).is_some() => Format,

        (s, t) if s.is_integral() && t.is_integral() => {
            if integral_rank(s) <= integral_rank(t) {
                Safe
            } else {
                Range
            }
        }
        (Byte | Short, Float) | (Byte | Short | Integer, Double) => Safe,
        (s, Float | Double) if s.is_integral() => Range,
        (s, Decimal) if s.is_integral() => Safe,
        (s, t) if s.is_floating() && t.is_integral() => Range,
        (Float, Double) => Safe,
        (Double, Float) => Range,
        (Float | Double, Decimal) => Range,
        (Decimal, t) if t.is_numeric() => Range,

        (Boolean, t) if t.is_numeric() => Safe,
        (s, Boolean) if s.is_numeric() => Range,
        (Boolean, Char) => Safe,
        (Char, Boolean) => Format,

        (Char, Byte | Short) => Range,
        (Char, t) if t.is_numeric() => Safe,
        (s, Char) if s.is_numeric() => Range,

        (Date, DateTime) => Safe,
        (DateTime, Date | Time) => Range,
        (DateTime, Long) => Safe,
        (Long, DateTime) => Range,

        _ => return Option::None,
    };
    Some(concern)
}

impl TypeConversionRegistry {
    /// Registry with every built-in converter.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for source in FieldType::ALL {
            for target in FieldType::ALL {
                if source == target {
                    continue;
                }
                if let (Some(concern), Some(convert)) =
                    (builtin_concern(source, target), target_fn(target))
                {
                    registry.register(Converter::new(source, target, concern, convert));
                }
            }
        }
        tracing::debug!(converters = registry.len(), "conversion registry built");
        registry
    }

    /// Registry without converters, to be filled with [`register`](Self::register).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace the converter for its type pair.
    pub fn register(&mut self, converter: Converter) -> &mut Self {
        self.converters
            .insert((converter.source, converter.target), converter);
        self
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn find_converter(&self, source: FieldType, target: FieldType) -> Option<&Converter> {
        self.converters.get(&(source, target))
    }

    /// Static concern for a type pair.
    pub fn classify(&self, source: FieldType, target: FieldType) -> ConversionConcern {
        if source == target {
            return ConversionConcern::None;
        }
        self.find_converter(source, target)
            .map(|c| c.concern)
            .unwrap_or(ConversionConcern::Unsupported)
    }

    /// Field type of a native value.
    pub fn type_from_native_value(&self, value: &Value) -> FieldType {
        value.field_type()
    }

    /// Convert `value` to `target`.
    ///
    /// The source type is the value's own type. An undeclared target, `Any`,
    /// or a target equal to the source passes the value through. A missing
    /// converter, or one that refuses the value, yields `Unsupported` with no
    /// value.
    pub fn convert(&self, value: &Value, target: Option<FieldType>) -> Conversion {
        let source = self.type_from_native_value(value);
        let target = match target {
            None | Some(FieldType::Any) => return Conversion::pass(value),
            Some(t) if t == source => return Conversion::pass(value),
            Some(t) => t,
        };

        let Some(converter) = self.find_converter(source, target) else {
            return Conversion::unsupported(format!("no converter from {} to {}", source, target));
        };

        match converter.convert(value) {
            Ok(converted) => {
                if converter.concern.is_warning() {
                    tracing::trace!(%source, %target, concern = %converter.concern, "conversion with concern");
                }
                Conversion {
                    value: Some(converted),
                    concern: converter.concern,
                    reason: None,
                }
            }
            Err(e) => Conversion::unsupported(e.to_string()),
        }
    }
}
