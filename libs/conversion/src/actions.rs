//! Field action pipeline
//!
//! Actions run strictly in declared order. Each one checks the type of the
//! value it receives; when the value is not of an accepted type the action is
//! skipped and the value moves on unchanged. The type produced by the last
//! executed action becomes the field's type, which is what the engine then
//! converts from on the output side.

use crate::converters;
use chrono::Datelike;
use fieldmap_model::{Action, AreaUnit, DistanceUnit, FieldType, FieldValue, MassUnit, Value, VolumeUnit};
use lru::LruCache;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock, PoisonError};

const REGEX_CACHE_SIZE: usize = 256;

/// Compiled ReplaceAll patterns; `None` marks a pattern that failed to compile.
fn regex_cache() -> &'static Mutex<LruCache<String, Option<Regex>>> {
    static CACHE: OnceLock<Mutex<LruCache<String, Option<Regex>>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        let size = NonZeroUsize::new(REGEX_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(size))
    })
}

fn compiled(pattern: &str) -> Option<Regex> {
    let mut cache = regex_cache().lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cached) = cache.get(pattern) {
        return cached.clone();
    }
    let compiled = match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(%pattern, error = %e, "invalid ReplaceAll pattern");
            None
        }
    };
    cache.put(pattern.to_string(), compiled.clone());
    compiled
}

/// Run `actions` over `field` and return the transformed field.
pub fn apply(actions: &[Action], mut field: FieldValue) -> FieldValue {
    for action in actions {
        let input_type = field.value.as_ref().map(Value::field_type);
        if !accepts(action, input_type) {
            tracing::trace!(
                action = action.name(),
                input = ?input_type,
                path = %field.path,
                "action skipped"
            );
            continue;
        }

        match execute(action, field.value.as_ref()) {
            Some(value) => {
                field.field_type = Some(action.output_type(value_type(input_type)));
                field.value = Some(value);
            }
            None => {
                tracing::trace!(action = action.name(), path = %field.path, "action produced no value");
            }
        }
    }
    field
}

fn value_type(input: Option<FieldType>) -> FieldType {
    input.unwrap_or(FieldType::None)
}

/// Whether `action` runs on a value of `input` type (`None` for no value).
pub fn accepts(action: &Action, input: Option<FieldType>) -> bool {
    match action {
        Action::GenerateUuid => true,
        Action::ToString => input.is_some(),
        Action::Trim
        | Action::TrimLeft
        | Action::TrimRight
        | Action::Uppercase
        | Action::Lowercase
        | Action::Capitalize
        | Action::Normalize
        | Action::Prepend { .. }
        | Action::Append { .. }
        | Action::SubString { .. }
        | Action::SubStringBefore { .. }
        | Action::SubStringAfter { .. }
        | Action::ReplaceFirst { .. }
        | Action::ReplaceAll { .. }
        | Action::PadStringLeft { .. }
        | Action::PadStringRight { .. }
        | Action::Length => input == Some(FieldType::String),
        Action::AbsoluteValue
        | Action::Ceiling
        | Action::Floor
        | Action::Round
        | Action::ConvertMassUnit { .. }
        | Action::ConvertDistanceUnit { .. }
        | Action::ConvertAreaUnit { .. }
        | Action::ConvertVolumeUnit { .. } => input.is_some_and(FieldType::is_numeric),
        Action::DayOfWeek | Action::DayOfYear => {
            matches!(input, Some(FieldType::Date | FieldType::DateTime))
        }
    }
}

fn execute(action: &Action, value: Option<&Value>) -> Option<Value> {
    if let Action::GenerateUuid = action {
        return Some(Value::String(uuid::Uuid::new_v4().to_string()));
    }
    let value = value?;
    if let Action::ToString = action {
        return Some(Value::String(value.to_string()));
    }
    match value {
        Value::String(s) => string_action(action, s),
        Value::Date(d) => date_action(action, *d),
        Value::DateTime(dt) => date_action(action, dt.date_naive()),
        other if other.field_type().is_numeric() => numeric_action(action, other),
        _ => None,
    }
}

fn char_slice(s: &str, start: usize, end: Option<usize>) -> Option<String> {
    let len = s.chars().count();
    let end = end.unwrap_or(len).min(len);
    if start > end {
        return None;
    }
    Some(s.chars().skip(start).take(end - start).collect())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pad(c: char, count: usize) -> String {
    std::iter::repeat(c).take(count).collect()
}

fn string_action(action: &Action, s: &str) -> Option<Value> {
    let out = match action {
        Action::Trim => s.trim().to_string(),
        Action::TrimLeft => s.trim_start().to_string(),
        Action::TrimRight => s.trim_end().to_string(),
        Action::Uppercase => s.to_uppercase(),
        Action::Lowercase => s.to_lowercase(),
        Action::Capitalize => capitalize(s),
        Action::Normalize => s.split_whitespace().collect::<Vec<_>>().join(" "),
        Action::Prepend { string } => format!("{}{}", string, s),
        Action::Append { string } => format!("{}{}", s, string),
        Action::SubString {
            start_index,
            end_index,
        } => char_slice(s, *start_index, *end_index)?,
        Action::SubStringBefore {
            start_index,
            end_index,
            match_string,
        } => match s.find(match_string.as_str()) {
            Some(at) => char_slice(&s[..at], *start_index, *end_index)?,
            None => s.to_string(),
        },
        Action::SubStringAfter {
            start_index,
            end_index,
            match_string,
        } => match s.find(match_string.as_str()) {
            Some(at) => char_slice(&s[at + match_string.len()..], *start_index, *end_index)?,
            None => s.to_string(),
        },
        Action::ReplaceFirst {
            match_string,
            new_string,
        } => s.replacen(match_string.as_str(), new_string, 1),
        Action::ReplaceAll {
            match_string,
            new_string,
        } => compiled(match_string)?
            .replace_all(s, new_string.as_str())
            .into_owned(),
        Action::PadStringLeft {
            pad_character,
            pad_count,
        } => format!("{}{}", pad(*pad_character, *pad_count), s),
        Action::PadStringRight {
            pad_character,
            pad_count,
        } => format!("{}{}", s, pad(*pad_character, *pad_count)),
        Action::Length => {
            return i32::try_from(s.chars().count()).ok().map(Value::Integer);
        }
        _ => return None,
    };
    Some(Value::String(out))
}

fn date_action(action: &Action, date: chrono::NaiveDate) -> Option<Value> {
    match action {
        // ISO numbering, Monday is 1
        Action::DayOfWeek => i32::try_from(date.weekday().number_from_monday())
            .ok()
            .map(Value::Integer),
        Action::DayOfYear => i32::try_from(date.ordinal()).ok().map(Value::Integer),
        _ => None,
    }
}

fn round_f64(action: &Action, f: f64) -> Option<i64> {
    let rounded = match action {
        Action::Ceiling => f.ceil(),
        Action::Floor => f.floor(),
        _ => f.round(),
    };
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

fn round_decimal(action: &Action, d: Decimal) -> Option<i64> {
    let rounded = match action {
        Action::Ceiling => d.ceil(),
        Action::Floor => d.floor(),
        _ => d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
    };
    rounded.to_i64()
}

fn numeric_action(action: &Action, value: &Value) -> Option<Value> {
    match action {
        Action::AbsoluteValue => match value {
            Value::Byte(v) => v.checked_abs().map(Value::Byte),
            Value::Short(v) => v.checked_abs().map(Value::Short),
            Value::Integer(v) => v.checked_abs().map(Value::Integer),
            Value::Long(v) => v.checked_abs().map(Value::Long),
            Value::Float(v) => Some(Value::Float(v.abs())),
            Value::Double(v) => Some(Value::Double(v.abs())),
            Value::Decimal(v) => Some(Value::Decimal(v.abs())),
            _ => None,
        },
        Action::Ceiling | Action::Floor | Action::Round => match value {
            Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
                Some(value.clone())
            }
            Value::Float(v) => round_f64(action, f64::from(*v)).map(Value::Long),
            Value::Double(v) => round_f64(action, *v).map(Value::Long),
            Value::Decimal(v) => round_decimal(action, *v).map(Value::Long),
            _ => None,
        },
        Action::ConvertMassUnit { from_unit, to_unit } => {
            convert_unit(value, mass_factor(*from_unit), mass_factor(*to_unit))
        }
        Action::ConvertDistanceUnit { from_unit, to_unit } => {
            convert_unit(value, distance_factor(*from_unit), distance_factor(*to_unit))
        }
        Action::ConvertAreaUnit { from_unit, to_unit } => {
            convert_unit(value, area_factor(*from_unit), area_factor(*to_unit))
        }
        Action::ConvertVolumeUnit { from_unit, to_unit } => {
            convert_unit(value, volume_factor(*from_unit), volume_factor(*to_unit))
        }
        _ => None,
    }
}

fn convert_unit(value: &Value, from: Decimal, to: Decimal) -> Option<Value> {
    let amount = match converters::to_decimal(value) {
        Ok(Value::Decimal(d)) => d,
        _ => return None,
    };
    amount
        .checked_mul(from)?
        .checked_div(to)
        .map(|d| Value::Decimal(d.normalize()))
}

/// Kilograms per unit
fn mass_factor(unit: MassUnit) -> Decimal {
    match unit {
        MassUnit::Kilogram => Decimal::ONE,
        MassUnit::Gram => Decimal::new(1, 3),
        MassUnit::Pound => Decimal::new(45_359_237, 8),
        MassUnit::Ounce => Decimal::new(28_349_523_125, 12),
    }
}

/// Meters per unit
fn distance_factor(unit: DistanceUnit) -> Decimal {
    match unit {
        DistanceUnit::Meter => Decimal::ONE,
        DistanceUnit::Kilometer => Decimal::from(1000),
        DistanceUnit::Centimeter => Decimal::new(1, 2),
        DistanceUnit::Foot => Decimal::new(3048, 4),
        DistanceUnit::Yard => Decimal::new(9144, 4),
        DistanceUnit::Mile => Decimal::new(1_609_344, 3),
        DistanceUnit::Inch => Decimal::new(254, 4),
    }
}

/// Square meters per unit
fn area_factor(unit: AreaUnit) -> Decimal {
    match unit {
        AreaUnit::SquareMeter => Decimal::ONE,
        AreaUnit::SquareFoot => Decimal::new(9_290_304, 8),
        AreaUnit::SquareMile => Decimal::new(2_589_988_110_336, 6),
    }
}

/// Cubic meters per unit
fn volume_factor(unit: VolumeUnit) -> Decimal {
    match unit {
        VolumeUnit::CubicMeter => Decimal::ONE,
        VolumeUnit::Liter => Decimal::new(1, 3),
        VolumeUnit::CubicFoot => Decimal::new(28_316_846_592, 12),
        VolumeUnit::GallonUs => Decimal::new(3_785_411_784, 12),
    }
}
