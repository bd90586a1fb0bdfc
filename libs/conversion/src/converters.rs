//! Target-type conversion functions
//!
//! One function per target type. Each accepts every source variant it knows
//! how to handle; the registry decides which pairs are actually exposed and
//! with which concern.

use crate::error::{ConversionError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use fieldmap_model::{FieldType, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

fn unsupported(value: &Value, target: FieldType) -> ConversionError {
    ConversionError::Unsupported {
        from: value.field_type(),
        to: target,
    }
}

fn float_to_i64(f: f64, target: FieldType) -> Result<i64> {
    // i64::MAX as f64 rounds up to 2^63
    if !f.is_finite() || f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(ConversionError::range(f, target));
    }
    Ok(f as i64)
}

/// Whole-number view of a value. Fractional values are refused rather than
/// truncated; `Round`, `Floor` and `Ceiling` exist for that.
fn integral(value: &Value, target: FieldType) -> Result<i64> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            value.as_i64().ok_or_else(|| unsupported(value, target))
        }
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::Char(c) => Ok(i64::from(u32::from(*c))),
        Value::Float(f) => float_to_i64(f64::from(*f), target),
        Value::Double(d) => float_to_i64(*d, target),
        Value::Decimal(d) => {
            if !d.fract().is_zero() {
                return Err(ConversionError::range(d, target));
            }
            d.to_i64().ok_or_else(|| ConversionError::range(d, target))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConversionError::parse(s, target)),
        Value::DateTime(dt) => Ok(dt.timestamp_millis()),
        _ => Err(unsupported(value, target)),
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, target: FieldType) -> Result<T> {
    T::try_from(value).map_err(|_| ConversionError::range(value, target))
}

fn floating(value: &Value, target: FieldType) -> Result<f64> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => value
            .as_i64()
            .map(|i| i as f64)
            .ok_or_else(|| unsupported(value, target)),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Char(c) => Ok(f64::from(u32::from(*c))),
        Value::Float(f) => Ok(f64::from(*f)),
        Value::Double(d) => Ok(*d),
        Value::Decimal(d) => d.to_f64().ok_or_else(|| ConversionError::range(d, target)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConversionError::parse(s, target)),
        _ => Err(unsupported(value, target)),
    }
}

fn decimal_from_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

pub fn to_boolean(value: &Value) -> Result<Value> {
    let target = FieldType::Boolean;
    let b = match value {
        Value::Boolean(b) => *b,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => return Err(ConversionError::parse(s, target)),
        },
        Value::Char(c) => match c {
            'T' | 't' | 'Y' | 'y' | '1' => true,
            'F' | 'f' | 'N' | 'n' | '0' => false,
            _ => return Err(ConversionError::parse(c, target)),
        },
        Value::Decimal(d) if d.is_zero() => false,
        Value::Decimal(d) if *d == Decimal::ONE => true,
        Value::Float(_) | Value::Double(_) => match floating(value, target)? {
            f if f == 0.0 => false,
            f if f == 1.0 => true,
            f => return Err(ConversionError::range(f, target)),
        },
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            match integral(value, target)? {
                0 => false,
                1 => true,
                i => return Err(ConversionError::range(i, target)),
            }
        }
        Value::Decimal(d) => return Err(ConversionError::range(d, target)),
        _ => return Err(unsupported(value, target)),
    };
    Ok(Value::Boolean(b))
}

pub fn to_byte(value: &Value) -> Result<Value> {
    let target = FieldType::Byte;
    narrow(integral(value, target)?, target).map(Value::Byte)
}

pub fn to_short(value: &Value) -> Result<Value> {
    let target = FieldType::Short;
    narrow(integral(value, target)?, target).map(Value::Short)
}

pub fn to_integer(value: &Value) -> Result<Value> {
    let target = FieldType::Integer;
    narrow(integral(value, target)?, target).map(Value::Integer)
}

pub fn to_long(value: &Value) -> Result<Value> {
    integral(value, FieldType::Long).map(Value::Long)
}

pub fn to_float(value: &Value) -> Result<Value> {
    let target = FieldType::Float;
    let f = floating(value, target)?;
    if f.is_finite() && f.abs() > f64::from(f32::MAX) {
        return Err(ConversionError::range(f, target));
    }
    Ok(Value::Float(f as f32))
}

pub fn to_double(value: &Value) -> Result<Value> {
    floating(value, FieldType::Double).map(Value::Double)
}

pub fn to_decimal(value: &Value) -> Result<Value> {
    let target = FieldType::Decimal;
    let d = match value {
        Value::Decimal(d) => *d,
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            Decimal::from(integral(value, target)?)
        }
        Value::Boolean(b) => {
            if *b {
                Decimal::ONE
            } else {
                Decimal::ZERO
            }
        }
        Value::Char(c) => Decimal::from(u32::from(*c)),
        // Go through the shortest textual form so 0.1f32 stays 0.1
        Value::Float(f) => {
            decimal_from_text(&f.to_string()).ok_or_else(|| ConversionError::range(f, target))?
        }
        Value::Double(d) => {
            decimal_from_text(&d.to_string()).ok_or_else(|| ConversionError::range(d, target))?
        }
        Value::String(s) => {
            decimal_from_text(s.trim()).ok_or_else(|| ConversionError::parse(s, target))?
        }
        _ => return Err(unsupported(value, target)),
    };
    Ok(Value::Decimal(d))
}

pub fn to_char(value: &Value) -> Result<Value> {
    let target = FieldType::Char;
    match value {
        Value::Char(c) => Ok(Value::Char(*c)),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(ConversionError::parse(s, target)),
            }
        }
        Value::Boolean(b) => Ok(Value::Char(if *b { 'T' } else { 'F' })),
        _ => {
            let code = integral(value, target)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(|| ConversionError::range(code, target))
        }
    }
}

pub fn to_string(value: &Value) -> Result<Value> {
    Ok(Value::String(value.to_string()))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// RFC 3339, then a zone-less date-time taken as UTC, then a bare date at
/// midnight UTC.
fn parse_date_time(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc().fixed_offset())
}

pub fn to_date(value: &Value) -> Result<Value> {
    let target = FieldType::Date;
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
        Value::String(s) => parse_date(s.trim())
            .or_else(|| parse_date_time(s.trim()).map(|dt| dt.date_naive()))
            .map(Value::Date)
            .ok_or_else(|| ConversionError::parse(s, target)),
        _ => Err(unsupported(value, target)),
    }
}

pub fn to_time(value: &Value) -> Result<Value> {
    let target = FieldType::Time;
    match value {
        Value::Time(t) => Ok(Value::Time(*t)),
        Value::DateTime(dt) => Ok(Value::Time(dt.time())),
        Value::String(s) => parse_time(s.trim())
            .map(Value::Time)
            .ok_or_else(|| ConversionError::parse(s, target)),
        _ => Err(unsupported(value, target)),
    }
}

pub fn to_date_time(value: &Value) -> Result<Value> {
    let target = FieldType::DateTime;
    match value {
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|naive| Value::DateTime(naive.and_utc().fixed_offset()))
            .ok_or_else(|| ConversionError::range(d, target)),
        Value::String(s) => parse_date_time(s.trim())
            .map(Value::DateTime)
            .ok_or_else(|| ConversionError::parse(s, target)),
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) => {
            let millis = integral(value, target)?;
            DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|dt| Value::DateTime(dt.fixed_offset()))
                .ok_or_else(|| ConversionError::range(millis, target))
        }
        _ => Err(unsupported(value, target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_narrowing() {
        assert_eq!(to_byte(&Value::Integer(127)), Ok(Value::Byte(127)));
        assert!(matches!(
            to_byte(&Value::Integer(128)),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert_eq!(to_integer(&Value::from(" 42 ")), Ok(Value::Integer(42)));
        assert!(matches!(
            to_integer(&Value::from("fname")),
            Err(ConversionError::Parse { .. })
        ));
    }

    #[test]
    fn test_fraction_is_refused() {
        assert!(to_long(&Value::Double(2.5)).is_err());
        assert_eq!(to_long(&Value::Double(2.0)), Ok(Value::Long(2)));
        assert!(to_integer(&Value::Decimal(Decimal::new(15, 1))).is_err());
        assert_eq!(
            to_integer(&Value::Decimal(Decimal::new(300, 2))),
            Ok(Value::Integer(3))
        );
    }

    #[test]
    fn test_boolean_forms() {
        assert_eq!(to_boolean(&Value::from("Yes")), Ok(Value::Boolean(true)));
        assert_eq!(to_boolean(&Value::Integer(0)), Ok(Value::Boolean(false)));
        assert!(to_boolean(&Value::Integer(2)).is_err());
        assert_eq!(to_boolean(&Value::Char('n')), Ok(Value::Boolean(false)));
    }

    #[test]
    fn test_decimal_from_float_keeps_short_form() {
        assert_eq!(
            to_decimal(&Value::Float(0.1)),
            Ok(Value::Decimal(Decimal::new(1, 1)))
        );
        assert!(to_decimal(&Value::Double(f64::NAN)).is_err());
    }

    #[test]
    fn test_char() {
        assert_eq!(to_char(&Value::from("x")), Ok(Value::Char('x')));
        assert!(to_char(&Value::from("xy")).is_err());
        assert_eq!(to_char(&Value::Integer(65)), Ok(Value::Char('A')));
        assert_eq!(to_integer(&Value::Char('A')), Ok(Value::Integer(65)));
    }

    #[test]
    fn test_temporal() {
        let dt = to_date_time(&Value::from("2024-03-01T10:30:00+02:00")).unwrap();
        assert_eq!(
            to_date(&dt),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );
        assert_eq!(
            to_long(&to_date_time(&Value::from("1970-01-01T00:00:01Z")).unwrap()),
            Ok(Value::Long(1000))
        );
        assert_eq!(
            to_date_time(&Value::Long(0)).unwrap().to_string(),
            "1970-01-01T00:00:00+00:00"
        );
        assert_eq!(
            to_time(&Value::from("08:15")),
            Ok(Value::Time(NaiveTime::from_hms_opt(8, 15, 0).unwrap()))
        );
        assert!(to_date(&Value::from("yesterday")).is_err());
    }
}
