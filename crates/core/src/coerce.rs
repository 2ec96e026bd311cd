//! Lenient numeric coercion for form-sourced records.
//!
//! Quote fields arrive from a form-state holder and may be numbers, numeric text, booleans or
//! missing entirely. Every helper here maps those to a usable value and never fails: anything
//! non-numeric becomes zero.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn decimal_from_value(value: &Value) -> Decimal {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        Value::Bool(true) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

pub fn parse_decimal(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)).unwrap_or_default()
}

/// Truncates toward zero and clamps into `0..=u32::MAX`.
pub fn count_from_decimal(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

pub fn count_from_value(value: &Value) -> u32 {
    count_from_decimal(decimal_from_value(value))
}

pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, ONE_HUNDRED)
}

pub fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(_) => !decimal_from_value(value).is_zero(),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => true,
            other => !parse_decimal(other).is_zero(),
        },
        _ => false,
    }
}

pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

pub fn lenient_percent<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(clamp_percent(decimal_from_value(&value)))
}

pub fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flag_from_value(&value))
}

/// Required identifier: numbers are rendered as text, anything else becomes an empty id.
pub fn lenient_id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::from(id_from_value(&value).unwrap_or_default()))
}

pub fn lenient_optional_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(&value).map(T::from))
}
