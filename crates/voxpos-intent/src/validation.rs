//! Payload validation - the single decode step for inference output.
//!
//! Only two shapes are rejected outright: a top level that is not an
//! object, and a `results` key that is present but not an array. Every
//! other irregularity degrades to a default.

use crate::{CommandField, IntentField, RawResultEntry, ValidatedPayload};
use serde_json::{Map, Value};
use thiserror::Error;

/// Validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Validate a deserialized intent payload.
pub fn validate(value: &Value) -> Result<ValidatedPayload, ValidationError> {
    let object = value.as_object().ok_or_else(|| {
        ValidationError::MalformedPayload(format!(
            "expected a JSON object, found {}",
            json_kind(value)
        ))
    })?;

    let intent = match object.get("intent") {
        None | Some(Value::Null) => IntentField::Unset,
        Some(Value::String(s)) => IntentField::from_literal(s),
        Some(other) => IntentField::Unrecognized(other.to_string()),
    };

    let global_command = match object.get("global_command") {
        None | Some(Value::Null) => CommandField::Unset,
        Some(Value::String(s)) => CommandField::from_literal(s),
        Some(other) => CommandField::Unrecognized(other.to_string()),
    };

    let results = match object.get("results") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().map(validate_entry).collect(),
        Some(other) => {
            return Err(ValidationError::MalformedPayload(format!(
                "`results` must be an array, found {}",
                json_kind(other)
            )))
        }
    };

    Ok(ValidatedPayload {
        intent,
        global_command,
        results,
    })
}

/// Parse model output text and validate it.
///
/// Models occasionally wrap the object in prose or code fences, so the
/// outermost `{ ... }` span is extracted first.
pub fn parse_payload(text: &str) -> Result<ValidatedPayload, ValidationError> {
    let json_text = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    };

    let value: Value = serde_json::from_str(json_text)
        .map_err(|e| ValidationError::MalformedPayload(format!("invalid JSON: {}", e)))?;

    validate(&value)
}

fn validate_entry(value: &Value) -> RawResultEntry {
    let empty = Map::new();
    let entry = value.as_object().unwrap_or(&empty);

    let action = match entry.get("action") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        // Keep the text so the resolver flags it instead of silently adding
        Some(other) => Some(other.to_string()),
    };

    let item = entry
        .get("item")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let quantity = match entry.get("quantity") {
        None => Some(1),
        Some(v) => integer_value(v),
    };

    let price = entry.get("price").and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    let modifiers = entry
        .get("modifiers")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    RawResultEntry {
        action,
        item,
        quantity,
        price,
        modifiers,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
