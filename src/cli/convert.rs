//! JSON <-> formula Value conversion utilities

use serde_json::Map;

use crate::evaluator::VariableMap;
use crate::moment::Moment;
use crate::value::{DataType, Value};

use super::CliError;

/// Key of the single-entry object that marks a date: `{"$date": "2024-01-01"}`
pub const DATE_KEY: &str = "$date";

/// Convert serde_json::Value to a formula Value
///
/// Objects are only accepted in the `{"$date": "..."}` form.
pub fn json_to_value(v: serde_json::Value) -> Result<Value, CliError> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| CliError::Input(format!("number {n} is out of range"))),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(json_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_json::Value::Object(obj) => date_from_object(&obj).map(Value::DateTime),
    }
}

fn date_from_object(obj: &Map<String, serde_json::Value>) -> Result<Moment, CliError> {
    match (obj.len(), obj.get(DATE_KEY)) {
        (1, Some(serde_json::Value::String(text))) => text
            .parse::<Moment>()
            .map_err(|e| CliError::Input(e.to_string())),
        _ => Err(CliError::Input(format!(
            "objects are only supported as {{\"{DATE_KEY}\": \"YYYY-MM-DD\"}}"
        ))),
    }
}

/// Convert a formula Value to serde_json::Value
///
/// Dates become ISO-8601 strings; non-finite numbers become `null`.
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Number(n) => serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::DateTime(m) => serde_json::Value::String(m.to_string()),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
    }
}

/// Build variables from a top-level JSON object.
///
/// `null` members are declared as String so they still have a type.
pub fn json_to_variables(v: serde_json::Value) -> Result<VariableMap, CliError> {
    let serde_json::Value::Object(obj) = v else {
        return Err(CliError::Input("variables must be a JSON object".to_string()));
    };

    let mut vars = VariableMap::new();
    for (name, member) in obj {
        match json_to_value(member)? {
            Value::Null => vars.declare(name, DataType::String, Value::Null),
            value => vars.insert(name, value),
        }
    }
    Ok(vars)
}
