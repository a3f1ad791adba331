use serde_json::{Map, Value};
use sqlbind_core::{
    data::{OracleJsonObject, OracleJsonValue},
    err::{Result, StatementError},
};

use super::literal::{literal, parse_decimal};

/// Parses the JSON text bound onto a JSON column.
///
/// A string value is expected to hold the JSON document itself,
/// any other value is the document.
pub fn json_document(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|_| StatementError::invalid_format("json", text.as_str()).into()),
        other => Ok(other.clone()),
    }
}

/// Decomposes a JSON object into an oracle native JSON object, key by key
pub fn to_oracle_object(obj: &Map<String, Value>) -> Result<OracleJsonObject> {
    let mut fields = Vec::with_capacity(obj.len());

    for (key, value) in obj.iter() {
        fields.push((key.clone(), to_oracle_value(value)?));
    }

    Ok(OracleJsonObject::new(fields))
}

fn to_oracle_value(value: &Value) -> Result<OracleJsonValue> {
    Ok(match value {
        Value::Null => OracleJsonValue::Null,
        Value::Bool(b) => OracleJsonValue::Boolean(*b),
        Value::Number(_) => OracleJsonValue::Number(parse_decimal(&literal(value))?),
        Value::String(s) => OracleJsonValue::String(s.clone()),
        Value::Array(items) => OracleJsonValue::Array(
            items
                .iter()
                .map(to_oracle_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(obj) => OracleJsonValue::Object(to_oracle_object(obj)?),
    })
}
