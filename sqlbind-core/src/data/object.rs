use std::str::FromStr;

use bigdecimal::BigDecimal;
use enum_as_inner::EnumAsInner;
use serde_json::{Map, Number, Value};

/// A driver-native object value, bound through the statement's
/// `set_object` call
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum SqlObject {
    /// A postgres `json` object wrapping the literal JSON text
    PgJson(String),
    /// An oracle native JSON object
    OracleJson(OracleJsonObject),
    /// A native array value
    Array(SqlArray),
}

/// An oracle JSON object, decomposed key by key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OracleJsonObject {
    pub fields: Vec<(String, OracleJsonValue)>,
}

#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum OracleJsonValue {
    Null,
    String(String),
    Number(BigDecimal),
    Boolean(bool),
    Object(OracleJsonObject),
    Array(Vec<OracleJsonValue>),
}

/// A native array, typed by the user-defined type name of its column
#[derive(Debug, Clone, PartialEq)]
pub struct SqlArray {
    pub type_name: String,
    pub elements: Vec<SqlArrayElement>,
}

#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum SqlArrayElement {
    Null,
    /// A scalar element in its textual form
    Value(String),
    /// A struct element with its attributes in declaration order
    Struct(Vec<(String, SqlArrayElement)>),
    /// A nested table element
    Array(Vec<SqlArrayElement>),
}

impl OracleJsonObject {
    pub fn new(fields: Vec<(String, OracleJsonValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&OracleJsonValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<_, _>>(),
        )
    }
}

impl OracleJsonValue {
    pub fn to_json(&self) -> Value {
        match self {
            OracleJsonValue::Null => Value::Null,
            OracleJsonValue::String(s) => Value::String(s.clone()),
            OracleJsonValue::Number(n) => Number::from_str(&n.to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.to_string())),
            OracleJsonValue::Boolean(b) => Value::Bool(*b),
            OracleJsonValue::Object(o) => o.to_json(),
            OracleJsonValue::Array(a) => Value::Array(a.iter().map(|i| i.to_json()).collect()),
        }
    }
}

impl SqlArray {
    pub fn new(type_name: impl Into<String>, elements: Vec<SqlArrayElement>) -> Self {
        Self {
            type_name: type_name.into(),
            elements,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.elements.iter().map(|e| e.to_json()).collect())
    }
}

impl SqlArrayElement {
    pub fn to_json(&self) -> Value {
        match self {
            SqlArrayElement::Null => Value::Null,
            SqlArrayElement::Value(v) => Value::String(v.clone()),
            SqlArrayElement::Struct(attrs) => Value::Object(
                attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            SqlArrayElement::Array(a) => Value::Array(a.iter().map(|e| e.to_json()).collect()),
        }
    }
}

impl SqlObject {
    /// Renders the object as JSON text, used by drivers without a
    /// native representation and for logging
    pub fn to_json_text(&self) -> String {
        match self {
            SqlObject::PgJson(text) => text.clone(),
            SqlObject::OracleJson(obj) => obj.to_json().to_string(),
            SqlObject::Array(arr) => arr.to_json().to_string(),
        }
    }
}
