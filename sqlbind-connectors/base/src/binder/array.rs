use serde_json::Value;
use sqlbind_core::{
    data::{SqlArray, SqlArrayElement},
    err::{Result, StatementError},
};

use super::{json::json_document, literal::literal};

/// The deepest supported nesting of table types within an array value
pub const MAX_NESTED_LEVELS: usize = 3;

/// Builds a native array of the supplied user-defined type from a JSON
/// array, or JSON text holding one.
///
/// Objects become struct elements with uppercased attribute names, nested
/// arrays become nested tables. The top level array counts as the first level.
pub fn build_array(type_name: &str, value: &Value) -> Result<SqlArray> {
    let doc = json_document(value)?;

    let items = match doc {
        Value::Array(items) => items,
        _ => return Err(StatementError::invalid_format("array", literal(value)).into()),
    };

    Ok(SqlArray::new(type_name, build_elements(&items, 1)?))
}

fn build_elements(items: &[Value], level: usize) -> Result<Vec<SqlArrayElement>> {
    items.iter().map(|i| build_element(i, level)).collect()
}

fn build_element(value: &Value, level: usize) -> Result<SqlArrayElement> {
    Ok(match value {
        Value::Null => SqlArrayElement::Null,
        Value::Array(items) => {
            if level >= MAX_NESTED_LEVELS {
                return Err(StatementError::NestedLevelExhausted {
                    max: MAX_NESTED_LEVELS,
                }
                .into());
            }

            SqlArrayElement::Array(build_elements(items, level + 1)?)
        }
        Value::Object(obj) => SqlArrayElement::Struct(
            obj.iter()
                .map(|(k, v)| Ok((k.to_uppercase(), build_element(v, level)?)))
                .collect::<Result<Vec<_>>>()?,
        ),
        scalar => SqlArrayElement::Value(literal(scalar)),
    })
}
