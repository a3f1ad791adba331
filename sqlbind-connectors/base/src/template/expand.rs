use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use sqlbind_core::err::{Result, StatementError};

use crate::request::RequestDocument;

lazy_static! {
    /// An IN group with a single placeholder, eg `IN($ids)` or `IN ($ids)`
    static ref IN_PLACEHOLDER: Regex =
        Regex::new(r"\bIN ?\(\s*\$(\w+)\s*\)").expect("Invalid IN placeholder pattern");
    /// Any IN clause, regardless of case or contents
    static ref IN_CLAUSE: Regex = Regex::new(r"(?i)\bIN\s*\(").expect("Invalid IN clause pattern");
}

/// Whether the query contains an IN clause
pub fn contains_in_clause(query: &str) -> bool {
    IN_CLAUSE.is_match(query)
}

/// Whether the query has an `IN($name)` group that can be expanded from
/// a JSON array
pub fn has_in_placeholder(query: &str) -> bool {
    IN_PLACEHOLDER.is_match(query)
}

/// Expands each `IN($name)` group into one placeholder per element of the
/// `name` array of the request, eg `IN($ids,$ids,$ids)` for three elements.
///
/// Groups whose parameter is not an array, or is absent from the request,
/// are left with a single slot.
pub fn expand_in_clauses(template: &str, request: &RequestDocument) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in IN_PLACEHOLDER.captures_iter(template) {
        let (whole, name) = match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(name)) => (whole, name.as_str()),
            _ => continue,
        };

        let slots = match request.lookup(name)? {
            Some((_, Value::Array(items))) if items.is_empty() => {
                return Err(StatementError::malformed(format!(
                    "The array for IN clause parameter '{}' is empty",
                    name
                ))
                .into())
            }
            Some((_, Value::Array(items))) => items.len(),
            _ => 1,
        };

        out.push_str(&template[last..whole.start()]);
        out.push_str("IN(");
        out.push_str(&std::iter::repeat(format!("${}", name)).take(slots).join(","));
        out.push(')');
        last = whole.end();
    }

    out.push_str(&template[last..]);

    Ok(out)
}
