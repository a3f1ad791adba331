use serde_json::{Map, Value};
use sqlbind_core::err::{Result, StatementError};

/// A single input record: the JSON request body and the optional
/// document-level WHERE and ORDER BY overrides
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestDocument {
    body: Option<Result<Value, String>>,
    where_override: Option<String>,
    order_by_override: Option<String>,
}

impl RequestDocument {
    /// A document without a body, typically carrying only overrides
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(body: Value) -> Self {
        Self {
            body: Some(Ok(body)),
            ..Self::default()
        }
    }

    /// Parses the UTF-8 JSON body. Numbers retain their literal form so
    /// decimals keep their precision and trailing zeros.
    ///
    /// Parse failures are retained and only reported when the body is
    /// actually required.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            None
        } else {
            Some(serde_json::from_slice::<Value>(bytes).map_err(|e| e.to_string()))
        };

        Self {
            body,
            ..Self::default()
        }
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_override = Some(clause.into()).filter(|c: &String| !c.trim().is_empty());
        self
    }

    pub fn with_order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by_override = Some(clause.into()).filter(|c: &String| !c.trim().is_empty());
        self
    }

    pub fn where_override(&self) -> Option<&str> {
        self.where_override.as_deref().map(|c| c.trim())
    }

    pub fn order_by_override(&self) -> Option<&str> {
        self.order_by_override.as_deref().map(|c| c.trim())
    }

    /// Gets the body as a JSON object, if a body is present
    pub fn object(&self) -> Result<Option<&Map<String, Value>>> {
        match &self.body {
            None => Ok(None),
            Some(Err(err)) => {
                Err(StatementError::malformed(format!("Failed to parse JSON: {}", err)).into())
            }
            Some(Ok(Value::Object(obj))) => Ok(Some(obj)),
            Some(Ok(Value::Null)) => Ok(None),
            Some(Ok(_)) => {
                Err(StatementError::malformed("The request document must be a JSON object").into())
            }
        }
    }

    /// Gets the body as a JSON object, failing if it is absent
    pub fn require_object(&self) -> Result<&Map<String, Value>> {
        self.object()?
            .ok_or_else(|| StatementError::malformed("The request document is empty").into())
    }

    /// Finds the value of the supplied key, falling back to a case
    /// insensitive match
    pub fn lookup(&self, name: &str) -> Result<Option<(&str, &Value)>> {
        Ok(self.object()?.and_then(|obj| lookup_key(obj, name)))
    }
}

/// Finds the entry of the supplied key in the object, falling back to a
/// case insensitive match
pub(crate) fn lookup_key<'a>(
    obj: &'a Map<String, Value>,
    name: &str,
) -> Option<(&'a str, &'a Value)> {
    if let Some((k, v)) = obj.iter().find(|(k, _)| k.as_str() == name) {
        return Some((k.as_str(), v));
    }

    let upper = name.to_uppercase();
    obj.iter()
        .find(|(k, _)| k.to_uppercase() == upper)
        .map(|(k, v)| (k.as_str(), v))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlbind_core::err::ErrorKind;

    use super::*;

    #[test]
    fn test_request_from_bytes_preserves_decimals() {
        let doc = RequestDocument::from_bytes(
            br#"{"AMOUNT": 99999999999999999999999999999999999999, "RATE": 1.50}"#,
        );

        let obj = doc.require_object().unwrap();

        assert_eq!(
            obj["AMOUNT"].to_string(),
            "99999999999999999999999999999999999999"
        );
        assert_eq!(obj["RATE"].to_string(), "1.50");
    }

    #[test]
    fn test_request_empty_body() {
        let doc = RequestDocument::from_bytes(b"  \n");

        assert_eq!(doc.object().unwrap(), None);

        let err = doc.require_object().unwrap_err();
        assert_eq!(StatementError::classify(&err), ErrorKind::MalformedRequest);
    }

    #[test]
    fn test_request_unparseable_body() {
        let doc = RequestDocument::from_bytes(b"{\"a\": ");

        let err = doc.object().unwrap_err();
        assert_eq!(StatementError::classify(&err), ErrorKind::MalformedRequest);
    }

    #[test]
    fn test_request_non_object_body() {
        let doc = RequestDocument::from_json(json!([1, 2]));

        let err = doc.object().unwrap_err();
        assert_eq!(StatementError::classify(&err), ErrorKind::MalformedRequest);
    }

    #[test]
    fn test_request_lookup_is_case_insensitive() {
        let doc = RequestDocument::from_json(json!({"Name": "Bob", "name": "Alice"}));

        assert_eq!(doc.lookup("name").unwrap(), Some(("name", &json!("Alice"))));
        assert_eq!(doc.lookup("NAME").unwrap(), Some(("Name", &json!("Bob"))));
        assert_eq!(doc.lookup("ID").unwrap(), None);
    }

    #[test]
    fn test_request_blank_overrides_are_ignored() {
        let doc = RequestDocument::empty()
            .with_where("  ")
            .with_order_by(" NAME DESC ");

        assert_eq!(doc.where_override(), None);
        assert_eq!(doc.order_by_override(), Some("NAME DESC"));
    }
}
