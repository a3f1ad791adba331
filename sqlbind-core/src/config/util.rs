use serde::Deserialize;
use serde_yaml::{Deserializer, Value};

use crate::err::{bail, Context, Result};

/// Parses the supplied yaml into a configuration mapping.
///
/// Options are always supplied as a mapping, an empty document or a bare
/// scalar is rejected here rather than failing later with a missing field.
pub fn parse_config<'a>(conf_str: impl Into<&'a str>) -> Result<Value> {
    let value = Value::deserialize(Deserializer::from_str(conf_str.into()))
        .context("Failed to parse configuration yaml")?;

    match value {
        Value::Mapping(_) => Ok(value),
        Value::Null => bail!("The configuration is empty"),
        other => bail!("Expected the configuration to be a mapping, found: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_config_mapping() {
        let parsed = parse_config("kind: Get\ntables: T").unwrap();

        assert_eq!(parsed.get("kind"), Some(&Value::String("Get".into())));
        assert_eq!(parsed.get("tables"), Some(&Value::String("T".into())));
    }

    #[test]
    fn test_parse_config_rejects_non_mapping() {
        assert!(parse_config("").is_err());
        assert!(parse_config("- Get").is_err());
        assert!(parse_config("just text").is_err());
    }

    #[test]
    fn test_parse_config_invalid_yaml() {
        assert!(parse_config("kind: [Get").is_err());
    }
}
