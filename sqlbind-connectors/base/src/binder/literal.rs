use std::str::FromStr;

use serde_json::Value;
use sqlbind_core::{
    data::{
        bigdecimal::BigDecimal,
        chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime},
    },
    err::{Result, StatementError},
};

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The literal text of a JSON value.
///
/// Strings yield their contents without quotes, numbers their exact source
/// text and everything else its serialised JSON.
pub fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn parse_decimal(text: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(text.trim())
        .map_err(|_| StatementError::invalid_format("decimal", text).into())
}

pub fn parse_long(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| StatementError::invalid_format("long", text).into())
}

pub fn parse_float(text: &str) -> Result<f32> {
    match text.trim().parse::<f32>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err(StatementError::invalid_format("float", text).into()),
    }
}

pub fn parse_boolean(text: &str) -> Result<bool> {
    let text = text.trim();

    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(StatementError::invalid_format("boolean", text).into())
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| StatementError::invalid_format("date", text).into())
}

pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let trimmed = text.trim();

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| StatementError::invalid_format("time", text).into())
}

/// Parses a timestamp, accepting a space or `T` separator, an RFC 3339
/// offset (converted to UTC) or a bare date at midnight
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();

    if let Some(ts) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(ts);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.naive_utc());
    }

    if let Some(ts) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }

    Err(StatementError::invalid_format("timestamp", text).into())
}

/// Replaces backslash escape sequences (`\n`, `\t`, `\uXXXX` ...) with the
/// characters they denote. Unknown sequences are kept as is.
pub fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex = chars.by_ref().take(4).collect::<String>();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| StatementError::invalid_format("nvarchar", text))?;
                out.push(decoded);
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sqlbind_core::err::ErrorKind;

    use super::*;

    fn kind(res: Result<impl std::fmt::Debug>) -> ErrorKind {
        StatementError::classify(&res.unwrap_err())
    }

    #[test]
    fn test_literal() {
        assert_eq!(literal(&json!("Bob")), "Bob");
        assert_eq!(literal(&json!(5)), "5");
        assert_eq!(literal(&json!(true)), "true");
        assert_eq!(literal(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_literal_preserves_number_text() {
        let value: Value =
            serde_json::from_str("[99999999999999999999999999999999999999, 1.50]").unwrap();

        assert_eq!(
            literal(&value[0]),
            "99999999999999999999999999999999999999"
        );
        assert_eq!(literal(&value[1]), "1.50");
    }

    #[test]
    fn test_parse_decimal() {
        let nines = "9".repeat(40);

        assert_eq!(parse_decimal(&nines).unwrap().to_string(), nines);
        assert_eq!(parse_decimal("-12.3400").unwrap().to_string(), "-12.3400");
        assert_eq!(kind(parse_decimal("12a")), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_long("9223372036854775807").unwrap(), i64::MAX);
        assert_eq!(kind(parse_long("9223372036854775808")), ErrorKind::InvalidFormat);
        assert_eq!(parse_float("1.5").unwrap(), 1.5);
        assert_eq!(kind(parse_float("1e50")), ErrorKind::InvalidFormat);
        assert_eq!(kind(parse_float("abc")), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("TRUE").unwrap(), true);
        assert_eq!(parse_boolean("false").unwrap(), false);
        assert_eq!(kind(parse_boolean("yes")), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_parse_temporal() {
        assert_eq!(
            parse_date("2022-03-04").unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 4).unwrap()
        );
        assert_eq!(kind(parse_date("2022-13-45")), ErrorKind::InvalidFormat);

        assert_eq!(
            parse_time("10:11:12").unwrap(),
            NaiveTime::from_hms_opt(10, 11, 12).unwrap()
        );
        assert_eq!(
            parse_time("10:11").unwrap(),
            NaiveTime::from_hms_opt(10, 11, 0).unwrap()
        );
        assert_eq!(kind(parse_time("25:00")), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 4)
            .unwrap()
            .and_hms_milli_opt(10, 11, 12, 500)
            .unwrap();

        assert_eq!(parse_timestamp("2022-03-04 10:11:12.5").unwrap(), expected);
        assert_eq!(parse_timestamp("2022-03-04T10:11:12.500").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2022-03-04T12:11:12.5+02:00").unwrap(),
            expected
        );
        assert_eq!(
            parse_timestamp("2022-03-04").unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(kind(parse_timestamp("yesterday")), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"line1\nline2\ttab").unwrap(), "line1\nline2\ttab");
        assert_eq!(unescape(r#"\"quoted\" \\ \/"#).unwrap(), "\"quoted\" \\ /");
        assert_eq!(unescape(r"caf\u00e9").unwrap(), "café");
        assert_eq!(unescape(r"keep \q").unwrap(), r"keep \q");
        assert_eq!(kind(unescape(r"bad \u00")), ErrorKind::InvalidFormat);
    }
}
