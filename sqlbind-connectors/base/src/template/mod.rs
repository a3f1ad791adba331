mod clauses;
pub use clauses::*;
mod expand;
pub use expand::*;
mod tokenizer;
pub use tokenizer::{classify, TokenKind};

use tokenizer::{rewrite_token, tokenize, ParameterAccumulator};

/// A named parameter and the positional slots it occupies
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameter {
    /// The uppercased parameter name
    pub name: String,
    /// The 1-based positional indices, in order of appearance
    pub indices: Vec<usize>,
}

impl NamedParameter {
    pub fn new(name: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            indices,
        }
    }
}

/// A SQL template rewritten into a statement with `?` bind markers.
///
/// Every placeholder occurrence becomes one bind marker, so the number of
/// markers always equals the total number of indices across the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTemplate {
    sql: String,
    params: Vec<NamedParameter>,
}

impl ParsedTemplate {
    /// Parses the supplied template.
    ///
    /// The template is split on whitespace and each token is rewritten
    /// according to its [`TokenKind`]. Rewritten tokens are joined by single
    /// spaces.
    pub fn parse(template: &str) -> Self {
        let mut acc = ParameterAccumulator::new();

        let sql = tokenize(template)
            .iter()
            .map(|token| rewrite_token(token, &mut acc))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            sql,
            params: acc.finish(),
        }
    }

    /// The rewritten SQL
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The named parameters in order of first appearance
    pub fn params(&self) -> &[NamedParameter] {
        &self.params
    }

    /// Gets the slot indices of the supplied parameter
    pub fn indices(&self, name: &str) -> Option<&[usize]> {
        let name = name.to_uppercase();
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.indices.as_slice())
    }

    /// The total number of bind slots
    pub fn slot_count(&self) -> usize {
        self.params.iter().map(|p| p.indices.len()).sum()
    }

    pub fn is_parameterised(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

/// Whether the template contains any `$name` placeholder
pub fn has_placeholders(template: &str) -> bool {
    ParsedTemplate::parse(template).is_parameterised()
}

/// Counts the `?` bind markers of the statement, ignoring those within
/// quoted string literals
pub fn count_bind_markers(sql: &str) -> usize {
    let mut in_quotes = false;
    let mut count = 0;

    for c in sql.chars() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '?' if !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_operator_prefixed_template() {
        let parsed = ParsedTemplate::parse("SELECT * FROM T WHERE id=$id AND name=$name");

        assert_eq!(parsed.sql(), "SELECT * FROM T WHERE id=? AND name=?");
        assert_eq!(
            parsed.params(),
            &[
                NamedParameter::new("ID", vec![1]),
                NamedParameter::new("NAME", vec![2]),
            ]
        );
    }

    #[test]
    fn test_parse_repeated_parameter() {
        let parsed = ParsedTemplate::parse(
            "SELECT * FROM T WHERE a = $val OR b = $other OR c = $Val",
        );

        assert_eq!(parsed.sql(), "SELECT * FROM T WHERE a = ? OR b = ? OR c = ?");
        assert_eq!(parsed.indices("val"), Some([1, 3].as_slice()));
        assert_eq!(parsed.indices("OTHER"), Some([2].as_slice()));
        assert_eq!(parsed.indices("missing"), None);
    }

    #[test]
    fn test_parse_bind_marker_count_matches_indices() {
        let templates = [
            "SELECT * FROM T WHERE a = $a AND b = $b AND c = $a",
            "INSERT INTO T (A, B) VALUES ($a,$b);",
            "UPDATE T SET A = $a WHERE ID IN($ids,$ids,$ids)",
            "SELECT * FROM V$SESSION WHERE SID=$sid",
            "DELETE FROM T WHERE ($a) OR b<>$b",
        ];

        for template in templates.into_iter() {
            let parsed = ParsedTemplate::parse(template);

            assert_eq!(
                count_bind_markers(parsed.sql()),
                parsed.slot_count(),
                "{}",
                template
            );
        }
    }

    #[test]
    fn test_parse_insert_values() {
        let parsed = ParsedTemplate::parse("INSERT INTO T (A, B)\n  VALUES ($a,$b);");

        assert_eq!(parsed.sql(), "INSERT INTO T (A, B) VALUES (?,?)");
        assert_eq!(parsed.slot_count(), 2);
    }

    #[test]
    fn test_parse_in_group() {
        let parsed = ParsedTemplate::parse("SELECT * FROM T WHERE ID IN ($ids,$ids,$ids) AND X=$x");

        assert_eq!(parsed.sql(), "SELECT * FROM T WHERE ID IN(?,?,?) AND X=?");
        assert_eq!(
            parsed.params(),
            &[
                NamedParameter::new("IDS", vec![1, 2, 3]),
                NamedParameter::new("X", vec![4]),
            ]
        );
    }

    #[test]
    fn test_parse_template_without_placeholders() {
        let parsed = ParsedTemplate::parse("SELECT *\n FROM   T");

        assert_eq!(parsed.sql(), "SELECT * FROM T");
        assert!(!parsed.is_parameterised());
    }

    #[test]
    fn test_has_placeholders() {
        assert!(has_placeholders("SELECT * FROM T WHERE A = $a"));
        assert!(has_placeholders("SELECT * FROM T WHERE A IN($a)"));
        assert!(!has_placeholders("SELECT * FROM V$SESSION WHERE A = ?"));
        assert!(!has_placeholders("SELECT '$' FROM T"));
    }

    #[test]
    fn test_count_bind_markers_ignores_literals() {
        assert_eq!(count_bind_markers("SELECT '?' FROM T WHERE A = ? AND B = ?"), 2);
    }
}
