use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHERE_KEYWORD: Regex = Regex::new(r"(?i)\bWHERE\b").expect("Invalid WHERE pattern");
    static ref ORDER_BY_KEYWORD: Regex =
        Regex::new(r"(?i)\bORDER\s+BY\b").expect("Invalid ORDER BY pattern");
    /// Clauses which must follow the WHERE clause
    static ref AFTER_WHERE: Regex = Regex::new(
        r"(?i)\b(GROUP\s+BY|HAVING|WINDOW|UNION|INTERSECT|EXCEPT|MINUS|ORDER\s+BY|LIMIT|OFFSET|FETCH\s+(FIRST|NEXT)|FOR\s+UPDATE)\b"
    )
    .expect("Invalid trailing clause pattern");
    /// Clauses which must follow the ORDER BY clause
    static ref AFTER_ORDER_BY: Regex =
        Regex::new(r"(?i)\b(LIMIT|OFFSET|FETCH\s+(FIRST|NEXT)|FOR\s+UPDATE)\b")
            .expect("Invalid trailing clause pattern");
}

/// A query split at the position a clause can be added to it
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseSplit<'a> {
    /// The query up to the insertion point
    pub head: &'a str,
    /// The remainder of the query, starting with the first clause that
    /// must follow the inserted one
    pub tail: &'a str,
    /// Whether the head already has a top-level clause of the same kind
    pub present: bool,
}

impl<'a> ClauseSplit<'a> {
    /// Joins the head, extended with `inserted`, back onto the tail
    pub fn rejoin(&self, inserted: &str) -> String {
        if self.tail.is_empty() {
            inserted.to_string()
        } else if self.tail.starts_with(';') {
            format!("{}{}", inserted, self.tail)
        } else {
            format!("{} {}", inserted, self.tail)
        }
    }
}

/// Splits the query where a WHERE predicate belongs, before any top-level
/// GROUP BY, HAVING, set operator, ORDER BY or row limiting clause
pub fn split_for_where(sql: &str) -> ClauseSplit {
    split(sql, &WHERE_KEYWORD, &AFTER_WHERE)
}

/// Splits the query where an ORDER BY clause belongs, before any top-level
/// row limiting or locking clause
pub fn split_for_order_by(sql: &str) -> ClauseSplit {
    split(sql, &ORDER_BY_KEYWORD, &AFTER_ORDER_BY)
}

fn split<'a>(sql: &'a str, keyword: &Regex, boundary: &Regex) -> ClauseSplit<'a> {
    let sql = sql.trim_end();

    let at = boundary
        .find_iter(sql)
        .map(|m| m.start())
        .find(|pos| is_top_level(sql, *pos))
        .or_else(|| sql.strip_suffix(';').map(|s| s.trim_end().len()))
        .unwrap_or(sql.len());

    let head = sql[..at].trim_end();
    let present = keyword
        .find_iter(head)
        .any(|m| is_top_level(sql, m.start()));

    ClauseSplit {
        head,
        tail: sql[at..].trim_start(),
        present,
    }
}

/// Whether the position is outside of any parentheses or string literal
fn is_top_level(sql: &str, pos: usize) -> bool {
    let mut depth = 0i32;
    let mut quoted = false;

    for c in sql[..pos].chars() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            _ => {}
        }
    }

    depth == 0 && !quoted
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_for_where_without_trailing_clauses() {
        assert_eq!(
            split_for_where("SELECT * FROM T"),
            ClauseSplit {
                head: "SELECT * FROM T",
                tail: "",
                present: false
            }
        );
        assert_eq!(
            split_for_where("SELECT * FROM T WHERE ID > 0"),
            ClauseSplit {
                head: "SELECT * FROM T WHERE ID > 0",
                tail: "",
                present: true
            }
        );
    }

    #[test]
    fn test_split_for_where_before_order_by() {
        let split = split_for_where("SELECT * FROM T WHERE ID > 0 ORDER BY NAME");

        assert_eq!(split.head, "SELECT * FROM T WHERE ID > 0");
        assert_eq!(split.tail, "ORDER BY NAME");
        assert!(split.present);
        assert_eq!(
            split.rejoin("SELECT * FROM T WHERE ID > 0 AND (A = 1)"),
            "SELECT * FROM T WHERE ID > 0 AND (A = 1) ORDER BY NAME"
        );
    }

    #[test]
    fn test_split_for_where_before_group_by_and_fetch() {
        let split = split_for_where(
            "SELECT DEPT, COUNT(*) FROM T group by DEPT FETCH FIRST 10 ROWS ONLY",
        );

        assert_eq!(split.head, "SELECT DEPT, COUNT(*) FROM T");
        assert_eq!(split.tail, "group by DEPT FETCH FIRST 10 ROWS ONLY");
        assert!(!split.present);
    }

    #[test]
    fn test_split_for_where_ignores_identifiers_and_subqueries() {
        let split = split_for_where("SELECT SOMEWHERE FROM T");
        assert!(!split.present);

        let split = split_for_where(
            "SELECT * FROM T JOIN (SELECT ID FROM U WHERE X = 1 ORDER BY ID) V ON T.ID = V.ID",
        );
        assert!(!split.present);
        assert_eq!(split.tail, "");

        let split = split_for_where("SELECT 'WHERE' AS W FROM T");
        assert!(!split.present);
    }

    #[test]
    fn test_split_keeps_terminator() {
        let split = split_for_where("SELECT * FROM T ;");

        assert_eq!(split.head, "SELECT * FROM T");
        assert_eq!(split.tail, ";");
        assert_eq!(
            split.rejoin("SELECT * FROM T WHERE A = 1"),
            "SELECT * FROM T WHERE A = 1;"
        );
    }

    #[test]
    fn test_split_for_order_by() {
        let split = split_for_order_by("SELECT * FROM T ORDER BY NAME LIMIT 10");

        assert_eq!(split.head, "SELECT * FROM T ORDER BY NAME");
        assert_eq!(split.tail, "LIMIT 10");
        assert!(split.present);

        assert!(!split_for_order_by("SELECT * FROM T WHERE A = 1").present);
    }
}
