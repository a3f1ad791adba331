use std::collections::HashMap;

use super::NamedParameter;

/// Characters which may precede an operator-prefixed placeholder,
/// covering `=`, `>`, `>=`, `<`, `<=`, `!=`, `<>` and `%`
const OPERATOR_CHARS: [char; 4] = ['=', '<', '>', '%'];

/// How a whitespace-separated token of a template is rewritten.
///
/// Tokens are checked in the order of the variants, the first
/// matching kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `IN($name)` or `IN($name,$name,...)`
    InGroup,
    /// `$name` or `($name)` at the start of the token
    Bare,
    /// `op$name` where op is a comparison operator
    OperatorPrefixed,
    /// Any token without a placeholder, emitted unchanged
    Literal,
}

/// Classifies the supplied token
pub fn classify(token: &str) -> TokenKind {
    if is_in_group(token) {
        return TokenKind::InGroup;
    }

    if token.starts_with('$') || token.starts_with("($") {
        return TokenKind::Bare;
    }

    let chars = token.chars().collect::<Vec<_>>();
    match (0..chars.len()).find(|i| is_placeholder_at(&chars, *i)) {
        Some(i) if OPERATOR_CHARS.contains(&chars[i - 1]) => TokenKind::OperatorPrefixed,
        Some(_) => TokenKind::Bare,
        None => TokenKind::Literal,
    }
}

fn is_in_group(token: &str) -> bool {
    token.starts_with("IN($") || token.starts_with("IN ($")
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A `$` starts a placeholder at the start of a token or after `(`, `,` or an
/// operator, so identifiers such as `V$SESSION` are left untouched
fn is_placeholder_at(chars: &[char], i: usize) -> bool {
    if chars[i] != '$' || !chars.get(i + 1).map_or(false, |c| is_name_char(*c)) {
        return false;
    }

    i == 0 || matches!(chars[i - 1], '(' | ',') || OPERATOR_CHARS.contains(&chars[i - 1])
}

/// Splits the template on whitespace, joining `IN ($...)` groups into a
/// single token
pub(crate) fn tokenize(template: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut iter = template.split_whitespace().peekable();

    while let Some(token) = iter.next() {
        let mut token = token.to_string();

        if token == "IN" && iter.peek().map_or(false, |n| n.starts_with("($")) {
            if let Some(next) = iter.next() {
                token.push_str(next);
            }
        }

        if is_in_group(&token) {
            while !token.contains(')') {
                match iter.next() {
                    Some(next) => token.push_str(next),
                    None => break,
                }
            }
        }

        tokens.push(token);
    }

    tokens
}

/// Collects the positional indices of each named parameter while the
/// template is scanned
pub(crate) struct ParameterAccumulator {
    params: Vec<NamedParameter>,
    positions: HashMap<String, usize>,
    next_index: usize,
}

impl ParameterAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            params: vec![],
            positions: HashMap::new(),
            next_index: 1,
        }
    }

    /// Assigns the next positional index to the supplied parameter
    pub(crate) fn push(&mut self, name: &str) -> usize {
        let name = name.to_uppercase();
        let index = self.next_index;
        self.next_index += 1;

        match self.positions.get(&name) {
            Some(pos) => self.params[*pos].indices.push(index),
            None => {
                self.positions.insert(name.clone(), self.params.len());
                self.params.push(NamedParameter::new(name, vec![index]));
            }
        }

        index
    }

    pub(crate) fn finish(self) -> Vec<NamedParameter> {
        self.params
    }
}

/// Rewrites a single token, replacing each placeholder with a `?`
pub(crate) fn rewrite_token(token: &str, acc: &mut ParameterAccumulator) -> String {
    match classify(token) {
        TokenKind::Literal => token.to_string(),
        TokenKind::InGroup => rewrite_in_group(token, acc),
        TokenKind::Bare | TokenKind::OperatorPrefixed => rewrite_placeholders(token, acc),
    }
}

fn rewrite_placeholders(token: &str, acc: &mut ParameterAccumulator) -> String {
    let chars = token.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(token.len());
    let mut i = 0;

    while i < chars.len() {
        if !is_placeholder_at(&chars, i) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while end < chars.len() && is_name_char(chars[end]) {
            end += 1;
        }

        acc.push(&chars[start..end].iter().collect::<String>());
        out.push('?');
        i = end;
    }

    strip_terminator(out)
}

fn rewrite_in_group(token: &str, acc: &mut ParameterAccumulator) -> String {
    let open = token.find('(').unwrap_or(token.len());
    let close = token[open..]
        .find(')')
        .map(|i| open + i)
        .unwrap_or(token.len());

    let inner = token.get(open + 1..close).unwrap_or("");
    let trailing = token.get(close + 1..).unwrap_or("");

    let slots = inner
        .split(',')
        .map(|slot| {
            let slot = slot.trim();
            match placeholder_name(slot) {
                Some(name) => {
                    acc.push(name);
                    "?".to_string()
                }
                None => slot.to_string(),
            }
        })
        .collect::<Vec<_>>();

    strip_terminator(format!("IN({}){}", slots.join(","), trailing))
}

fn placeholder_name(slot: &str) -> Option<&str> {
    slot.strip_prefix('$')
        .filter(|name| !name.is_empty() && name.chars().all(is_name_char))
}

/// Statement terminators following a placeholder are dropped,
/// drivers reject them in prepared statements
fn strip_terminator(mut token: String) -> String {
    if token.ends_with(';') {
        token.pop();
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tokens() {
        assert_eq!(classify("IN($ids)"), TokenKind::InGroup);
        assert_eq!(classify("IN($ids,$ids))"), TokenKind::InGroup);
        assert_eq!(classify("$name"), TokenKind::Bare);
        assert_eq!(classify("($name)"), TokenKind::Bare);
        assert_eq!(classify("$name);"), TokenKind::Bare);
        assert_eq!(classify("id=$id"), TokenKind::OperatorPrefixed);
        assert_eq!(classify("amount>=$min"), TokenKind::OperatorPrefixed);
        assert_eq!(classify("a<>$b"), TokenKind::OperatorPrefixed);
        assert_eq!(classify("'%$term%'"), TokenKind::OperatorPrefixed);
        assert_eq!(classify("V$SESSION"), TokenKind::Literal);
        assert_eq!(classify("SELECT"), TokenKind::Literal);
        assert_eq!(classify("$"), TokenKind::Bare);
        assert_eq!(classify("in($ids)"), TokenKind::Bare);
    }

    #[test]
    fn test_tokenize_joins_in_groups() {
        assert_eq!(
            tokenize("WHERE ID IN ($a, $b) AND X = 1"),
            vec!["WHERE", "ID", "IN($a,$b)", "AND", "X", "=", "1"]
        );
    }

    #[test]
    fn test_rewrite_bare_with_paren_and_terminator() {
        let mut acc = ParameterAccumulator::new();

        assert_eq!(rewrite_token("$name);", &mut acc), "?)");
        assert_eq!(rewrite_token("($id)", &mut acc), "(?)");
        assert_eq!(rewrite_token("$last;", &mut acc), "?");

        let params = acc.finish();
        assert_eq!(params[0], NamedParameter::new("NAME", vec![1]));
        assert_eq!(params[1], NamedParameter::new("ID", vec![2]));
        assert_eq!(params[2], NamedParameter::new("LAST", vec![3]));
    }

    #[test]
    fn test_rewrite_operator_prefixed() {
        let mut acc = ParameterAccumulator::new();

        assert_eq!(rewrite_token("id<=$max_id", &mut acc), "id<=?");
        assert_eq!(rewrite_token("a!=$b)", &mut acc), "a!=?)");

        assert_eq!(
            acc.finish(),
            vec![
                NamedParameter::new("MAX_ID", vec![1]),
                NamedParameter::new("B", vec![2]),
            ]
        );
    }

    #[test]
    fn test_rewrite_in_group() {
        let mut acc = ParameterAccumulator::new();

        assert_eq!(rewrite_token("IN($ids,$ids,$ids))", &mut acc), "IN(?,?,?))");
        assert_eq!(acc.finish(), vec![NamedParameter::new("IDS", vec![1, 2, 3])]);
    }

    #[test]
    fn test_rewrite_literal_dollar_untouched() {
        let mut acc = ParameterAccumulator::new();

        assert_eq!(rewrite_token("V$SESSION", &mut acc), "V$SESSION");
        assert_eq!(rewrite_token("'$'", &mut acc), "'$'");
        assert!(acc.finish().is_empty());
    }
}
