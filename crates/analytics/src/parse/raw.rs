use crate::error::ParseError;
use crate::error::Result;

const TUPLE_SEPARATOR: &str = "],";
const FIELD_SEPARATOR: &str = ",";

/// Splits the value of a bracketed-array assignment into tuples of raw field strings.
///
/// Values may or may not be quoted with either `"` or `'`, trailing commas are accepted
/// both after the last tuple and after the last field of a tuple, and whitespace
/// outside of quoted values is insignificant.
pub(super) struct TupleParser;

impl TupleParser {
    pub fn parse(name: &str, value: &str) -> Result<Vec<Vec<String>>> {
        let compact = strip_unquoted_whitespace(value);

        let body = compact
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ParseError::MalformedArray {
                name: name.to_owned(),
                reason: String::from("missing enclosing brackets"),
            })?;
        let body = body.strip_suffix(',').unwrap_or(body);

        if body.is_empty() {
            return Ok(Vec::new());
        }

        let tuples = split_unquoted(body, TUPLE_SEPARATOR);
        let last = tuples.len() - 1;

        tuples
            .into_iter()
            .enumerate()
            .map(|(idx, tuple)| Self::fields(name, tuple, idx == last))
            .collect()
    }

    /// Splits one tuple into its fields. The separator between two tuples consumes the
    /// closing bracket of the first, so only the last tuple still carries its own.
    fn fields(name: &str, tuple: &str, last: bool) -> Result<Vec<String>> {
        let unclosed = || ParseError::MalformedArray {
            name: name.to_owned(),
            reason: format!("unclosed tuple `{tuple}`"),
        };

        let inner = tuple.strip_prefix('[').ok_or_else(unclosed)?;
        let inner = if last {
            inner.strip_suffix(']').ok_or_else(unclosed)?
        } else {
            inner
        };

        if find_unquoted(inner, '[').is_some() {
            return Err(ParseError::MalformedArray {
                name: name.to_owned(),
                reason: format!("unexpected nesting in `{tuple}`"),
            });
        }

        let mut fields: Vec<String> = split_unquoted(inner, FIELD_SEPARATOR)
            .into_iter()
            .map(str::to_owned)
            .collect();

        if fields.last().is_some_and(String::is_empty) {
            fields.pop();
        }

        Ok(fields)
    }
}

/// Removes the enclosing quote characters from a raw field.
pub(super) fn unquote(field: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = field
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }

    field
}

/// Finds the first occurrence of `needle` that is not enclosed in quotes.
pub(super) fn find_unquoted(haystack: &str, needle: char) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (idx, ch) in haystack.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == needle => return Some(idx),
            None => {}
        }
    }

    None
}

fn strip_unquoted_whitespace(value: &str) -> String {
    let mut quote: Option<char> = None;
    let mut compact = String::with_capacity(value.len());

    for ch in value.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => continue,
            None => {}
        }

        compact.push(ch);
    }

    compact
}

fn split_unquoted<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut skip_until = 0;

    for (idx, ch) in value.char_indices() {
        if idx < skip_until {
            continue;
        }

        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if value[idx..].starts_with(separator) => {
                parts.push(&value[start..idx]);
                start = idx + separator.len();
                skip_until = start;
            }
            None => {}
        }
    }

    parts.push(&value[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_tuples_with_trailing_commas() -> Result<()> {
        let tuples = TupleParser::parse("X", "[[1, 2, \"a b\",], [3,4,'c'],\n]")?;

        assert_eq!(
            tuples,
            vec![
                vec!["1", "2", "\"a b\""],
                vec!["3", "4", "'c'"],
            ]
        );

        Ok(())
    }

    #[test]
    fn keeps_separators_inside_quotes() -> Result<()> {
        let tuples = TupleParser::parse("X", r#"[["war, peace", "x],y"]]"#)?;

        assert_eq!(tuples, vec![vec![r#""war, peace""#, r#""x],y""#]]);

        Ok(())
    }

    #[test]
    fn empty_array_has_no_tuples() -> Result<()> {
        assert!(TupleParser::parse("X", " [ ] ")?.is_empty());
        Ok(())
    }

    #[test]
    fn truncated_array_is_malformed() {
        let result = TupleParser::parse("X", "[[1,2],[3,4");

        assert!(matches!(result, Err(ParseError::MalformedArray { .. })));
    }

    #[test]
    fn array_missing_its_closing_bracket_is_malformed() {
        let result = TupleParser::parse(
            "NEGARANKS",
            r#"[[1,2,3,"conflict","all","2020",1.5],[4,5,6,"polemic","all","2021",2.5]"#,
        );

        assert!(matches!(
            result,
            Err(ParseError::MalformedArray { ref name, .. }) if name == "NEGARANKS"
        ));
    }

    #[test]
    fn tuple_without_brackets_is_malformed() {
        let flat = TupleParser::parse("X", "[1,2,3]");
        let unopened = TupleParser::parse("X", "[[1,2],3,4]]");

        assert!(matches!(flat, Err(ParseError::MalformedArray { .. })));
        assert!(matches!(unopened, Err(ParseError::MalformedArray { .. })));
    }

    #[test]
    fn nested_tuples_are_malformed() {
        let result = TupleParser::parse("X", "[[[1,2]]]");

        assert!(matches!(result, Err(ParseError::MalformedArray { .. })));
    }

    #[test]
    fn unquotes_both_quote_styles() {
        assert_eq!(unquote("\"all\""), "all");
        assert_eq!(unquote("'2020'"), "2020");
        assert_eq!(unquote("12.5"), "12.5");
        assert_eq!(unquote("\"open"), "\"open");
    }

    #[test]
    fn finds_terminator_outside_quotes() {
        assert_eq!(find_unquoted(r#"["a;b"];"#, ';'), Some(7));
        assert_eq!(find_unquoted("[1,2]", ';'), None);
    }
}
