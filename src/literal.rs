//! Safe parser for the literal-encoded columns of the recipe dataset.
//!
//! Fields such as `ingredients`, `steps`, `tags` and `nutrition` are stored as
//! stringified lists or tuples, e.g. `['carrot', 'onion']` or
//! `(51.5, 0.0, 13.0)`. Only plain data is accepted here: strings, numbers,
//! booleans, `None`, lists and tuples. Nothing is ever evaluated.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of ints and floats. Booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Items of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) | Literal::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid literal at byte {}: {}", self.position, self.message)
    }
}

impl std::error::Error for LiteralError {}

/// Parses a complete literal. Trailing non-whitespace input is an error.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
    };
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        None => Ok(value),
        Some(&(pos, c)) => Err(LiteralError {
            position: pos,
            message: format!("unexpected trailing character '{}'", c),
        }),
    }
}

/// Parses a list literal and keeps its string items, skipping anything else.
/// Returns `None` when the text is not a list at all.
pub fn parse_string_list(input: &str) -> Option<Vec<String>> {
    match parse_literal(input).ok()? {
        Literal::List(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect(),
        ),
        _ => None,
    }
}

/// Parses a list or tuple in which every item is numeric.
pub fn parse_number_sequence(input: &str) -> Option<Vec<f64>> {
    let value = parse_literal(input).ok()?;
    value
        .as_sequence()?
        .iter()
        .map(Literal::as_f64)
        .collect()
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn error<T>(&self, position: usize, message: impl Into<String>) -> Result<T, LiteralError> {
        Err(LiteralError {
            position,
            message: message.into(),
        })
    }

    fn end_position(&self) -> usize {
        self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_whitespace();
        let Some(&(pos, c)) = self.chars.peek() else {
            return self.error(self.end_position(), "unexpected end of input");
        };
        match c {
            '[' => {
                self.chars.next();
                let (items, _) = self.sequence(']')?;
                Ok(Literal::List(items))
            }
            '(' => {
                self.chars.next();
                let (mut items, saw_comma) = self.sequence(')')?;
                // `(x)` is just a parenthesized value, `(x,)` is a tuple.
                if items.len() == 1 && !saw_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            '\'' | '"' => self.string(),
            '0'..='9' | '-' | '+' | '.' => self.number(),
            c if c.is_alphabetic() || c == '_' => self.keyword(),
            other => self.error(pos, format!("unexpected character '{}'", other)),
        }
    }

    fn sequence(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some(&(_, c)) if c == close => {
                    self.chars.next();
                    return Ok((items, saw_comma));
                }
                None => return self.error(self.end_position(), format!("missing '{}'", close)),
                _ => {}
            }
            items.push(self.value()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => saw_comma = true,
                Some((_, c)) if c == close => return Ok((items, saw_comma)),
                Some((pos, c)) => {
                    return self.error(pos, format!("expected ',' or '{}', found '{}'", close, c))
                }
                None => return self.error(self.end_position(), format!("missing '{}'", close)),
            }
        }
    }

    fn string(&mut self) -> Result<Literal, LiteralError> {
        let Some((start, quote)) = self.chars.next() else {
            return self.error(self.end_position(), "unexpected end of input");
        };
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return self.error(start, "unterminated string"),
                Some((_, c)) if c == quote => return Ok(Literal::Str(out)),
                Some((pos, '\\')) => {
                    let Some((_, esc)) = self.chars.next() else {
                        return self.error(pos, "unterminated escape");
                    };
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(esc),
                        '\n' => {}
                        'x' => out.push(self.hex_escape(pos, 2)?),
                        'u' => out.push(self.hex_escape(pos, 4)?),
                        'U' => out.push(self.hex_escape(pos, 8)?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                Some((pos, '\n')) => return self.error(pos, "newline in string"),
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, pos: usize, digits: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let Some((_, c)) = self.chars.next() else {
                return self.error(pos, "truncated escape");
            };
            let Some(d) = c.to_digit(16) else {
                return self.error(pos, format!("invalid hex digit '{}'", c));
            };
            code = code * 16 + d;
        }
        match char::from_u32(code) {
            Some(c) => Ok(c),
            None => self.error(pos, format!("invalid code point {:#x}", code)),
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let Some(&(start, _)) = self.chars.peek() else {
            return self.error(self.end_position(), "unexpected end of input");
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            let sign_after_exponent = (c == '-' || c == '+')
                && pos > start
                && matches!(self.input[..pos].chars().last(), Some('e' | 'E'));
            if c.is_ascii_digit()
                || c == '.'
                || c == '_'
                || c == 'e'
                || c == 'E'
                || sign_after_exponent
                || ((c == '-' || c == '+') && pos == start)
            {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text: String = self.input[start..end].chars().filter(|&c| c != '_').collect();
        let is_float = text.contains(|c: char| matches!(c, '.' | 'e' | 'E'));
        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Literal::Float(value)),
                _ => self.error(start, format!("invalid number '{}'", text)),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Literal::Int(value)),
                Err(_) => self.error(start, format!("invalid number '{}'", text)),
            }
        }
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let Some(&(start, _)) = self.chars.peek() else {
            return self.error(self.end_position(), "unexpected end of input");
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        match &self.input[start..end] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            name => self.error(start, format!("names are not literals: '{}'", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_list() {
        let items = parse_string_list("['winter squash', \"mexican seasoning\", 'honey']").unwrap();
        assert_eq!(items, vec!["winter squash", "mexican seasoning", "honey"]);
    }

    #[test]
    fn test_string_escapes() {
        let value = parse_literal(r"['it\'s', 'tab\there', '\x41é']").unwrap();
        assert_eq!(
            value,
            Literal::List(vec![
                Literal::Str("it's".into()),
                Literal::Str("tab\there".into()),
                Literal::Str("Aé".into()),
            ])
        );
    }

    #[test]
    fn test_nutrition_tuple_and_list() {
        assert_eq!(
            parse_number_sequence("[51.5, 0.0, 13.0, 0.0, 2.0, 0.0, 4.0]").unwrap(),
            vec![51.5, 0.0, 13.0, 0.0, 2.0, 0.0, 4.0]
        );
        assert_eq!(
            parse_number_sequence("(100, -1.5e2, 3)").unwrap(),
            vec![100.0, -150.0, 3.0]
        );
    }

    #[test]
    fn test_tuple_versus_parenthesized_value() {
        assert_eq!(parse_literal("(5)").unwrap(), Literal::Int(5));
        assert_eq!(parse_literal("(5,)").unwrap(), Literal::Tuple(vec![Literal::Int(5)]));
        assert_eq!(parse_literal("()").unwrap(), Literal::Tuple(vec![]));
    }

    #[test]
    fn test_nested_and_keywords() {
        let value = parse_literal("[[1, 2], (True, None), 'x',]").unwrap();
        assert_eq!(
            value,
            Literal::List(vec![
                Literal::List(vec![Literal::Int(1), Literal::Int(2)]),
                Literal::Tuple(vec![Literal::Bool(true), Literal::None]),
                Literal::Str("x".into()),
            ])
        );
    }

    #[test]
    fn test_rejects_expressions() {
        assert!(parse_literal("__import__('os').system('ls')").is_err());
        assert!(parse_literal("[1, 2] + [3]").is_err());
        assert!(parse_literal("open('x')").is_err());
        assert!(parse_literal("1 + 1").is_err());
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(parse_literal("").is_err());
        assert!(parse_literal("['unterminated").is_err());
        assert!(parse_literal("[1, 2").is_err());
        assert!(parse_literal("[1 2]").is_err());
        assert!(parse_string_list("'just a string'").is_none());
        assert!(parse_number_sequence("[1, 'two', 3]").is_none());
        assert!(parse_number_sequence("[True, 2]").is_none());
    }

    #[test]
    fn test_string_list_skips_non_strings() {
        assert_eq!(
            parse_string_list("['salt', 3, None, 'pepper']").unwrap(),
            vec!["salt", "pepper"]
        );
    }

    #[test]
    fn test_error_position() {
        let err = parse_literal("[1, ?]").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.to_string().contains("unexpected character '?'"));
    }
}
