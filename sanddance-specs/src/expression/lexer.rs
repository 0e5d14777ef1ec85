use regex::Regex;
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Null,
    Bool { value: bool, raw: String },
    Number { value: f64, raw: String },
    String { value: String, raw: String },
    Identifier { value: String },
    Asterisk,
    CloseCurly,
    CloseParen,
    CloseSquare,
    Dot,
    DoubleEquals,
    TripleEquals,
    Exclamation,
    ExclamationEquals,
    ExclamationDoubleEquals,
    Minus,
    OpenCurly,
    OpenParen,
    OpenSquare,
    Plus,
    Slash,
    Percent,
    Comma,
    Colon,
    Question,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    LogicalAnd,
    LogicalOr,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Null => "null",
            Token::Bool { raw, .. } | Token::Number { raw, .. } | Token::String { raw, .. } => {
                return write!(f, "{}", raw)
            }
            Token::Identifier { value } => return write!(f, "{}", value),
            Token::Asterisk => "*",
            Token::CloseCurly => "}",
            Token::CloseParen => ")",
            Token::CloseSquare => "]",
            Token::Dot => ".",
            Token::DoubleEquals => "==",
            Token::TripleEquals => "===",
            Token::Exclamation => "!",
            Token::ExclamationEquals => "!=",
            Token::ExclamationDoubleEquals => "!==",
            Token::Minus => "-",
            Token::OpenCurly => "{",
            Token::OpenParen => "(",
            Token::OpenSquare => "[",
            Token::Plus => "+",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Question => "?",
            Token::GreaterThan => ">",
            Token::GreaterThanEquals => ">=",
            Token::LessThan => "<",
            Token::LessThanEquals => "<=",
            Token::LogicalAnd => "&&",
            Token::LogicalOr => "||",
        };
        write!(f, "{}", s)
    }
}

/// A token with its byte span in the source expression
pub type SpannedToken = (Token, usize, usize);

/// Split an expression string into tokens
pub fn tokenize(src: &str) -> Result<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    let mut index = 0;
    loop {
        index += leading_whitespace_len(&src[index..]);
        let remaining = &src[index..];
        if remaining.is_empty() {
            break;
        }
        let (token, len) = tokenize_single_token(remaining).with_context(|| {
            format!(
                "Failed to parse token at position {} in expression: {}",
                index, src
            )
        })?;
        tokens.push((token, index, index + len));
        index += len;
    }
    Ok(tokens)
}

fn leading_whitespace_len(data: &str) -> usize {
    take_while(data, |ch| ch.is_whitespace()).len()
}

/// Longest prefix whose characters all satisfy the predicate
fn take_while<F>(data: &str, mut pred: F) -> &str
where
    F: FnMut(char) -> bool,
{
    let mut end = 0;
    for ch in data.chars() {
        if !pred(ch) {
            break;
        }
        end += ch.len_utf8();
    }
    &data[..end]
}

fn tokenize_single_token(data: &str) -> Result<(Token, usize)> {
    let next = data
        .chars()
        .next()
        .ok_or_else(|| SandDanceError::parse("Unexpected end of expression"))?;

    let simple = match next {
        '*' => Some(Token::Asterisk),
        '/' => Some(Token::Slash),
        '%' => Some(Token::Percent),
        '{' => Some(Token::OpenCurly),
        '}' => Some(Token::CloseCurly),
        '(' => Some(Token::OpenParen),
        ')' => Some(Token::CloseParen),
        '[' => Some(Token::OpenSquare),
        ']' => Some(Token::CloseSquare),
        ',' => Some(Token::Comma),
        '?' => Some(Token::Question),
        ':' => Some(Token::Colon),
        _ => None,
    };
    if let Some(token) = simple {
        return Ok((token, 1));
    }

    match next {
        '+' | '-' => tokenize_sign(data, next),
        '|' | '&' => tokenize_logical(data, next),
        '"' | '\'' => tokenize_string(data, next),
        '>' | '<' | '=' | '!' => tokenize_comparison(data),
        c if c.is_ascii_digit() || c == '.' => tokenize_dot_or_number(data),
        c if c.is_alphabetic() || c == '_' || c == '$' => Ok(tokenize_ident(data)),
        other => Err(SandDanceError::parse(&format!(
            "Invalid character: {}",
            other
        ))),
    }
}

fn tokenize_sign(data: &str, sign: char) -> Result<(Token, usize)> {
    let taken = take_while(data, |c| c == sign);
    if taken.len() > 1 {
        return Err(SandDanceError::parse(&format!(
            "Increment and decrement operators are not supported: {}",
            taken
        )));
    }
    let token = if sign == '+' {
        Token::Plus
    } else {
        Token::Minus
    };
    Ok((token, 1))
}

fn tokenize_logical(data: &str, ch: char) -> Result<(Token, usize)> {
    let taken = take_while(data, |c| c == ch);
    match (ch, taken.len()) {
        ('|', 2) => Ok((Token::LogicalOr, 2)),
        ('&', 2) => Ok((Token::LogicalAnd, 2)),
        (_, 1) => Err(SandDanceError::parse(&format!(
            "Bitwise operator not supported: {}",
            taken
        ))),
        _ => Err(SandDanceError::parse(&format!(
            "Invalid number of consecutive {} characters: {}",
            ch, taken
        ))),
    }
}

fn tokenize_comparison(data: &str) -> Result<(Token, usize)> {
    let mut first = true;
    let taken = take_while(data, |c| {
        // A `!` only starts an operator, so `!!x` yields two tokens
        let keep = c == '>' || c == '<' || c == '=' || (first && c == '!');
        first = false;
        keep
    });
    let token = match taken {
        ">" => Token::GreaterThan,
        "<" => Token::LessThan,
        ">=" => Token::GreaterThanEquals,
        "<=" => Token::LessThanEquals,
        "==" => Token::DoubleEquals,
        "===" => Token::TripleEquals,
        "!" => Token::Exclamation,
        "!=" => Token::ExclamationEquals,
        "!==" => Token::ExclamationDoubleEquals,
        "=" => {
            return Err(SandDanceError::parse(
                "Assignment operator is not supported",
            ))
        }
        _ => {
            return Err(SandDanceError::parse(&format!(
                "Invalid operator: {}",
                taken
            )))
        }
    };
    Ok((token, taken.len()))
}

fn unescape_unicode(data: &str, unicode_start_inds: &[usize]) -> String {
    lazy_static! {
        // \xXX, \uXXXX and \u{X..XXXXXX}, with the escape slash already removed
        static ref UNICODE_RE: Regex =
            Regex::new(r"^(?:x([0-9a-fA-F]{2})|u([0-9a-fA-F]{4})|u\{([0-9a-fA-F]{1,6})\})").unwrap();
    }

    let mut result = String::from(data);

    // Reverse order keeps earlier indices valid while the string is edited
    for i in unicode_start_inds.iter().rev() {
        let Some(caps) = UNICODE_RE.captures(&data[*i..]) else {
            continue;
        };
        let (Some(whole), Some(hex)) = (
            caps.get(0),
            caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)),
        ) else {
            continue;
        };
        let ch = u32::from_str_radix(hex.as_str(), 16)
            .ok()
            .and_then(std::char::from_u32);
        if let Some(ch) = ch {
            result.replace_range(*i..*i + whole.end(), &ch.to_string());
        }
    }

    result
}

fn tokenize_string(data: &str, quote_char: char) -> Result<(Token, usize)> {
    let mut unescaped = String::new();
    let mut unicode_start_inds: Vec<usize> = Vec::new();
    let mut in_escape = false;
    let mut end = None;

    for (i, c) in data.char_indices().skip(1) {
        if in_escape {
            match c {
                '0' => unescaped.push('\u{0000}'),
                'n' => unescaped.push('\n'),
                'r' => unescaped.push('\r'),
                't' => unescaped.push('\t'),
                'v' => unescaped.push('\u{000B}'),
                'b' => unescaped.push('\u{0008}'),
                'f' => unescaped.push('\u{000C}'),
                '\n' => {}
                'u' | 'x' => {
                    unicode_start_inds.push(unescaped.len());
                    unescaped.push(c);
                }
                // Quotes, backslashes and unknown escapes keep the character
                _ => unescaped.push(c),
            }
            in_escape = false;
        } else if c == '\\' {
            in_escape = true;
        } else if c == quote_char {
            end = Some(i + c.len_utf8());
            break;
        } else {
            unescaped.push(c);
        }
    }

    let end = end.ok_or_else(|| SandDanceError::parse("Expression ends with unterminated string"))?;
    let token = Token::String {
        value: unescape_unicode(&unescaped, &unicode_start_inds),
        raw: data[..end].to_string(),
    };
    Ok((token, end))
}

fn tokenize_dot_or_number(data: &str) -> Result<(Token, usize)> {
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_e = false;
    let mut last_char_was_e = false;

    let taken = take_while(data, |c| {
        let keep = if c.is_ascii_digit() {
            seen_digit = true;
            true
        } else if c == '.' && !seen_dot && !seen_e {
            seen_dot = true;
            true
        } else if (c == 'e' || c == 'E') && seen_digit && !seen_e {
            seen_e = true;
            true
        } else {
            (c == '+' || c == '-') && last_char_was_e
        };
        last_char_was_e = keep && (c == 'e' || c == 'E');
        keep
    });

    if taken == "." {
        return Ok((Token::Dot, 1));
    }
    if taken.len() > 1 && taken.starts_with('0') && !taken.starts_with("0.") {
        return Err(SandDanceError::parse("Numbers may not have leading zeros"));
    }
    let value: f64 = taken.parse()?;
    Ok((
        Token::Number {
            value,
            raw: taken.to_string(),
        },
        taken.len(),
    ))
}

fn tokenize_ident(data: &str) -> (Token, usize) {
    let taken = take_while(data, |ch| ch == '_' || ch == '$' || ch.is_alphanumeric());
    let token = match taken {
        "true" | "false" => Token::Bool {
            value: taken == "true",
            raw: taken.to_string(),
        },
        "null" => Token::Null,
        _ => Token::Identifier {
            value: taken.to_string(),
        },
    };
    (token, taken.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        tokenize(src).unwrap().into_iter().map(|t| t.0).collect()
    }

    #[test]
    fn test_operators_and_spans() {
        let tokens = tokenize("a >= 10 && !b").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[1], (Token::GreaterThanEquals, 2, 4));
        assert_eq!(tokens[4].0, Token::Exclamation);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0.5 .25 5e-3"),
            vec![
                Token::Number { value: 0.5, raw: "0.5".to_string() },
                Token::Number { value: 0.25, raw: ".25".to_string() },
                Token::Number { value: 0.005, raw: "5e-3".to_string() },
            ]
        );
        assert!(tokenize("007").is_err());
    }

    #[test]
    fn test_strings() {
        let tokens = kinds(r#"datum["a \"b\""] 'café'"#);
        assert_eq!(
            tokens[2],
            Token::String {
                value: "a \"b\"".to_string(),
                raw: r#""a \"b\"""#.to_string()
            }
        );
        assert!(matches!(&tokens[4], Token::String { value, .. } if value == "café"));
        assert!(tokenize("'open").is_err());
    }

    #[test]
    fn test_rejects_unsupported() {
        assert!(tokenize("a = 1").is_err());
        assert!(tokenize("a | b").is_err());
        assert!(tokenize("i++").is_err());
    }
}
