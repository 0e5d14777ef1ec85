use crate::expression::ast::{Expression, Literal, MemberProperty};
use crate::expression::lexer::{tokenize, SpannedToken, Token};
use crate::expression::ops::{
    ternary_binding_power, BinaryOperator, LogicalOperator, UnaryOperator, MEMBER_BINDING_POWER,
};
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};

/// Parse an expression string into an AST
pub fn parse(expr: &str) -> Result<Expression> {
    let mut parser = Parser {
        tokens: tokenize(expr)?,
        position: 0,
        full_expr: expr,
    };
    let result = parser.parse_bp(0.0)?;
    if let Some((token, start, _)) = parser.peek_spanned() {
        return Err(SandDanceError::parse(&format!(
            "Unexpected token {} at position {} in expression: {}",
            token, start, expr
        )));
    }
    Ok(result)
}

struct Parser<'a> {
    tokens: Vec<SpannedToken>,
    position: usize,
    full_expr: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _, _)| t)
    }

    fn peek_spanned(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some((token, _, _)) if token == expected => Ok(()),
            Some((token, start, _)) => Err(SandDanceError::parse(&format!(
                "Expected {}, received {} at position {}",
                expected, token, start
            ))),
            None => Err(SandDanceError::parse(&format!(
                "Expected {}, reached end of expression",
                expected
            ))),
        }
    }

    /// Pratt loop: parse a prefix form, then fold in operators that bind tighter than `min_bp`
    fn parse_bp(&mut self, min_bp: f64) -> Result<Expression> {
        let (token, start, _) = self
            .advance()
            .ok_or_else(|| SandDanceError::parse("Unexpected end of expression"))?;

        let mut lhs = self.parse_prefix(token).with_context(|| {
            format!(
                "Failed to parse form starting at position {} in expression: {}",
                start, self.full_expr
            )
        })?;

        while let Some(token) = self.peek().cloned() {
            match token {
                Token::CloseParen
                | Token::CloseCurly
                | Token::CloseSquare
                | Token::Comma
                | Token::Colon => break,
                _ => {}
            }

            if let Some(op) = BinaryOperator::from_token(&token) {
                let (left_bp, right_bp) = op.infix_binding_power();
                if left_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_bp(right_bp)?;
                lhs = Expression::Binary {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(right),
                };
            } else if let Some(op) = LogicalOperator::from_token(&token) {
                let (left_bp, right_bp) = op.infix_binding_power();
                if left_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_bp(right_bp)?;
                lhs = Expression::Logical {
                    left: Box::new(lhs),
                    op,
                    right: Box::new(right),
                };
            } else if token == Token::Question {
                let (left_bp, middle_bp, right_bp) = ternary_binding_power();
                if min_bp >= left_bp {
                    break;
                }
                self.advance();
                let consequent = self.parse_bp(middle_bp)?;
                self.expect(Token::Colon)?;
                let alternate = self.parse_bp(right_bp)?;
                lhs = Expression::Conditional {
                    test: Box::new(lhs),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                };
            } else if min_bp >= MEMBER_BINDING_POWER {
                break;
            } else if token == Token::OpenParen {
                let callee = match lhs {
                    Expression::Identifier(name) => name,
                    other => {
                        return Err(SandDanceError::parse(&format!(
                            "Only global functions are callable, found: {}",
                            other
                        )))
                    }
                };
                self.advance();
                let arguments = self.parse_list(Token::CloseParen)?;
                lhs = Expression::Call { callee, arguments };
            } else if token == Token::OpenSquare {
                self.advance();
                let property = self.parse_bp(1.0)?;
                self.expect(Token::CloseSquare)?;
                lhs = Expression::Member {
                    object: Box::new(lhs),
                    property: MemberProperty::Computed(Box::new(property)),
                };
            } else if token == Token::Dot {
                self.advance();
                let name = match self.advance() {
                    Some((Token::Identifier { value }, _, _)) => value,
                    Some((token, start, _)) => {
                        return Err(SandDanceError::parse(&format!(
                            "Expected property name after '.', received {} at position {}",
                            token, start
                        )))
                    }
                    None => return Err(SandDanceError::parse("Expected property name after '.'")),
                };
                lhs = Expression::Member {
                    object: Box::new(lhs),
                    property: MemberProperty::Static(name),
                };
            } else {
                return Err(SandDanceError::parse(&format!(
                    "Unexpected token '{}' in expression: {}",
                    token, self.full_expr
                )));
            }
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self, token: Token) -> Result<Expression> {
        if let Some(op) = UnaryOperator::from_token(&token) {
            let argument = self.parse_bp(op.unary_binding_power())?;
            return Ok(Expression::Unary {
                op,
                argument: Box::new(argument),
            });
        }
        Ok(match token {
            Token::Null => Expression::Literal(Literal::Null),
            Token::Bool { value, .. } => Expression::Literal(Literal::Bool(value)),
            Token::Number { value, .. } => Expression::Literal(Literal::Number(value)),
            Token::String { value, .. } => Expression::Literal(Literal::String(value)),
            Token::Identifier { value } => Expression::Identifier(value),
            Token::OpenParen => {
                let inner = self.parse_bp(0.0)?;
                self.expect(Token::CloseParen)?;
                inner
            }
            Token::OpenSquare => Expression::Array(self.parse_list(Token::CloseSquare)?),
            Token::OpenCurly => self.parse_object()?,
            other => {
                return Err(SandDanceError::parse(&format!(
                    "Unexpected token: {}",
                    other
                )))
            }
        })
    }

    /// Comma separated expressions up to and including `close`
    fn parse_list(&mut self, close: Token) -> Result<Vec<Expression>> {
        let mut items = Vec::new();
        while self.peek().is_some() && self.peek() != Some(&close) {
            items.push(self.parse_bp(1.0)?);
            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_object(&mut self) -> Result<Expression> {
        let mut properties = Vec::new();
        while self.peek().is_some() && self.peek() != Some(&Token::CloseCurly) {
            let key = match self.advance() {
                Some((Token::Identifier { value }, _, _))
                | Some((Token::String { value, .. }, _, _)) => value,
                Some((Token::Number { raw, .. }, _, _)) => raw,
                Some((token, start, _)) => {
                    return Err(SandDanceError::parse(&format!(
                        "Invalid object key {} at position {}",
                        token, start
                    )))
                }
                None => break,
            };
            self.expect(Token::Colon)?;
            let value = self.parse_bp(1.0)?;
            properties.push((key, value));
            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::CloseCurly)?;
        Ok(Expression::Object(properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(src: &str) -> String {
        parse(src).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(round_trip("1 + 2 * 3"), "1 + 2 * 3");
        assert_eq!(round_trip("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(round_trip("a - (b - c)"), "a - (b - c)");
        assert_eq!(round_trip("a || b && c"), "a || b && c");
        assert_eq!(round_trip("-(a + b)"), "-(a + b)");
    }

    #[test]
    fn test_ternary_and_calls() {
        assert_eq!(
            round_trip("max(0, PlotWidthIn) > 0 ? ceil(sqrt(n)) : 0"),
            "max(0, PlotWidthIn) > 0 ? ceil(sqrt(n)) : 0"
        );
        assert_eq!(
            round_trip("a ? b : c ? d : e"),
            "a ? b : c ? d : e"
        );
    }

    #[test]
    fn test_members() {
        let expr = parse(r#"datum["Sepal Width"] + parent.count + data('x').length"#).unwrap();
        let ids = expr.free_identifiers();
        assert!(ids.contains("datum"));
        assert!(ids.contains("parent"));
        assert!(!ids.contains("count"));
        assert!(!ids.contains("length"));
        assert!(expr.callees().contains("data"));
    }

    #[test]
    fn test_literals() {
        let expr = parse("{'a': [1, 'two', null], b: true}").unwrap();
        assert_eq!(expr.to_string(), r#"{"a": [1, "two", null], "b": true}"#);
    }

    #[test]
    fn test_errors() {
        assert!(parse("").is_err());
        assert!(parse("(a + b").is_err());
        assert!(parse("a b").is_err());
        assert!(parse("f(a,").is_err());
        assert!(parse("a.1").is_err());
        assert!(parse("datum.(a)").is_err());
    }
}
