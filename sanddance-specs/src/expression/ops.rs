use crate::expression::lexer::Token;
use std::fmt;

/// ESTree-style binary infix operators
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    StrictEquals,
    NotStrictEquals,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
}

impl BinaryOperator {
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::Plus => BinaryOperator::Plus,
            Token::Minus => BinaryOperator::Minus,
            Token::Asterisk => BinaryOperator::Mult,
            Token::Slash => BinaryOperator::Div,
            Token::Percent => BinaryOperator::Mod,
            Token::DoubleEquals => BinaryOperator::Equals,
            Token::TripleEquals => BinaryOperator::StrictEquals,
            Token::ExclamationEquals => BinaryOperator::NotEquals,
            Token::ExclamationDoubleEquals => BinaryOperator::NotStrictEquals,
            Token::GreaterThan => BinaryOperator::GreaterThan,
            Token::GreaterThanEquals => BinaryOperator::GreaterThanEqual,
            Token::LessThan => BinaryOperator::LessThan,
            Token::LessThanEquals => BinaryOperator::LessThanEqual,
            _ => return None,
        })
    }

    /// Left-to-right operators have the larger number on the right
    pub fn infix_binding_power(&self) -> (f64, f64) {
        match self {
            BinaryOperator::Plus | BinaryOperator::Minus => (14.0, 14.5),
            BinaryOperator::Mult | BinaryOperator::Div | BinaryOperator::Mod => (15.0, 15.5),
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThanEqual
            | BinaryOperator::LessThanEqual => (12.0, 12.5),
            BinaryOperator::Equals
            | BinaryOperator::StrictEquals
            | BinaryOperator::NotEquals
            | BinaryOperator::NotStrictEquals => (11.0, 11.5),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Equals => "==",
            BinaryOperator::StrictEquals => "===",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::NotStrictEquals => "!==",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::LessThanEqual => "<=",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    Or,
    And,
}

impl LogicalOperator {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::LogicalOr => Some(LogicalOperator::Or),
            Token::LogicalAnd => Some(LogicalOperator::And),
            _ => None,
        }
    }

    pub fn infix_binding_power(&self) -> (f64, f64) {
        match self {
            LogicalOperator::Or => (6.0, 6.5),
            LogicalOperator::And => (7.0, 7.5),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::Or => write!(f, "||"),
            LogicalOperator::And => write!(f, "&&"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
    Not,
}

impl UnaryOperator {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Plus => Some(UnaryOperator::Pos),
            Token::Minus => Some(UnaryOperator::Neg),
            Token::Exclamation => Some(UnaryOperator::Not),
            _ => None,
        }
    }

    pub fn unary_binding_power(&self) -> f64 {
        17.0
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Pos => write!(f, "+"),
            UnaryOperator::Neg => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}

/// Binding powers of the ternary operator `test ? consequent : alternate`
pub fn ternary_binding_power() -> (f64, f64, f64) {
    (4.8, 4.6, 4.4)
}

/// Binding power of calls and member access
pub const MEMBER_BINDING_POWER: f64 = 20.0;
