use crate::expression::ops::{
    ternary_binding_power, BinaryOperator, LogicalOperator, UnaryOperator, MEMBER_BINDING_POWER,
};
use sanddance_common::escape::quote;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Number(v) => write!(f, "{}", v),
            Literal::String(v) => write!(f, "{}", quote(v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `object.name`
    Static(String),
    /// `object[expr]`
    Computed(Box<Expression>),
}

/// ESTree-style expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Identifier(String),
    Unary {
        op: UnaryOperator,
        argument: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Logical {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Member {
        object: Box<Expression>,
        property: MemberProperty,
    },
    Call {
        callee: String,
        arguments: Vec<Expression>,
    },
    Array(Vec<Expression>),
    Object(Vec<(String, Expression)>),
}

impl Expression {
    /// Binding power used to decide where Display needs parentheses
    fn binding_power(&self) -> (f64, f64) {
        match self {
            Expression::Unary { op, .. } => {
                let bp = op.unary_binding_power();
                (bp, bp)
            }
            Expression::Binary { op, .. } => op.infix_binding_power(),
            Expression::Logical { op, .. } => op.infix_binding_power(),
            Expression::Conditional { .. } => {
                let (left, _, right) = ternary_binding_power();
                (left, right)
            }
            Expression::Member { .. } | Expression::Call { .. } => {
                (MEMBER_BINDING_POWER, MEMBER_BINDING_POWER)
            }
            _ => (1000.0, 1000.0),
        }
    }

    /// Identifiers read as variables: excludes callees, static member names and object keys
    pub fn free_identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Identifier(name) => {
                names.insert(name.clone());
            }
            Expression::Unary { argument, .. } => argument.collect_identifiers(names),
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.collect_identifiers(names);
                consequent.collect_identifiers(names);
                alternate.collect_identifiers(names);
            }
            Expression::Member { object, property } => {
                object.collect_identifiers(names);
                if let MemberProperty::Computed(property) = property {
                    property.collect_identifiers(names);
                }
            }
            Expression::Call { arguments, .. } | Expression::Array(arguments) => {
                for arg in arguments {
                    arg.collect_identifiers(names);
                }
            }
            Expression::Object(properties) => {
                for (_, value) in properties {
                    value.collect_identifiers(names);
                }
            }
        }
    }

    /// Names of every function called anywhere in the expression
    pub fn callees(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.visit(&mut |expr| {
            if let Expression::Call { callee, .. } = expr {
                names.insert(callee.clone());
            }
        });
        names
    }

    /// Pre-order traversal
    pub fn visit(&self, f: &mut dyn FnMut(&Expression)) {
        f(self);
        match self {
            Expression::Literal(_) | Expression::Identifier(_) => {}
            Expression::Unary { argument, .. } => argument.visit(f),
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.visit(f);
                consequent.visit(f);
                alternate.visit(f);
            }
            Expression::Member { object, property } => {
                object.visit(f);
                if let MemberProperty::Computed(property) = property {
                    property.visit(f);
                }
            }
            Expression::Call { arguments, .. } | Expression::Array(arguments) => {
                for arg in arguments {
                    arg.visit(f);
                }
            }
            Expression::Object(properties) => {
                for (_, value) in properties {
                    value.visit(f);
                }
            }
        }
    }
}

/// Write `child`, wrapping it in parentheses when it binds looser than `min_bp`
fn write_operand(f: &mut fmt::Formatter<'_>, child: &Expression, min_bp: f64) -> fmt::Result {
    if child.binding_power().0 < min_bp {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Unary { op, argument } => {
                write!(f, "{}", op)?;
                write_operand(f, argument, op.unary_binding_power())
            }
            Expression::Binary { left, op, right } => {
                let (left_bp, right_bp) = op.infix_binding_power();
                write_operand(f, left, left_bp)?;
                write!(f, " {} ", op)?;
                write_operand(f, right, right_bp)
            }
            Expression::Logical { left, op, right } => {
                let (left_bp, right_bp) = op.infix_binding_power();
                write_operand(f, left, left_bp)?;
                write!(f, " {} ", op)?;
                write_operand(f, right, right_bp)
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let (left_bp, middle_bp, right_bp) = ternary_binding_power();
                write_operand(f, test, left_bp)?;
                write!(f, " ? ")?;
                write_operand(f, consequent, middle_bp)?;
                write!(f, " : ")?;
                write_operand(f, alternate, right_bp)
            }
            Expression::Member { object, property } => {
                write_operand(f, object, MEMBER_BINDING_POWER)?;
                match property {
                    MemberProperty::Static(name) => write!(f, ".{}", name),
                    MemberProperty::Computed(expr) => write!(f, "[{}]", expr),
                }
            }
            Expression::Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Array(elements) => {
                write!(f, "[")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", el)?;
                }
                write!(f, "]")
            }
            Expression::Object(properties) => {
                write!(f, "{{")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", quote(key), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
