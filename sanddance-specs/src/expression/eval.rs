use crate::expression::ast::{Expression, Literal, MemberProperty};
use crate::expression::ops::{BinaryOperator, LogicalOperator, UnaryOperator};
use crate::expression::parser::parse;
use crate::spec::chart::ChartSpec;
use crate::spec::signal::SignalSpec;
use indexmap::IndexMap;
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};
use serde_json::Value;

/// Runtime value of an evaluated expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ExprValue>),
    Object(IndexMap<String, ExprValue>),
}

impl ExprValue {
    pub fn truthy(&self) -> bool {
        match self {
            ExprValue::Null => false,
            ExprValue::Bool(v) => *v,
            ExprValue::Number(v) => *v != 0.0 && !v.is_nan(),
            ExprValue::String(v) => !v.is_empty(),
            ExprValue::Array(_) | ExprValue::Object(_) => true,
        }
    }

    /// Numeric coercion
    pub fn to_number(&self) -> f64 {
        match self {
            ExprValue::Null => 0.0,
            ExprValue::Bool(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            ExprValue::Number(v) => *v,
            ExprValue::String(v) => {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            ExprValue::Array(_) | ExprValue::Object(_) => f64::NAN,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ExprValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    fn display_string(&self) -> String {
        match self {
            ExprValue::Null => "null".to_string(),
            ExprValue::Bool(v) => v.to_string(),
            ExprValue::Number(v) => v.to_string(),
            ExprValue::String(v) => v.clone(),
            ExprValue::Array(items) => items
                .iter()
                .map(|v| v.display_string())
                .collect::<Vec<_>>()
                .join(","),
            ExprValue::Object(_) => "[object Object]".to_string(),
        }
    }
}

impl From<&Value> for ExprValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ExprValue::Null,
            Value::Bool(v) => ExprValue::Bool(*v),
            Value::Number(v) => ExprValue::Number(v.as_f64().unwrap_or(f64::NAN)),
            Value::String(v) => ExprValue::String(v.clone()),
            Value::Array(items) => ExprValue::Array(items.iter().map(ExprValue::from).collect()),
            Value::Object(map) => ExprValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), ExprValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Values an expression can read beyond its own literals
pub trait EvalContext {
    fn signal(&self, name: &str) -> Option<ExprValue>;

    /// Row count of a named dataset, backing `data(name).length`
    fn data_length(&self, _name: &str) -> Option<usize> {
        None
    }

    fn bandwidth(&self, _scale: &str) -> Option<f64> {
        None
    }
}

/// Host context with fixed signal values, dataset lengths and band widths
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    pub signals: IndexMap<String, ExprValue>,
    pub data_lengths: IndexMap<String, usize>,
    pub bandwidths: IndexMap<String, f64>,
}

impl StaticContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_signal(mut self, name: &str, value: ExprValue) -> Self {
        self.signals.insert(name.to_string(), value);
        self
    }

    pub fn with_data_length(mut self, name: &str, length: usize) -> Self {
        self.data_lengths.insert(name.to_string(), length);
        self
    }

    pub fn with_bandwidth(mut self, scale: &str, bandwidth: f64) -> Self {
        self.bandwidths.insert(scale.to_string(), bandwidth);
        self
    }
}

impl EvalContext for StaticContext {
    fn signal(&self, name: &str) -> Option<ExprValue> {
        self.signals.get(name).cloned()
    }

    fn data_length(&self, name: &str) -> Option<usize> {
        self.data_lengths.get(name).copied()
    }

    fn bandwidth(&self, scale: &str) -> Option<f64> {
        self.bandwidths.get(scale).copied()
    }
}

pub fn evaluate(expr: &Expression, ctx: &dyn EvalContext) -> Result<ExprValue> {
    Ok(match expr {
        Expression::Literal(literal) => match literal {
            Literal::Null => ExprValue::Null,
            Literal::Bool(v) => ExprValue::Bool(*v),
            Literal::Number(v) => ExprValue::Number(*v),
            Literal::String(v) => ExprValue::String(v.clone()),
        },
        Expression::Identifier(name) => match name.as_str() {
            "PI" => ExprValue::Number(std::f64::consts::PI),
            "E" => ExprValue::Number(std::f64::consts::E),
            "NaN" => ExprValue::Number(f64::NAN),
            "Infinity" => ExprValue::Number(f64::INFINITY),
            "undefined" => ExprValue::Null,
            _ => ctx.signal(name).ok_or_else(|| {
                SandDanceError::evaluation(&format!("Unknown identifier: {}", name))
            })?,
        },
        Expression::Unary { op, argument } => {
            let value = evaluate(argument, ctx)?;
            match op {
                UnaryOperator::Pos => ExprValue::Number(value.to_number()),
                UnaryOperator::Neg => ExprValue::Number(-value.to_number()),
                UnaryOperator::Not => ExprValue::Bool(!value.truthy()),
            }
        }
        Expression::Binary { left, op, right } => {
            let lhs = evaluate(left, ctx)?;
            let rhs = evaluate(right, ctx)?;
            eval_binary(*op, &lhs, &rhs)
        }
        Expression::Logical { left, op, right } => {
            let lhs = evaluate(left, ctx)?;
            match (op, lhs.truthy()) {
                (LogicalOperator::And, false) | (LogicalOperator::Or, true) => lhs,
                _ => evaluate(right, ctx)?,
            }
        }
        Expression::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if evaluate(test, ctx)?.truthy() {
                evaluate(consequent, ctx)?
            } else {
                evaluate(alternate, ctx)?
            }
        }
        Expression::Member { object, property } => {
            let object = evaluate(object, ctx)?;
            let key = match property {
                MemberProperty::Static(name) => ExprValue::String(name.clone()),
                MemberProperty::Computed(expr) => evaluate(expr, ctx)?,
            };
            eval_member(&object, &key)
        }
        Expression::Call { callee, arguments } => {
            let args = arguments
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<Vec<_>>>()?;
            eval_call(callee, &args, ctx)
                .with_context(|| format!("Failed to evaluate call to {}", callee))?
        }
        Expression::Array(elements) => ExprValue::Array(
            elements
                .iter()
                .map(|el| evaluate(el, ctx))
                .collect::<Result<Vec<_>>>()?,
        ),
        Expression::Object(properties) => {
            let mut map = IndexMap::new();
            for (key, value) in properties {
                map.insert(key.clone(), evaluate(value, ctx)?);
            }
            ExprValue::Object(map)
        }
    })
}

fn eval_binary(op: BinaryOperator, lhs: &ExprValue, rhs: &ExprValue) -> ExprValue {
    use BinaryOperator::*;
    match op {
        Plus => match (lhs, rhs) {
            (ExprValue::String(_), _) | (_, ExprValue::String(_)) => {
                ExprValue::String(lhs.display_string() + &rhs.display_string())
            }
            _ => ExprValue::Number(lhs.to_number() + rhs.to_number()),
        },
        Minus => ExprValue::Number(lhs.to_number() - rhs.to_number()),
        Mult => ExprValue::Number(lhs.to_number() * rhs.to_number()),
        Div => ExprValue::Number(lhs.to_number() / rhs.to_number()),
        Mod => ExprValue::Number(lhs.to_number() % rhs.to_number()),
        LessThan | LessThanEqual | GreaterThan | GreaterThanEqual => {
            let ordering = match (lhs, rhs) {
                (ExprValue::String(a), ExprValue::String(b)) => a.partial_cmp(b),
                _ => lhs.to_number().partial_cmp(&rhs.to_number()),
            };
            let result = match ordering {
                None => false,
                Some(ordering) => match op {
                    LessThan => ordering.is_lt(),
                    LessThanEqual => ordering.is_le(),
                    GreaterThan => ordering.is_gt(),
                    _ => ordering.is_ge(),
                },
            };
            ExprValue::Bool(result)
        }
        Equals => ExprValue::Bool(loose_equals(lhs, rhs)),
        NotEquals => ExprValue::Bool(!loose_equals(lhs, rhs)),
        StrictEquals => ExprValue::Bool(strict_equals(lhs, rhs)),
        NotStrictEquals => ExprValue::Bool(!strict_equals(lhs, rhs)),
    }
}

fn strict_equals(lhs: &ExprValue, rhs: &ExprValue) -> bool {
    match (lhs, rhs) {
        // NaN is never equal to itself
        (ExprValue::Number(a), ExprValue::Number(b)) => a == b,
        _ => lhs == rhs,
    }
}

fn loose_equals(lhs: &ExprValue, rhs: &ExprValue) -> bool {
    match (lhs, rhs) {
        (ExprValue::Null, ExprValue::Null) => true,
        (ExprValue::Null, _) | (_, ExprValue::Null) => false,
        (ExprValue::String(a), ExprValue::String(b)) => a == b,
        (ExprValue::Number(_), _)
        | (_, ExprValue::Number(_))
        | (ExprValue::Bool(_), _)
        | (_, ExprValue::Bool(_)) => lhs.to_number() == rhs.to_number(),
        _ => lhs == rhs,
    }
}

fn eval_member(object: &ExprValue, key: &ExprValue) -> ExprValue {
    match (object, key) {
        (ExprValue::Array(items), ExprValue::String(name)) if name == "length" => {
            ExprValue::Number(items.len() as f64)
        }
        (ExprValue::String(s), ExprValue::String(name)) if name == "length" => {
            ExprValue::Number(s.chars().count() as f64)
        }
        (ExprValue::Array(items), ExprValue::Number(index)) => {
            if *index >= 0.0 && index.fract() == 0.0 {
                items.get(*index as usize).cloned().unwrap_or(ExprValue::Null)
            } else {
                ExprValue::Null
            }
        }
        (ExprValue::Object(map), key) => map
            .get(&key.display_string())
            .cloned()
            .unwrap_or(ExprValue::Null),
        _ => ExprValue::Null,
    }
}

fn numeric_arg(args: &[ExprValue], index: usize) -> f64 {
    args.get(index).map(|v| v.to_number()).unwrap_or(f64::NAN)
}

fn string_arg(args: &[ExprValue], index: usize) -> Result<String> {
    match args.get(index) {
        Some(ExprValue::String(s)) => Ok(s.clone()),
        other => Err(SandDanceError::evaluation(&format!(
            "Expected string argument at position {}, received {:?}",
            index, other
        ))),
    }
}

fn eval_call(callee: &str, args: &[ExprValue], ctx: &dyn EvalContext) -> Result<ExprValue> {
    let unary = |f: fn(f64) -> f64| ExprValue::Number(f(numeric_arg(args, 0)));
    Ok(match callee {
        "min" => ExprValue::Number(fold_numbers(args, f64::INFINITY, f64::min)),
        "max" => ExprValue::Number(fold_numbers(args, f64::NEG_INFINITY, f64::max)),
        "ceil" => unary(f64::ceil),
        "floor" => unary(f64::floor),
        "round" => unary(|v| (v + 0.5).floor()),
        "sqrt" => unary(f64::sqrt),
        "abs" => unary(f64::abs),
        "log" => unary(f64::ln),
        "exp" => unary(f64::exp),
        "pow" => ExprValue::Number(numeric_arg(args, 0).powf(numeric_arg(args, 1))),
        "isFinite" => ExprValue::Bool(numeric_arg(args, 0).is_finite()),
        "isValid" => ExprValue::Bool(match args.first() {
            None | Some(ExprValue::Null) => false,
            Some(ExprValue::Number(v)) => !v.is_nan(),
            Some(_) => true,
        }),
        "if" => {
            let test = args.first().map(|v| v.truthy()).unwrap_or(false);
            let index = if test { 1 } else { 2 };
            args.get(index).cloned().unwrap_or(ExprValue::Null)
        }
        "length" => match args.first() {
            Some(ExprValue::Array(items)) => ExprValue::Number(items.len() as f64),
            Some(ExprValue::String(s)) => ExprValue::Number(s.chars().count() as f64),
            _ => ExprValue::Number(0.0),
        },
        "data" => {
            let name = string_arg(args, 0)?;
            let length = ctx
                .data_length(&name)
                .with_context(|| format!("No row count available for data {}", name))?;
            ExprValue::Array(vec![ExprValue::Object(IndexMap::new()); length])
        }
        "bandwidth" => {
            let scale = string_arg(args, 0)?;
            let bandwidth = ctx
                .bandwidth(&scale)
                .with_context(|| format!("No band width available for scale {}", scale))?;
            ExprValue::Number(bandwidth)
        }
        _ => {
            return Err(SandDanceError::evaluation(&format!(
                "Unsupported function: {}",
                callee
            )))
        }
    })
}

/// JavaScript Math.min/Math.max semantics: any NaN argument yields NaN
fn fold_numbers(args: &[ExprValue], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for arg in args {
        let v = arg.to_number();
        if v.is_nan() {
            return f64::NAN;
        }
        acc = f(acc, v);
    }
    acc
}

/// Signals evaluated so far, layered over a host context
struct SignalScope<'a> {
    values: IndexMap<String, ExprValue>,
    host: &'a dyn EvalContext,
}

impl<'a> EvalContext for SignalScope<'a> {
    fn signal(&self, name: &str) -> Option<ExprValue> {
        self.values
            .get(name)
            .cloned()
            .or_else(|| self.host.signal(name))
    }

    fn data_length(&self, name: &str) -> Option<usize> {
        self.host.data_length(name)
    }

    fn bandwidth(&self, scale: &str) -> Option<f64> {
        self.host.bandwidth(scale)
    }
}

impl<'a> SignalScope<'a> {
    fn evaluate_signal(&mut self, signal: &SignalSpec) -> Result<()> {
        // Host values win so callers can pin data-dependent signals
        let value = if let Some(value) = self.host.signal(&signal.name) {
            value
        } else if let Some(expr) = signal.update.as_ref().or(signal.init.as_ref()) {
            let parsed = parse(expr)?;
            evaluate(&parsed, &*self)
                .with_context(|| format!("Failed to evaluate signal {}", signal.name))?
        } else if let Some(value) = &signal.value {
            ExprValue::from(value)
        } else {
            ExprValue::Null
        };
        self.values.insert(signal.name.clone(), value);
        Ok(())
    }

    /// Evaluate one scope's signals, deferring any that read a signal defined later
    fn evaluate_all(&mut self, signals: &[SignalSpec]) -> Result<()> {
        let mut pending: Vec<&SignalSpec> = signals.iter().collect();
        while !pending.is_empty() {
            let mut deferred = Vec::new();
            let mut last_error = None;
            for signal in &pending {
                if let Err(err) = self.evaluate_signal(signal) {
                    deferred.push(*signal);
                    last_error = Some(err);
                }
            }
            if deferred.len() == pending.len() {
                if let Some(err) = last_error {
                    return Err(err);
                }
            }
            pending = deferred;
        }
        Ok(())
    }
}

/// Evaluate the signals of every scope from the root down to `path`
pub fn evaluate_signals(
    chart: &ChartSpec,
    path: &[u32],
    host: &dyn EvalContext,
) -> Result<IndexMap<String, ExprValue>> {
    let mut scope = SignalScope {
        values: IndexMap::new(),
        host,
    };
    scope.evaluate_all(&chart.signals)?;
    for depth in 1..=path.len() {
        let group = chart.get_nested_group(&path[..depth])?;
        scope.evaluate_all(&group.signals)?;
    }
    Ok(scope.values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval_str(src: &str, ctx: &dyn EvalContext) -> ExprValue {
        evaluate(&parse(src).unwrap(), ctx).unwrap()
    }

    #[test]
    fn test_arithmetic_and_functions() {
        let ctx = StaticContext::new().with_signal("n", ExprValue::Number(10.0));
        assert_eq!(eval_str("ceil(sqrt(n * 1.6))", &ctx), ExprValue::Number(4.0));
        assert_eq!(eval_str("max(1, min(n, 3))", &ctx), ExprValue::Number(3.0));
        assert_eq!(eval_str("n > 0 ? n / 4 : 0", &ctx), ExprValue::Number(2.5));
        assert_eq!(eval_str("'a' + 1", &ctx), ExprValue::String("a1".to_string()));
        assert_eq!(eval_str("round(2.5)", &ctx), ExprValue::Number(3.0));
    }

    #[test]
    fn test_logical_short_circuit() {
        let ctx = StaticContext::new();
        // `missing` would fail to resolve if the right side were evaluated
        assert_eq!(eval_str("false && missing", &ctx), ExprValue::Bool(false));
        assert_eq!(eval_str("1 || missing", &ctx), ExprValue::Number(1.0));
        assert!(evaluate(&parse("missing").unwrap(), &ctx).is_err());
    }

    #[test]
    fn test_host_data_and_bandwidth() {
        let ctx = StaticContext::new()
            .with_data_length("bins", 7)
            .with_bandwidth("scale_x", 12.5);
        assert_eq!(
            eval_str("length(data('bins')) + data('bins').length", &ctx),
            ExprValue::Number(14.0)
        );
        assert_eq!(eval_str("bandwidth('scale_x')", &ctx), ExprValue::Number(12.5));
        assert_eq!(eval_str("isValid(null)", &ctx), ExprValue::Bool(false));
    }

    #[test]
    fn test_evaluate_signals_in_order() {
        let mut chart = ChartSpec::default();
        chart.signals.push(SignalSpec::value("a", json!(3)));
        chart.signals.push(SignalSpec::update("b", "a * 2"));
        let path = chart
            .add_nested_mark(&[], crate::spec::mark::MarkSpec::unnamed("group"))
            .unwrap()
            .unwrap();
        chart
            .add_nested_signal(&path, SignalSpec::update("c", "b + pinned"), None)
            .unwrap();

        let host = StaticContext::new().with_signal("pinned", ExprValue::Number(1.0));
        let values = evaluate_signals(&chart, &path, &host).unwrap();
        assert_eq!(values.get("b"), Some(&ExprValue::Number(6.0)));
        assert_eq!(values.get("c"), Some(&ExprValue::Number(7.0)));
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut chart = ChartSpec::default();
        chart.signals.push(SignalSpec::update("out", "max(100, cell * 4)"));
        chart.signals.push(SignalSpec::update("cell", "30"));
        chart.signals.push(SignalSpec::update("broken", "missing + 1"));
        assert!(evaluate_signals(&chart, &[], &StaticContext::new()).is_err());

        chart.signals.pop();
        let values = evaluate_signals(&chart, &[], &StaticContext::new()).unwrap();
        assert_eq!(values.get("out"), Some(&ExprValue::Number(120.0)));
    }
}
