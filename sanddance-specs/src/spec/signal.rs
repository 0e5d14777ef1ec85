use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<SignalBindSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignalSpec {
    pub fn update<S: Into<String>, T: Into<String>>(name: S, update: T) -> Self {
        Self {
            name: name.into(),
            init: None,
            update: Some(update.into()),
            value: None,
            bind: None,
            extra: Default::default(),
        }
    }

    pub fn value<S: Into<String>>(name: S, value: Value) -> Self {
        Self {
            name: name.into(),
            init: None,
            update: None,
            value: Some(value),
            bind: None,
            extra: Default::default(),
        }
    }

    pub fn with_bind(mut self, bind: SignalBindSpec) -> Self {
        self.bind = Some(bind);
        self
    }

    /// Wrap the current update expression in a binary function call, e.g. `max(current, expr)`
    pub fn modify(&mut self, func: &str, expr: &str) {
        let current = self
            .update
            .clone()
            .or_else(|| self.value.as_ref().map(|v| v.to_string()))
            .unwrap_or_else(|| "0".to_string());
        self.update = Some(format!("{func}({current}, {expr})"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindInput {
    Range,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBindSpec {
    pub input: BindInput,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
}

impl SignalBindSpec {
    pub fn range(name: &str, min: f64, max: f64, step: f64) -> Self {
        Self {
            input: BindInput::Range,
            name: Some(name.to_string()),
            debounce: Some(50.0),
            min: Some(min),
            max: Some(max),
            step: Some(step),
            options: None,
        }
    }

    pub fn select(name: &str, options: Vec<Value>) -> Self {
        Self {
            input: BindInput::Select,
            name: Some(name.to_string()),
            debounce: None,
            min: None,
            max: None,
            step: None,
            options: Some(options),
        }
    }

    pub fn checkbox(name: &str) -> Self {
        Self {
            input: BindInput::Checkbox,
            name: Some(name.to_string()),
            debounce: None,
            min: None,
            max: None,
            step: None,
            options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_wraps_update() {
        let mut signal = SignalSpec::update("PlotWidthOut", "PlotWidthIn");
        signal.modify("max", "bar_0_minsize");
        assert_eq!(signal.update.as_deref(), Some("max(PlotWidthIn, bar_0_minsize)"));
    }

    #[test]
    fn test_bind_serializes_without_empty_fields() {
        let signal = SignalSpec::value("Chart_ZGroundedSignal", Value::Bool(false))
            .with_bind(SignalBindSpec::checkbox("Z grounded"));
        let json = serde_json::to_string(&signal).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Chart_ZGroundedSignal","value":false,"bind":{"input":"checkbox","name":"Z grounded"}}"#
        );
    }
}
