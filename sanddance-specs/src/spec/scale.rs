use crate::spec::values::{
    NumberOrSignalSpec, SignalExpressionSpec, StringOrSignalSpec, ValueOrSignalSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub name: String,

    #[serde(rename = "type", default)]
    pub type_: ScaleTypeSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<ScaleDomainSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ScaleRangeSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<ValueOrSignalSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleTypeSpec {
    #[default]
    Linear,
    Band,
    Point,
    Ordinal,
    Quantize,
    Quantile,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleDomainSpec {
    Array(Vec<ScaleArrayElementSpec>),
    FieldReference(ScaleFieldReferenceSpec),
    Signal(SignalExpressionSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleRangeSpec {
    Array(Vec<ScaleArrayElementSpec>),
    Reference(ScaleFieldReferenceSpec),
    Scheme(ScaleSchemeSpec),
    Signal(SignalExpressionSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleFieldReferenceSpec {
    pub data: String,
    pub field: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScaleFieldReferenceSpec {
    pub fn new(data: &str, field: &str) -> Self {
        Self {
            data: data.to_string(),
            field: field.to_string(),
            sort: None,
            extra: Default::default(),
        }
    }

    pub fn sorted(data: &str, field: &str) -> Self {
        Self {
            sort: Some(true),
            ..Self::new(data, field)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSchemeSpec {
    pub scheme: StringOrSignalSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<NumberOrSignalSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleArrayElementSpec {
    Signal(SignalExpressionSpec),
    Value(Value),
}

impl ScaleArrayElementSpec {
    pub fn signal<S: Into<String>>(signal: S) -> Self {
        Self::Signal(SignalExpressionSpec::new(signal))
    }

    pub fn number(v: f64) -> Self {
        Self::Value(Value::from(v))
    }
}

impl ScaleSpec {
    pub fn new<S: Into<String>>(name: S, type_: ScaleTypeSpec) -> Self {
        Self {
            name: name.into(),
            type_,
            domain: None,
            range: None,
            reverse: None,
            padding: None,
            round: None,
            nice: None,
            zero: None,
            extra: Default::default(),
        }
    }

    /// Names of datasets referenced by the domain and range
    pub fn data_references(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(ScaleDomainSpec::FieldReference(reference)) = &self.domain {
            names.push(reference.data.clone());
        }
        if let Some(ScaleRangeSpec::Reference(reference)) = &self.range {
            names.push(reference.data.clone());
        }
        names
    }

    /// Expression strings embedded in the domain, range and reverse properties
    pub fn expressions(&self) -> Vec<String> {
        let mut exprs = Vec::new();
        match &self.domain {
            Some(ScaleDomainSpec::Array(elements)) => exprs.extend(element_signals(elements)),
            Some(ScaleDomainSpec::Signal(s)) => exprs.push(s.signal.clone()),
            _ => {}
        }
        match &self.range {
            Some(ScaleRangeSpec::Array(elements)) => exprs.extend(element_signals(elements)),
            Some(ScaleRangeSpec::Signal(s)) => exprs.push(s.signal.clone()),
            Some(ScaleRangeSpec::Scheme(scheme)) => {
                if let Some(NumberOrSignalSpec::Signal(count)) = &scheme.count {
                    exprs.push(count.signal.clone());
                }
            }
            _ => {}
        }
        if let Some(ValueOrSignalSpec::Signal(s)) = &self.reverse {
            exprs.push(s.signal.clone());
        }
        exprs
    }
}

fn element_signals(elements: &[ScaleArrayElementSpec]) -> Vec<String> {
    elements
        .iter()
        .filter_map(|el| match el {
            ScaleArrayElementSpec::Signal(s) => Some(s.signal.clone()),
            ScaleArrayElementSpec::Value(_) => None,
        })
        .collect()
}
