use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{CompareSpec, Field, NumberOrSignalSpec, StringOrSignalSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapTransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CompareSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<StringOrSignalSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[NumberOrSignalSpec; 2]>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for TreemapTransformSpec {
    fn expressions(&self) -> Vec<String> {
        let mut exprs = Vec::new();
        if let Some(StringOrSignalSpec::Signal(method)) = &self.method {
            exprs.push(method.signal.clone());
        }
        if let Some(size) = &self.size {
            exprs.extend(size.iter().filter_map(|v| v.signal_expr().map(String::from)));
        }
        exprs
    }
}
