use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::NumberOrSignalSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTransformSpec {
    pub start: NumberOrSignalSpec,
    pub stop: NumberOrSignalSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<NumberOrSignalSpec>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for SequenceTransformSpec {
    fn expressions(&self) -> Vec<String> {
        [Some(&self.start), Some(&self.stop), self.step.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|v| v.signal_expr().map(String::from))
            .collect()
    }
}
