use crate::spec::transform::TransformSpecTrait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaTransformSpec {
    pub expr: String,

    #[serde(rename = "as")]
    pub as_: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for FormulaTransformSpec {
    fn expressions(&self) -> Vec<String> {
        vec![self.expr.clone()]
    }
}
