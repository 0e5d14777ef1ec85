use crate::spec::transform::TransformSpecTrait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterTransformSpec {
    pub expr: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for FilterTransformSpec {
    fn expressions(&self) -> Vec<String> {
        vec![self.expr.clone()]
    }
}
