use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::CompareSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectTransformSpec {
    pub sort: CompareSpec,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for CollectTransformSpec {}
