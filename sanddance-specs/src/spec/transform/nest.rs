use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestTransformSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for NestTransformSpec {}
