use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTransformSpec {
    pub from: String,

    pub key: Field,

    pub fields: Vec<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Field>>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransformSpecTrait for LookupTransformSpec {
    fn input_data(&self) -> Vec<String> {
        vec![self.from.clone()]
    }
}
