use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{CompareSpec, Field};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackTransformSpec {
    pub field: Field,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<Field>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CompareSpec>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<StackOffsetSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StackTransformSpec {
    pub fn as_(&self) -> Vec<String> {
        self.as_
            .clone()
            .unwrap_or_else(|| vec!["y0".to_string(), "y1".to_string()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffsetSpec {
    Zero,
    Center,
    Normalize,
}

impl TransformSpecTrait for StackTransformSpec {}
