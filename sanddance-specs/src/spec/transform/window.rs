use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{CompareSpec, Field};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CompareSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<Field>>,

    pub ops: Vec<WindowOpSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Option<Field>>>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<Option<String>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowOpSpec {
    RowNumber,
    Rank,
    DenseRank,
    Count,
    Sum,
}

impl WindowTransformSpec {
    /// Number rows 1..n in their current order
    pub fn row_number<S: Into<String>>(as_: S) -> Self {
        Self {
            sort: None,
            groupby: None,
            ops: vec![WindowOpSpec::RowNumber],
            fields: None,
            as_: Some(vec![Some(as_.into())]),
            extra: Default::default(),
        }
    }
}

impl TransformSpecTrait for WindowTransformSpec {}
