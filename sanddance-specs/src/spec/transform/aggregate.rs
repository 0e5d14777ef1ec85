use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTransformSpec {
    pub groupby: Vec<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Option<Field>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops: Option<Vec<AggregateOpSpec>>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<Option<String>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOpSpec {
    Count,
    Valid,
    Distinct,
    Sum,
    Mean,
    Min,
    Max,
}

impl AggregateOpSpec {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOpSpec::Count => "count",
            AggregateOpSpec::Valid => "valid",
            AggregateOpSpec::Distinct => "distinct",
            AggregateOpSpec::Sum => "sum",
            AggregateOpSpec::Mean => "mean",
            AggregateOpSpec::Min => "min",
            AggregateOpSpec::Max => "max",
        }
    }
}

impl AggregateTransformSpec {
    /// Single-op aggregation grouped by the given fields
    pub fn single(
        groupby: Vec<Field>,
        op: AggregateOpSpec,
        field: Option<Field>,
        as_: &str,
    ) -> Self {
        Self {
            groupby,
            fields: Some(vec![field]),
            ops: Some(vec![op]),
            as_: Some(vec![Some(as_.to_string())]),
            extra: Default::default(),
        }
    }
}

impl TransformSpecTrait for AggregateTransformSpec {}
