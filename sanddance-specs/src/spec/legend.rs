use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
