use crate::spec::transform::TransformSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            source: None,
            values: None,
            transform: Vec::new(),
            extra: Default::default(),
        }
    }

    pub fn from_source<S: Into<String>, T: Into<String>>(name: S, source: T) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(name)
        }
    }

    pub fn with_transforms(mut self, transforms: Vec<TransformSpec>) -> Self {
        self.transform.extend(transforms);
        self
    }

    pub fn output_signals(&self) -> Vec<String> {
        self.transform
            .iter()
            .flat_map(|tx| tx.output_signals())
            .collect()
    }
}
