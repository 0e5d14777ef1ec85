use crate::spec::axis::AxisSpec;
use crate::spec::chart::{ChartVisitor, MutChartVisitor};
use crate::spec::data::DataSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use crate::spec::transform::aggregate::AggregateOpSpec;
use indexmap::IndexMap;
use sanddance_common::error::{Result, ResultWithContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<MarkFromSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<MarkEncodeSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<ScaleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkSpec {
    pub fn new(type_: &str, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::unnamed(type_)
        }
    }

    pub fn unnamed(type_: &str) -> Self {
        Self {
            type_: type_.to_string(),
            name: None,
            style: None,
            from: None,
            encode: None,
            data: Vec::new(),
            signals: Vec::new(),
            scales: Vec::new(),
            axes: Vec::new(),
            marks: Vec::new(),
            extra: Default::default(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.type_ == "group"
    }

    pub fn with_from_data(mut self, data: &str) -> Self {
        self.from = Some(MarkFromSpec {
            data: Some(data.to_string()),
            facet: None,
        });
        self
    }

    pub fn with_facet(mut self, facet: MarkFacetSpec) -> Self {
        self.from = Some(MarkFromSpec {
            data: None,
            facet: Some(facet),
        });
        self
    }

    pub fn with_update(mut self, update: MarkEncodingsSpec) -> Self {
        self.encode = Some(MarkEncodeSpec::update(update));
        self
    }

    /// The `update` encoding set, if any
    pub fn update_mut(&mut self) -> Option<&mut MarkEncodingsSpec> {
        self.encode
            .as_mut()
            .and_then(|encode| encode.encodings.get_mut("update"))
    }

    pub fn walk(&self, visitor: &mut dyn ChartVisitor, scope: &[u32]) -> Result<()> {
        for data in &self.data {
            visitor.visit_data(data, scope)?;
        }
        for signal in &self.signals {
            visitor.visit_signal(signal, scope)?;
        }
        for scale in &self.scales {
            visitor.visit_scale(scale, scope)?;
        }
        for axis in &self.axes {
            visitor.visit_axis(axis, scope)?;
        }

        // Child groups
        let mut group_index = 0;
        for mark in &self.marks {
            if mark.is_group() {
                let mut nested_scope = Vec::from(scope);
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk(visitor, &nested_scope)?;
                group_index += 1;
            } else {
                visitor.visit_non_group_mark(mark, scope)?;
            }
        }

        Ok(())
    }

    pub fn walk_mut(&mut self, visitor: &mut dyn MutChartVisitor, scope: &[u32]) -> Result<()> {
        for data in &mut self.data {
            visitor.visit_data(data, scope)?;
        }
        for signal in &mut self.signals {
            visitor.visit_signal(signal, scope)?;
        }
        for scale in &mut self.scales {
            visitor.visit_scale(scale, scope)?;
        }
        for axis in &mut self.axes {
            visitor.visit_axis(axis, scope)?;
        }

        let mut group_index = 0;
        for mark in &mut self.marks {
            if mark.is_group() {
                let mut nested_scope = Vec::from(scope);
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk_mut(visitor, &nested_scope)?;
                group_index += 1;
            } else {
                visitor.visit_non_group_mark(mark, scope)?;
            }
        }

        Ok(())
    }

    pub fn get_group(&self, group_index: u32) -> Result<&MarkSpec> {
        self.marks
            .iter()
            .filter(|m| m.is_group())
            .nth(group_index as usize)
            .with_context(|| format!("No group with index {}", group_index))
    }

    pub fn get_group_mut(&mut self, group_index: u32) -> Result<&mut MarkSpec> {
        self.marks
            .iter_mut()
            .filter(|m| m.is_group())
            .nth(group_index as usize)
            .with_context(|| format!("No group with index {}", group_index))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFromSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<MarkFacetSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFacetSpec {
    pub name: String,
    pub data: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groupby: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<MarkFacetAggregateSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFacetAggregateSpec {
    pub fields: Vec<Option<String>>,
    pub ops: Vec<AggregateOpSpec>,

    #[serde(rename = "as")]
    pub as_: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarkEncodeSpec {
    // e.g. enter, update, hover, etc.
    #[serde(flatten)]
    pub encodings: IndexMap<String, MarkEncodingsSpec>,
}

impl MarkEncodeSpec {
    pub fn update(update: MarkEncodingsSpec) -> Self {
        let mut encodings = IndexMap::new();
        encodings.insert("update".to_string(), update);
        Self { encodings }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarkEncodingsSpec {
    // e.g. x, fill, width, etc.
    #[serde(flatten)]
    pub channels: IndexMap<String, MarkEncodingOrList>,
}

impl MarkEncodingsSpec {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builder-style channel insertion
    pub fn with<S: Into<String>>(mut self, channel: S, encoding: MarkEncodingSpec) -> Self {
        self.channels
            .insert(channel.into(), MarkEncodingOrList::Scalar(Box::new(encoding)));
        self
    }

    pub fn with_list<S: Into<String>>(mut self, channel: S, rules: Vec<MarkEncodingSpec>) -> Self {
        self.channels
            .insert(channel.into(), MarkEncodingOrList::List(rules));
        self
    }

    pub fn get(&self, channel: &str) -> Option<&MarkEncodingOrList> {
        self.channels.get(channel)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkEncodingOrList {
    List(Vec<MarkEncodingSpec>),
    Scalar(Box<MarkEncodingSpec>),
}

impl MarkEncodingOrList {
    pub fn to_vec(&self) -> Vec<MarkEncodingSpec> {
        match self {
            MarkEncodingOrList::List(m) => m.clone(),
            MarkEncodingOrList::Scalar(m) => vec![m.as_ref().clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarkEncodingSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Box<MarkEncodingSpec>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarkEncodingSpec {
    pub fn signal<S: Into<String>>(signal: S) -> Self {
        Self {
            signal: Some(signal.into()),
            ..Default::default()
        }
    }

    pub fn value<V: Into<Value>>(value: V) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn field<S: Into<String>>(field: S) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn scaled<S: Into<String>, T: Into<String>>(scale: S, field: T) -> Self {
        Self {
            scale: Some(scale.into()),
            field: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn with_test<S: Into<String>>(mut self, test: S) -> Self {
        self.test = Some(test.into());
        self
    }

    /// Scales referenced by this encoding, including its offset
    pub fn scale_references(&self) -> Vec<String> {
        let mut scales: Vec<String> = self.scale.clone().into_iter().collect();
        if let Some(offset) = &self.offset {
            scales.extend(offset.scale_references());
        }
        scales
    }

    /// Expression strings embedded in this encoding, including its offset
    pub fn expressions(&self) -> Vec<String> {
        let mut exprs: Vec<String> = self
            .test
            .iter()
            .chain(self.signal.iter())
            .cloned()
            .collect();
        if let Some(offset) = &self.offset {
            exprs.extend(offset.expressions());
        }
        exprs
    }
}
