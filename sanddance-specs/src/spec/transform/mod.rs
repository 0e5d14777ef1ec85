pub mod aggregate;
pub mod bin;
pub mod collect;
pub mod extent;
pub mod filter;
pub mod formula;
pub mod lookup;
pub mod nest;
pub mod sequence;
pub mod stack;
pub mod treemap;
pub mod window;

use crate::spec::transform::aggregate::AggregateTransformSpec;
use crate::spec::transform::bin::BinTransformSpec;
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::extent::ExtentTransformSpec;
use crate::spec::transform::filter::FilterTransformSpec;
use crate::spec::transform::formula::FormulaTransformSpec;
use crate::spec::transform::lookup::LookupTransformSpec;
use crate::spec::transform::nest::NestTransformSpec;
use crate::spec::transform::sequence::SequenceTransformSpec;
use crate::spec::transform::stack::StackTransformSpec;
use crate::spec::transform::treemap::TreemapTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformSpec {
    Extent(ExtentTransformSpec),
    Filter(FilterTransformSpec),
    Formula(FormulaTransformSpec),
    Bin(Box<BinTransformSpec>), // Box since transform is much larger than others
    Aggregate(AggregateTransformSpec),
    Collect(CollectTransformSpec),
    Lookup(LookupTransformSpec),
    Nest(NestTransformSpec),
    Sequence(SequenceTransformSpec),
    Stack(StackTransformSpec),
    Treemap(TreemapTransformSpec),
    Window(WindowTransformSpec),
}

impl Deref for TransformSpec {
    type Target = dyn TransformSpecTrait;

    fn deref(&self) -> &Self::Target {
        match self {
            TransformSpec::Extent(t) => t,
            TransformSpec::Filter(t) => t,
            TransformSpec::Formula(t) => t,
            TransformSpec::Bin(t) => t.as_ref(),
            TransformSpec::Aggregate(t) => t,
            TransformSpec::Collect(t) => t,
            TransformSpec::Lookup(t) => t,
            TransformSpec::Nest(t) => t,
            TransformSpec::Sequence(t) => t,
            TransformSpec::Stack(t) => t,
            TransformSpec::Treemap(t) => t,
            TransformSpec::Window(t) => t,
        }
    }
}

pub trait TransformSpecTrait {
    /// Signals defined by this transform
    fn output_signals(&self) -> Vec<String> {
        Default::default()
    }

    /// Names of other datasets this transform reads from
    fn input_data(&self) -> Vec<String> {
        Default::default()
    }

    /// Expression strings evaluated by this transform
    fn expressions(&self) -> Vec<String> {
        Default::default()
    }
}

impl TransformSpec {
    pub fn filter<S: Into<String>>(expr: S) -> Self {
        TransformSpec::Filter(FilterTransformSpec {
            expr: expr.into(),
            extra: Default::default(),
        })
    }

    pub fn formula<S: Into<String>, T: Into<String>>(expr: S, as_: T) -> Self {
        TransformSpec::Formula(FormulaTransformSpec {
            expr: expr.into(),
            as_: as_.into(),
            extra: Default::default(),
        })
    }

    pub fn extent<S: Into<String>, T: Into<String>>(field: S, signal: T) -> Self {
        TransformSpec::Extent(ExtentTransformSpec {
            field: Field::String(field.into()),
            signal: Some(signal.into()),
            extra: Default::default(),
        })
    }
}
