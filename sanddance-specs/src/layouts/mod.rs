pub mod bar;
pub mod cross;
pub mod density;
pub mod scatter;
pub mod slice;
pub mod square;
pub mod stack;
pub mod strip;
pub mod treemap;
pub mod wrap;

use crate::axes::AxisScales;
use crate::layouts::bar::Bar;
use crate::layouts::cross::Cross;
use crate::layouts::density::Density;
use crate::layouts::scatter::Scatter;
use crate::layouts::slice::Slice;
use crate::layouts::square::Square;
use crate::layouts::stack::Stack;
use crate::layouts::strip::Strip;
use crate::layouts::treemap::Treemap;
use crate::layouts::wrap::Wrap;
use crate::scope::{GlobalScope, InnerScope, LayoutOutput};
use crate::types::SpecContext;
use sanddance_common::error::Result;
use std::ops::Deref;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Orientation::Horizontal)
    }
}

/// Everything a layout reads while building, besides its own properties
#[derive(Clone, Copy)]
pub struct LayoutBuildContext<'a> {
    /// Position in the pipeline, used to prefix every emitted name
    pub id: usize,
    pub spec_context: SpecContext<'a>,
    pub global_scope: &'a GlobalScope,
    pub parent_scope: &'a InnerScope,
    pub axis_scales: Option<&'a AxisScales>,

    /// Fields each earlier layout partitioned on, outermost first
    pub groupings: &'a [Vec<String>],
}

impl<'a> LayoutBuildContext<'a> {
    pub fn ancestor_fields(&self) -> Vec<String> {
        self.groupings.iter().flatten().cloned().collect()
    }
}

pub trait Layout {
    /// Name used in diagnostics
    fn kind(&self) -> &'static str;

    /// Produce the definitions this layout contributes and the scope the next layout draws in
    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput>;

    /// Unescaped fields this layout partitions rows by, if any
    fn grouping(&self, _context: &LayoutBuildContext) -> Option<Vec<String>> {
        None
    }
}

/// A layout strategy with its properties, chosen by a chart
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutPair {
    Bar(Bar),
    Cross(Cross),
    Density(Density),
    Scatter(Scatter),
    Slice(Slice),
    Square(Square),
    Stack(Stack),
    Strip(Strip),
    Treemap(Treemap),
    Wrap(Wrap),
}

impl Deref for LayoutPair {
    type Target = dyn Layout;

    fn deref(&self) -> &Self::Target {
        match self {
            LayoutPair::Bar(l) => l,
            LayoutPair::Cross(l) => l,
            LayoutPair::Density(l) => l,
            LayoutPair::Scatter(l) => l,
            LayoutPair::Slice(l) => l,
            LayoutPair::Square(l) => l,
            LayoutPair::Stack(l) => l,
            LayoutPair::Strip(l) => l,
            LayoutPair::Treemap(l) => l,
            LayoutPair::Wrap(l) => l,
        }
    }
}
