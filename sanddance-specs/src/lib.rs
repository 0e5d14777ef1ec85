#[macro_use]
extern crate lazy_static;

pub mod axes;
pub mod bin;
pub mod builder;
pub mod capabilities;
pub mod charts;
pub mod color;
pub mod columns;
pub mod constants;
pub mod defaults;
pub mod expression;
pub mod facet_layout;
pub mod facet_title;
pub mod layouts;
pub mod ordinal;
pub mod scales;
pub mod scope;
pub mod selection;
pub mod signals;
pub mod spec;
pub mod types;
pub mod zbase;

pub use builder::{SpecBuilder, SpecBuilderProps, SpecResult};

use crate::types::{Insight, SpecColumns, SpecContext, SpecViewOptions};

/// Compile an insight into a Vega document, or the reasons it cannot be drawn
pub fn create(insight: &Insight, spec_columns: &SpecColumns, options: &SpecViewOptions) -> SpecResult {
    let context = SpecContext {
        insight,
        spec_columns,
        spec_view_options: options,
    };
    let props = charts::factory(insight.chart)(&context);
    SpecBuilder::new(props, context).build()
}
