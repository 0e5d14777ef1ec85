//! Chart registry: each chart type supplies its layout pipeline, axes and role capabilities

pub mod barchart_h;
pub mod barchart_v;
pub mod density;
pub mod scatterplot;
pub mod stacks;
pub mod strips;
pub mod treemap;

use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecRoleCapabilities};
use crate::layouts::square::{FillDirection, Square};
use crate::layouts::strip::Strip;
use crate::layouts::treemap::{Corner, Treemap};
use crate::layouts::{LayoutPair, Orientation};
use crate::types::{Chart, SpecContext, TotalStyle};

pub type SpecBuilderFactory = fn(&SpecContext) -> SpecBuilderProps;

pub fn factory(chart: Chart) -> SpecBuilderFactory {
    match chart {
        Chart::Barchart | Chart::BarchartV => barchart_v::props,
        Chart::BarchartH => barchart_h::props,
        Chart::Density => density::props,
        Chart::Scatterplot => scatterplot::props,
        Chart::Stacks => stacks::props,
        Chart::Strips => strips::props,
        Chart::Treemap => treemap::props,
    }
}

/// Roles every chart may leave unassigned
fn optional_roles(roles: &[Role]) -> impl Iterator<Item = SpecRoleCapabilities> + '_ {
    roles.iter().map(|r| SpecRoleCapabilities::optional(*r))
}

/// The size role weights units only for sum styles, where it must be quantitative
fn size_role(total_style: TotalStyle) -> SpecRoleCapabilities {
    if total_style.is_sum() {
        SpecRoleCapabilities::required(Role::Size).quantitative()
    } else {
        SpecRoleCapabilities::optional(Role::Size).quantitative()
    }
}

/// Units drawn inside each bucket of a footprint layout
///
/// Percent strips are handled by the caller, which also swaps the footprint for a slice.
fn unit_layout(
    context: &SpecContext,
    total_style: TotalStyle,
    fill_direction: FillDirection,
    orientation: Orientation,
    corner: Corner,
) -> LayoutPair {
    let columns = context.spec_columns;
    match total_style {
        TotalStyle::CountSquare => LayoutPair::Square(Square {
            sort_by: columns.sort.clone(),
            fill_direction,
            ..Default::default()
        }),
        TotalStyle::CountStrip => LayoutPair::Strip(Strip {
            orientation,
            size: None,
            sort: columns.sort.clone(),
            add_percentage_scale: false,
        }),
        TotalStyle::SumStrip | TotalStyle::SumStripPercent => LayoutPair::Strip(Strip {
            orientation,
            size: columns.size.clone(),
            sort: columns.sort.clone(),
            add_percentage_scale: total_style == TotalStyle::SumStripPercent,
        }),
        TotalStyle::SumTreemap => LayoutPair::Treemap(Treemap {
            corner,
            size: columns.size.clone(),
            group_by: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Insight, InsightColumns, SpecColumns, SpecViewOptions};

    #[test]
    fn test_barchart_is_vertical() {
        let insight = Insight::new(Chart::Barchart, InsightColumns::default());
        let columns = SpecColumns::default();
        let options = SpecViewOptions::default();
        let context = SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        };
        assert_eq!(
            factory(Chart::Barchart)(&context),
            factory(Chart::BarchartV)(&context)
        );
    }

    #[test]
    fn test_size_role_by_total_style() {
        let count = size_role(TotalStyle::CountSquare);
        assert!(count.allow_none);
        let sum = size_role(TotalStyle::SumTreemap);
        assert!(!sum.allow_none && sum.exclude_categoric);
    }
}
