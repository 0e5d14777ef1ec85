use crate::axes::{AxisAggregate, AxisScale, AxisScales};
use crate::bin::DiscreteColumn;
use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::{optional_roles, size_role, unit_layout};
use crate::constants::signal_names;
use crate::defaults::MIN_BAR_BAND_WIDTH;
use crate::layouts::bar::Bar;
use crate::layouts::slice::Slice;
use crate::layouts::square::FillDirection;
use crate::layouts::treemap::Corner;
use crate::layouts::{LayoutPair, Orientation};
use crate::types::{SpecContext, TotalStyle};

/// Columns of units rising from the x axis, one column per x bucket
pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let total_style = context.insight.total_style();
    let aggregate = match total_style {
        TotalStyle::CountSquare | TotalStyle::CountStrip => AxisAggregate::Count,
        TotalStyle::SumStrip | TotalStyle::SumTreemap => AxisAggregate::Sum,
        TotalStyle::SumStripPercent => AxisAggregate::Percent,
    };

    let mut layouts = Vec::new();
    if let Some(x) = &columns.x {
        let groupby = DiscreteColumn::new(
            x,
            signal_names::X_BINS,
            &context.spec_view_options.language.x_max_bins,
        );
        let footprint = if total_style == TotalStyle::SumStripPercent {
            LayoutPair::Slice(Slice {
                orientation: Orientation::Vertical,
                groupby,
            })
        } else {
            LayoutPair::Bar(Bar {
                orientation: Orientation::Vertical,
                groupby,
                sum_by: columns.size.clone().filter(|_| total_style.is_sum()),
                min_band_width: MIN_BAR_BAND_WIDTH,
            })
        };
        layouts.push(footprint);
        layouts.push(unit_layout(
            context,
            total_style,
            FillDirection::RightUp,
            Orientation::Vertical,
            Corner::BottomLeft,
        ));
    }

    let mut roles = vec![SpecRoleCapabilities::required(Role::X)
        .binned(columns.x.as_ref(), signal_names::X_BINS)];
    roles.extend(optional_roles(&[Role::Z, Role::Color, Role::Sort]));
    roles.push(size_role(total_style));
    roles.extend(optional_roles(&[Role::Facet, Role::FacetV]));

    SpecBuilderProps {
        axis_scales: Some(AxisScales {
            x: Some(AxisScale::titled(columns.x.as_ref())),
            y: Some(AxisScale::aggregate(aggregate)),
            z: Some(AxisScale::titled(columns.z.as_ref())),
        }),
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: Vec::new(),
        },
    }
}
