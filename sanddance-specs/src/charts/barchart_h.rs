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

/// Rows of units extending from the y axis, one row per y bucket
pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let total_style = context.insight.total_style();
    let aggregate = match total_style {
        TotalStyle::CountSquare | TotalStyle::CountStrip => AxisAggregate::Count,
        TotalStyle::SumStrip | TotalStyle::SumTreemap => AxisAggregate::Sum,
        TotalStyle::SumStripPercent => AxisAggregate::Percent,
    };

    let mut layouts = Vec::new();
    if let Some(y) = &columns.y {
        let groupby = DiscreteColumn::new(
            y,
            signal_names::Y_BINS,
            &context.spec_view_options.language.y_max_bins,
        );
        layouts.push(match total_style {
            TotalStyle::SumStripPercent => LayoutPair::Slice(Slice {
                orientation: Orientation::Horizontal,
                groupby,
            }),
            _ => LayoutPair::Bar(Bar {
                orientation: Orientation::Horizontal,
                groupby,
                sum_by: columns.size.clone().filter(|_| total_style.is_sum()),
                min_band_width: MIN_BAR_BAND_WIDTH,
            }),
        });
        layouts.push(unit_layout(
            context,
            total_style,
            FillDirection::DownRight,
            Orientation::Horizontal,
            Corner::TopLeft,
        ));
    }

    let mut roles = vec![SpecRoleCapabilities::required(Role::Y)
        .binned(columns.y.as_ref(), signal_names::Y_BINS)];
    roles.extend(optional_roles(&[Role::Z, Role::Color, Role::Sort]));
    roles.push(size_role(total_style));
    roles.extend(optional_roles(&[Role::Facet, Role::FacetV]));

    SpecBuilderProps {
        axis_scales: Some(AxisScales {
            x: Some(AxisScale::aggregate(aggregate)),
            y: Some(AxisScale::titled(columns.y.as_ref())),
            z: Some(AxisScale::titled(columns.z.as_ref())),
        }),
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts::square::Square;
    use crate::types::{Chart, Column, ColumnType, Insight, InsightColumns, SpecColumns, SpecViewOptions};

    #[test]
    fn test_horizontal_bars_fill_down() {
        let insight = Insight::new(Chart::BarchartH, InsightColumns::default());
        let columns = SpecColumns {
            y: Some(Column::new("region", ColumnType::String)),
            ..Default::default()
        };
        let options = SpecViewOptions::default();
        let props = props(&SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        });
        let LayoutPair::Bar(bar) = &props.layouts[0] else {
            panic!("expected a bar footprint");
        };
        assert!(bar.orientation.is_horizontal());
        assert_eq!(bar.groupby.maxbins_signal_name, signal_names::Y_BINS);
        assert!(matches!(
            &props.layouts[1],
            LayoutPair::Square(Square {
                fill_direction: FillDirection::DownRight,
                ..
            })
        ));
        assert_eq!(
            props.axis_scales.unwrap().x.unwrap().aggregate,
            Some(AxisAggregate::Count)
        );
        assert!(props.spec_capabilities.validate(&columns).is_empty());
    }
}
