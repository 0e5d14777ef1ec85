use crate::bin::{binnable, Binnable, DiscreteColumn};
use crate::layouts::{Layout, LayoutBuildContext};
use crate::scales::{band_scale, from_to_zero, zero_to};
use crate::scope::{
    ChildScopeSpec, GlobalScales, GroupedUnits, LayoutOutput, SizeSignals, SpecFragment,
};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkFacetSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, quote};

/// How units share a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DensityMode {
    /// Units pack the whole cell
    #[default]
    Pack,
    /// Units fill a square footprint, the floor of a cube
    Cube,
}

/// A grid of cells, one per pair of x and y buckets, packed edge to edge
#[derive(Debug, Clone, PartialEq)]
pub struct Density {
    pub groupby_x: DiscreteColumn,
    pub groupby_y: DiscreteColumn,
    pub mode: DensityMode,
}

impl Density {
    fn bins(&self, context: &LayoutBuildContext) -> (Binnable, Binnable) {
        let prefix = format!("density_{}", context.id);
        let data_name = &context.global_scope.data_name;
        (
            binnable(&format!("{prefix}_x"), data_name, &self.groupby_x),
            binnable(&format!("{prefix}_y"), data_name, &self.groupby_y),
        )
    }
}

impl Layout for Density {
    fn kind(&self) -> &'static str {
        "Density"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("density_{}", context.id);
        let facet_data = format!("facet_{prefix}");
        let count_data = format!("{prefix}_aggregate_count");
        let extent_signal = format!("{prefix}_count_extent");
        let max_signal = format!("{prefix}_count_max");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;
        let (bin_x, bin_y) = self.bins(context);

        let mut fragment = SpecFragment::default();
        for bin in [&bin_x, &bin_y].into_iter().filter(|b| !b.native) {
            fragment
                .global_transforms
                .push((global.data_name.clone(), bin.transforms.clone()));
            fragment.global.signals.extend(bin.maxbins_signal.clone());
            fragment.global.data.extend(bin.data_sequence.clone());
        }

        let groupby: Vec<String> = bin_x.field_refs().into_iter().chain(bin_y.field_refs()).collect();
        fragment.global.data.push(
            DataSpec::from_source(&count_data, &global.data_name).with_transforms(vec![
                TransformSpec::Aggregate(AggregateTransformSpec {
                    groupby: groupby.iter().cloned().map(Field::String).collect(),
                    fields: None,
                    ops: Some(vec![AggregateOpSpec::Count]),
                    as_: Some(vec![Some("count".to_string())]),
                    extra: Default::default(),
                }),
                TransformSpec::extent("count", &extent_signal),
            ]),
        );

        let scale_x = format!("{prefix}_scale_x");
        let scale_y = format!("{prefix}_scale_y");
        let bandwidth_x = format!("{prefix}_bandwidth_x");
        let bandwidth_y = format!("{prefix}_bandwidth_y");
        fragment.global.signals.extend([
            SignalSpec::update(&max_signal, format!("{extent_signal}[1]")),
            SignalSpec::update(&bandwidth_x, format!("bandwidth({})", quote(&scale_x))),
            SignalSpec::update(&bandwidth_y, format!("bandwidth({})", quote(&scale_y))),
        ]);
        let (cell_width, cell_height) = match self.mode {
            DensityMode::Pack => (bandwidth_x.clone(), bandwidth_y.clone()),
            DensityMode::Cube => {
                let cube_size = format!("{prefix}_cube_size");
                fragment.global.signals.push(SignalSpec::update(
                    &cube_size,
                    format!("min({bandwidth_x}, {bandwidth_y})"),
                ));
                (cube_size.clone(), cube_size)
            }
        };

        let scaled = |scale: &str, bin: &Binnable| {
            MarkEncodingSpec::signal(format!("scale({}, {})", quote(scale), datum_field(bin.field())))
        };
        let update = MarkEncodingsSpec::new()
            .with("x", scaled(&scale_x, &bin_x))
            .with("y", scaled(&scale_y, &bin_y))
            .with("height", MarkEncodingSpec::signal(&cell_height))
            .with("width", MarkEncodingSpec::signal(&cell_width));
        let mut mark = MarkSpec::new("group", &prefix)
            .with_facet(MarkFacetSpec {
                name: facet_data.clone(),
                data: parent.data_name.clone(),
                groupby,
                aggregate: None,
            })
            .with_update(update);
        mark.style = Some("cell".to_string());
        fragment.local.marks.push(mark);

        let mut x = band_scale(
            &scale_x,
            &bin_x.domain_data_name,
            bin_x.field(),
            zero_to(&size.layout_width),
        );
        let mut y = band_scale(
            &scale_y,
            &bin_y.domain_data_name,
            bin_y.field(),
            from_to_zero(&size.layout_height),
        );
        // cells touch so their units read as one surface
        x.padding = Some(0.0);
        y.padding = Some(0.0);

        let mut scope = ChildScopeSpec::new(&facet_data, SizeSignals::new(&cell_width, &cell_height));
        scope.group = Some(prefix);
        scope.global_scales = Some(GlobalScales {
            show_axes: true,
            x: Some(x),
            y: Some(y),
            z: None,
        });
        scope.grouped_units = Some(GroupedUnits {
            max_units_signal: max_signal,
            aspect: format!("{cell_width}/{cell_height}"),
            common_size: cell_height,
        });
        Ok(LayoutOutput { fragment, scope })
    }

    fn grouping(&self, context: &LayoutBuildContext) -> Option<Vec<String>> {
        let (bin_x, bin_y) = self.bins(context);
        Some(bin_x.fields.into_iter().chain(bin_y.fields).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::eval::{evaluate_signals, ExprValue, StaticContext};
    use crate::layouts::square::Square;
    use crate::layouts::test_support::run;
    use crate::layouts::LayoutPair;
    use crate::types::{Chart, Column, ColumnType, Insight, InsightColumns, SpecColumns};

    fn discrete(name: &str, type_: ColumnType, signal: &str) -> DiscreteColumn {
        DiscreteColumn {
            column: Column::new(name, type_),
            default_bins: 10,
            maxbins: 100,
            maxbins_signal_name: signal.to_string(),
            maxbins_signal_display_name: signal.to_string(),
        }
    }

    #[test]
    fn test_density_cells_hold_squares() {
        let insight = Insight::new(Chart::Density, InsightColumns::default());
        let layouts = vec![
            LayoutPair::Density(Density {
                groupby_x: discrete("age", ColumnType::Integer, "RoleX_BinsSignal"),
                groupby_y: discrete("region", ColumnType::String, "RoleY_BinsSignal"),
                mode: DensityMode::Pack,
            }),
            LayoutPair::Square(Square::default()),
        ];
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &layouts);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let cell = &scopes[0];
        let facet = chart.get_nested_group(&cell.path).unwrap().from.clone().unwrap().facet.unwrap();
        assert_eq!(
            facet.groupby,
            vec!["density_0_x_bin_age", "density_0_x_bin_age_end", "region"]
        );
        assert_eq!(cell.grouped_units.as_ref().unwrap().max_units_signal, "density_0_count_max");
        assert!(chart.get_nested_signal(&[], "RoleY_BinsSignal").is_err());

        let host = StaticContext::new()
            .with_signal(
                "density_0_count_extent",
                ExprValue::Array(vec![ExprValue::Number(1.0), ExprValue::Number(9.0)]),
            )
            .with_bandwidth("density_0_scale_x", 80.0)
            .with_bandwidth("density_0_scale_y", 40.0);
        let values = evaluate_signals(&chart, &cell.path, &host).unwrap();
        // 9 units over a 2:1 cell pack as 5 per row over 2 rows
        assert_eq!(values.get("square_1_squares_per_band"), Some(&ExprValue::Number(5.0)));
        assert_eq!(values.get("square_1_levels"), Some(&ExprValue::Number(2.0)));
    }
}
