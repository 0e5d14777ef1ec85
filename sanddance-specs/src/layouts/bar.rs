use crate::axes::AxisAggregate;
use crate::bin::{binnable, Binnable, DiscreteColumn};
use crate::layouts::{Layout, LayoutBuildContext, Orientation};
use crate::scales::{band_scale, from_to_zero, zero_to};
use crate::scope::{
    ChildScopeSpec, GlobalScales, GroupedUnits, LayoutOutput, SizeSignals, SpecFragment,
};
use crate::spec::data::DataSpec;
use crate::spec::mark::{
    MarkEncodingSpec, MarkEncodingsSpec, MarkFacetAggregateSpec, MarkFacetSpec, MarkSpec,
};
use crate::spec::scale::{ScaleArrayElementSpec, ScaleDomainSpec, ScaleSpec, ScaleTypeSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use crate::types::Column;
use log::debug;
use sanddance_common::error::{Result, SandDanceError};
use sanddance_common::escape::{datum_field, escape_field, quote};

/// One bar per bucket of `groupby`, sized by row count or by the sum of `sum_by`
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub orientation: Orientation,
    pub groupby: DiscreteColumn,
    pub sum_by: Option<Column>,
    pub min_band_width: f64,
}

struct BarNames {
    prefix: String,
    min_size: String,
    facet_data: String,
    aggregate_data: String,
    extent_signal: String,
    max_signal: String,
    x_scale: String,
    y_scale: String,
    bandwidth: String,
    accumulative: String,
}

impl BarNames {
    fn new(id: usize, aggregation: &str) -> Self {
        let prefix = format!("bar_{id}");
        Self {
            min_size: format!("{prefix}_minsize"),
            facet_data: format!("facet_{prefix}"),
            aggregate_data: format!("{prefix}_aggregate_{aggregation}"),
            extent_signal: format!("{prefix}_{aggregation}_extent"),
            max_signal: format!("{prefix}_{aggregation}_max"),
            x_scale: format!("{prefix}_scale_x"),
            y_scale: format!("{prefix}_scale_y"),
            bandwidth: format!("{prefix}_bandwidth"),
            accumulative: format!("{prefix}_accumulative"),
            prefix,
        }
    }
}

impl Bar {
    fn aggregation(&self, context: &LayoutBuildContext) -> AggregateOpSpec {
        let aggregate = context
            .axis_scales
            .map(|a| a.value_aggregate(self.orientation.is_horizontal()))
            .unwrap_or(AxisAggregate::Count);
        match aggregate {
            AxisAggregate::Sum => AggregateOpSpec::Sum,
            AxisAggregate::Count | AxisAggregate::Percent => AggregateOpSpec::Count,
        }
    }

    fn bin(&self, context: &LayoutBuildContext) -> Binnable {
        binnable(
            &format!("bar_{}", context.id),
            &context.global_scope.data_name,
            &self.groupby,
        )
    }

    fn scales(&self, names: &BarNames, bin: &Binnable, size: &SizeSignals) -> (ScaleSpec, ScaleSpec) {
        let horizontal = self.orientation.is_horizontal();
        let (band_name, band_extent, linear_name) = if horizontal {
            (&names.y_scale, &size.layout_height, &names.x_scale)
        } else {
            (&names.x_scale, &size.layout_width, &names.y_scale)
        };
        let band = band_scale(
            band_name,
            &bin.domain_data_name,
            bin.field(),
            zero_to(&format!("max({band_extent},{})", names.min_size)),
        );

        let mut linear = ScaleSpec::new(linear_name, ScaleTypeSpec::Linear);
        linear.domain = Some(ScaleDomainSpec::Array(vec![
            ScaleArrayElementSpec::number(0.0),
            ScaleArrayElementSpec::signal(&names.max_signal),
        ]));
        linear.range = Some(if horizontal {
            zero_to(&size.layout_width)
        } else {
            from_to_zero(&size.layout_height)
        });
        linear.nice = Some(true);
        linear.zero = Some(true);

        if horizontal {
            (linear, band)
        } else {
            (band, linear)
        }
    }
}

impl Layout for Bar {
    fn kind(&self) -> &'static str {
        "Bar"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let op = self.aggregation(context);
        let aggregation = op.name();
        let names = BarNames::new(context.id, aggregation);
        let global = context.global_scope;
        let parent = context.parent_scope;
        let horizontal = self.orientation.is_horizontal();
        let bin = self.bin(context);
        let bin_ref = escape_field(bin.field());

        let sum_field = match op {
            AggregateOpSpec::Sum => Some(escape_field(
                &self
                    .sum_by
                    .as_ref()
                    .ok_or_else(|| SandDanceError::specification("Summed bars require a size column"))?
                    .name,
            )),
            _ => None,
        };

        let mut fragment = SpecFragment::default();
        if !bin.native {
            fragment
                .global_transforms
                .push((global.data_name.clone(), bin.transforms.clone()));
            fragment.global.signals.extend(bin.maxbins_signal.clone());
            fragment.global.data.extend(bin.data_sequence.clone());
        }

        fragment.global.data.push(
            DataSpec::from_source(&names.aggregate_data, &global.data_name).with_transforms(vec![
                TransformSpec::Aggregate(AggregateTransformSpec::single(
                    vec![Field::String(bin_ref.clone())],
                    op,
                    sum_field.clone().map(Field::String),
                    aggregation,
                )),
                TransformSpec::extent(aggregation, &names.extent_signal),
            ]),
        );
        fragment.global.data.push(
            DataSpec::from_source(&names.accumulative, &global.data_name).with_transforms(vec![
                TransformSpec::Aggregate(AggregateTransformSpec {
                    groupby: vec![Field::String(bin_ref.clone())],
                    fields: None,
                    ops: Some(vec![AggregateOpSpec::Count]),
                    as_: None,
                    extra: Default::default(),
                }),
            ]),
        );

        let band_scale_name = if horizontal {
            &names.y_scale
        } else {
            &names.x_scale
        };
        fragment.global.signals.extend([
            SignalSpec::update(&names.max_signal, format!("{}[1]", names.extent_signal)),
            SignalSpec::update(
                &names.bandwidth,
                format!("bandwidth({})", quote(band_scale_name)),
            ),
            SignalSpec::update(
                &names.min_size,
                format!(
                    "length(data({}))*{}",
                    quote(&names.accumulative),
                    self.min_band_width
                ),
            ),
        ]);

        let size = &parent.size_signals;
        let scaled_bin = |scale: &str| format!("scale({}, {})", quote(scale), datum_field(bin.field()));
        let scaled_value =
            |scale: &str, object: &str| format!("scale({}, {object}[{}])", quote(scale), quote(aggregation));
        let update = if horizontal {
            MarkEncodingsSpec::new()
                .with("x", MarkEncodingSpec::value(0))
                .with("y", MarkEncodingSpec::signal(scaled_bin(&names.y_scale)))
                .with("height", MarkEncodingSpec::signal(&names.bandwidth))
                .with(
                    "width",
                    MarkEncodingSpec::signal(scaled_value(&names.x_scale, "datum")),
                )
        } else {
            MarkEncodingsSpec::new()
                .with("x", MarkEncodingSpec::signal(scaled_bin(&names.x_scale)))
                .with(
                    "y",
                    MarkEncodingSpec::signal(scaled_value(&names.y_scale, "datum")),
                )
                .with(
                    "height",
                    MarkEncodingSpec::signal(format!(
                        "{} - {}",
                        size.layout_height,
                        scaled_value(&names.y_scale, "datum")
                    )),
                )
                .with("width", MarkEncodingSpec::signal(&names.bandwidth))
        };

        let mut mark = MarkSpec::new("group", &names.prefix)
            .with_facet(MarkFacetSpec {
                name: names.facet_data.clone(),
                data: parent.data_name.clone(),
                groupby: vec![bin_ref],
                aggregate: Some(MarkFacetAggregateSpec {
                    fields: vec![sum_field],
                    ops: vec![op],
                    as_: vec![aggregation.to_string()],
                }),
            })
            .with_update(update);
        mark.style = Some("cell".to_string());
        fragment.local.marks.push(mark);

        let (x, y) = self.scales(&names, &bin, size);
        let (parent_size, size_signals) = if horizontal {
            (
                size.layout_width.clone(),
                SizeSignals::new(scaled_value(&names.x_scale, "parent"), &names.bandwidth),
            )
        } else {
            (
                size.layout_height.clone(),
                SizeSignals::new(
                    &names.bandwidth,
                    format!(
                        "{} - {}",
                        size.layout_height,
                        scaled_value(&names.y_scale, "parent")
                    ),
                ),
            )
        };
        debug!("Bar {} groups by {}", names.prefix, bin.field());

        let mut scope = ChildScopeSpec::new(&names.facet_data, size_signals);
        scope.group = Some(names.prefix.clone());
        scope.global_scales = Some(GlobalScales {
            show_axes: true,
            x: Some(x),
            y: Some(y),
            z: None,
        });
        scope.grouped_units = Some(GroupedUnits {
            max_units_signal: names.max_signal.clone(),
            aspect: format!("{}/({parent_size})", names.bandwidth),
            common_size: parent_size,
        });
        Ok(LayoutOutput { fragment, scope })
    }

    fn grouping(&self, context: &LayoutBuildContext) -> Option<Vec<String>> {
        Some(self.bin(context).fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::{AxisScale, AxisScales};
    use crate::expression::eval::{evaluate_signals, ExprValue, StaticContext};
    use crate::layouts::test_support::run;
    use crate::layouts::LayoutPair;
    use crate::types::{Chart, ColumnType, Insight, InsightColumns, SpecColumns};
    use serde_json::json;

    fn bar(orientation: Orientation, column: Column) -> Bar {
        Bar {
            orientation,
            groupby: DiscreteColumn {
                column,
                default_bins: 10,
                maxbins: 100,
                maxbins_signal_name: "RoleX_BinsSignal".to_string(),
                maxbins_signal_display_name: "X axis max bins".to_string(),
            },
            sum_by: Some(Column::new("income", ColumnType::Number)),
            min_band_width: 15.0,
        }
    }

    fn axis_scales(aggregate: AxisAggregate) -> AxisScales {
        AxisScales {
            x: Some(AxisScale::default()),
            y: Some(AxisScale::aggregate(aggregate)),
            z: None,
        }
    }

    #[test]
    fn test_vertical_binned_bar() {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let layout = LayoutPair::Bar(bar(Orientation::Vertical, Column::new("age", ColumnType::Integer)));
        let (chart, scopes) = run(
            &insight,
            &SpecColumns::default(),
            Some(&axis_scales(AxisAggregate::Count)),
            &[layout],
        );
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let source = chart.get_nested_data(&[], "data_source").unwrap();
        assert_eq!(source.transform.len(), 2);
        let names: Vec<_> = chart.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "origin",
                "data_source",
                "bar_0_bin_age_sequence",
                "bar_0_aggregate_count",
                "bar_0_accumulative"
            ]
        );

        let child = &scopes[0];
        assert_eq!(child.path, vec![0, 0]);
        assert_eq!(child.size_signals.layout_width, "bar_0_bandwidth");
        assert_eq!(
            child.size_signals.layout_height,
            r#"PlotHeightIn - scale("bar_0_scale_y", parent["count"])"#
        );
        let grouped = child.grouped_units.as_ref().unwrap();
        assert_eq!(grouped.max_units_signal, "bar_0_count_max");
        assert_eq!(grouped.common_size, "PlotHeightIn");

        let group = chart.get_nested_group(&[0, 0]).unwrap();
        assert_eq!(
            serde_json::to_value(&group.from).unwrap(),
            json!({"facet": {
                "name": "facet_bar_0",
                "data": "data_source",
                "groupby": ["bar_0_bin_age"],
                "aggregate": {"fields": [null], "ops": ["count"], "as": ["count"]}
            }})
        );

        let host = StaticContext::new()
            .with_signal("bar_0_count_extent", ExprValue::Array(vec![ExprValue::Number(0.0), ExprValue::Number(8.0)]))
            .with_data_length("bar_0_accumulative", 10)
            .with_bandwidth("bar_0_scale_x", 70.0);
        let values = evaluate_signals(&chart, &[], &host).unwrap();
        assert_eq!(values.get("bar_0_count_max"), Some(&ExprValue::Number(8.0)));
        assert_eq!(values.get("bar_0_minsize"), Some(&ExprValue::Number(150.0)));
        assert_eq!(values.get("bar_0_bandwidth"), Some(&ExprValue::Number(70.0)));
    }

    #[test]
    fn test_horizontal_sum_bar() {
        let insight = Insight::new(Chart::BarchartH, InsightColumns::default());
        let layout = LayoutPair::Bar(bar(Orientation::Horizontal, Column::new("region", ColumnType::String)));
        let scales = AxisScales {
            x: Some(AxisScale::aggregate(AxisAggregate::Sum)),
            y: Some(AxisScale::default()),
            z: None,
        };
        let (chart, scopes) = run(&insight, &SpecColumns::default(), Some(&scales), &[layout]);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        // native buckets need no sequence or extra transforms
        assert!(chart.get_nested_data(&[], "data_source").unwrap().transform.is_empty());
        let global_scales = scopes[0].global_scales.as_ref().unwrap();
        assert_eq!(global_scales.y.as_ref().unwrap().type_, ScaleTypeSpec::Band);
        assert_eq!(global_scales.x.as_ref().unwrap().type_, ScaleTypeSpec::Linear);
        assert_eq!(scopes[0].size_signals.layout_height, "bar_0_bandwidth");

        let aggregate = chart.get_nested_data(&[], "bar_0_aggregate_sum").unwrap();
        assert_eq!(
            serde_json::to_value(&aggregate.transform[0]).unwrap(),
            json!({"type": "aggregate", "groupby": ["region"], "fields": ["income"], "ops": ["sum"], "as": ["sum"]})
        );
    }

    #[test]
    fn test_sum_without_size_column_fails() {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let mut layout = bar(Orientation::Vertical, Column::new("age", ColumnType::Integer));
        layout.sum_by = None;
        let (_, global, parent) = crate::layouts::test_support::root();
        let columns = SpecColumns::default();
        let options = crate::types::SpecViewOptions::default();
        let scales = axis_scales(AxisAggregate::Sum);
        let context = LayoutBuildContext {
            id: 0,
            spec_context: crate::types::SpecContext {
                insight: &insight,
                spec_columns: &columns,
                spec_view_options: &options,
            },
            global_scope: &global,
            parent_scope: &parent,
            axis_scales: Some(&scales),
            groupings: &[],
        };
        assert!(layout.build(&context).is_err());
    }
}
