use crate::constants::{data_names, field_names, scale_names, signal_names, COLOR_SCALE_NONE, OTHER};
use crate::defaults::{DEFAULT_COLOR_BIN_COUNT, MAX_COLOR_BIN_COUNT};
use crate::scales::{binnable_color_scale, categorical_color_scale};
use crate::spec::data::DataSpec;
use crate::spec::legend::LegendSpec;
use crate::spec::mark::MarkEncodingSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::lookup::LookupTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use crate::types::{ColorBin, SpecContext};
use log::debug;
use sanddance_common::escape::{datum_field, escape_field, quote};
use serde_json::Value;

const DEFAULT_QUANTITATIVE_SCHEME: &str = "redyellowgreen";
const DEFAULT_CATEGORICAL_SCHEME: &str = "category20";
const TOP_COUNT_FIELD: &str = "count";

/// Root additions made for the color role
#[derive(Debug, Clone, Default)]
pub struct ColorOutput {
    pub data: Vec<DataSpec>,
    pub signals: Vec<SignalSpec>,
    pub scales: Vec<ScaleSpec>,
    pub legends: Vec<LegendSpec>,

    /// Dataset layouts draw from, which carries the top-color field when present
    pub color_data_name: String,
    pub top_color_field: Option<String>,
}

fn scheme_or(context: &SpecContext, default: &str) -> String {
    context
        .insight
        .scheme
        .clone()
        .unwrap_or_else(|| default.to_string())
}

fn color_signals(context: &SpecContext, with_bin_count: bool) -> Vec<SignalSpec> {
    let language = &context.spec_view_options.language;
    let mut signals = Vec::new();
    if with_bin_count {
        signals.push(
            SignalSpec::value(signal_names::COLOR_BIN_COUNT, Value::from(DEFAULT_COLOR_BIN_COUNT))
                .with_bind(SignalBindSpec::range(
                    &language.color_bin_count,
                    1.0,
                    MAX_COLOR_BIN_COUNT as f64,
                    1.0,
                )),
        );
    }
    signals.push(
        SignalSpec::value(signal_names::COLOR_REVERSE, Value::Bool(false))
            .with_bind(SignalBindSpec::checkbox(&language.color_reverse)),
    );
    signals
}

/// Top-N categories by row count, and a copy of the source that maps the rest to `__Other`
fn top_color_data(data_name: &str, color: &str, max_legends: usize) -> Vec<DataSpec> {
    let escaped = escape_field(color);
    let lookup = DataSpec::from_source(data_names::TOP_COLOR_LOOKUP, data_name).with_transforms(vec![
        TransformSpec::Aggregate(AggregateTransformSpec::single(
            vec![Field::String(escaped.clone())],
            AggregateOpSpec::Count,
            None,
            TOP_COUNT_FIELD,
        )),
        TransformSpec::Collect(CollectTransformSpec {
            sort: CompareSpec::descending(TOP_COUNT_FIELD),
            extra: Default::default(),
        }),
        TransformSpec::Window(WindowTransformSpec::row_number(field_names::TOP_INDEX)),
        TransformSpec::filter(format!(
            "{} <= {max_legends}",
            datum_field(field_names::TOP_INDEX)
        )),
    ]);
    let legend = DataSpec::from_source(data_names::LEGEND, data_name).with_transforms(vec![
        TransformSpec::Lookup(LookupTransformSpec {
            from: data_names::TOP_COLOR_LOOKUP.to_string(),
            key: Field::String(escaped.clone()),
            fields: vec![Field::String(escaped)],
            values: None,
            as_: Some(vec![field_names::TOP.to_string()]),
            default: None,
            extra: Default::default(),
        }),
        TransformSpec::formula(
            format!(
                "isValid({}) ? {} : {}",
                datum_field(field_names::TOP),
                datum_field(color),
                quote(OTHER)
            ),
            field_names::TOP_COLOR,
        ),
    ]);
    vec![lookup, legend]
}

/// Build the color scale, legend and any top-N bucketing for the insight's color column
pub fn add_color(context: &SpecContext, data_name: &str) -> ColorOutput {
    let mut output = ColorOutput {
        color_data_name: data_name.to_string(),
        ..Default::default()
    };
    let Some(color) = &context.spec_columns.color else {
        return output;
    };
    let insight = context.insight;
    if insight.scheme.as_deref() == Some(COLOR_SCALE_NONE) {
        return output;
    }

    if color.quantitative {
        let scheme = scheme_or(context, DEFAULT_QUANTITATIVE_SCHEME);
        output.signals = color_signals(context, insight.color_bin != ColorBin::Native);
        output.scales.push(binnable_color_scale(
            insight.color_bin,
            data_name,
            &color.name,
            &scheme,
        ));
    } else if color.is_color_data && insight.direct_color {
        debug!("Filling directly from color column {}", color.name);
        return output;
    } else {
        let scheme = scheme_or(context, DEFAULT_CATEGORICAL_SCHEME);
        output.signals = color_signals(context, false);
        let max_legends = context.spec_view_options.max_legends;
        if color.stats.distinct_value_count > max_legends {
            output.data = top_color_data(data_name, &color.name, max_legends);
            output.color_data_name = data_names::LEGEND.to_string();
            output.top_color_field = Some(field_names::TOP_COLOR.to_string());
            output.scales.push(categorical_color_scale(
                data_names::LEGEND,
                field_names::TOP_COLOR,
                &scheme,
            ));
        } else {
            output
                .scales
                .push(categorical_color_scale(data_name, &color.name, &scheme));
        }
    }

    if !insight.hide_legend {
        let mut legend = LegendSpec {
            fill: Some(scale_names::COLOR.to_string()),
            orient: Some("right".to_string()),
            title: Some(color.name.clone()),
            encode: None,
            extra: Default::default(),
        };
        legend
            .extra
            .insert("type".to_string(), Value::String("symbol".to_string()));
        output.legends.push(legend);
    }
    output
}

/// Fill channel of the final mark
pub fn fill(context: &SpecContext, top_color_field: Option<&str>) -> MarkEncodingSpec {
    let default = || MarkEncodingSpec::value(context.spec_view_options.colors.default_cube.clone());
    let Some(color) = &context.spec_columns.color else {
        return default();
    };
    if context.insight.scheme.as_deref() == Some(COLOR_SCALE_NONE) {
        return default();
    }
    if color.is_color_data && context.insight.direct_color && !color.quantitative {
        return MarkEncodingSpec::field(escape_field(&color.name));
    }
    match top_color_field {
        Some(field) => MarkEncodingSpec::scaled(scale_names::COLOR, escape_field(field)),
        None => MarkEncodingSpec::scaled(scale_names::COLOR, escape_field(&color.name)),
    }
}

/// Opacity channel of the final mark
pub fn opacity() -> MarkEncodingSpec {
    MarkEncodingSpec::signal(signal_names::MARK_OPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chart, Column, ColumnType, Insight, InsightColumns, SpecColumns, SpecViewOptions};

    fn with_color(column: Column, insight: Insight) -> (ColorOutput, MarkEncodingSpec) {
        let columns = SpecColumns {
            color: Some(column),
            ..Default::default()
        };
        let options = SpecViewOptions::default();
        let context = SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        };
        let output = add_color(&context, "data_source");
        let fill = fill(&context, output.top_color_field.as_deref());
        (output, fill)
    }

    fn insight() -> Insight {
        Insight::new(
            Chart::Scatterplot,
            InsightColumns {
                color: Some("c".to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_many_categories_use_top_lookup() {
        let mut column = Column::new("c", ColumnType::String);
        column.stats.distinct_value_count = 50;
        let (output, fill) = with_color(column, insight());
        assert_eq!(output.color_data_name, "data_legend");
        let names: Vec<_> = output.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["data_topcolorlookup", "data_legend"]);
        assert_eq!(fill.field.as_deref(), Some("__SandDance__TopColor"));
        assert_eq!(output.legends.len(), 1);
    }

    #[test]
    fn test_quantitative_color_signals() {
        let (output, fill) = with_color(Column::new("c", ColumnType::Number), insight());
        let names: Vec<_> = output.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["RoleColor_BinCountSignal", "RoleColor_ReverseSignal"]);
        assert_eq!(fill.scale.as_deref(), Some("scale_color"));
        assert_eq!(output.color_data_name, "data_source");
    }

    #[test]
    fn test_direct_color_skips_scale() {
        let mut column = Column::new("c", ColumnType::String);
        column.is_color_data = true;
        let mut insight = insight();
        insight.direct_color = true;
        let (output, fill) = with_color(column, insight);
        assert!(output.scales.is_empty());
        assert_eq!(fill.field.as_deref(), Some("c"));
        assert_eq!(fill.scale, None);
    }
}
