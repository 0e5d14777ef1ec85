use crate::capabilities::Role;
use crate::constants::signal_names;
use crate::defaults::{
    AXES_LABEL_LIMIT, AXES_OFFSET_X, AXES_OFFSET_Y, AXES_TITLE_LIMIT, AXES_TITLE_PADDING_FACET_X,
    AXES_TITLE_PADDING_FACET_Y, AXES_TITLE_PADDING_X, AXES_TITLE_PADDING_Y,
};
use crate::scope::GlobalScales;
use crate::spec::axis::{AxisOrient, AxisSpec};
use crate::spec::chart::ChartSpec;
use crate::spec::scale::ScaleSpec;
use crate::types::{Column, SpecContext};
use log::debug;
use sanddance_common::error::Result;
use serde_json::{json, Map, Value};

/// What a value axis aggregates, when it shows an aggregate instead of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAggregate {
    Count,
    Sum,
    Percent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisScale {
    pub title: Option<String>,
    pub aggregate: Option<AxisAggregate>,
}

impl AxisScale {
    pub fn aggregate(aggregate: AxisAggregate) -> Self {
        Self {
            title: None,
            aggregate: Some(aggregate),
        }
    }

    pub fn titled(title: Option<&Column>) -> Self {
        Self {
            title: title.map(|c| c.name.clone()),
            aggregate: None,
        }
    }
}

/// Axis descriptions per role, supplied by a chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisScales {
    pub x: Option<AxisScale>,
    pub y: Option<AxisScale>,
    pub z: Option<AxisScale>,
}

impl AxisScales {
    pub fn get(&self, role: Role) -> Option<&AxisScale> {
        match role {
            Role::X => self.x.as_ref(),
            Role::Y => self.y.as_ref(),
            Role::Z => self.z.as_ref(),
            _ => None,
        }
    }

    /// Aggregate of the value axis for a given orientation of bars
    pub fn value_aggregate(&self, horizontal: bool) -> AxisAggregate {
        let scale = if horizontal { &self.x } else { &self.y };
        scale
            .as_ref()
            .and_then(|s| s.aggregate)
            .unwrap_or(AxisAggregate::Count)
    }
}

fn axis_title(context: &SpecContext, axis_scale: &AxisScale, column: Option<&Column>) -> Option<String> {
    let language = &context.spec_view_options.language;
    if let Some(title) = &axis_scale.title {
        return Some(title.clone());
    }
    match axis_scale.aggregate {
        Some(AxisAggregate::Count) => Some(language.count.clone()),
        Some(AxisAggregate::Percent) => Some(language.percent.clone()),
        Some(AxisAggregate::Sum) => Some(match &context.spec_columns.size {
            Some(size) => format!("{} of {}", language.sum, size.name),
            None => language.sum.clone(),
        }),
        None => column.map(|c| c.name.clone()),
    }
}

fn signal_ref(name: &str) -> Value {
    json!({ "signal": name })
}

/// Axis along one role of the plot, styled with the shared text signals
pub fn create_axis(
    context: &SpecContext,
    scale: &str,
    horizontal: bool,
    title: Option<String>,
    column: Option<&Column>,
    title_padding: f64,
) -> AxisSpec {
    let options = context.spec_view_options;
    let line_color = Value::String(options.colors.axis_line.clone());
    let text_color = Value::String(options.colors.axis_text.clone());
    let (align, angle_signal, baseline) = if horizontal {
        ("left", signal_names::TEXT_ANGLE_X, "top")
    } else {
        ("right", signal_names::TEXT_ANGLE_Y, "middle")
    };

    let mut extra = Map::new();
    extra.insert("domain".to_string(), Value::Bool(true));
    extra.insert("ticks".to_string(), Value::Bool(true));
    extra.insert("domainColor".to_string(), line_color.clone());
    extra.insert("tickColor".to_string(), line_color);
    extra.insert("tickSize".to_string(), json!(options.tick_size));
    if title.is_some() {
        extra.insert("titleAlign".to_string(), json!(align));
        extra.insert("titleAngle".to_string(), signal_ref(angle_signal));
        extra.insert("titleColor".to_string(), text_color.clone());
        extra.insert(
            "titleFontSize".to_string(),
            signal_ref(signal_names::TEXT_TITLE_SIZE),
        );
        extra.insert("titleLimit".to_string(), json!(AXES_TITLE_LIMIT));
        extra.insert("titlePadding".to_string(), json!(title_padding));
    }
    extra.insert("labels".to_string(), Value::Bool(true));
    extra.insert("labelAlign".to_string(), json!(align));
    extra.insert("labelBaseline".to_string(), json!(baseline));
    extra.insert("labelAngle".to_string(), signal_ref(angle_signal));
    extra.insert("labelColor".to_string(), text_color);
    extra.insert("labelFontSize".to_string(), signal_ref(signal_names::TEXT_SIZE));
    extra.insert("labelLimit".to_string(), json!(AXES_LABEL_LIMIT));

    AxisSpec {
        scale: scale.to_string(),
        orient: if horizontal {
            AxisOrient::Bottom
        } else {
            AxisOrient::Left
        },
        title,
        format: column.filter(|c| c.quantitative).map(|_| "~r".to_string()),
        extra,
    }
}

/// Hoist every layout's global scales to the root and draw axes for the x and y roles
///
/// Axes are placed in the scope at `axes_path`: the plot group for a single plot, or the
/// first facet cell so that each cell repeats them.
pub fn add_global_axes(
    chart: &mut ChartSpec,
    context: &SpecContext,
    all_global_scales: &[GlobalScales],
    axis_scales: Option<&AxisScales>,
    axes_path: &[u32],
    faceted: bool,
) -> Result<()> {
    let (padding_x, padding_y) = if faceted {
        (AXES_TITLE_PADDING_FACET_X, AXES_TITLE_PADDING_FACET_Y)
    } else {
        (AXES_TITLE_PADDING_X, AXES_TITLE_PADDING_Y)
    };

    for global_scales in all_global_scales {
        let roles: [(Role, &Option<ScaleSpec>); 3] = [
            (Role::X, &global_scales.x),
            (Role::Y, &global_scales.y),
            (Role::Z, &global_scales.z),
        ];
        for (role, scale) in roles {
            let Some(scale) = scale else {
                continue;
            };
            chart.add_nested_scale(&[], scale.clone())?;

            // z depth never gets a 2D axis
            if role == Role::Z || !global_scales.show_axes || context.insight.hide_axes {
                continue;
            }
            let Some(axis_scale) = axis_scales.and_then(|a| a.get(role)) else {
                continue;
            };
            let horizontal = role == Role::X;
            let column = role.column(context.spec_columns);
            let title = axis_title(context, axis_scale, column);
            let padding = if horizontal { padding_x } else { padding_y };
            debug!("Adding {} axis on scale {}", role, scale.name);
            chart.add_nested_axis(
                axes_path,
                create_axis(context, &scale.name, horizontal, title, column, padding),
            )?;

            let (offset_signal, offset) = if horizontal {
                (signal_names::PLOT_OFFSET_BOTTOM, AXES_OFFSET_X)
            } else {
                (signal_names::PLOT_OFFSET_LEFT, AXES_OFFSET_Y)
            };
            chart.get_nested_signal_mut(&[], offset_signal)?.update = Some(offset.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::scale::ScaleTypeSpec;
    use crate::spec::signal::SignalSpec;
    use crate::types::{Chart, ColumnType, Insight, InsightColumns, SpecColumns, SpecViewOptions};

    fn chart_with_offsets() -> ChartSpec {
        let mut chart = ChartSpec::default();
        chart
            .signals
            .push(SignalSpec::update(signal_names::PLOT_OFFSET_LEFT, "0"));
        chart
            .signals
            .push(SignalSpec::update(signal_names::PLOT_OFFSET_BOTTOM, "0"));
        chart.add_nested_mark(&[], crate::spec::mark::MarkSpec::unnamed("group")).unwrap();
        chart
    }

    #[test]
    fn test_axes_for_x_and_y_only() {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let columns = SpecColumns {
            x: Some(Column::new("age", ColumnType::Integer)),
            size: Some(Column::new("income", ColumnType::Number)),
            ..Default::default()
        };
        let options = SpecViewOptions::default();
        let context = SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        };
        let global_scales = GlobalScales {
            show_axes: true,
            x: Some(ScaleSpec::new("bar_0_scale_x", ScaleTypeSpec::Band)),
            y: Some(ScaleSpec::new("bar_0_scale_y", ScaleTypeSpec::Linear)),
            z: Some(ScaleSpec::new("scale_z", ScaleTypeSpec::Linear)),
        };
        let axis_scales = AxisScales {
            x: Some(AxisScale::titled(columns.x.as_ref())),
            y: Some(AxisScale::aggregate(AxisAggregate::Sum)),
            z: Some(AxisScale::default()),
        };
        let mut chart = chart_with_offsets();
        add_global_axes(&mut chart, &context, &[global_scales], Some(&axis_scales), &[0], false)
            .unwrap();

        assert_eq!(chart.scales.len(), 3);
        let axes = &chart.get_nested_group(&[0]).unwrap().axes;
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].orient, AxisOrient::Bottom);
        assert_eq!(axes[0].format.as_deref(), Some("~r"));
        assert_eq!(axes[1].title.as_deref(), Some("Sum of income"));
        assert_eq!(
            chart.signals[0].update.as_deref(),
            Some(AXES_OFFSET_Y.to_string().as_str())
        );
    }

    #[test]
    fn test_hidden_axes_still_hoist_scales() {
        let mut insight = Insight::new(Chart::Scatterplot, InsightColumns::default());
        insight.hide_axes = true;
        let columns = SpecColumns::default();
        let options = SpecViewOptions::default();
        let context = SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        };
        let global_scales = GlobalScales {
            show_axes: true,
            x: Some(ScaleSpec::new("scale_x", ScaleTypeSpec::Linear)),
            ..Default::default()
        };
        let mut chart = chart_with_offsets();
        add_global_axes(
            &mut chart,
            &context,
            &[global_scales],
            Some(&AxisScales::default()),
            &[0],
            false,
        )
        .unwrap();
        assert_eq!(chart.scales.len(), 1);
        assert!(chart.get_nested_group(&[0]).unwrap().axes.is_empty());
        assert_eq!(chart.signals[1].update.as_deref(), Some("0"));
    }
}
