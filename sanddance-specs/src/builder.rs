use crate::axes::{add_global_axes, AxisScales};
use crate::bin::DiscreteColumn;
use crate::capabilities::SpecCapabilities;
use crate::color::{add_color, fill, opacity, ColorOutput};
use crate::constants::{data_names, signal_names};
use crate::defaults::{MIN_FACET_HEIGHT, MIN_FACET_WIDTH};
use crate::facet_layout::{get_facet_layout, FacetLayout};
use crate::facet_title::{cell_title_mark, col_row_titles};
use crate::layouts::{LayoutBuildContext, LayoutPair};
use crate::scope::{
    apply_layout_output, EncodingRuleMap, GlobalScales, GlobalScope, InnerScope, SizeSignals,
};
use crate::signals::text_signals;
use crate::spec::chart::ChartSpec;
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingOrList, MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::types::SpecContext;
use crate::zbase::z_proportion_signal;
use log::{debug, info, warn};
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};
use serde::{Deserialize, Serialize};

/// What a chart hands the builder: its layout pipeline, axis descriptions and role capabilities
#[derive(Debug, Clone, PartialEq)]
pub struct SpecBuilderProps {
    pub axis_scales: Option<AxisScales>,
    pub layouts: Vec<LayoutPair>,
    pub spec_capabilities: SpecCapabilities,
}

/// Outcome of one build: the validation or build errors, or the finished document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecResult {
    Failure {
        errors: Vec<String>,

        #[serde(rename = "specCapabilities")]
        spec_capabilities: SpecCapabilities,
    },
    Success {
        #[serde(rename = "specCapabilities")]
        spec_capabilities: SpecCapabilities,
        document: ChartSpec,
    },
}

impl SpecResult {
    pub fn document(&self) -> Option<&ChartSpec> {
        match self {
            SpecResult::Success { document, .. } => Some(document),
            SpecResult::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            SpecResult::Failure { errors, .. } => errors,
            SpecResult::Success { .. } => &[],
        }
    }

    pub fn spec_capabilities(&self) -> &SpecCapabilities {
        match self {
            SpecResult::Failure {
                spec_capabilities, ..
            }
            | SpecResult::Success {
                spec_capabilities, ..
            } => spec_capabilities,
        }
    }
}

/// Scopes placed by the layout pipeline, outermost first
struct Pipeline {
    scopes: Vec<InnerScope>,
}

impl Pipeline {
    fn first(&self) -> Result<&InnerScope> {
        self.scopes.first().with_context(|| "Layout pipeline is empty")
    }

    fn last(&self) -> Result<&InnerScope> {
        self.scopes.last().with_context(|| "Layout pipeline is empty")
    }

    fn global_scales(&self) -> Vec<GlobalScales> {
        self.scopes
            .iter()
            .filter_map(|s| s.global_scales.clone())
            .collect()
    }

    fn encoding_rules(&self) -> impl Iterator<Item = &EncodingRuleMap> {
        self.scopes.iter().filter_map(|s| s.encoding_rule_map.as_ref())
    }
}

pub struct SpecBuilder<'a> {
    props: SpecBuilderProps,
    spec_context: SpecContext<'a>,
}

impl<'a> SpecBuilder<'a> {
    pub fn new(props: SpecBuilderProps, spec_context: SpecContext<'a>) -> Self {
        Self {
            props,
            spec_context,
        }
    }

    /// Role errors, missing roles first
    pub fn validate(&self) -> Vec<String> {
        self.props
            .spec_capabilities
            .validate(self.spec_context.spec_columns)
    }

    pub fn build(self) -> SpecResult {
        let spec_capabilities = self.props.spec_capabilities.clone();
        let chart = self.spec_context.insight.chart.name();
        let errors = self.validate();
        if !errors.is_empty() {
            warn!("Insight for {} failed validation: {}", chart, errors.join(" "));
            return SpecResult::Failure {
                errors,
                spec_capabilities,
            };
        }
        match self.build_document() {
            Ok(document) => {
                info!(
                    "Built {} with {} data sources and {} signals",
                    chart,
                    document.data.len(),
                    document.signals.len()
                );
                SpecResult::Success {
                    spec_capabilities,
                    document,
                }
            }
            Err(err) => {
                warn!("Failed to build {}: {}", chart, err);
                SpecResult::Failure {
                    errors: vec![err.to_string()],
                    spec_capabilities,
                }
            }
        }
    }

    fn facet_layout(&self) -> Option<FacetLayout> {
        let columns = self.spec_context.spec_columns;
        let language = &self.spec_context.spec_view_options.language;
        let facet = DiscreteColumn::new(
            columns.facet.as_ref()?,
            signal_names::FACET_BINS,
            &language.facet_max_bins,
        );
        let facet_v = columns.facet_v.as_ref().map(|c| {
            DiscreteColumn::new(c, signal_names::FACET_V_BINS, &language.facet_v_max_bins)
        });
        Some(get_facet_layout(
            self.spec_context.insight.facet_style,
            facet,
            facet_v,
        ))
    }

    fn build_document(&self) -> Result<ChartSpec> {
        let context = self.spec_context;
        let mut chart = init_spec(&context);

        debug!("Adding color encoding");
        let ColorOutput {
            data,
            signals,
            scales,
            legends,
            color_data_name,
            top_color_field,
        } = add_color(&context, data_names::SOURCE);
        chart.data.extend(data);
        chart.signals.extend(signals);
        chart.signals.extend(z_proportion_signal(&context));
        chart.scales.extend(scales);
        chart.legends.extend(legends);

        let global = GlobalScope {
            data_name: color_data_name,
            size_signals: SizeSignals::new(signal_names::PLOT_WIDTH_IN, signal_names::PLOT_HEIGHT_IN),
        };

        let mut layouts = self.props.layouts.clone();
        let facet_layout = self.facet_layout();
        if let Some(facet) = &facet_layout {
            debug!("Prepending facet layout {}", facet.layout_pair.kind());
            chart.signals.extend(facet.signals.iter().cloned());
            layouts.insert(0, facet.layout_pair.clone());
            chart
                .get_nested_signal_mut(&[], signal_names::PLOT_OFFSET_TOP)?
                .update = Some(facet.plot_padding.y.to_string());
            chart
                .get_nested_signal_mut(&[], signal_names::PLOT_OFFSET_RIGHT)?
                .update = Some(facet.plot_padding.x.to_string());
        }

        let pipeline = self.iterate_layouts(&mut chart, &global, &layouts)?;
        let first = pipeline.first()?;

        if let Some(facet) = &facet_layout {
            if facet.cell_titles {
                chart.add_nested_mark(&first.path, cell_title_mark(&first.size_signals))?;
            }
            if let (true, Some(titles)) = (facet.col_row_titles, &first.titles) {
                let (data, marks) = col_row_titles(&titles.x, &titles.y);
                for data in data {
                    chart.add_nested_data(&[], data, None)?;
                }
                for mark in marks {
                    chart.add_nested_mark(&[0], mark)?;
                }
            }
        }

        debug!("Adding global axes");
        let axes_path = if facet_layout.is_some() {
            first.path.clone()
        } else {
            vec![0]
        };
        add_global_axes(
            &mut chart,
            &context,
            &pipeline.global_scales(),
            self.props.axis_scales.as_ref(),
            &axes_path,
            facet_layout.is_some(),
        )?;

        if let Some(mark_ref) = &pipeline.last()?.mark {
            let mark = chart.get_nested_mark_mut(&mark_ref.path, &mark_ref.name)?;
            let update = mark
                .update_mut()
                .with_context(|| format!("Mark {} has no update encoding", mark_ref.name))?;
            for rules in pipeline.encoding_rules() {
                merge_encoding_rules(update, rules);
            }
            update.channels.insert(
                "fill".to_string(),
                MarkEncodingOrList::Scalar(Box::new(fill(&context, top_color_field.as_deref()))),
            );
            update.channels.insert(
                "opacity".to_string(),
                MarkEncodingOrList::Scalar(Box::new(opacity())),
            );
        }

        apply_signal_values(&mut chart, &context);
        Ok(chart)
    }

    fn iterate_layouts(
        &self,
        chart: &mut ChartSpec,
        global: &GlobalScope,
        layouts: &[LayoutPair],
    ) -> Result<Pipeline> {
        if layouts.is_empty() {
            return Err(SandDanceError::specification("Chart has no layouts"));
        }
        let mut parent = InnerScope {
            data_name: global.data_name.clone(),
            path: vec![0],
            size_signals: global.size_signals.clone(),
            global_scales: None,
            encoding_rule_map: None,
            mark: None,
            titles: None,
            grouped_units: None,
        };
        let mut groupings: Vec<Vec<String>> = Vec::new();
        let mut scopes = Vec::with_capacity(layouts.len());
        for (id, layout) in layouts.iter().enumerate() {
            let failed = || format!("Failed to build layout {} #{}", layout.kind(), id);
            let build_context = LayoutBuildContext {
                id,
                spec_context: self.spec_context,
                global_scope: global,
                parent_scope: &parent,
                axis_scales: self.props.axis_scales.as_ref(),
                groupings: &groupings,
            };
            debug!("Building layout {} #{} in {}", layout.kind(), id, parent.data_name);
            let output = layout.build(&build_context).with_context(failed)?;
            let grouping = layout.grouping(&build_context);
            let child = apply_layout_output(chart, &parent, output).with_context(failed)?;
            groupings.extend(grouping);
            scopes.push(child.clone());
            parent = child;
        }
        Ok(Pipeline { scopes })
    }
}

/// Root data, sizing signals and the plot group every document starts from
fn init_spec(context: &SpecContext) -> ChartSpec {
    let size = &context.insight.size;
    let mut chart = ChartSpec::default();
    chart.data.push(DataSpec::new(data_names::ORIGIN));
    chart
        .data
        .push(DataSpec::from_source(data_names::SOURCE, data_names::ORIGIN));

    chart.signals = text_signals(context);
    chart.signals.extend([
        SignalSpec::update(signal_names::MIN_CELL_WIDTH, MIN_FACET_WIDTH.to_string()),
        SignalSpec::update(signal_names::MIN_CELL_HEIGHT, MIN_FACET_HEIGHT.to_string()),
        SignalSpec::update(
            signal_names::VIEWPORT_HEIGHT,
            format!("max({}, {})", signal_names::MIN_CELL_HEIGHT, size.height),
        ),
        SignalSpec::update(
            signal_names::VIEWPORT_WIDTH,
            format!("max({}, {})", signal_names::MIN_CELL_WIDTH, size.width),
        ),
        SignalSpec::update(signal_names::PLOT_OFFSET_LEFT, "0"),
        SignalSpec::update(signal_names::PLOT_OFFSET_TOP, "0"),
        SignalSpec::update(signal_names::PLOT_OFFSET_BOTTOM, "0"),
        SignalSpec::update(signal_names::PLOT_OFFSET_RIGHT, "0"),
        SignalSpec::update(
            signal_names::PLOT_HEIGHT_IN,
            format!(
                "{} - {}",
                signal_names::VIEWPORT_HEIGHT,
                signal_names::PLOT_OFFSET_BOTTOM
            ),
        ),
        SignalSpec::update(
            signal_names::PLOT_WIDTH_IN,
            format!(
                "{} - {} - {}",
                signal_names::VIEWPORT_WIDTH,
                signal_names::PLOT_OFFSET_LEFT,
                signal_names::PLOT_OFFSET_RIGHT
            ),
        ),
        SignalSpec::update(signal_names::PLOT_HEIGHT_OUT, signal_names::PLOT_HEIGHT_IN),
        SignalSpec::update(signal_names::PLOT_WIDTH_OUT, signal_names::PLOT_WIDTH_IN),
        SignalSpec::update(
            "height",
            format!(
                "{} + {} + {}",
                signal_names::PLOT_OFFSET_TOP,
                signal_names::PLOT_HEIGHT_OUT,
                signal_names::PLOT_OFFSET_BOTTOM
            ),
        ),
        SignalSpec::update(
            "width",
            format!(
                "{} + {} + {}",
                signal_names::PLOT_WIDTH_OUT,
                signal_names::PLOT_OFFSET_LEFT,
                signal_names::PLOT_OFFSET_RIGHT
            ),
        ),
    ]);

    chart.marks.push(
        MarkSpec::unnamed("group").with_update(
            MarkEncodingsSpec::new()
                .with("x", MarkEncodingSpec::signal(signal_names::PLOT_OFFSET_LEFT))
                .with("y", MarkEncodingSpec::signal(signal_names::PLOT_OFFSET_TOP))
                .with("height", MarkEncodingSpec::signal(signal_names::PLOT_HEIGHT_OUT))
                .with("width", MarkEncodingSpec::signal(signal_names::PLOT_WIDTH_OUT)),
        ),
    );
    chart
}

/// Fold conditional rules into existing channels of `update`
///
/// A bare value becomes the last entry after the rules; an existing rule list gets each rule
/// placed at its front in turn.
pub fn merge_encoding_rules(update: &mut MarkEncodingsSpec, rules: &EncodingRuleMap) {
    for (channel, incoming) in rules {
        let Some(existing) = update.channels.get_mut(channel) else {
            continue;
        };
        match existing {
            MarkEncodingOrList::Scalar(value) => {
                let mut list = incoming.clone();
                list.push(value.as_ref().clone());
                *existing = MarkEncodingOrList::List(list);
            }
            MarkEncodingOrList::List(list) => {
                for rule in incoming {
                    list.insert(0, rule.clone());
                }
            }
        }
    }
}

/// Restore saved values of bound root signals
fn apply_signal_values(chart: &mut ChartSpec, context: &SpecContext) {
    for (name, value) in &context.insight.signal_values {
        match chart.signals.iter_mut().find(|s| &s.name == name) {
            Some(signal) if signal.value.is_some() => signal.value = Some(value.clone()),
            _ => debug!("Ignoring value for unknown or computed signal {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chart, Insight, InsightColumns, SpecColumns, SpecViewOptions};
    use serde_json::json;

    #[test]
    fn test_merge_rules_into_value_and_list() {
        let mut update = MarkEncodingsSpec::new()
            .with("fill", MarkEncodingSpec::value("steelblue"))
            .with_list(
                "depth",
                vec![MarkEncodingSpec::scaled("scale_z", "height")],
            );
        let mut rules = EncodingRuleMap::new();
        rules.insert(
            "fill".to_string(),
            vec![MarkEncodingSpec::value("red").with_test("datum.selected")],
        );
        rules.insert(
            "depth".to_string(),
            vec![
                MarkEncodingSpec::value(0).with_test("a"),
                MarkEncodingSpec::value(1).with_test("b"),
            ],
        );
        rules.insert("x".to_string(), vec![MarkEncodingSpec::value(0)]);
        merge_encoding_rules(&mut update, &rules);

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "fill": [{"test": "datum.selected", "value": "red"}, {"value": "steelblue"}],
                "depth": [
                    {"test": "b", "value": 1},
                    {"test": "a", "value": 0},
                    {"scale": "scale_z", "field": "height"}
                ]
            })
        );
    }

    #[test]
    fn test_init_spec_signals_evaluate() {
        let insight = Insight::new(Chart::Scatterplot, InsightColumns::default());
        let columns = SpecColumns::default();
        let options = SpecViewOptions::default();
        let context = SpecContext {
            insight: &insight,
            spec_columns: &columns,
            spec_view_options: &options,
        };
        let chart = init_spec(&context);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let host = crate::expression::eval::StaticContext::new();
        let values = crate::expression::eval::evaluate_signals(&chart, &[0], &host).unwrap();
        let width = values.get("width").and_then(|v| v.as_number());
        assert_eq!(width, Some(insight.size.width.max(MIN_FACET_WIDTH)));
    }

    #[test]
    fn test_result_serializes_by_outcome() {
        let failure = SpecResult::Failure {
            errors: vec!["Field y is required.".to_string()],
            spec_capabilities: SpecCapabilities::default(),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["errors"], json!(["Field y is required."]));
        assert!(value.get("document").is_none());
        assert_eq!(
            serde_json::from_value::<SpecResult>(value).unwrap(),
            failure
        );
    }
}
