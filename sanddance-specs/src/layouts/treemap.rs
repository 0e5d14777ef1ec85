use crate::constants::{field_names, scale_names, signal_names};
use crate::layouts::{Layout, LayoutBuildContext};
use crate::scope::{ChildScopeSpec, GlobalScales, LayoutOutput, SpecFragment};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::spec::transform::nest::NestTransformSpec;
use crate::spec::transform::treemap::TreemapTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field, NumberOrSignalSpec, SignalExpressionSpec, StringOrSignalSpec};
use crate::types::Column;
use crate::zbase::{add_z_scale, with_depth, z_size};
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field};
use serde_json::Value;

/// Tiling methods offered by the method signal, the first being the default
pub const TREEMAP_METHODS: [&str; 2] = ["squarify", "binary"];

/// Where the first tile is anchored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Corner {
    #[default]
    TopLeft,
    BottomLeft,
}

/// Tiles the parent region with one rectangle per row, area proportional to its weight
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Treemap {
    pub corner: Corner,

    /// Row weight; every row weighs the same when absent
    pub size: Option<Column>,

    /// Optional column whose values are tiled as contiguous blocks
    pub group_by: Option<Column>,
}

fn method_signal(language_name: &str) -> SignalSpec {
    SignalSpec::value(
        signal_names::TREE_MAP_METHOD,
        Value::String(TREEMAP_METHODS[0].to_string()),
    )
    .with_bind(SignalBindSpec::select(
        language_name,
        TREEMAP_METHODS
            .iter()
            .map(|m| Value::String(m.to_string()))
            .collect(),
    ))
}

impl Layout for Treemap {
    fn kind(&self) -> &'static str {
        "Treemap"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("treemap_{}", context.id);
        let data_name = format!("data_{prefix}");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;

        let mut transforms = Vec::new();
        let weight = match &self.size {
            Some(column) => {
                // zero or negative weights have no area
                transforms.push(TransformSpec::filter(format!(
                    "{} > 0",
                    datum_field(&column.name)
                )));
                escape_field(&column.name)
            }
            None => {
                transforms.push(TransformSpec::formula("1", field_names::COUNT));
                field_names::COUNT.to_string()
            }
        };
        transforms.push(TransformSpec::Nest(NestTransformSpec {
            keys: self
                .group_by
                .iter()
                .map(|c| Field::String(escape_field(&c.name)))
                .collect(),
            generate: None,
            extra: Default::default(),
        }));
        transforms.push(TransformSpec::Treemap(TreemapTransformSpec {
            field: Some(Field::String(weight)),
            sort: Some(CompareSpec::descending("value")),
            method: Some(StringOrSignalSpec::Signal(SignalExpressionSpec::new(
                signal_names::TREE_MAP_METHOD,
            ))),
            padding: None,
            round: Some(true),
            size: Some([
                NumberOrSignalSpec::signal(&size.layout_width),
                NumberOrSignalSpec::signal(&size.layout_height),
            ]),
            extra: Default::default(),
        }));

        let mut fragment = SpecFragment::default();
        fragment.global.signals.push(method_signal(
            &context.spec_context.spec_view_options.language.tree_map_method,
        ));
        fragment
            .local
            .data
            .push(DataSpec::from_source(&data_name, &parent.data_name).with_transforms(transforms));

        let [x0, y0, x1, y1] = ["x0", "y0", "x1", "y1"].map(datum_field);
        let y = match self.corner {
            Corner::TopLeft => MarkEncodingSpec::signal(y0.clone()),
            Corner::BottomLeft => {
                MarkEncodingSpec::signal(format!("({}) - {y1}", size.layout_height))
            }
        };
        let update = MarkEncodingsSpec::new()
            .with("x", MarkEncodingSpec::signal(x0.clone()))
            .with("y", y)
            .with("height", MarkEncodingSpec::signal(format!("{y1} - {y0}")))
            .with("width", MarkEncodingSpec::signal(format!("{x1} - {x0}")));
        let z = context.spec_context.spec_columns.z.as_ref();
        fragment.local.marks.push(
            MarkSpec::new("rect", &prefix)
                .with_from_data(&data_name)
                .with_update(with_depth(update, z, scale_names::Z)),
        );

        let mut scope = ChildScopeSpec::new(&data_name, size.clone());
        scope.mark = Some(prefix);
        let z_scale = add_z_scale(
            z,
            &z_size(&context.spec_context, &global.size_signals.layout_height),
            &global.data_name,
            scale_names::Z,
        );
        if z_scale.is_some() {
            scope.global_scales = Some(GlobalScales {
                show_axes: false,
                z: z_scale,
                ..Default::default()
            });
        }
        Ok(LayoutOutput { fragment, scope })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts::test_support::run;
    use crate::layouts::LayoutPair;
    use crate::types::{Chart, ColumnType, Insight, InsightColumns, SpecColumns};
    use serde_json::json;

    #[test]
    fn test_grouped_weighted_treemap() {
        let insight = Insight::new(Chart::Treemap, InsightColumns::default());
        let layout = LayoutPair::Treemap(Treemap {
            corner: Corner::TopLeft,
            size: Some(Column::new("Sales $", ColumnType::Number)),
            group_by: Some(Column::new("region", ColumnType::String)),
        });
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &[layout]);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let data = chart.get_nested_data(&[0], "data_treemap_0").unwrap();
        assert_eq!(
            serde_json::to_value(&data.transform).unwrap(),
            json!([
                {"type": "filter", "expr": "datum[\"Sales $\"] > 0"},
                {"type": "nest", "keys": ["region"]},
                {
                    "type": "treemap",
                    "field": "Sales $",
                    "sort": {"field": "value", "order": "descending"},
                    "method": {"signal": "Chart_TreeMapMethodSignal"},
                    "round": true,
                    "size": [{"signal": "PlotWidthIn"}, {"signal": "PlotHeightIn"}]
                }
            ])
        );
        let signal = chart
            .get_nested_signal(&[], signal_names::TREE_MAP_METHOD)
            .unwrap();
        assert_eq!(signal.value, Some(json!("squarify")));
        assert_eq!(scopes[0].mark.as_ref().unwrap().name, "treemap_0");
    }

    #[test]
    fn test_bottom_left_flips_rows() {
        let insight = Insight::new(Chart::Treemap, InsightColumns::default());
        let layout = LayoutPair::Treemap(Treemap {
            corner: Corner::BottomLeft,
            ..Default::default()
        });
        let (chart, _) = run(&insight, &SpecColumns::default(), None, &[layout]);
        let mark = &chart.get_nested_group(&[0]).unwrap().marks[0];
        let update = serde_json::to_value(&mark.encode).unwrap();
        assert_eq!(
            update["update"]["y"]["signal"],
            json!(r#"(PlotHeightIn) - datum["y1"]"#)
        );
        let data = chart.get_nested_data(&[0], "data_treemap_0").unwrap();
        assert_eq!(
            serde_json::to_value(&data.transform[1]).unwrap(),
            json!({"type": "nest"})
        );
    }
}
