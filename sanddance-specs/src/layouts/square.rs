use crate::constants::scale_names;
use crate::layouts::{Layout, LayoutBuildContext};
use crate::scope::{ChildScopeSpec, GlobalScales, LayoutOutput, SizeSignals, SpecFragment};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use crate::types::Column;
use crate::zbase::{add_z_scale, with_depth, z_size};
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field, quote};

/// Order in which units fill a band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillDirection {
    /// Rows left to right, stacked downward
    #[default]
    RightDown,
    /// Rows left to right, stacked upward from the bottom
    RightUp,
    /// Columns top to bottom, stacked rightward
    DownRight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SquareMarkType {
    Group,
    #[default]
    Rect,
}

impl SquareMarkType {
    fn name(&self) -> &'static str {
        match self {
            SquareMarkType::Group => "group",
            SquareMarkType::Rect => "rect",
        }
    }
}

/// Packs one unit per row into a near-square grid filling the parent band
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Square {
    pub sort_by: Option<Column>,
    pub fill_direction: FillDirection,
    pub mark_type: SquareMarkType,
}

struct SquareNames {
    prefix: String,
    data_name: String,
    aspect: String,
    squares_per_band: String,
    index: String,
    gap: String,
    size: String,
    levels: String,
    level_size: String,
}

impl SquareNames {
    fn new(id: usize) -> Self {
        let prefix = format!("square_{id}");
        Self {
            data_name: format!("facet_{prefix}"),
            aspect: format!("{prefix}_aspect"),
            squares_per_band: format!("{prefix}_squares_per_band"),
            index: format!("{prefix}_index"),
            gap: format!("{prefix}_gap"),
            size: format!("{prefix}_size"),
            levels: format!("{prefix}_levels"),
            level_size: format!("{prefix}_levelsize"),
            prefix,
        }
    }
}

impl Square {
    fn band_width(&self, size: &SizeSignals) -> String {
        match self.fill_direction {
            FillDirection::DownRight => size.layout_height.clone(),
            _ => size.layout_width.clone(),
        }
    }

    /// Grid signals; every division is guarded so an empty parent yields zero sizes
    fn signals(&self, names: &SquareNames, band_width: &str, max_units: &str, aspect: &str, common_size: &str) -> Vec<SignalSpec> {
        vec![
            SignalSpec::update(
                &names.aspect,
                format!("isFinite({aspect}) && ({aspect}) > 0 ? {aspect} : 1"),
            ),
            SignalSpec::update(
                &names.squares_per_band,
                format!(
                    "max(1, min({max_units}, ceil(sqrt(({max_units})*{}))))",
                    names.aspect
                ),
            ),
            SignalSpec::update(
                &names.gap,
                format!(
                    "{spb} > 1 ? min(0.1*(({band_width})/({spb}-1)),1) : 0",
                    spb = names.squares_per_band
                ),
            ),
            SignalSpec::update(
                &names.size,
                format!(
                    "({max_units}) > 0 ? max(0, ({band_width})/{}-{}) : 0",
                    names.squares_per_band, names.gap
                ),
            ),
            SignalSpec::update(
                &names.levels,
                format!("max(1, ceil(({max_units})/{}))", names.squares_per_band),
            ),
            SignalSpec::update(
                &names.level_size,
                format!(
                    "({max_units}) > 0 ? max(0, (({common_size})/{})-{}) : 0",
                    names.levels, names.gap
                ),
            ),
        ]
    }

    fn encode_xy(&self, names: &SquareNames, band_width: &str, parent: &SizeSignals) -> (String, String) {
        let index = datum_field(&names.index);
        let compartment = format!(
            "({band_width})/{spb}*(({index}-1)%{spb})",
            spb = names.squares_per_band
        );
        let level = format!("floor(({index}-1)/{})", names.squares_per_band);
        let level_offset = format!("{level}*({}+{})", names.level_size, names.gap);
        match self.fill_direction {
            FillDirection::DownRight => (level_offset, compartment),
            FillDirection::RightUp => (
                compartment,
                format!(
                    "({})-{}-{level_offset}",
                    parent.layout_height, names.level_size
                ),
            ),
            FillDirection::RightDown => (compartment, level_offset),
        }
    }
}

impl Layout for Square {
    fn kind(&self) -> &'static str {
        "Square"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let names = SquareNames::new(context.id);
        let parent = context.parent_scope;
        let global = context.global_scope;
        let band_width = self.band_width(&parent.size_signals);

        let (max_units, aspect, common_size) = match &parent.grouped_units {
            Some(grouped) => (
                grouped.max_units_signal.clone(),
                grouped.aspect.clone(),
                grouped.common_size.clone(),
            ),
            None => {
                let global_size = &global.size_signals;
                let denominator = match self.fill_direction {
                    FillDirection::DownRight => &global_size.layout_width,
                    _ => &global_size.layout_height,
                };
                let common = match self.fill_direction {
                    FillDirection::DownRight => &parent.size_signals.layout_width,
                    _ => &parent.size_signals.layout_height,
                };
                (
                    format!("length(data({}))", quote(&parent.data_name)),
                    format!("({})/({denominator})", global_size.layout_width),
                    common.clone(),
                )
            }
        };

        let mut transforms = Vec::new();
        if let Some(sort_by) = &self.sort_by {
            transforms.push(TransformSpec::Collect(CollectTransformSpec {
                sort: CompareSpec::ascending(escape_field(&sort_by.name)),
                extra: Default::default(),
            }));
        }
        let mut window = WindowTransformSpec::row_number(&names.index);
        let ancestors = context.ancestor_fields();
        if !ancestors.is_empty() {
            window.groupby = Some(
                ancestors
                    .iter()
                    .map(|f| Field::String(escape_field(f)))
                    .collect(),
            );
        }
        transforms.push(TransformSpec::Window(window));

        let mut fragment = SpecFragment::default();
        fragment.local.data.push(
            DataSpec::from_source(&names.data_name, &parent.data_name).with_transforms(transforms),
        );
        fragment.local.signals = self.signals(&names, &band_width, &max_units, &aspect, &common_size);

        let (x, y) = self.encode_xy(&names, &band_width, &parent.size_signals);
        let (height, width) = match self.fill_direction {
            FillDirection::DownRight => (&names.size, &names.level_size),
            _ => (&names.level_size, &names.size),
        };
        let z = context.spec_context.spec_columns.z.as_ref();
        let update = MarkEncodingsSpec::new()
            .with("x", MarkEncodingSpec::signal(x))
            .with("y", MarkEncodingSpec::signal(y))
            .with("height", MarkEncodingSpec::signal(height))
            .with("width", MarkEncodingSpec::signal(width));
        let update = with_depth(update, z, scale_names::Z);
        fragment.local.marks.push(
            MarkSpec::new(self.mark_type.name(), &names.prefix)
                .with_from_data(&names.data_name)
                .with_update(update),
        );

        let mut scope = ChildScopeSpec::new(
            &names.data_name,
            SizeSignals::new(&names.size, &names.size),
        );
        match self.mark_type {
            SquareMarkType::Group => scope.group = Some(names.prefix.clone()),
            SquareMarkType::Rect => scope.mark = Some(names.prefix.clone()),
        }
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
    use crate::bin::DiscreteColumn;
    use crate::expression::eval::{evaluate, evaluate_signals, ExprValue, StaticContext};
    use crate::expression::parse;
    use crate::layouts::bar::Bar;
    use crate::layouts::test_support::run;
    use crate::layouts::{LayoutPair, Orientation};
    use crate::spec::mark::MarkEncodingOrList;
    use crate::types::{Chart, ColumnType, Insight, InsightColumns, SpecColumns};
    use float_cmp::approx_eq;
    use indexmap::IndexMap;
    use rstest::rstest;

    fn number(values: &IndexMap<String, ExprValue>, name: &str) -> f64 {
        values
            .get(name)
            .and_then(|v| v.as_number())
            .unwrap_or_else(|| panic!("{name} is not a number"))
    }

    fn bar_then_square() -> Vec<LayoutPair> {
        vec![
            LayoutPair::Bar(Bar {
                orientation: Orientation::Vertical,
                groupby: DiscreteColumn {
                    column: Column::new("kind", ColumnType::String),
                    default_bins: 10,
                    maxbins: 100,
                    maxbins_signal_name: "RoleX_BinsSignal".to_string(),
                    maxbins_signal_display_name: "X axis max bins".to_string(),
                },
                sum_by: None,
                min_band_width: 15.0,
            }),
            LayoutPair::Square(Square {
                fill_direction: FillDirection::RightUp,
                ..Default::default()
            }),
        ]
    }

    fn evaluate_grid(max_units: f64) -> IndexMap<String, ExprValue> {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &bar_then_square());
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let mut parent = IndexMap::new();
        parent.insert("count".to_string(), ExprValue::Number(max_units));
        let host = StaticContext::new()
            .with_signal(
                "bar_0_count_extent",
                ExprValue::Array(vec![ExprValue::Number(0.0), ExprValue::Number(max_units)]),
            )
            .with_signal("parent", ExprValue::Object(parent))
            .with_data_length("bar_0_accumulative", 4)
            .with_bandwidth("bar_0_scale_x", 120.0);
        evaluate_signals(&chart, &scopes[0].path, &host).unwrap()
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(250.0)]
    fn test_grid_signals_are_finite(#[case] max_units: f64) {
        let values = evaluate_grid(max_units);
        for name in [
            "square_1_aspect",
            "square_1_squares_per_band",
            "square_1_gap",
            "square_1_size",
            "square_1_levels",
            "square_1_levelsize",
        ] {
            assert!(number(&values, name).is_finite(), "{name} is not finite");
        }
    }

    #[test]
    fn test_zero_units_have_zero_size() {
        let values = evaluate_grid(0.0);
        assert!(approx_eq!(f64, number(&values, "square_1_size"), 0.0));
        assert!(approx_eq!(f64, number(&values, "square_1_levelsize"), 0.0));
    }

    #[test]
    fn test_one_unit_fills_band() {
        let values = evaluate_grid(1.0);
        assert!(approx_eq!(f64, number(&values, "square_1_squares_per_band"), 1.0));
        assert!(approx_eq!(f64, number(&values, "square_1_levels"), 1.0));
        assert!(approx_eq!(f64, number(&values, "square_1_gap"), 0.0));
        assert!(approx_eq!(f64, number(&values, "square_1_size"), 120.0));
        assert!(approx_eq!(f64, number(&values, "square_1_levelsize"), 600.0));
    }

    /// Position of the unit numbered `index` in a Square placed directly under the plot
    fn unit_position(fill_direction: FillDirection, units: usize, index: f64) -> (f64, f64, IndexMap<String, ExprValue>) {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let layouts = vec![LayoutPair::Square(Square {
            fill_direction,
            ..Default::default()
        })];
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &layouts);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let host = StaticContext::new().with_data_length("data_source", units);
        let values = evaluate_signals(&chart, &scopes[0].path, &host).unwrap();

        let mark = chart
            .get_nested_group(&scopes[0].path)
            .unwrap()
            .marks
            .iter()
            .find(|m| m.name.as_deref() == Some("square_0"))
            .unwrap();
        let update = mark.encode.as_ref().unwrap().encodings.get("update").unwrap();
        let channel = |name: &str| match update.get(name).unwrap() {
            MarkEncodingOrList::Scalar(encoding) => encoding.signal.clone().unwrap(),
            MarkEncodingOrList::List(_) => panic!("{name} has encoding rules"),
        };

        let mut datum = IndexMap::new();
        datum.insert("square_0_index".to_string(), ExprValue::Number(index));
        let mut signals = values.clone();
        signals.insert("datum".to_string(), ExprValue::Object(datum));
        let row = StaticContext {
            signals,
            ..host
        };
        let position = |name: &str| {
            evaluate(&parse(&channel(name)).unwrap(), &row)
                .unwrap()
                .as_number()
                .unwrap()
        };
        (position("x"), position("y"), values)
    }

    #[rstest]
    #[case(FillDirection::RightDown, 1)]
    #[case(FillDirection::RightDown, 250)]
    #[case(FillDirection::RightUp, 1)]
    #[case(FillDirection::RightUp, 250)]
    #[case(FillDirection::DownRight, 250)]
    fn test_first_unit_position(#[case] fill_direction: FillDirection, #[case] units: usize) {
        let (x, y, values) = unit_position(fill_direction, units, 1.0);
        assert!(approx_eq!(f64, x, 0.0), "x is {x}");
        let expected_y = match fill_direction {
            FillDirection::RightUp => 600.0 - number(&values, "square_0_levelsize"),
            _ => 0.0,
        };
        assert!(approx_eq!(f64, y, expected_y), "y is {y}, expected {expected_y}");
    }

    #[test]
    fn test_next_level_starts_a_new_row() {
        let (_, _, values) = unit_position(FillDirection::RightDown, 250, 1.0);
        let per_band = number(&values, "square_0_squares_per_band");
        let level_step = number(&values, "square_0_levelsize") + number(&values, "square_0_gap");

        let (x, y, _) = unit_position(FillDirection::RightDown, 250, per_band + 1.0);
        assert!(approx_eq!(f64, x, 0.0), "x is {x}");
        assert!(approx_eq!(f64, y, level_step), "y is {y}");

        let (x, y, _) = unit_position(FillDirection::RightUp, 250, per_band + 1.0);
        assert!(approx_eq!(f64, x, 0.0), "x is {x}");
        let bottom = 600.0 - number(&values, "square_0_levelsize");
        assert!(approx_eq!(f64, y, bottom - level_step, epsilon = 1e-9), "y is {y}");
    }

    #[test]
    fn test_square_sorts_and_numbers_rows() {
        let insight = Insight::new(Chart::BarchartV, InsightColumns::default());
        let mut layouts = bar_then_square();
        if let LayoutPair::Square(square) = &mut layouts[1] {
            square.sort_by = Some(Column::new("Sort.Key", ColumnType::Number));
        }
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &layouts);
        let data = chart.get_nested_data(&scopes[0].path, "facet_square_1").unwrap();
        assert_eq!(
            serde_json::to_value(&data.transform).unwrap(),
            serde_json::json!([
                {"type": "collect", "sort": {"field": "Sort\\.Key"}},
                {"type": "window", "ops": ["row_number"], "as": ["square_1_index"], "groupby": ["kind"]}
            ])
        );
        let mark = scopes[1].mark.as_ref().unwrap();
        assert_eq!(mark.name, "square_1");
        assert_eq!(mark.path, scopes[0].path);
    }
}
