use crate::layouts::{Layout, LayoutBuildContext};
use crate::scope::{ChildScopeSpec, LayoutOutput, SizeSignals, SpecFragment};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use crate::types::Column;
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field, quote};

/// Piles units into a cube per cell: columns and rows on the floor, levels rising upward
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    pub sort_by: Option<Column>,
}

struct StackNames {
    prefix: String,
    data_name: String,
    index: String,
    column: String,
    row: String,
    level: String,
    units: String,
    cube_root: String,
    side: String,
    size: String,
}

impl StackNames {
    fn new(id: usize) -> Self {
        let prefix = format!("stack_{id}");
        Self {
            data_name: format!("facet_{prefix}"),
            index: format!("{prefix}_index"),
            column: format!("{prefix}_column"),
            row: format!("{prefix}_row"),
            level: format!("{prefix}_level"),
            units: format!("{prefix}_units"),
            cube_root: format!("{prefix}_cube_root"),
            side: format!("{prefix}_side"),
            size: format!("{prefix}_size"),
            prefix,
        }
    }
}

impl Stack {
    /// Cube sizing; the side is the smallest whole number whose cube holds the fullest cell
    fn signals(&self, names: &StackNames, max_units: &str, size: &SizeSignals) -> Vec<SignalSpec> {
        let root = &names.cube_root;
        vec![
            SignalSpec::update(&names.units, format!("max(0, {max_units})")),
            SignalSpec::update(root, format!("round(pow({}, 1/3))", names.units)),
            SignalSpec::update(
                &names.side,
                format!(
                    "max(1, {root}*{root}*{root} < {units} ? {root}+1 : {root})",
                    units = names.units
                ),
            ),
            SignalSpec::update(
                &names.size,
                format!(
                    "{} > 0 ? max(0, min({}, {})/{}) : 0",
                    names.units, size.layout_width, size.layout_height, names.side
                ),
            ),
        ]
    }

    fn transforms(&self, names: &StackNames, ancestors: &[String]) -> Vec<TransformSpec> {
        let mut transforms = Vec::new();
        if let Some(sort_by) = &self.sort_by {
            transforms.push(TransformSpec::Collect(CollectTransformSpec {
                sort: CompareSpec::ascending(escape_field(&sort_by.name)),
                extra: Default::default(),
            }));
        }
        let mut window = WindowTransformSpec::row_number(&names.index);
        if !ancestors.is_empty() {
            window.groupby = Some(
                ancestors
                    .iter()
                    .map(|f| Field::String(escape_field(f)))
                    .collect(),
            );
        }
        transforms.push(TransformSpec::Window(window));

        let position = format!("({}-1)", datum_field(&names.index));
        let side = &names.side;
        transforms.extend([
            TransformSpec::formula(format!("{position}%{side}"), &names.column),
            TransformSpec::formula(format!("floor({position}/{side})%{side}"), &names.row),
            TransformSpec::formula(format!("floor({position}/({side}*{side}))"), &names.level),
        ]);
        transforms
    }
}

impl Layout for Stack {
    fn kind(&self) -> &'static str {
        "Stack"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let names = StackNames::new(context.id);
        let parent = context.parent_scope;
        let size = &parent.size_signals;
        let max_units = match &parent.grouped_units {
            Some(grouped) => grouped.max_units_signal.clone(),
            None => format!("length(data({}))", quote(&parent.data_name)),
        };

        let mut fragment = SpecFragment::default();
        fragment.local.data.push(
            DataSpec::from_source(&names.data_name, &parent.data_name)
                .with_transforms(self.transforms(&names, &context.ancestor_fields())),
        );
        fragment.local.signals = self.signals(&names, &max_units, size);

        let unit = &names.size;
        let update = MarkEncodingsSpec::new()
            .with(
                "x",
                MarkEncodingSpec::signal(format!("{}*{unit}", datum_field(&names.column))),
            )
            .with(
                "y",
                MarkEncodingSpec::signal(format!(
                    "({})-({}+1)*{unit}",
                    size.layout_height,
                    datum_field(&names.level)
                )),
            )
            .with(
                "z",
                MarkEncodingSpec::signal(format!("{}*{unit}", datum_field(&names.row))),
            )
            .with("height", MarkEncodingSpec::signal(unit))
            .with("width", MarkEncodingSpec::signal(unit))
            .with("depth", MarkEncodingSpec::signal(unit));
        fragment.local.marks.push(
            MarkSpec::new("rect", &names.prefix)
                .with_from_data(&names.data_name)
                .with_update(update),
        );

        let mut scope = ChildScopeSpec::new(&names.data_name, SizeSignals::new(unit, unit));
        scope.mark = Some(names.prefix.clone());
        Ok(LayoutOutput { fragment, scope })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::eval::{evaluate, evaluate_signals, ExprValue, StaticContext};
    use crate::expression::parse;
    use crate::layouts::test_support::run;
    use crate::layouts::LayoutPair;
    use crate::spec::chart::ChartSpec;
    use crate::types::{Chart, Insight, InsightColumns, SpecColumns};
    use indexmap::IndexMap;
    use rstest::rstest;

    fn stack_under_plot(units: usize) -> (ChartSpec, IndexMap<String, ExprValue>, StaticContext) {
        let insight = Insight::new(Chart::Stacks, InsightColumns::default());
        let layouts = vec![LayoutPair::Stack(Stack::default())];
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &layouts);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
        assert_eq!(scopes[0].mark.as_ref().unwrap().name, "stack_0");

        let host = StaticContext::new().with_data_length("data_source", units);
        let values = evaluate_signals(&chart, &scopes[0].path, &host).unwrap();
        (chart, values, host)
    }

    #[rstest]
    #[case(0, 1.0)]
    #[case(1, 1.0)]
    #[case(8, 2.0)]
    #[case(9, 3.0)]
    #[case(27, 3.0)]
    #[case(64, 4.0)]
    #[case(65, 5.0)]
    fn test_cube_side_holds_every_unit(#[case] units: usize, #[case] side: f64) {
        let (_, values, _) = stack_under_plot(units);
        assert_eq!(values.get("stack_0_side"), Some(&ExprValue::Number(side)));
    }

    #[test]
    fn test_empty_cell_has_zero_size() {
        let (_, values, _) = stack_under_plot(0);
        assert_eq!(values.get("stack_0_size"), Some(&ExprValue::Number(0.0)));
    }

    #[test]
    fn test_units_fill_floor_before_rising() {
        let (chart, values, host) = stack_under_plot(27);
        // the plot is 800 by 600, so a side of 3 gives 200 per unit
        assert_eq!(values.get("stack_0_size"), Some(&ExprValue::Number(200.0)));

        let data = chart.get_nested_data(&[0], "facet_stack_0").unwrap();
        let formulas: Vec<(String, String)> = data
            .transform
            .iter()
            .filter_map(|t| match t {
                TransformSpec::Formula(formula) => Some((formula.as_.clone(), formula.expr.clone())),
                _ => None,
            })
            .collect();
        let mark = &chart.get_nested_group(&[0]).unwrap().marks[0];
        let update = mark.encode.as_ref().unwrap().encodings.get("update").unwrap();

        let place = |index: f64| {
            let mut datum = IndexMap::new();
            datum.insert("stack_0_index".to_string(), ExprValue::Number(index));
            let mut signals = values.clone();
            for (field, expr) in &formulas {
                signals.insert("datum".to_string(), ExprValue::Object(datum.clone()));
                let context = StaticContext {
                    signals: signals.clone(),
                    ..host.clone()
                };
                let value = evaluate(&parse(expr).unwrap(), &context).unwrap();
                datum.insert(field.clone(), value);
            }
            signals.insert("datum".to_string(), ExprValue::Object(datum));
            let context = StaticContext {
                signals,
                ..host.clone()
            };
            ["x", "y", "z"].map(|channel| {
                let encoding = update.get(channel).unwrap().to_vec().remove(0);
                evaluate(&parse(&encoding.signal.unwrap()).unwrap(), &context)
                    .unwrap()
                    .as_number()
                    .unwrap()
            })
        };

        assert_eq!(place(1.0), [0.0, 400.0, 0.0]);
        assert_eq!(place(3.0), [400.0, 400.0, 0.0]);
        assert_eq!(place(4.0), [0.0, 400.0, 200.0]);
        assert_eq!(place(10.0), [0.0, 200.0, 0.0]);
        assert_eq!(place(27.0), [400.0, 0.0, 400.0]);
    }
}
