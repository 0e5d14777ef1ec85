use crate::bin::{binnable, Binnable, DiscreteColumn};
use crate::constants::{field_names, signal_names};
use crate::facet_title::{facet_search_expression, facet_title_expression};
use crate::layouts::{Layout, LayoutBuildContext};
use crate::ordinal::create_ordinals_for_facet;
use crate::scope::{ChildScopeSpec, LayoutOutput, SignalPatch, SizeSignals, SpecFragment};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkFacetSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::lookup::LookupTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use log::debug;
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field, quote};

/// Fields every bucket row carries, looked up onto each data row
const CELL_FIELDS: [&str; 4] = [
    field_names::FACET_SEARCH,
    field_names::FACET_TITLE,
    field_names::WRAP_COL,
    field_names::WRAP_ROW,
];

/// One cell per bucket of `groupby`, flowing left to right then wrapping to a new row
#[derive(Debug, Clone, PartialEq)]
pub struct Wrap {
    pub groupby: DiscreteColumn,
}

impl Wrap {
    fn bin(&self, context: &LayoutBuildContext) -> Binnable {
        binnable(
            &format!("wrap_{}", context.id),
            &context.global_scope.data_name,
            &self.groupby,
        )
    }
}

impl Layout for Wrap {
    fn kind(&self) -> &'static str {
        "Wrap"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("wrap_{}", context.id);
        let wrap_data = format!("data_{prefix}_wrap");
        let facet_data = format!("data_{prefix}_facet");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;
        let bin = self.bin(context);

        let count = format!("{prefix}_count");
        let aspect = format!("{prefix}_aspect");
        let cols = format!("{prefix}_cols");
        let rows = format!("{prefix}_rows");
        let cell_width = format!("{prefix}_cell_width");
        let cell_height = format!("{prefix}_cell_height");
        let padding_x = signal_names::FACET_PADDING_LEFT;
        let padding_y = format!(
            "({} + {})",
            signal_names::FACET_PADDING_TOP,
            signal_names::FACET_PADDING_BOTTOM
        );

        let mut fragment = SpecFragment::default();
        let mut buckets = if bin.native {
            create_ordinals_for_facet(&global.data_name, &prefix, bin.field()).data
        } else {
            fragment
                .global_transforms
                .push((global.data_name.clone(), bin.transforms.clone()));
            fragment.global.signals.extend(bin.maxbins_signal.clone());
            bin.data_sequence
                .clone()
                .unwrap_or_else(|| DataSpec::new(&bin.domain_data_name))
        };
        let ordinal = datum_field(field_names::ORDINAL);
        buckets.transform.extend([
            TransformSpec::formula(facet_search_expression(&bin), field_names::FACET_SEARCH),
            TransformSpec::formula(facet_title_expression(&bin), field_names::FACET_TITLE),
            TransformSpec::formula(format!("({ordinal} - 1) % {cols}"), field_names::WRAP_COL),
            TransformSpec::formula(
                format!("floor(({ordinal} - 1) / {cols})"),
                field_names::WRAP_ROW,
            ),
        ]);
        let buckets_name = buckets.name.clone();
        debug!("Wrap {} reads its buckets from {}", prefix, buckets_name);
        fragment.global.data.push(buckets);

        fragment.global.signals.extend([
            SignalSpec::update(&count, format!("length(data({}))", quote(&buckets_name))),
            SignalSpec::update(
                &aspect,
                format!("({}) / ({})", size.layout_width, size.layout_height),
            ),
            SignalSpec::update(
                &cols,
                format!("max(1, min({count}, ceil(sqrt({count} * {aspect}))))"),
            ),
            SignalSpec::update(&rows, format!("max(1, ceil({count} / {cols}))")),
            SignalSpec::update(
                &cell_width,
                format!(
                    "max({}, ({}) / {cols} - {padding_x})",
                    signal_names::MIN_CELL_WIDTH,
                    size.layout_width
                ),
            ),
            SignalSpec::update(
                &cell_height,
                format!(
                    "max({}, ({}) / {rows} - {padding_y})",
                    signal_names::MIN_CELL_HEIGHT,
                    size.layout_height
                ),
            ),
        ]);
        fragment.signal_patches.extend([
            SignalPatch::max(
                signal_names::PLOT_WIDTH_OUT,
                format!("(({cell_width} + {padding_x}) * {cols})"),
            ),
            SignalPatch::max(
                signal_names::PLOT_HEIGHT_OUT,
                format!("(({cell_height} + {padding_y}) * {rows})"),
            ),
        ]);

        let cell_fields: Vec<Field> = CELL_FIELDS
            .iter()
            .map(|f| Field::String(f.to_string()))
            .collect();
        fragment.global.data.push(
            DataSpec::from_source(&wrap_data, &parent.data_name).with_transforms(vec![
                TransformSpec::Lookup(LookupTransformSpec {
                    from: buckets_name,
                    key: Field::String(escape_field(bin.field())),
                    fields: vec![Field::String(escape_field(bin.field()))],
                    values: Some(cell_fields),
                    as_: Some(CELL_FIELDS.iter().map(|f| f.to_string()).collect()),
                    default: None,
                    extra: Default::default(),
                }),
            ]),
        );

        let update = MarkEncodingsSpec::new()
            .with(
                "x",
                MarkEncodingSpec::signal(format!(
                    "{padding_x} + {} * ({cell_width} + {padding_x})",
                    datum_field(field_names::WRAP_COL)
                )),
            )
            .with(
                "y",
                MarkEncodingSpec::signal(format!(
                    "{} + {} * ({cell_height} + {padding_y})",
                    signal_names::FACET_PADDING_TOP,
                    datum_field(field_names::WRAP_ROW)
                )),
            )
            .with("height", MarkEncodingSpec::signal(&cell_height))
            .with("width", MarkEncodingSpec::signal(&cell_width));
        let mut groupby = bin.field_refs();
        groupby.extend(CELL_FIELDS.iter().map(|f| f.to_string()));
        let mut mark = MarkSpec::new("group", &prefix)
            .with_facet(MarkFacetSpec {
                name: facet_data.clone(),
                data: wrap_data,
                groupby,
                aggregate: None,
            })
            .with_update(update);
        mark.style = Some("cell".to_string());
        fragment.local.marks.push(mark);

        let mut size_signals = SizeSignals::new(&cell_width, &cell_height);
        size_signals.col_count = Some(cols);
        size_signals.row_count = Some(rows);
        let mut scope = ChildScopeSpec::new(&facet_data, size_signals);
        scope.group = Some(prefix);
        Ok(LayoutOutput { fragment, scope })
    }

    fn grouping(&self, context: &LayoutBuildContext) -> Option<Vec<String>> {
        Some(self.bin(context).fields)
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
    use rstest::rstest;
    use serde_json::json;

    fn wrap(type_: ColumnType) -> LayoutPair {
        LayoutPair::Wrap(Wrap {
            groupby: DiscreteColumn {
                column: Column::new("region", type_),
                default_bins: 10,
                maxbins: 100,
                maxbins_signal_name: signal_names::FACET_BINS.to_string(),
                maxbins_signal_display_name: "Facets max bins".to_string(),
            },
        })
    }

    #[test]
    fn test_native_wrap_cells() {
        let insight = Insight::new(Chart::Scatterplot, InsightColumns::default());
        let layouts = vec![wrap(ColumnType::String), LayoutPair::Square(Square::default())];
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &layouts);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());

        let cell = &scopes[0];
        assert_eq!(cell.data_name, "data_wrap_0_facet");
        assert_eq!(cell.size_signals.layout_width, "wrap_0_cell_width");
        assert_eq!(cell.size_signals.row_count.as_deref(), Some("wrap_0_rows"));

        let wrap_data = chart.get_nested_data(&[], "data_wrap_0_wrap").unwrap();
        assert_eq!(
            serde_json::to_value(&wrap_data.transform[0]).unwrap()["from"],
            json!("wrap_0_bin_order")
        );
        let buckets = chart.get_nested_data(&[], "wrap_0_bin_order").unwrap();
        assert_eq!(
            serde_json::to_value(buckets.transform.last().unwrap()).unwrap(),
            json!({
                "type": "formula",
                "expr": "floor((datum[\"__SandDance__Ordinal\"] - 1) / wrap_0_cols)",
                "as": "__SandDance__WrapRow"
            })
        );
    }

    #[rstest]
    #[case(7, 4.0, 2.0, 160.0, 230.0, 800.0, 600.0)]
    #[case(30, 7.0, 5.0, 140.0, 180.0, 1260.0, 1250.0)]
    #[case(0, 1.0, 1.0, 760.0, 530.0, 800.0, 600.0)]
    fn test_wrap_grid_size(
        #[case] buckets: usize,
        #[case] cols: f64,
        #[case] rows: f64,
        #[case] cell_width: f64,
        #[case] cell_height: f64,
        #[case] width_out: f64,
        #[case] height_out: f64,
    ) {
        let insight = Insight::new(Chart::Scatterplot, InsightColumns::default());
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &[wrap(ColumnType::String)]);
        let host = StaticContext::new().with_data_length("wrap_0_bin_order", buckets);
        let values = evaluate_signals(&chart, &scopes[0].path, &host).unwrap();
        let number = |name: &str| values.get(name).and_then(|v| v.as_number());
        assert_eq!(number("wrap_0_cols"), Some(cols));
        assert_eq!(number("wrap_0_rows"), Some(rows));
        assert_eq!(number("wrap_0_cell_width"), Some(cell_width));
        assert_eq!(number("wrap_0_cell_height"), Some(cell_height));
        assert_eq!(values.get("PlotWidthOut"), Some(&ExprValue::Number(width_out)));
        assert_eq!(values.get("PlotHeightOut"), Some(&ExprValue::Number(height_out)));
    }

    #[test]
    fn test_binned_wrap_uses_sequence() {
        let insight = Insight::new(Chart::Scatterplot, InsightColumns::default());
        let (chart, scopes) = run(&insight, &SpecColumns::default(), None, &[wrap(ColumnType::Number)]);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
        assert!(chart.get_nested_signal(&[], signal_names::FACET_BINS).is_ok());

        let group = chart.get_nested_group(&scopes[0].path).unwrap();
        let facet = group.from.clone().unwrap().facet.unwrap();
        assert_eq!(facet.data, "data_wrap_0_wrap");
        assert_eq!(
            &facet.groupby[..2],
            &["wrap_0_bin_region".to_string(), "wrap_0_bin_region_end".to_string()]
        );
    }
}
