use crate::bin::Binnable;
use crate::constants::{data_names, field_names, signal_names};
use crate::defaults::FACET_TITLE_LIMIT;
use crate::scope::{SizeSignals, TitleSource};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use sanddance_common::escape::{datum_field, quote};

/// Vega expression building the search clauses that select one facet bucket
pub fn facet_search_expression(bin: &Binnable) -> String {
    let name = quote(&bin.column().name);
    if bin.native {
        return format!(
            "{{name: {name}, operator: '==', value: {}}}",
            datum_field(bin.field())
        );
    }
    let upper_operator = format!("{} ? '<=' : '<'", datum_field(field_names::LAST));
    format!(
        "[{{name: {name}, operator: '>=', value: {}}}, {{name: {name}, operator: {upper_operator}, value: {}, clause: '&&'}}]",
        datum_field(&bin.fields[0]),
        datum_field(&bin.fields[1]),
    )
}

/// Vega expression producing the display text of one facet bucket
pub fn facet_title_expression(bin: &Binnable) -> String {
    if bin.native {
        return format!("'' + {}", datum_field(bin.field()));
    }
    format!(
        "format({}, '~r') + ' - ' + format({}, '~r')",
        datum_field(&bin.fields[0]),
        datum_field(&bin.fields[1]),
    )
}

fn title_text(text: MarkEncodingSpec) -> MarkEncodingsSpec {
    MarkEncodingsSpec::new()
        .with("text", text)
        .with("align", MarkEncodingSpec::value("center"))
        .with("baseline", MarkEncodingSpec::value("middle"))
        .with("fontSize", MarkEncodingSpec::signal(signal_names::TEXT_SIZE))
}

/// Title drawn centered above each facet cell, reading the cell's bucket from its group datum
pub fn cell_title_mark(size_signals: &SizeSignals) -> MarkSpec {
    let update = title_text(MarkEncodingSpec::signal(format!(
        "parent[{}]",
        quote(field_names::FACET_TITLE)
    )))
    .with(
        "x",
        MarkEncodingSpec::signal(format!("({}) / 2", size_signals.layout_width)),
    )
    .with(
        "y",
        MarkEncodingSpec::signal(format!("-{} / 2", signal_names::FACET_PADDING_TOP)),
    )
    .with(
        "limit",
        MarkEncodingSpec::signal(format!(
            "max({FACET_TITLE_LIMIT}, {})",
            size_signals.layout_width
        )),
    );
    MarkSpec::unnamed("text").with_update(update)
}

/// Column and row titles of a grid facet, as data aliases plus marks for the plot group
pub fn col_row_titles(x: &TitleSource, y: &TitleSource) -> (Vec<DataSpec>, Vec<MarkSpec>) {
    let data = vec![
        DataSpec::from_source(data_names::FACET_CELL_COL_TITLES, &x.data_name),
        DataSpec::from_source(data_names::FACET_CELL_ROW_TITLES, &y.data_name),
    ];
    let text = || MarkEncodingSpec::field(field_names::FACET_TITLE);

    let col = MarkSpec::unnamed("text")
        .with_from_data(data_names::FACET_CELL_COL_TITLES)
        .with_update(
            title_text(text())
                .with(
                    "x",
                    MarkEncodingSpec::signal(format!("{} + {} / 2", x.offset, x.cell_size)),
                )
                .with(
                    "y",
                    MarkEncodingSpec::signal(format!("{} / 2", signal_names::FACET_PADDING_TOP)),
                )
                .with("limit", MarkEncodingSpec::signal(x.cell_size.clone())),
        );
    let row = MarkSpec::unnamed("text")
        .with_from_data(data_names::FACET_CELL_ROW_TITLES)
        .with_update(
            title_text(text())
                .with(
                    "x",
                    MarkEncodingSpec::signal(format!("{} / 2", signal_names::FACET_PADDING_LEFT)),
                )
                .with(
                    "y",
                    MarkEncodingSpec::signal(format!("{} + {} / 2", y.offset, y.cell_size)),
                )
                .with("angle", MarkEncodingSpec::value(-90))
                .with("limit", MarkEncodingSpec::signal(y.cell_size.clone())),
        );
    (data, vec![col, row])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin::{binnable, DiscreteColumn};
    use crate::expression::parse;
    use crate::types::{Column, ColumnType};

    fn bin_for(type_: ColumnType) -> Binnable {
        let discrete = DiscreteColumn {
            column: Column::new("Region.Name", type_),
            default_bins: 10,
            maxbins: 100,
            maxbins_signal_name: "RoleFacet_BinsSignal".to_string(),
            maxbins_signal_display_name: "Facets max bins".to_string(),
        };
        binnable("wrap_0", "data_source", &discrete)
    }

    #[test]
    fn test_native_search_is_single_clause() {
        let bin = bin_for(ColumnType::String);
        let expr = facet_search_expression(&bin);
        assert_eq!(
            expr,
            r#"{name: "Region.Name", operator: '==', value: datum["Region.Name"]}"#
        );
        assert!(parse(&expr).is_ok());
        assert!(parse(&facet_title_expression(&bin)).is_ok());
    }

    #[test]
    fn test_binned_search_closes_last_bucket() {
        let bin = bin_for(ColumnType::Number);
        let expr = facet_search_expression(&bin);
        assert!(expr.contains("datum[\"__SandDance__Last\"] ? '<=' : '<'"));
        assert!(expr.contains("datum[\"wrap_0_bin_Region_Name_end\"]"));
        assert!(parse(&expr).is_ok());
        assert!(parse(&facet_title_expression(&bin)).is_ok());
    }
}
