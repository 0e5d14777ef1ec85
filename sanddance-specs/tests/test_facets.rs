mod util;

use sanddance_specs::spec::chart::ChartSpec;
use serde_json::json;
use util::{document, insight};

fn group_names(chart: &ChartSpec, path: &[u32]) -> Vec<String> {
    chart
        .get_nested_group(path)
        .unwrap()
        .marks
        .iter()
        .filter_map(|m| m.name.clone())
        .collect()
}

mod test_wrap {
    use crate::*;

    #[test]
    fn bars_inside_wrapped_cells() {
        let chart = document(&insight(json!({
            "chart": "barchartV",
            "columns": {"x": "age", "facet": "region"}
        })));
        assert_eq!(group_names(&chart, &[0]), vec!["wrap_0".to_string()]);
        assert!(chart.get_nested_data(&[], "wrap_0_bin_order").is_ok());
        assert_eq!(
            chart.get_nested_signal(&[], "PlotOffsetTop").unwrap().update.as_deref(),
            Some("40")
        );
        assert_eq!(
            chart.get_nested_signal(&[], "PlotOffsetRight").unwrap().update.as_deref(),
            Some("80")
        );

        // the cell carries its own title next to the bar layout
        let cell = chart.get_nested_group(&[0, 0]).unwrap();
        let types: Vec<_> = cell.marks.iter().map(|m| m.type_.as_str()).collect();
        assert!(types.contains(&"text"));
        assert!(!cell.axes.is_empty());
        assert!(chart.get_nested_group(&[0]).unwrap().axes.is_empty());
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn cross_style_without_vertical_column_wraps() {
        let chart = document(&insight(json!({
            "chart": "scatterplot",
            "facetStyle": "cross",
            "columns": {"x": "age", "y": "income", "facet": "region"}
        })));
        assert_eq!(group_names(&chart, &[0]), vec!["wrap_0".to_string()]);
    }
}

mod test_cross {
    use crate::*;

    #[test]
    fn grid_with_column_and_row_titles() {
        let chart = document(&insight(json!({
            "chart": "scatterplot",
            "facetStyle": "cross",
            "columns": {"x": "age", "y": "income", "facet": "region", "facetV": "segment"}
        })));
        assert_eq!(group_names(&chart, &[0]), vec!["cross_0".to_string()]);
        assert!(chart.get_nested_data(&[], "data_FacetCellColTitles").is_ok());
        assert!(chart.get_nested_data(&[], "data_FacetCellRowTitles").is_ok());

        let plot = chart.get_nested_group(&[0]).unwrap();
        let titles = plot
            .marks
            .iter()
            .filter(|m| m.type_ == "text")
            .count();
        assert_eq!(titles, 2);
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
    }
}
