mod util;

use rstest::rstest;
use sanddance_specs::capabilities::Role;
use sanddance_specs::spec::scale::ScaleTypeSpec;
use serde_json::json;
use util::{create, document, insight};

mod test_validation {
    use crate::*;

    #[test]
    fn missing_y_fails_without_document() {
        let insight = insight(json!({"chart": "scatterplot", "columns": {"x": "age"}}));
        let result = create(&insight);
        assert_eq!(result.errors(), &["Field y is required.".to_string()]);
        assert!(result.document().is_none());
        assert!(result.spec_capabilities().role(Role::Y).is_some());
    }

    #[rstest(
        chart,
        expected,
        case("barchartV", "Field x is required."),
        case("barchartH", "Field y is required."),
        case("density", "Field x is required."),
        case("treemap", "Field size is required.")
    )]
    fn empty_insight_lists_first_missing_role(chart: &str, expected: &str) {
        let insight = insight(json!({"chart": chart}));
        let result = create(&insight);
        assert_eq!(result.errors().first().map(String::as_str), Some(expected));
        assert!(result.document().is_none());
    }

    #[test]
    fn categorical_size_is_rejected() {
        let insight = insight(json!({"chart": "treemap", "columns": {"size": "region"}}));
        let result = create(&insight);
        assert_eq!(result.errors(), &["Field size must be quantitative.".to_string()]);
    }

    #[test]
    fn unknown_column_counts_as_missing() {
        let insight = insight(json!({
            "chart": "scatterplot",
            "columns": {"x": "age", "y": "no_such_column"}
        }));
        assert_eq!(create(&insight).errors(), &["Field y is required.".to_string()]);
    }
}

mod test_scatter {
    use crate::*;

    #[test]
    fn quantitative_axes() {
        let insight = insight(json!({"chart": "scatterplot", "columns": {"x": "age", "y": "income"}}));
        let result = create(&insight);
        assert!(result.errors().is_empty());
        let chart = result.document().unwrap();

        for (name, field) in [("scale_x", "age"), ("scale_y", "income")] {
            let scale = chart.scales.iter().find(|s| s.name == name).unwrap();
            assert_eq!(scale.type_, ScaleTypeSpec::Linear);
            assert_eq!(
                serde_json::to_value(&scale.domain).unwrap(),
                json!({"data": "data_source", "field": field})
            );
        }

        let plot = chart.get_nested_group(&[0]).unwrap();
        let bound: Vec<_> = plot
            .marks
            .iter()
            .filter(|m| m.from.as_ref().and_then(|f| f.data.as_deref()) == Some("data_source"))
            .collect();
        assert_eq!(bound.len(), 1);
        assert!(!chart.data.iter().any(|d| d.name.to_lowercase().contains("facet")));
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn saved_signal_values_are_restored() {
        let insight = insight(json!({
            "chart": "scatterplot",
            "columns": {"x": "age", "y": "income"},
            "signalValues": {"Chart_PointSizeSignal": 7, "PlotWidthIn": 10}
        }));
        let chart = document(&insight);
        let point_size = chart.get_nested_signal(&[], "Chart_PointSizeSignal").unwrap();
        assert_eq!(point_size.value, Some(json!(7)));
        // computed signals keep their expression
        let width = chart.get_nested_signal(&[], "PlotWidthIn").unwrap();
        assert!(width.value.is_none());
        assert!(width.update.is_some());
    }
}

mod test_determinism {
    use crate::*;

    #[rstest(
        value,
        case(json!({"chart": "scatterplot", "columns": {"x": "age", "y": "income", "color": "region"}})),
        case(json!({"chart": "barchartV", "columns": {"x": "age", "facet": "region"}})),
        case(json!({"chart": "density", "columns": {"x": "age", "y": "region", "z": "height"}}))
    )]
    fn same_input_same_bytes(value: serde_json::Value) {
        let insight = insight(value);
        let first = serde_json::to_string(&create(&insight)).unwrap();
        let second = serde_json::to_string(&create(&insight)).unwrap();
        assert_eq!(first, second);
    }
}
