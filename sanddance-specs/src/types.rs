use crate::defaults::{DEFAULT_MAX_LEGENDS, DEFAULT_TICK_SIZE};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Number,
    Date,
    String,
}

/// How a column behaves when it is assigned to a binnable role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Quantitative,
    Temporal,
    Discrete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnStats {
    pub distinct_value_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub has_negative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,

    #[serde(rename = "type")]
    pub type_: ColumnType,

    pub quantitative: bool,

    #[serde(default)]
    pub is_color_data: bool,

    #[serde(default)]
    pub stats: ColumnStats,
}

impl Column {
    pub fn new(name: &str, type_: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            type_,
            quantitative: matches!(type_, ColumnType::Integer | ColumnType::Number),
            is_color_data: false,
            stats: Default::default(),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        if self.quantitative {
            ColumnKind::Quantitative
        } else if self.type_ == ColumnType::Date {
            ColumnKind::Temporal
        } else {
            ColumnKind::Discrete
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chart {
    #[serde(rename = "barchart")]
    Barchart,
    #[serde(rename = "barchartV")]
    BarchartV,
    #[serde(rename = "barchartH")]
    BarchartH,
    #[serde(rename = "density")]
    Density,
    #[serde(rename = "scatterplot")]
    Scatterplot,
    #[serde(rename = "stacks")]
    Stacks,
    #[serde(rename = "strips")]
    Strips,
    #[serde(rename = "treemap")]
    Treemap,
}

impl Chart {
    pub fn name(&self) -> &'static str {
        match self {
            Chart::Barchart => "barchart",
            Chart::BarchartV => "barchartV",
            Chart::BarchartH => "barchartH",
            Chart::Density => "density",
            Chart::Scatterplot => "scatterplot",
            Chart::Stacks => "stacks",
            Chart::Strips => "strips",
            Chart::Treemap => "treemap",
        }
    }
}

/// Column name per role, as chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightColumns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    #[serde(rename = "facetV", skip_serializing_if = "Option::is_none")]
    pub facet_v: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBin {
    Native,
    #[default]
    Quantize,
    Quantile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetStyle {
    #[default]
    Wrap,
    Cross,
}

/// How units are totaled inside each bar or density cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TotalStyle {
    #[default]
    CountSquare,
    CountStrip,
    SumStrip,
    SumStripPercent,
    SumTreemap,
}

impl TotalStyle {
    /// Whether the style weights units by the `size` column
    pub fn is_sum(&self) -> bool {
        matches!(
            self,
            TotalStyle::SumStrip | TotalStyle::SumStripPercent | TotalStyle::SumTreemap
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub chart: Chart,

    #[serde(default)]
    pub columns: InsightColumns,

    #[serde(default)]
    pub size: Size,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(default)]
    pub color_bin: ColorBin,

    #[serde(default)]
    pub facet_style: FacetStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_style: Option<TotalStyle>,

    #[serde(default)]
    pub hide_axes: bool,

    #[serde(default)]
    pub hide_legend: bool,

    #[serde(default)]
    pub direct_color: bool,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub signal_values: IndexMap<String, Value>,
}

impl Insight {
    pub fn new(chart: Chart, columns: InsightColumns) -> Self {
        Self {
            chart,
            columns,
            size: Default::default(),
            scheme: None,
            color_bin: Default::default(),
            facet_style: Default::default(),
            total_style: None,
            hide_axes: false,
            hide_legend: false,
            direct_color: false,
            signal_values: Default::default(),
        }
    }

    pub fn total_style(&self) -> TotalStyle {
        self.total_style.unwrap_or_default()
    }
}

/// Column metadata resolved for each role of an insight
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecColumns {
    pub x: Option<Column>,
    pub y: Option<Column>,
    pub z: Option<Column>,
    pub color: Option<Column>,
    pub sort: Option<Column>,
    pub size: Option<Column>,
    pub group: Option<Column>,
    pub facet: Option<Column>,
    pub facet_v: Option<Column>,
}

impl SpecColumns {
    /// Look up each role's column by name; names with no matching column resolve to absent
    pub fn resolve(insight: &Insight, columns: &[Column]) -> Self {
        let find = |name: &Option<String>| -> Option<Column> {
            name.as_ref()
                .and_then(|name| columns.iter().find(|c| &c.name == name))
                .cloned()
        };
        let roles = &insight.columns;
        Self {
            x: find(&roles.x),
            y: find(&roles.y),
            z: find(&roles.z),
            color: find(&roles.color),
            sort: find(&roles.sort),
            size: find(&roles.size),
            group: find(&roles.group),
            facet: find(&roles.facet),
            facet_v: find(&roles.facet_v),
        }
    }
}

/// Display names of every bound signal and axis aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecLanguage {
    pub x_max_bins: String,
    pub y_max_bins: String,
    pub facet_max_bins: String,
    pub facet_v_max_bins: String,
    pub color_bin_count: String,
    pub color_reverse: String,
    pub count: String,
    pub percent: String,
    pub sum: String,
    pub point_size: String,
    pub tree_map_method: String,
    pub text_angle_x: String,
    pub text_angle_y: String,
    pub text_scale: String,
    pub mark_opacity: String,
    pub z_proportion: String,
}

impl Default for SpecLanguage {
    fn default() -> Self {
        Self {
            x_max_bins: "X axis max bins".to_string(),
            y_max_bins: "Y axis max bins".to_string(),
            facet_max_bins: "Facets max bins".to_string(),
            facet_v_max_bins: "Facets vertical max bins".to_string(),
            color_bin_count: "Color bin count".to_string(),
            color_reverse: "Color reverse".to_string(),
            count: "Count".to_string(),
            percent: "Percent".to_string(),
            sum: "Sum".to_string(),
            point_size: "Point size".to_string(),
            tree_map_method: "Treemap layout".to_string(),
            text_angle_x: "X axis text angle".to_string(),
            text_angle_y: "Y axis text angle".to_string(),
            text_scale: "Text scale".to_string(),
            mark_opacity: "Mark opacity".to_string(),
            z_proportion: "Z proportion".to_string(),
        }
    }
}

/// CSS colors used for guides and unscaled marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecColorSettings {
    pub axis_line: String,
    pub axis_text: String,
    pub default_cube: String,
}

impl Default for SpecColorSettings {
    fn default() -> Self {
        Self {
            axis_line: "#000000".to_string(),
            axis_text: "#000000".to_string(),
            default_cube: "steelblue".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecViewOptions {
    pub language: SpecLanguage,
    pub colors: SpecColorSettings,
    pub max_legends: usize,
    pub tick_size: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_size: Option<String>,
}

impl Default for SpecViewOptions {
    fn default() -> Self {
        Self {
            language: Default::default(),
            colors: Default::default(),
            max_legends: DEFAULT_MAX_LEGENDS,
            tick_size: DEFAULT_TICK_SIZE,
            z_size: None,
        }
    }
}

/// Everything a single build reads
#[derive(Debug, Clone, Copy)]
pub struct SpecContext<'a> {
    pub insight: &'a Insight,
    pub spec_columns: &'a SpecColumns,
    pub spec_view_options: &'a SpecViewOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insight_deserializes_with_defaults() {
        let insight: Insight = serde_json::from_value(json!({
            "chart": "barchartV",
            "columns": {"x": "age", "facetV": "region"},
            "totalStyle": "sum-strip-percent"
        }))
        .unwrap();
        assert_eq!(insight.chart, Chart::BarchartV);
        assert_eq!(insight.columns.facet_v.as_deref(), Some("region"));
        assert_eq!(insight.size, Size::default());
        assert_eq!(insight.facet_style, FacetStyle::Wrap);
        assert_eq!(insight.total_style(), TotalStyle::SumStripPercent);
        assert!(insight.total_style().is_sum());
    }

    #[test]
    fn test_resolve_ignores_unknown_names() {
        let insight = Insight::new(
            Chart::Scatterplot,
            InsightColumns {
                x: Some("age".to_string()),
                y: Some("missing".to_string()),
                ..Default::default()
            },
        );
        let columns = vec![Column::new("age", ColumnType::Integer)];
        let resolved = SpecColumns::resolve(&insight, &columns);
        assert_eq!(resolved.x.map(|c| c.kind()), Some(ColumnKind::Quantitative));
        assert!(resolved.y.is_none());
    }

    #[test]
    fn test_dates_are_temporal() {
        assert_eq!(
            Column::new("when", ColumnType::Date).kind(),
            ColumnKind::Temporal
        );
        assert_eq!(
            Column::new("name", ColumnType::String).kind(),
            ColumnKind::Discrete
        );
    }
}
