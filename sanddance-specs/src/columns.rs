use crate::types::{Column, ColumnStats, ColumnType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

fn is_date(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn is_color(s: &str) -> bool {
    lazy_static! {
        static ref COLOR_RE: Regex = Regex::new(
            r"^(#[0-9a-fA-F]{3}|#[0-9a-fA-F]{6}|#[0-9a-fA-F]{8}|rgba?\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*(,\s*[0-9.]+\s*)?\))$"
        )
        .unwrap();
    }
    COLOR_RE.is_match(s.trim())
}

fn infer_type(values: &[&Value]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::String;
    }
    if values.iter().all(|v| v.is_boolean()) {
        ColumnType::Boolean
    } else if values.iter().all(|v| v.is_i64() || v.is_u64()) {
        ColumnType::Integer
    } else if values.iter().all(|v| v.is_number()) {
        ColumnType::Number
    } else if values
        .iter()
        .all(|v| v.as_str().map(is_date).unwrap_or(false))
    {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}

fn distinct_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn column_stats(type_: ColumnType, values: &[&Value]) -> ColumnStats {
    let numbers = values.iter().filter_map(|v| v.as_f64()).collect::<Vec<_>>();
    let distinct_value_count = if matches!(type_, ColumnType::Integer | ColumnType::Number) {
        numbers
            .iter()
            .map(|v| OrderedFloat(*v))
            .collect::<HashSet<_>>()
            .len()
    } else {
        values.iter().map(|v| distinct_key(v)).unique().count()
    };

    let mut stats = ColumnStats {
        distinct_value_count,
        ..Default::default()
    };
    if !numbers.is_empty() {
        let (min, max) = numbers
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        stats.min = Some(min);
        stats.max = Some(max);
        stats.mean = Some(numbers.iter().sum::<f64>() / numbers.len() as f64);
        stats.has_negative = min < 0.0;
    }
    stats
}

/// Derive column metadata from an array of row objects, in first-seen field order
pub fn infer_columns(rows: &[Value]) -> Vec<Column> {
    let mut fields: IndexMap<String, Vec<&Value>> = IndexMap::new();
    for row in rows.iter().filter_map(|row| row.as_object()) {
        for (name, value) in row {
            let values = fields.entry(name.clone()).or_default();
            if !value.is_null() {
                values.push(value);
            }
        }
    }

    fields
        .into_iter()
        .map(|(name, values)| {
            let type_ = infer_type(&values);
            let mut column = Column::new(&name, type_);
            column.stats = column_stats(type_, &values);
            column.is_color_data = type_ == ColumnType::String
                && values
                    .iter()
                    .all(|v| v.as_str().map(is_color).unwrap_or(false));
            column
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKind;
    use float_cmp::assert_approx_eq;
    use serde_json::json;

    #[test]
    fn test_infer_types_and_stats() {
        let rows = json!([
            {"age": 30, "income": 1200.5, "born": "1990-01-02", "name": "a", "tint": "#ff0000", "ok": true},
            {"age": -4, "income": 10, "born": "1991-03-04", "name": "b", "tint": "rgb(0, 0, 255)", "ok": false},
            {"age": 30, "income": null, "born": "1992-05-06T10:00:00Z", "name": "a", "tint": "#00f", "ok": true}
        ]);
        let columns = infer_columns(rows.as_array().unwrap());
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["age", "income", "born", "name", "tint", "ok"]);

        let age = &columns[0];
        assert_eq!(age.type_, ColumnType::Integer);
        assert_eq!(age.kind(), ColumnKind::Quantitative);
        assert_eq!(age.stats.distinct_value_count, 2);
        assert!(age.stats.has_negative);
        assert_approx_eq!(f64, age.stats.mean.unwrap(), 56.0 / 3.0);

        assert_eq!(columns[1].type_, ColumnType::Number);
        assert_eq!(columns[2].kind(), ColumnKind::Temporal);
        assert_eq!(columns[3].stats.distinct_value_count, 2);
        assert!(!columns[3].is_color_data);
        assert!(columns[4].is_color_data);
        assert_eq!(columns[5].type_, ColumnType::Boolean);
    }

    #[test]
    fn test_mixed_values_are_strings() {
        let rows = json!([{"v": 1}, {"v": "one"}]);
        let columns = infer_columns(rows.as_array().unwrap());
        assert_eq!(columns[0].type_, ColumnType::String);
        assert!(!columns[0].quantitative);
    }
}
