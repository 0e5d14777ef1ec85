#![allow(dead_code)]

use sanddance_specs::columns::infer_columns;
use sanddance_specs::spec::chart::ChartSpec;
use sanddance_specs::types::{Column, Insight, SpecColumns, SpecViewOptions};
use sanddance_specs::SpecResult;
use serde_json::{json, Value};

/// A small table with integer, float and categorical columns
pub fn people() -> Vec<Value> {
    let regions = ["north", "south", "east", "west"];
    let segments = ["retail", "wholesale"];
    (0..40)
        .map(|i| {
            json!({
                "age": 20 + (i * 7) % 45,
                "income": 1000.5 * ((i % 9) as f64 + 1.0),
                "height": 150.0 + (i % 11) as f64 * 4.5,
                "region": regions[i % regions.len()],
                "segment": segments[i % segments.len()],
            })
        })
        .collect()
}

pub fn people_columns() -> Vec<Column> {
    infer_columns(&people())
}

pub fn insight(value: Value) -> Insight {
    serde_json::from_value(value).unwrap()
}

pub fn create(insight: &Insight) -> SpecResult {
    let columns = SpecColumns::resolve(insight, &people_columns());
    sanddance_specs::create(insight, &columns, &SpecViewOptions::default())
}

pub fn document(insight: &Insight) -> ChartSpec {
    match create(insight) {
        SpecResult::Success { document, .. } => document,
        SpecResult::Failure { errors, .. } => panic!("build failed: {errors:?}"),
    }
}
