use crate::constants::signal_names;
use crate::defaults::DEFAULT_Z_PROPORTION;
use crate::scales::{linear_scale, point_scale, zero_to};
use crate::selection::collapsed_to_zero;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec};
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::types::{Column, SpecContext};
use sanddance_common::escape::escape_field;
use serde_json::Value;

/// Depth scale for the z role, sized as a proportion of `z_size`
pub fn add_z_scale(z: Option<&Column>, z_size: &str, data_name: &str, scale_name: &str) -> Option<ScaleSpec> {
    let z = z?;
    let range = zero_to(&format!("({z_size}) * {}", signal_names::Z_PROPORTION));
    Some(if z.quantitative {
        linear_scale(scale_name, data_name, &z.name, range, false, true)
    } else {
        point_scale(scale_name, data_name, range, &z.name)
    })
}

/// Extent z scales stretch to, from view options or the global layout height
pub fn z_size(context: &SpecContext, global_height: &str) -> String {
    context
        .spec_view_options
        .z_size
        .clone()
        .unwrap_or_else(|| global_height.to_string())
}

/// Bound signal for the z proportion, present whenever a z column is assigned
pub fn z_proportion_signal(context: &SpecContext) -> Option<SignalSpec> {
    context.spec_columns.z.as_ref()?;
    Some(
        SignalSpec::value(signal_names::Z_PROPORTION, Value::from(DEFAULT_Z_PROPORTION)).with_bind(
            SignalBindSpec::range(
                &context.spec_view_options.language.z_proportion,
                0.2,
                2.0,
                0.1,
            ),
        ),
    )
}

/// Seat a unit on the floor and extrude it by the z column, flat while its row is collapsed
pub fn with_depth(update: MarkEncodingsSpec, z: Option<&Column>, scale_name: &str) -> MarkEncodingsSpec {
    let Some(z) = z else {
        return update;
    };
    update.with("z", MarkEncodingSpec::value(0)).with_list(
        "depth",
        vec![
            collapsed_to_zero(),
            MarkEncodingSpec::scaled(scale_name, escape_field(&z.name)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use serde_json::json;

    #[test]
    fn test_depth_is_collapsible() {
        let z = Column::new("height", ColumnType::Number);
        let update = with_depth(MarkEncodingsSpec::new(), Some(&z), "scale_z");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "z": {"value": 0},
                "depth": [
                    {"test": "datum[\"__SandDance__Collapsed\"]", "value": 0},
                    {"scale": "scale_z", "field": "height"}
                ]
            })
        );
        assert_eq!(with_depth(MarkEncodingsSpec::new(), None, "scale_z"), MarkEncodingsSpec::new());
    }

    #[test]
    fn test_categorical_z_uses_point_scale() {
        let z = Column::new("kind", ColumnType::String);
        let scale = add_z_scale(Some(&z), "PlotHeightIn", "data_source", "scale_z").unwrap();
        assert_eq!(scale.type_, crate::spec::scale::ScaleTypeSpec::Point);
        assert!(add_z_scale(None, "PlotHeightIn", "data_source", "scale_z").is_none());
    }
}
