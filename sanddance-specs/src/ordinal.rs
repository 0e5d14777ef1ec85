use crate::constants::field_names;
use crate::spec::data::DataSpec;
use crate::spec::scale::{ScaleDomainSpec, ScaleFieldReferenceSpec, ScaleRangeSpec, ScaleSpec, ScaleTypeSpec};
use crate::spec::transform::aggregate::AggregateTransformSpec;
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use sanddance_common::escape::escape_field;

pub struct OrdinalResult {
    pub data: DataSpec,
    pub scale: ScaleSpec,
    pub lookup_field: String,
}

/// Ordinal scale mapping each bucket value to its 1-based position
pub fn ordinal_scale(data_name: &str, scale_name: &str, bin_field: &str, lookup_field: &str) -> ScaleSpec {
    let mut scale = ScaleSpec::new(scale_name, ScaleTypeSpec::Ordinal);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::new(data_name, &escape_field(bin_field)),
    ));
    scale.range = Some(ScaleRangeSpec::Reference(ScaleFieldReferenceSpec::new(
        data_name,
        lookup_field,
    )));
    scale
}

/// Distinct values of a native facet column, numbered in ascending order
pub fn create_ordinals_for_facet(source: &str, prefix: &str, bin_field: &str) -> OrdinalResult {
    let lookup_field = field_names::ORDINAL.to_string();
    let data_name = format!("{prefix}_bin_order");
    let escaped = escape_field(bin_field);
    let data = DataSpec::from_source(&data_name, source).with_transforms(vec![
        TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: vec![Field::String(escaped.clone())],
            fields: None,
            ops: None,
            as_: None,
            extra: Default::default(),
        }),
        TransformSpec::Collect(CollectTransformSpec {
            sort: CompareSpec::ascending(escaped),
            extra: Default::default(),
        }),
        TransformSpec::Window(WindowTransformSpec::row_number(&lookup_field)),
    ]);
    let scale = ordinal_scale(&data_name, &format!("{prefix}_order"), bin_field, &lookup_field);
    OrdinalResult {
        data,
        scale,
        lookup_field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordinals_for_native_facet() {
        let result = create_ordinals_for_facet("data_source", "cross_0_x", "Region");
        assert_eq!(result.data.name, "cross_0_x_bin_order");
        assert_eq!(
            serde_json::to_value(&result.data.transform).unwrap(),
            json!([
                {"type": "aggregate", "groupby": ["Region"]},
                {"type": "collect", "sort": {"field": "Region"}},
                {"type": "window", "ops": ["row_number"], "as": ["__SandDance__Ordinal"]}
            ])
        );
        assert_eq!(result.scale.name, "cross_0_x_order");
        assert_eq!(result.scale.data_references(), vec!["cross_0_x_bin_order".to_string(); 2]);
    }
}
