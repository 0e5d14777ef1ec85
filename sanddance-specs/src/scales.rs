use crate::constants::{scale_names, signal_names};
use crate::spec::scale::{
    ScaleArrayElementSpec, ScaleDomainSpec, ScaleFieldReferenceSpec, ScaleRangeSpec,
    ScaleSchemeSpec, ScaleSpec, ScaleTypeSpec,
};
use crate::spec::values::{
    NumberOrSignalSpec, SignalExpressionSpec, StringOrSignalSpec, ValueOrSignalSpec,
};
use crate::types::ColorBin;
use sanddance_common::escape::escape_field;

/// Range running from zero to a signal expression
pub fn zero_to(signal: &str) -> ScaleRangeSpec {
    ScaleRangeSpec::Array(vec![
        ScaleArrayElementSpec::number(0.0),
        ScaleArrayElementSpec::signal(signal),
    ])
}

/// Range running from a signal expression down to zero, for y positions
pub fn from_to_zero(signal: &str) -> ScaleRangeSpec {
    ScaleRangeSpec::Array(vec![
        ScaleArrayElementSpec::signal(signal),
        ScaleArrayElementSpec::number(0.0),
    ])
}

pub fn linear_scale(
    name: &str,
    data: &str,
    column: &str,
    range: ScaleRangeSpec,
    reverse: bool,
    zero: bool,
) -> ScaleSpec {
    let mut scale = ScaleSpec::new(name, ScaleTypeSpec::Linear);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::new(data, &escape_field(column)),
    ));
    scale.range = Some(range);
    if reverse {
        scale.reverse = Some(ValueOrSignalSpec::Value(true.into()));
    }
    scale.nice = Some(true);
    scale.zero = Some(zero);
    scale
}

pub fn point_scale(name: &str, data: &str, range: ScaleRangeSpec, column: &str) -> ScaleSpec {
    let mut scale = ScaleSpec::new(name, ScaleTypeSpec::Point);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::sorted(data, &escape_field(column)),
    ));
    scale.range = Some(range);
    scale.padding = Some(0.5);
    scale
}

/// Band scale over every bucket of `field`, with the renderer's default inner padding
pub fn band_scale(name: &str, data: &str, field: &str, range: ScaleRangeSpec) -> ScaleSpec {
    let mut scale = ScaleSpec::new(name, ScaleTypeSpec::Band);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::sorted(data, &escape_field(field)),
    ));
    scale.range = Some(range);
    scale.padding = Some(0.1);
    scale
}

fn color_scheme(scheme: &str, count: Option<NumberOrSignalSpec>) -> ScaleRangeSpec {
    ScaleRangeSpec::Scheme(ScaleSchemeSpec {
        scheme: StringOrSignalSpec::String(scheme.to_string()),
        count,
        extra: Default::default(),
    })
}

/// Color scale for a quantitative column, bucketed according to `color_bin`
pub fn binnable_color_scale(
    color_bin: ColorBin,
    data: &str,
    column: &str,
    scheme: &str,
) -> ScaleSpec {
    let (type_, count) = match color_bin {
        ColorBin::Native => (ScaleTypeSpec::Sequential, None),
        ColorBin::Quantile => (
            ScaleTypeSpec::Quantile,
            Some(NumberOrSignalSpec::signal(signal_names::COLOR_BIN_COUNT)),
        ),
        ColorBin::Quantize => (
            ScaleTypeSpec::Quantize,
            Some(NumberOrSignalSpec::signal(signal_names::COLOR_BIN_COUNT)),
        ),
    };
    let mut scale = ScaleSpec::new(scale_names::COLOR, type_);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::new(data, &escape_field(column)),
    ));
    scale.range = Some(color_scheme(scheme, count));
    scale.reverse = Some(ValueOrSignalSpec::Signal(
        SignalExpressionSpec::new(signal_names::COLOR_REVERSE),
    ));
    scale
}

/// Ordinal color scale over the distinct values of `field`
pub fn categorical_color_scale(data: &str, field: &str, scheme: &str) -> ScaleSpec {
    let mut scale = ScaleSpec::new(scale_names::COLOR, ScaleTypeSpec::Ordinal);
    scale.domain = Some(ScaleDomainSpec::FieldReference(
        ScaleFieldReferenceSpec::sorted(data, &escape_field(field)),
    ));
    scale.range = Some(color_scheme(scheme, None));
    scale.reverse = Some(ValueOrSignalSpec::Signal(
        SignalExpressionSpec::new(signal_names::COLOR_REVERSE),
    ));
    scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantize_color_scale() {
        let scale = binnable_color_scale(ColorBin::Quantize, "data_source", "Sepal.Width", "redblue");
        assert_eq!(
            serde_json::to_value(&scale).unwrap(),
            json!({
                "name": "scale_color",
                "type": "quantize",
                "domain": {"data": "data_source", "field": "Sepal\\.Width"},
                "range": {"scheme": "redblue", "count": {"signal": "RoleColor_BinCountSignal"}},
                "reverse": {"signal": "RoleColor_ReverseSignal"}
            })
        );
    }

    #[test]
    fn test_band_scale_sorts_domain() {
        let scale = band_scale("bar_0_scale_x", "seq", "bar_0_bin_x", zero_to("PlotWidthIn"));
        let json = serde_json::to_value(&scale).unwrap();
        assert_eq!(json["domain"]["sort"], json!(true));
        assert_eq!(json["range"], json!([0.0, {"signal": "PlotWidthIn"}]));
        assert_eq!(json["padding"], json!(0.1));
    }
}
