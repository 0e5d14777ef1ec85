use crate::constants::signal_names;
use crate::defaults::{DEFAULT_TEXT_SIZE, DEFAULT_TEXT_TITLE_SIZE};
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::types::SpecContext;
use serde_json::Value;

/// Signals controlling axis and title text, shared by every chart
pub fn text_signals(context: &SpecContext) -> Vec<SignalSpec> {
    let language = &context.spec_view_options.language;
    vec![
        SignalSpec::value(signal_names::TEXT_SCALE, Value::from(1.2)).with_bind(
            SignalBindSpec::range(&language.text_scale, 0.5, 2.0, 0.1),
        ),
        SignalSpec::value(signal_names::TEXT_ANGLE_X, Value::from(30)).with_bind(
            SignalBindSpec::range(&language.text_angle_x, 0.0, 90.0, 1.0),
        ),
        SignalSpec::value(signal_names::TEXT_ANGLE_Y, Value::from(0)).with_bind(
            SignalBindSpec::range(&language.text_angle_y, -90.0, 0.0, 1.0),
        ),
        SignalSpec::update(
            signal_names::TEXT_SIZE,
            format!("{} * {DEFAULT_TEXT_SIZE}", signal_names::TEXT_SCALE),
        ),
        SignalSpec::update(
            signal_names::TEXT_TITLE_SIZE,
            format!("{} * {DEFAULT_TEXT_TITLE_SIZE}", signal_names::TEXT_SCALE),
        ),
        SignalSpec::value(signal_names::MARK_OPACITY, Value::from(1)).with_bind(
            SignalBindSpec::range(&language.mark_opacity, 0.1, 1.0, 0.05),
        ),
    ]
}

