use crate::constants::{scale_names, signal_names};
use crate::defaults::{DEFAULT_POINT_SIZE, SCATTER_SIZED_MAX, SCATTER_SIZED_MIN};
use crate::layouts::{Layout, LayoutBuildContext};
use crate::scales::{from_to_zero, linear_scale, point_scale, zero_to};
use crate::scope::{ChildScopeSpec, GlobalScales, LayoutOutput, SpecFragment};
use crate::selection::collapsed_to_zero;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::scale::{ScaleArrayElementSpec, ScaleRangeSpec, ScaleSpec};
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::types::Column;
use crate::zbase::{add_z_scale, z_size};
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field, quote};
use serde_json::Value;

/// Plots each row as a point at its x, y and optional z values
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub x: Column,
    pub y: Column,
    pub z: Option<Column>,

    /// Scales point area when present
    pub size: Option<Column>,
}

fn position_scale(name: &str, data_name: &str, column: &Column, range: ScaleRangeSpec) -> ScaleSpec {
    if column.quantitative {
        linear_scale(name, data_name, &column.name, range, false, false)
    } else {
        point_scale(name, data_name, range, &column.name)
    }
}

fn point_size_signal(context: &LayoutBuildContext) -> SignalSpec {
    SignalSpec::value(signal_names::POINT_SIZE, Value::from(DEFAULT_POINT_SIZE)).with_bind(
        SignalBindSpec::range(
            &context.spec_context.spec_view_options.language.point_size,
            1.0,
            10.0,
            0.1,
        ),
    )
}

impl Layout for Scatter {
    fn kind(&self) -> &'static str {
        "Scatter"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("scatter_{}", context.id);
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;

        let mut fragment = SpecFragment::default();
        fragment.global.signals.push(point_size_signal(context));

        let x = position_scale(
            scale_names::X,
            &global.data_name,
            &self.x,
            zero_to(&size.layout_width),
        );
        let y = position_scale(
            scale_names::Y,
            &global.data_name,
            &self.y,
            from_to_zero(&size.layout_height),
        );
        let z = add_z_scale(
            self.z.as_ref(),
            &z_size(&context.spec_context, &global.size_signals.layout_height),
            &global.data_name,
            scale_names::Z,
        );

        let point_size = match self.size.as_ref().filter(|c| c.quantitative) {
            Some(column) => {
                let scale_name = format!("{prefix}_scale_size");
                let mut scale = linear_scale(
                    &scale_name,
                    &global.data_name,
                    &column.name,
                    ScaleRangeSpec::Array(vec![
                        ScaleArrayElementSpec::number(SCATTER_SIZED_MIN),
                        ScaleArrayElementSpec::number(SCATTER_SIZED_MAX),
                    ]),
                    false,
                    false,
                );
                scale.nice = None;
                fragment.global.scales.push(scale);
                format!(
                    "sqrt(scale({}, {}) / {SCATTER_SIZED_MIN}) * {}",
                    quote(&scale_name),
                    datum_field(&column.name),
                    signal_names::POINT_SIZE
                )
            }
            None => signal_names::POINT_SIZE.to_string(),
        };

        let mut update = MarkEncodingsSpec::new()
            .with(
                "x",
                MarkEncodingSpec::scaled(scale_names::X, escape_field(&self.x.name)),
            )
            .with(
                "y",
                MarkEncodingSpec::scaled(scale_names::Y, escape_field(&self.y.name)),
            )
            .with("height", MarkEncodingSpec::signal(&point_size))
            .with("width", MarkEncodingSpec::signal(&point_size));
        if let Some(z_column) = &self.z {
            update = update
                .with_list(
                    "z",
                    vec![
                        collapsed_to_zero(),
                        MarkEncodingSpec::scaled(scale_names::Z, escape_field(&z_column.name)),
                    ],
                )
                .with("depth", MarkEncodingSpec::signal(&point_size));
        }
        fragment.local.marks.push(
            MarkSpec::new("rect", &prefix)
                .with_from_data(&parent.data_name)
                .with_update(update),
        );

        let mut scope = ChildScopeSpec::new(&parent.data_name, size.clone());
        scope.mark = Some(prefix);
        scope.global_scales = Some(GlobalScales {
            show_axes: true,
            x: Some(x),
            y: Some(y),
            z,
        });
        Ok(LayoutOutput { fragment, scope })
    }
}
