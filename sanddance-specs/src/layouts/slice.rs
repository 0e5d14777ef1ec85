use crate::bin::{binnable, Binnable, DiscreteColumn};
use crate::layouts::{Layout, LayoutBuildContext, Orientation};
use crate::scales::{band_scale, zero_to};
use crate::scope::{ChildScopeSpec, GlobalScales, LayoutOutput, SizeSignals, SpecFragment};
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkFacetSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, quote};

/// One full-length band per bucket of `groupby`, with no aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub orientation: Orientation,
    pub groupby: DiscreteColumn,
}

impl Slice {
    fn bin(&self, context: &LayoutBuildContext) -> Binnable {
        binnable(
            &format!("slice_{}", context.id),
            &context.global_scope.data_name,
            &self.groupby,
        )
    }
}

impl Layout for Slice {
    fn kind(&self) -> &'static str {
        "Slice"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("slice_{}", context.id);
        let facet_data = format!("data_{prefix}_facet");
        let bandwidth = format!("{prefix}_bandwidth");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;
        let horizontal = self.orientation.is_horizontal();
        let bin = self.bin(context);

        let mut fragment = SpecFragment::default();
        if !bin.native {
            fragment
                .global_transforms
                .push((global.data_name.clone(), bin.transforms.clone()));
            fragment.global.signals.extend(bin.maxbins_signal.clone());
            fragment.global.data.extend(bin.data_sequence.clone());
        }

        // horizontal slices are stacked rows, vertical slices side by side columns
        let (scale_name, extent) = if horizontal {
            (format!("{prefix}_scale_y"), &size.layout_height)
        } else {
            (format!("{prefix}_scale_x"), &size.layout_width)
        };
        let scale = band_scale(&scale_name, &bin.domain_data_name, bin.field(), zero_to(extent));
        fragment.global.signals.push(SignalSpec::update(
            &bandwidth,
            format!("bandwidth({})", quote(&scale_name)),
        ));

        let position = MarkEncodingSpec::signal(format!(
            "scale({}, {})",
            quote(&scale_name),
            datum_field(bin.field())
        ));
        let update = if horizontal {
            MarkEncodingsSpec::new()
                .with("x", MarkEncodingSpec::value(0))
                .with("y", position)
                .with("height", MarkEncodingSpec::signal(&bandwidth))
                .with("width", MarkEncodingSpec::signal(&size.layout_width))
        } else {
            MarkEncodingsSpec::new()
                .with("x", position)
                .with("y", MarkEncodingSpec::value(0))
                .with("height", MarkEncodingSpec::signal(&size.layout_height))
                .with("width", MarkEncodingSpec::signal(&bandwidth))
        };
        let mut mark = MarkSpec::new("group", &prefix)
            .with_facet(MarkFacetSpec {
                name: facet_data.clone(),
                data: parent.data_name.clone(),
                groupby: bin.field_refs(),
                aggregate: None,
            })
            .with_update(update);
        mark.style = Some("cell".to_string());
        fragment.local.marks.push(mark);

        let size_signals = if horizontal {
            SizeSignals::new(&size.layout_width, &bandwidth)
        } else {
            SizeSignals::new(&bandwidth, &size.layout_height)
        };
        let mut scope = ChildScopeSpec::new(&facet_data, size_signals);
        scope.group = Some(prefix);
        scope.global_scales = Some(if horizontal {
            GlobalScales {
                show_axes: true,
                y: Some(scale),
                ..Default::default()
            }
        } else {
            GlobalScales {
                show_axes: true,
                x: Some(scale),
                ..Default::default()
            }
        });
        Ok(LayoutOutput { fragment, scope })
    }

    fn grouping(&self, context: &LayoutBuildContext) -> Option<Vec<String>> {
        Some(self.bin(context).fields)
    }
}
