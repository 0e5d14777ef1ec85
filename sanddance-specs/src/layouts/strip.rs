use crate::constants::{field_names, scale_names};
use crate::layouts::{Layout, LayoutBuildContext, Orientation};
use crate::scales::{from_to_zero, zero_to};
use crate::scope::{ChildScopeSpec, GlobalScales, LayoutOutput, SpecFragment};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkSpec};
use crate::spec::scale::{ScaleArrayElementSpec, ScaleDomainSpec, ScaleSpec, ScaleTypeSpec};
use crate::spec::transform::collect::CollectTransformSpec;
use crate::spec::transform::stack::{StackOffsetSpec, StackTransformSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use crate::types::Column;
use crate::zbase::{add_z_scale, with_depth, z_size};
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field};

/// Splits the parent region into segments proportional to each row's weight
#[derive(Debug, Clone, PartialEq)]
pub struct Strip {
    pub orientation: Orientation,

    /// Row weight; every row weighs the same when absent
    pub size: Option<Column>,
    pub sort: Option<Column>,

    /// Expose a 0 to 100 scale along the stacking direction for a percentage axis
    pub add_percentage_scale: bool,
}

impl Layout for Strip {
    fn kind(&self) -> &'static str {
        "Strip"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("strip_{}", context.id);
        let data_name = format!("data_{prefix}");
        let scale_name = format!("scale_{prefix}");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let size = &parent.size_signals;
        let horizontal = self.orientation.is_horizontal();

        let mut transforms = Vec::new();
        if let Some(sort) = &self.sort {
            transforms.push(TransformSpec::Collect(CollectTransformSpec {
                sort: CompareSpec::ascending(escape_field(&sort.name)),
                extra: Default::default(),
            }));
        }
        let weight = match &self.size {
            Some(size) => escape_field(&size.name),
            None => {
                transforms.push(TransformSpec::formula("1", field_names::COUNT));
                field_names::COUNT.to_string()
            }
        };
        let ancestors = context.ancestor_fields();
        transforms.push(TransformSpec::Stack(StackTransformSpec {
            field: Field::String(weight),
            groupby: if ancestors.is_empty() {
                None
            } else {
                Some(
                    ancestors
                        .iter()
                        .map(|f| Field::String(escape_field(f)))
                        .collect(),
                )
            },
            sort: None,
            as_: Some(vec![
                field_names::FIRST.to_string(),
                field_names::LAST.to_string(),
            ]),
            offset: Some(StackOffsetSpec::Normalize),
            extra: Default::default(),
        }));

        let mut fragment = SpecFragment::default();
        fragment
            .local
            .data
            .push(DataSpec::from_source(&data_name, &parent.data_name).with_transforms(transforms));

        let first = datum_field(field_names::FIRST);
        let span = format!("{} - {first}", datum_field(field_names::LAST));
        let update = if horizontal {
            MarkEncodingsSpec::new()
                .with(
                    "x",
                    MarkEncodingSpec::signal(format!("{first} * ({})", size.layout_width)),
                )
                .with("y", MarkEncodingSpec::value(0))
                .with("height", MarkEncodingSpec::signal(&size.layout_height))
                .with(
                    "width",
                    MarkEncodingSpec::signal(format!("({span}) * ({})", size.layout_width)),
                )
        } else {
            // first segment at the bottom
            MarkEncodingsSpec::new()
                .with("x", MarkEncodingSpec::value(0))
                .with(
                    "y",
                    MarkEncodingSpec::signal(format!(
                        "(1 - {}) * ({})",
                        datum_field(field_names::LAST),
                        size.layout_height
                    )),
                )
                .with(
                    "height",
                    MarkEncodingSpec::signal(format!("({span}) * ({})", size.layout_height)),
                )
                .with("width", MarkEncodingSpec::signal(&size.layout_width))
        };
        let z = context.spec_context.spec_columns.z.as_ref();
        let update = with_depth(update, z, scale_names::Z);
        fragment.local.marks.push(
            MarkSpec::new("rect", &prefix)
                .with_from_data(&data_name)
                .with_update(update),
        );

        let mut global_scales = GlobalScales {
            show_axes: true,
            z: add_z_scale(
                z,
                &z_size(&context.spec_context, &global.size_signals.layout_height),
                &global.data_name,
                scale_names::Z,
            ),
            ..Default::default()
        };
        if self.add_percentage_scale {
            let mut scale = ScaleSpec::new(&scale_name, ScaleTypeSpec::Linear);
            scale.domain = Some(ScaleDomainSpec::Array(vec![
                ScaleArrayElementSpec::number(0.0),
                ScaleArrayElementSpec::number(100.0),
            ]));
            if horizontal {
                scale.range = Some(zero_to(&size.layout_width));
                global_scales.x = Some(scale);
            } else {
                scale.range = Some(from_to_zero(&size.layout_height));
                global_scales.y = Some(scale);
            }
        }

        let mut scope = ChildScopeSpec::new(&data_name, size.clone());
        scope.mark = Some(prefix);
        if global_scales != GlobalScales::default() {
            scope.global_scales = Some(global_scales);
        }
        Ok(LayoutOutput { fragment, scope })
    }
}
