use crate::axes::{AxisAggregate, AxisScale, AxisScales};
use crate::bin::DiscreteColumn;
use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::optional_roles;
use crate::constants::signal_names;
use crate::layouts::slice::Slice;
use crate::layouts::strip::Strip;
use crate::layouts::{LayoutPair, Orientation};
use crate::types::SpecContext;

/// Proportional strips filling the plot, side by side per x bucket when x is assigned
pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let mut layouts = Vec::new();
    if let Some(x) = &columns.x {
        layouts.push(LayoutPair::Slice(Slice {
            orientation: Orientation::Vertical,
            groupby: DiscreteColumn::new(
                x,
                signal_names::X_BINS,
                &context.spec_view_options.language.x_max_bins,
            ),
        }));
    }
    layouts.push(LayoutPair::Strip(Strip {
        orientation: Orientation::Vertical,
        size: columns.size.clone(),
        sort: columns.sort.clone(),
        add_percentage_scale: true,
    }));

    let mut roles = vec![
        SpecRoleCapabilities::optional(Role::X).binned(columns.x.as_ref(), signal_names::X_BINS),
    ];
    roles.extend(optional_roles(&[Role::Z, Role::Color, Role::Sort]));
    roles.push(SpecRoleCapabilities::optional(Role::Size).quantitative());
    roles.extend(optional_roles(&[Role::Facet, Role::FacetV]));

    SpecBuilderProps {
        axis_scales: Some(AxisScales {
            x: Some(AxisScale::titled(columns.x.as_ref())),
            y: Some(AxisScale::aggregate(AxisAggregate::Percent)),
            z: Some(AxisScale::titled(columns.z.as_ref())),
        }),
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: Vec::new(),
        },
    }
}
