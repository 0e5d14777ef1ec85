use crate::axes::{AxisScale, AxisScales};
use crate::bin::DiscreteColumn;
use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::optional_roles;
use crate::constants::signal_names;
use crate::layouts::density::{Density, DensityMode};
use crate::layouts::stack::Stack;
use crate::layouts::LayoutPair;
use crate::types::SpecContext;

pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let language = &context.spec_view_options.language;

    let mut layouts = Vec::new();
    if let (Some(x), Some(y)) = (&columns.x, &columns.y) {
        layouts.push(LayoutPair::Density(Density {
            groupby_x: DiscreteColumn::new(x, signal_names::X_BINS, &language.x_max_bins),
            groupby_y: DiscreteColumn::new(y, signal_names::Y_BINS, &language.y_max_bins),
            mode: DensityMode::Cube,
        }));
        layouts.push(LayoutPair::Stack(Stack {
            sort_by: columns.sort.clone(),
        }));
    }

    let mut roles = vec![
        SpecRoleCapabilities::required(Role::X).binned(columns.x.as_ref(), signal_names::X_BINS),
        SpecRoleCapabilities::required(Role::Y).binned(columns.y.as_ref(), signal_names::Y_BINS),
    ];
    roles.extend(optional_roles(&[
        Role::Z,
        Role::Color,
        Role::Sort,
        Role::Facet,
        Role::FacetV,
    ]));

    SpecBuilderProps {
        axis_scales: Some(AxisScales {
            x: Some(AxisScale::titled(columns.x.as_ref())),
            y: Some(AxisScale::titled(columns.y.as_ref())),
            z: None,
        }),
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: Vec::new(),
        },
    }
}
