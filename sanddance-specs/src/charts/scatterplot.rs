use crate::axes::{AxisScale, AxisScales};
use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::optional_roles;
use crate::constants::signal_names;
use crate::layouts::scatter::Scatter;
use crate::layouts::LayoutPair;
use crate::types::SpecContext;

pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let layouts = match (&columns.x, &columns.y) {
        (Some(x), Some(y)) => vec![LayoutPair::Scatter(Scatter {
            x: x.clone(),
            y: y.clone(),
            z: columns.z.clone(),
            size: columns.size.clone(),
        })],
        _ => Vec::new(),
    };

    let mut roles = vec![
        SpecRoleCapabilities::required(Role::X).with_axis_selection(columns.x.as_ref()),
        SpecRoleCapabilities::required(Role::Y).with_axis_selection(columns.y.as_ref()),
    ];
    roles.extend(optional_roles(&[Role::Z, Role::Color]));
    roles.push(SpecRoleCapabilities::optional(Role::Size).quantitative());
    roles.extend(optional_roles(&[Role::Facet, Role::FacetV]));

    SpecBuilderProps {
        axis_scales: Some(AxisScales {
            x: Some(AxisScale::titled(columns.x.as_ref())),
            y: Some(AxisScale::titled(columns.y.as_ref())),
            z: Some(AxisScale::titled(columns.z.as_ref())),
        }),
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: vec![signal_names::POINT_SIZE.to_string()],
        },
    }
}
