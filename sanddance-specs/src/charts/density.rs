use crate::axes::{AxisScale, AxisScales};
use crate::bin::DiscreteColumn;
use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::{optional_roles, size_role, unit_layout};
use crate::constants::signal_names;
use crate::layouts::density::{Density, DensityMode};
use crate::layouts::square::FillDirection;
use crate::layouts::treemap::Corner;
use crate::layouts::{LayoutPair, Orientation};
use crate::types::SpecContext;

pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let language = &context.spec_view_options.language;
    let total_style = context.insight.total_style();

    let mut layouts = Vec::new();
    if let (Some(x), Some(y)) = (&columns.x, &columns.y) {
        layouts.push(LayoutPair::Density(Density {
            groupby_x: DiscreteColumn::new(x, signal_names::X_BINS, &language.x_max_bins),
            groupby_y: DiscreteColumn::new(y, signal_names::Y_BINS, &language.y_max_bins),
            mode: DensityMode::Pack,
        }));
        layouts.push(unit_layout(
            context,
            total_style,
            FillDirection::RightDown,
            Orientation::Vertical,
            Corner::TopLeft,
        ));
    }

    let mut roles = vec![
        SpecRoleCapabilities::required(Role::X).binned(columns.x.as_ref(), signal_names::X_BINS),
        SpecRoleCapabilities::required(Role::Y).binned(columns.y.as_ref(), signal_names::Y_BINS),
    ];
    roles.extend(optional_roles(&[Role::Z, Role::Color, Role::Sort]));
    roles.push(size_role(total_style));
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
            signals: Vec::new(),
        },
    }
}
