use crate::builder::SpecBuilderProps;
use crate::capabilities::{Role, SpecCapabilities, SpecRoleCapabilities};
use crate::charts::optional_roles;
use crate::constants::signal_names;
use crate::layouts::treemap::Treemap;
use crate::layouts::LayoutPair;
use crate::types::SpecContext;

pub fn props(context: &SpecContext) -> SpecBuilderProps {
    let columns = context.spec_columns;
    let layouts = match &columns.size {
        Some(size) => vec![LayoutPair::Treemap(Treemap {
            size: Some(size.clone()),
            group_by: columns.group.clone(),
            ..Default::default()
        })],
        None => Vec::new(),
    };

    let mut roles = vec![SpecRoleCapabilities::required(Role::Size).quantitative()];
    roles.extend(optional_roles(&[
        Role::Group,
        Role::Z,
        Role::Color,
        Role::Facet,
        Role::FacetV,
    ]));

    SpecBuilderProps {
        axis_scales: None,
        layouts,
        spec_capabilities: SpecCapabilities {
            roles,
            signals: vec![signal_names::TREE_MAP_METHOD.to_string()],
        },
    }
}
