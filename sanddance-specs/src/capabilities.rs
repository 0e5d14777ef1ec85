use crate::types::{Column, SpecColumns};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A visual-encoding slot a column can be assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    X,
    Y,
    Z,
    Color,
    Sort,
    Size,
    Group,
    Facet,
    #[serde(rename = "facetV")]
    FacetV,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::X => "x",
            Role::Y => "y",
            Role::Z => "z",
            Role::Color => "color",
            Role::Sort => "sort",
            Role::Size => "size",
            Role::Group => "group",
            Role::Facet => "facet",
            Role::FacetV => "facetV",
        }
    }

    pub fn column<'a>(&self, columns: &'a SpecColumns) -> Option<&'a Column> {
        match self {
            Role::X => columns.x.as_ref(),
            Role::Y => columns.y.as_ref(),
            Role::Z => columns.z.as_ref(),
            Role::Color => columns.color.as_ref(),
            Role::Sort => columns.sort.as_ref(),
            Role::Size => columns.size.as_ref(),
            Role::Group => columns.group.as_ref(),
            Role::Facet => columns.facet.as_ref(),
            Role::FacetV => columns.facet_v.as_ref(),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSelection {
    Exact,
    Range,
}

impl AxisSelection {
    pub fn for_column(column: Option<&Column>) -> Self {
        match column {
            Some(column) if column.quantitative => AxisSelection::Range,
            _ => AxisSelection::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecRoleCapabilities {
    pub role: Role,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_none: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude_categoric: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binnable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_selection: Option<AxisSelection>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

impl SpecRoleCapabilities {
    pub fn required(role: Role) -> Self {
        Self {
            role,
            allow_none: false,
            exclude_categoric: false,
            binnable: false,
            axis_selection: None,
            signals: Vec::new(),
        }
    }

    pub fn optional(role: Role) -> Self {
        Self {
            allow_none: true,
            ..Self::required(role)
        }
    }

    pub fn quantitative(mut self) -> Self {
        self.exclude_categoric = true;
        self
    }

    /// A role that is binned into buckets, exposing its maxbins signal
    pub fn binned(mut self, column: Option<&Column>, signal: &str) -> Self {
        self.binnable = true;
        self.axis_selection = Some(AxisSelection::for_column(column));
        self.signals.push(signal.to_string());
        self
    }

    pub fn with_axis_selection(mut self, column: Option<&Column>) -> Self {
        self.axis_selection = Some(AxisSelection::for_column(column));
        self
    }
}

/// Roles and signals a chart type exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecCapabilities {
    pub roles: Vec<SpecRoleCapabilities>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<String>,
}

impl SpecCapabilities {
    pub fn role(&self, role: Role) -> Option<&SpecRoleCapabilities> {
        self.roles.iter().find(|r| r.role == role)
    }

    /// Check role assignments, listing missing roles before non-quantitative ones
    pub fn validate(&self, columns: &SpecColumns) -> Vec<String> {
        let missing = self
            .roles
            .iter()
            .filter(|r| !r.allow_none && r.role.column(columns).is_none())
            .map(|r| format!("Field {} is required.", r.role));
        let categoric = self
            .roles
            .iter()
            .filter(|r| r.exclude_categoric)
            .filter(|r| matches!(r.role.column(columns), Some(c) if !c.quantitative))
            .map(|r| format!("Field {} must be quantitative.", r.role));
        missing.chain(categoric).collect()
    }
}
