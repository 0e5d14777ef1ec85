use crate::spec::chart::ChartSpec;
use crate::spec::data::DataSpec;
use crate::spec::mark::MarkEncodingSpec;
use crate::spec::mark::MarkSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use crate::spec::transform::TransformSpec;
use indexmap::IndexMap;
use log::debug;
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};

/// Width and height expressions of a drawing region
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSignals {
    pub layout_width: String,
    pub layout_height: String,
    pub col_count: Option<String>,
    pub row_count: Option<String>,
}

impl SizeSignals {
    pub fn new<S: Into<String>, T: Into<String>>(layout_width: S, layout_height: T) -> Self {
        Self {
            layout_width: layout_width.into(),
            layout_height: layout_height.into(),
            col_count: None,
            row_count: None,
        }
    }
}

/// Per-role scales a layout asks to be hoisted to the root of the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalScales {
    pub show_axes: bool,
    pub x: Option<ScaleSpec>,
    pub y: Option<ScaleSpec>,
    pub z: Option<ScaleSpec>,
}

/// Conditional rules to merge into the final mark's update channels
pub type EncodingRuleMap = IndexMap<String, Vec<MarkEncodingSpec>>;

/// Where facet column or row titles can read their values from
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSource {
    pub data_name: String,
    pub quantitative: bool,

    /// Offset of a cell along the dimension, in terms of `datum`
    pub offset: String,
    pub cell_size: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Titles {
    pub x: TitleSource,
    pub y: TitleSource,
}

/// Sizing hints a footprint layout hands to the unit layout drawn inside it
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedUnits {
    /// Unit count of the fullest group
    pub max_units_signal: String,
    pub aspect: String,

    /// Extent shared by every group along the stacking direction
    pub common_size: String,
}

/// Definitions one layout adds to a single scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeAdditions {
    pub data: Vec<DataSpec>,
    pub signals: Vec<SignalSpec>,
    pub scales: Vec<ScaleSpec>,
    pub marks: Vec<MarkSpec>,
}

impl ScopeAdditions {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
            && self.signals.is_empty()
            && self.scales.is_empty()
            && self.marks.is_empty()
    }
}

/// Rewrite a root signal's update as `func(current, expr)`
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPatch {
    pub name: String,
    pub func: String,
    pub expr: String,
}

impl SignalPatch {
    pub fn max<S: Into<String>, T: Into<String>>(name: S, expr: T) -> Self {
        Self {
            name: name.into(),
            func: "max".to_string(),
            expr: expr.into(),
        }
    }
}

/// Everything a layout contributes to the document, folded in by the builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecFragment {
    /// Additions to the root of the document
    pub global: ScopeAdditions,

    /// Additions to the parent scope the layout draws in
    pub local: ScopeAdditions,

    /// Transforms appended to existing root datasets, keyed by dataset name
    pub global_transforms: Vec<(String, Vec<TransformSpec>)>,
    pub signal_patches: Vec<SignalPatch>,
}

/// The child scope a layout hands to the next layout, before it is placed in the document
#[derive(Debug, Clone, PartialEq)]
pub struct ChildScopeSpec {
    pub data_name: String,

    /// Name of the group mark in `local.marks` that becomes the child scope
    pub group: Option<String>,

    /// Name of the drawing mark in `local.marks` that receives fill and encoding rules
    pub mark: Option<String>,
    pub size_signals: SizeSignals,
    pub global_scales: Option<GlobalScales>,
    pub encoding_rule_map: Option<EncodingRuleMap>,
    pub titles: Option<Titles>,
    pub grouped_units: Option<GroupedUnits>,
}

impl ChildScopeSpec {
    pub fn new<S: Into<String>>(data_name: S, size_signals: SizeSignals) -> Self {
        Self {
            data_name: data_name.into(),
            group: None,
            mark: None,
            size_signals,
            global_scales: None,
            encoding_rule_map: None,
            titles: None,
            grouped_units: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutput {
    pub fragment: SpecFragment,
    pub scope: ChildScopeSpec,
}

/// A named mark at a scope path
#[derive(Debug, Clone, PartialEq)]
pub struct MarkRef {
    pub path: Vec<u32>,
    pub name: String,
}

/// A scope placed in the document
#[derive(Debug, Clone, PartialEq)]
pub struct InnerScope {
    pub data_name: String,
    pub path: Vec<u32>,
    pub size_signals: SizeSignals,
    pub global_scales: Option<GlobalScales>,
    pub encoding_rule_map: Option<EncodingRuleMap>,
    pub mark: Option<MarkRef>,
    pub titles: Option<Titles>,
    pub grouped_units: Option<GroupedUnits>,
}

/// The whole-canvas scope every layout can reach
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalScope {
    pub data_name: String,
    pub size_signals: SizeSignals,
}

fn add_to_scope(chart: &mut ChartSpec, path: &[u32], additions: ScopeAdditions) -> Result<Vec<(String, Vec<u32>)>> {
    for data in additions.data {
        chart.add_nested_data(path, data, None)?;
    }
    for signal in additions.signals {
        chart.add_nested_signal(path, signal, None)?;
    }
    for scale in additions.scales {
        chart.add_nested_scale(path, scale)?;
    }
    let mut groups = Vec::new();
    for mark in additions.marks {
        let name = mark.name.clone();
        if let Some(group_path) = chart.add_nested_mark(path, mark)? {
            if let Some(name) = name {
                groups.push((name, group_path));
            }
        }
    }
    Ok(groups)
}

/// Fold a layout's output into the document and resolve its child scope
pub fn apply_layout_output(
    chart: &mut ChartSpec,
    parent: &InnerScope,
    output: LayoutOutput,
) -> Result<InnerScope> {
    let LayoutOutput { fragment, scope } = output;

    for (data_name, transforms) in fragment.global_transforms {
        chart
            .get_nested_data_mut(&[], &data_name)?
            .transform
            .extend(transforms);
    }
    add_to_scope(chart, &[], fragment.global)?;
    for patch in fragment.signal_patches {
        chart
            .get_nested_signal_mut(&[], &patch.name)?
            .modify(&patch.func, &patch.expr);
    }
    let groups = add_to_scope(chart, &parent.path, fragment.local)?;

    let path = match &scope.group {
        Some(group) => groups
            .into_iter()
            .find(|(name, _)| name == group)
            .map(|(_, path)| path)
            .with_context(|| format!("Layout did not add its group mark {group}"))?,
        None => parent.path.clone(),
    };
    let mark = match scope.mark {
        Some(name) => {
            chart.get_nested_mark_mut(&parent.path, &name).map_err(|_| {
                SandDanceError::specification(format!("Layout did not add its mark {name}"))
            })?;
            Some(MarkRef {
                path: parent.path.clone(),
                name,
            })
        }
        None => None,
    };
    debug!("Placed scope for data {} at {:?}", scope.data_name, path);

    Ok(InnerScope {
        data_name: scope.data_name,
        path,
        size_signals: scope.size_signals,
        global_scales: scope.global_scales,
        encoding_rule_map: scope.encoding_rule_map,
        mark,
        titles: scope.titles,
        grouped_units: scope.grouped_units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::mark::MarkFacetSpec;

    fn root() -> (ChartSpec, InnerScope) {
        let mut chart = ChartSpec::default();
        chart.data.push(DataSpec::new("data_source"));
        chart
            .signals
            .push(SignalSpec::update("PlotWidthOut", "PlotWidthIn"));
        let path = chart
            .add_nested_mark(&[], MarkSpec::unnamed("group"))
            .unwrap()
            .unwrap();
        let scope = InnerScope {
            data_name: "data_source".to_string(),
            path,
            size_signals: SizeSignals::new("PlotWidthIn", "PlotHeightIn"),
            global_scales: None,
            encoding_rule_map: None,
            mark: None,
            titles: None,
            grouped_units: None,
        };
        (chart, scope)
    }

    #[test]
    fn test_apply_places_group_and_patches() {
        let (mut chart, parent) = root();
        let mut fragment = SpecFragment::default();
        fragment.global.signals.push(SignalSpec::update("cell", "10"));
        fragment
            .global_transforms
            .push(("data_source".to_string(), vec![TransformSpec::filter("datum.x > 0")]));
        fragment
            .signal_patches
            .push(SignalPatch::max("PlotWidthOut", "cell * 3"));
        fragment.local.marks.push(MarkSpec::new("group", "cells").with_facet(
            MarkFacetSpec {
                name: "facet_cells".to_string(),
                data: "data_source".to_string(),
                groupby: vec!["x".to_string()],
                aggregate: None,
            },
        ));
        let mut scope = ChildScopeSpec::new("facet_cells", SizeSignals::new("cell", "cell"));
        scope.group = Some("cells".to_string());

        let child = apply_layout_output(&mut chart, &parent, LayoutOutput { fragment, scope }).unwrap();
        assert_eq!(child.path, vec![0, 0]);
        assert_eq!(chart.data[0].transform.len(), 1);
        assert_eq!(
            chart.get_nested_signal(&[], "PlotWidthOut").unwrap().update.as_deref(),
            Some("max(PlotWidthIn, cell * 3)")
        );
    }

    #[test]
    fn test_missing_mark_is_an_error() {
        let (mut chart, parent) = root();
        let mut scope = ChildScopeSpec::new("data_source", parent.size_signals.clone());
        scope.mark = Some("points".to_string());
        let output = LayoutOutput {
            fragment: SpecFragment::default(),
            scope,
        };
        assert!(apply_layout_output(&mut chart, &parent, output).is_err());
    }
}
