use crate::spec::axis::AxisSpec;
use crate::spec::data::DataSpec;
use crate::spec::legend::LegendSpec;
use crate::spec::mark::MarkSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use crate::spec::validate::ReferenceCheckVisitor;
use sanddance_common::error::{Result, ResultWithContext, SandDanceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema", default = "default_schema")]
    pub schema: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<ScaleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legends: Vec<LegendSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            data: Vec::new(),
            signals: Vec::new(),
            scales: Vec::new(),
            axes: Vec::new(),
            legends: Vec::new(),
            marks: Vec::new(),
            extra: Default::default(),
        }
    }
}

pub fn default_schema() -> String {
    String::from("https://vega.github.io/schema/vega/v5.json")
}

/// Mutable views of the definition lists held by one scope (the root or a group mark)
struct ScopeListsMut<'a> {
    data: &'a mut Vec<DataSpec>,
    signals: &'a mut Vec<SignalSpec>,
    scales: &'a mut Vec<ScaleSpec>,
    axes: &'a mut Vec<AxisSpec>,
    marks: &'a mut Vec<MarkSpec>,
}

impl ChartSpec {
    pub fn walk(&self, visitor: &mut dyn ChartVisitor) -> Result<()> {
        // Visit top-level chart
        visitor.visit_chart(self)?;

        // Top-level with empty scope
        let scope: Vec<u32> = Vec::new();
        for data in &self.data {
            visitor.visit_data(data, &scope)?;
        }
        for signal in &self.signals {
            visitor.visit_signal(signal, &scope)?;
        }
        for scale in &self.scales {
            visitor.visit_scale(scale, &scope)?;
        }
        for axis in &self.axes {
            visitor.visit_axis(axis, &scope)?;
        }
        for legend in &self.legends {
            visitor.visit_legend(legend, &scope)?;
        }

        // Child groups
        let mut group_index = 0;
        for mark in &self.marks {
            if mark.is_group() {
                // Add group index to scope
                let mut nested_scope = scope.clone();
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk(visitor, &nested_scope)?;
                group_index += 1;
            } else {
                // Keep parent scope
                visitor.visit_non_group_mark(mark, &scope)?;
            }
        }

        Ok(())
    }

    pub fn walk_mut(&mut self, visitor: &mut dyn MutChartVisitor) -> Result<()> {
        visitor.visit_chart(self)?;

        let scope: Vec<u32> = Vec::new();
        for data in &mut self.data {
            visitor.visit_data(data, &scope)?;
        }
        for signal in &mut self.signals {
            visitor.visit_signal(signal, &scope)?;
        }
        for scale in &mut self.scales {
            visitor.visit_scale(scale, &scope)?;
        }
        for axis in &mut self.axes {
            visitor.visit_axis(axis, &scope)?;
        }

        let mut group_index = 0;
        for mark in &mut self.marks {
            if mark.is_group() {
                let mut nested_scope = scope.clone();
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk_mut(visitor, &nested_scope)?;
                group_index += 1;
            } else {
                visitor.visit_non_group_mark(mark, &scope)?;
            }
        }

        Ok(())
    }

    /// Every reference that does not resolve to an earlier definition in the same or an
    /// ancestor scope, plus duplicate names and malformed expressions
    pub fn unresolved_references(&self) -> Result<Vec<String>> {
        let mut visitor = ReferenceCheckVisitor::try_new(self)?;
        self.walk(&mut visitor)?;
        Ok(visitor.finish())
    }

    pub fn get_group(&self, group_index: u32) -> Result<&MarkSpec> {
        self.marks
            .iter()
            .filter(|m| m.is_group())
            .nth(group_index as usize)
            .with_context(|| format!("No group with index {}", group_index))
    }

    pub fn get_nested_group(&self, path: &[u32]) -> Result<&MarkSpec> {
        if path.is_empty() {
            return Err(SandDanceError::internal(
                "Nested group scope may not be empty",
            ));
        }
        let mut group = self.get_group(path[0])?;
        for group_index in &path[1..] {
            group = group.get_group(*group_index)?;
        }
        Ok(group)
    }

    pub fn get_group_mut(&mut self, group_index: u32) -> Result<&mut MarkSpec> {
        self.marks
            .iter_mut()
            .filter(|m| m.is_group())
            .nth(group_index as usize)
            .with_context(|| format!("No group with index {}", group_index))
    }

    pub fn get_nested_group_mut(&mut self, path: &[u32]) -> Result<&mut MarkSpec> {
        if path.is_empty() {
            return Err(SandDanceError::internal("Path may not be empty"));
        }
        let mut group = self.get_group_mut(path[0])?;
        for group_index in &path[1..] {
            group = group.get_group_mut(*group_index)?;
        }
        Ok(group)
    }

    fn scope_lists_mut(&mut self, path: &[u32]) -> Result<ScopeListsMut<'_>> {
        if path.is_empty() {
            Ok(ScopeListsMut {
                data: &mut self.data,
                signals: &mut self.signals,
                scales: &mut self.scales,
                axes: &mut self.axes,
                marks: &mut self.marks,
            })
        } else {
            let group = self.get_nested_group_mut(path)?;
            Ok(ScopeListsMut {
                data: &mut group.data,
                signals: &mut group.signals,
                scales: &mut group.scales,
                axes: &mut group.axes,
                marks: &mut group.marks,
            })
        }
    }

    pub fn get_nested_signal(&self, path: &[u32], name: &str) -> Result<&SignalSpec> {
        let signals = if path.is_empty() {
            &self.signals
        } else {
            let group = self.get_nested_group(path)?;
            &group.signals
        };
        signals
            .iter()
            .find(|s| s.name == name)
            .with_context(|| format!("No signal named {} found at path {:?}", name, path))
    }

    pub fn get_nested_signal_mut(&mut self, path: &[u32], name: &str) -> Result<&mut SignalSpec> {
        let lists = self.scope_lists_mut(path)?;
        lists
            .signals
            .iter_mut()
            .find(|s| s.name == name)
            .with_context(|| format!("No signal named {} found at path {:?}", name, path))
    }

    pub fn get_nested_data(&self, path: &[u32], name: &str) -> Result<&DataSpec> {
        let datasets = if path.is_empty() {
            &self.data
        } else {
            let group = self.get_nested_group(path)?;
            &group.data
        };
        datasets
            .iter()
            .find(|s| s.name == name)
            .with_context(|| format!("No data named {} found at path {:?}", name, path))
    }

    pub fn get_nested_data_mut(&mut self, path: &[u32], name: &str) -> Result<&mut DataSpec> {
        let lists = self.scope_lists_mut(path)?;
        lists
            .data
            .iter_mut()
            .find(|s| s.name == name)
            .with_context(|| format!("No data named {} found at path {:?}", name, path))
    }

    /// Find a named mark among the direct children of the scope at `path`
    pub fn get_nested_mark_mut(&mut self, path: &[u32], name: &str) -> Result<&mut MarkSpec> {
        let lists = self.scope_lists_mut(path)?;
        lists
            .marks
            .iter_mut()
            .find(|m| m.name.as_deref() == Some(name))
            .with_context(|| format!("No mark named {} found at path {:?}", name, path))
    }

    pub fn add_nested_signal(
        &mut self,
        path: &[u32],
        spec: SignalSpec,
        index: Option<usize>,
    ) -> Result<()> {
        let lists = self.scope_lists_mut(path)?;
        match index {
            Some(index) => {
                lists.signals.insert(index, spec);
            }
            None => {
                lists.signals.push(spec);
            }
        }
        Ok(())
    }

    pub fn add_nested_data(
        &mut self,
        path: &[u32],
        spec: DataSpec,
        index: Option<usize>,
    ) -> Result<()> {
        let lists = self.scope_lists_mut(path)?;
        match index {
            Some(index) => {
                lists.data.insert(index, spec);
            }
            None => {
                lists.data.push(spec);
            }
        }
        Ok(())
    }

    pub fn add_nested_scale(&mut self, path: &[u32], spec: ScaleSpec) -> Result<()> {
        self.scope_lists_mut(path)?.scales.push(spec);
        Ok(())
    }

    pub fn add_nested_axis(&mut self, path: &[u32], spec: AxisSpec) -> Result<()> {
        self.scope_lists_mut(path)?.axes.push(spec);
        Ok(())
    }

    /// Append a mark to the scope at `path`, returning the new scope path when the mark is a group
    pub fn add_nested_mark(&mut self, path: &[u32], spec: MarkSpec) -> Result<Option<Vec<u32>>> {
        let lists = self.scope_lists_mut(path)?;
        let group_index = lists.marks.iter().filter(|m| m.is_group()).count() as u32;
        let is_group = spec.is_group();
        lists.marks.push(spec);
        if is_group {
            let mut nested = Vec::from(path);
            nested.push(group_index);
            Ok(Some(nested))
        } else {
            Ok(None)
        }
    }
}

pub trait ChartVisitor {
    fn visit_chart(&mut self, _chart: &ChartSpec) -> Result<()> {
        Ok(())
    }
    fn visit_data(&mut self, _data: &DataSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_signal(&mut self, _signal: &SignalSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_scale(&mut self, _scale: &ScaleSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_axis(&mut self, _axis: &AxisSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_legend(&mut self, _legend: &LegendSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_non_group_mark(&mut self, _mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_group_mark(&mut self, _mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
}

pub trait MutChartVisitor {
    fn visit_chart(&mut self, _chart: &mut ChartSpec) -> Result<()> {
        Ok(())
    }
    fn visit_data(&mut self, _data: &mut DataSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_signal(&mut self, _signal: &mut SignalSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_scale(&mut self, _scale: &mut ScaleSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_axis(&mut self, _axis: &mut AxisSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_non_group_mark(&mut self, _mark: &mut MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_group_mark(&mut self, _mark: &mut MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_nested_mark_returns_group_path() {
        let mut chart = ChartSpec::default();
        let plot = chart
            .add_nested_mark(&[], MarkSpec::unnamed("group"))
            .unwrap();
        assert_eq!(plot, Some(vec![0]));

        let rect = chart
            .add_nested_mark(&[0], MarkSpec::new("rect", "points"))
            .unwrap();
        assert_eq!(rect, None);

        let cell = chart
            .add_nested_mark(&[0], MarkSpec::new("group", "cells"))
            .unwrap();
        assert_eq!(cell, Some(vec![0, 0]));

        chart
            .add_nested_signal(&[0, 0], SignalSpec::update("cell_size", "10"), None)
            .unwrap();
        assert_eq!(
            chart.get_nested_signal(&[0, 0], "cell_size").unwrap().update,
            Some("10".to_string())
        );
        assert!(chart.get_nested_mark_mut(&[0], "points").is_ok());
    }

    #[test]
    fn test_root_serializes_definitions_before_marks() {
        let mut chart = ChartSpec::default();
        chart.data.push(DataSpec::new("origin"));
        chart.marks.push(MarkSpec::unnamed("group"));
        chart
            .signals
            .push(SignalSpec::update("width", "PlotWidthOut"));
        let json = serde_json::to_string(&chart).unwrap();
        let data_pos = json.find("\"data\"").unwrap();
        let signals_pos = json.find("\"signals\"").unwrap();
        let marks_pos = json.find("\"marks\"").unwrap();
        assert!(data_pos < signals_pos && signals_pos < marks_pos);
    }
}
