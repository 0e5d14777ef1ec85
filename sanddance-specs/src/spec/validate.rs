use crate::expression::ast::{Expression, Literal};
use crate::expression::parser::parse;
use crate::spec::axis::AxisSpec;
use crate::spec::chart::{ChartSpec, ChartVisitor};
use crate::spec::data::DataSpec;
use crate::spec::legend::LegendSpec;
use crate::spec::mark::MarkSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use sanddance_common::error::Result;
use std::collections::{HashMap, HashSet};

/// Identifiers the renderer provides without a signal definition
const BUILTIN_IDENTIFIERS: &[&str] = &[
    "datum",
    "parent",
    "item",
    "event",
    "group",
    "width",
    "height",
    "padding",
    "autosize",
    "background",
    "PI",
    "E",
    "NaN",
    "Infinity",
    "undefined",
];

/// Expression functions whose first argument names a scale
const SCALE_FUNCTIONS: &[&str] = &["scale", "invert", "bandwidth", "domain", "range"];

#[derive(Clone, Debug, Default)]
struct ScopeNames {
    data: HashSet<String>,
    signals: HashSet<String>,
    scales: HashSet<String>,
    marks: HashSet<String>,
}

/// Collects every definition per scope, regardless of position
#[derive(Clone, Debug, Default)]
struct DefinitionCollector {
    scopes: HashMap<Vec<u32>, ScopeNames>,
}

impl DefinitionCollector {
    fn scope_mut(&mut self, scope: &[u32]) -> &mut ScopeNames {
        self.scopes.entry(scope.to_vec()).or_default()
    }
}

impl ChartVisitor for DefinitionCollector {
    fn visit_data(&mut self, data: &DataSpec, scope: &[u32]) -> Result<()> {
        let names = self.scope_mut(scope);
        names.data.insert(data.name.clone());
        names.signals.extend(data.output_signals());
        Ok(())
    }

    fn visit_signal(&mut self, signal: &SignalSpec, scope: &[u32]) -> Result<()> {
        self.scope_mut(scope).signals.insert(signal.name.clone());
        Ok(())
    }

    fn visit_scale(&mut self, scale: &ScaleSpec, scope: &[u32]) -> Result<()> {
        self.scope_mut(scope).scales.insert(scale.name.clone());
        Ok(())
    }

    fn visit_group_mark(&mut self, mark: &MarkSpec, scope: &[u32]) -> Result<()> {
        if let Some(facet) = mark.from.as_ref().and_then(|from| from.facet.as_ref()) {
            self.scope_mut(scope).data.insert(facet.name.clone());
        }
        Ok(())
    }
}

/// Walks a chart in emitted order and records every reference that does not resolve
pub struct ReferenceCheckVisitor {
    everywhere: HashMap<Vec<u32>, ScopeNames>,
    defined: HashMap<Vec<u32>, ScopeNames>,
    violations: Vec<String>,
}

type NameSelector = fn(&ScopeNames) -> &HashSet<String>;

fn signal_names(names: &ScopeNames) -> &HashSet<String> {
    &names.signals
}

fn data_names(names: &ScopeNames) -> &HashSet<String> {
    &names.data
}

fn scale_names(names: &ScopeNames) -> &HashSet<String> {
    &names.scales
}

enum NamedReference {
    Data(String),
    Scale(String),
}

impl ReferenceCheckVisitor {
    pub fn try_new(chart: &ChartSpec) -> Result<Self> {
        let mut collector = DefinitionCollector::default();
        chart.walk(&mut collector)?;
        Ok(Self {
            everywhere: collector.scopes,
            defined: HashMap::new(),
            violations: Vec::new(),
        })
    }

    pub fn finish(self) -> Vec<String> {
        self.violations
    }

    fn defined_mut(&mut self, scope: &[u32]) -> &mut ScopeNames {
        self.defined.entry(scope.to_vec()).or_default()
    }

    fn data_defined(&self, name: &str, scope: &[u32]) -> bool {
        (0..=scope.len()).any(|depth| {
            self.defined
                .get(&scope[..depth])
                .is_some_and(|names| names.data.contains(name))
        })
    }

    fn scale_defined(&self, name: &str, scope: &[u32]) -> bool {
        (0..=scope.len()).any(|depth| {
            self.defined
                .get(&scope[..depth])
                .is_some_and(|names| names.scales.contains(name))
        })
    }

    /// Whether `name` is defined at any position along the scope chain
    fn anywhere(&self, scope: &[u32], select: NameSelector, name: &str) -> bool {
        (0..=scope.len()).any(|depth| {
            self.everywhere
                .get(&scope[..depth])
                .is_some_and(|names| select(names).contains(name))
        })
    }

    fn require_data(&mut self, name: &str, scope: &[u32], location: &str) {
        if !self.data_defined(name, scope) {
            self.violations.push(format!(
                "{location}: data {name} is not defined before use at scope {scope:?}"
            ));
        }
    }

    fn require_scale(&mut self, name: &str, scope: &[u32], location: &str) {
        if !self.scale_defined(name, scope) {
            self.violations.push(format!(
                "{location}: scale {name} is not defined before use at scope {scope:?}"
            ));
        }
    }

    fn check_expression(&mut self, expr: &str, scope: &[u32], location: &str) {
        let parsed = match parse(expr) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.violations.push(format!(
                    "{location}: expression `{expr}` failed to parse: {err}"
                ));
                return;
            }
        };

        for identifier in parsed.free_identifiers() {
            if BUILTIN_IDENTIFIERS.contains(&identifier.as_str()) {
                continue;
            }
            if !self.anywhere(scope, signal_names, &identifier) {
                self.violations.push(format!(
                    "{location}: expression `{expr}` references unknown signal {identifier}"
                ));
            }
        }

        let mut references = Vec::new();
        parsed.visit(&mut |node| {
            if let Expression::Call { callee, arguments } = node {
                if let Some(Expression::Literal(Literal::String(name))) = arguments.first() {
                    if callee == "data" {
                        references.push(NamedReference::Data(name.clone()));
                    } else if SCALE_FUNCTIONS.contains(&callee.as_str()) {
                        references.push(NamedReference::Scale(name.clone()));
                    }
                }
            }
        });
        for reference in references {
            let (kind, name, found) = match &reference {
                NamedReference::Data(name) => {
                    ("data", name, self.anywhere(scope, data_names, name))
                }
                NamedReference::Scale(name) => {
                    ("scale", name, self.anywhere(scope, scale_names, name))
                }
            };
            if !found {
                self.violations.push(format!(
                    "{location}: expression `{expr}` references unknown {kind} {name}"
                ));
            }
        }
    }

    fn check_encodings(&mut self, mark: &MarkSpec, scope: &[u32], location: &str) {
        let Some(encode) = &mark.encode else {
            return;
        };
        for encodings in encode.encodings.values() {
            for (channel, rules) in &encodings.channels {
                for rule in rules.to_vec() {
                    let channel_location = format!("{location} encoding {channel}");
                    for scale in rule.scale_references() {
                        self.require_scale(&scale, scope, &channel_location);
                    }
                    for expr in rule.expressions() {
                        self.check_expression(&expr, scope, &channel_location);
                    }
                }
            }
        }
    }

    fn check_mark_name(&mut self, mark: &MarkSpec, scope: &[u32]) {
        if let Some(name) = &mark.name {
            if !self.defined_mut(scope).marks.insert(name.clone()) {
                self.violations
                    .push(format!("Duplicate mark name {name} at scope {scope:?}"));
            }
        }
    }
}

impl ChartVisitor for ReferenceCheckVisitor {
    fn visit_data(&mut self, data: &DataSpec, scope: &[u32]) -> Result<()> {
        let location = format!("data {}", data.name);
        if let Some(source) = &data.source {
            self.require_data(source, scope, &location);
        }
        for tx in &data.transform {
            for input in tx.input_data() {
                self.require_data(&input, scope, &location);
            }
            for expr in tx.expressions() {
                self.check_expression(&expr, scope, &location);
            }
        }
        let names = self.defined_mut(scope);
        if !names.data.insert(data.name.clone()) {
            self.violations
                .push(format!("Duplicate data name {} at scope {:?}", data.name, scope));
        }
        for signal in data.output_signals() {
            if !self.defined_mut(scope).signals.insert(signal.clone()) {
                self.violations
                    .push(format!("Duplicate signal name {} at scope {:?}", signal, scope));
            }
        }
        Ok(())
    }

    fn visit_signal(&mut self, signal: &SignalSpec, scope: &[u32]) -> Result<()> {
        let location = format!("signal {}", signal.name);
        for expr in signal.update.iter().chain(signal.init.iter()) {
            self.check_expression(expr, scope, &location);
        }
        if !self.defined_mut(scope).signals.insert(signal.name.clone()) {
            self.violations.push(format!(
                "Duplicate signal name {} at scope {:?}",
                signal.name, scope
            ));
        }
        Ok(())
    }

    fn visit_scale(&mut self, scale: &ScaleSpec, scope: &[u32]) -> Result<()> {
        let location = format!("scale {}", scale.name);
        for data in scale.data_references() {
            self.require_data(&data, scope, &location);
        }
        for expr in scale.expressions() {
            self.check_expression(&expr, scope, &location);
        }
        if !self.defined_mut(scope).scales.insert(scale.name.clone()) {
            self.violations.push(format!(
                "Duplicate scale name {} at scope {:?}",
                scale.name, scope
            ));
        }
        Ok(())
    }

    fn visit_axis(&mut self, axis: &AxisSpec, scope: &[u32]) -> Result<()> {
        self.require_scale(&axis.scale, scope, "axis");
        Ok(())
    }

    fn visit_legend(&mut self, legend: &LegendSpec, scope: &[u32]) -> Result<()> {
        if let Some(fill) = &legend.fill {
            self.require_scale(fill, scope, "legend");
        }
        Ok(())
    }

    fn visit_non_group_mark(&mut self, mark: &MarkSpec, scope: &[u32]) -> Result<()> {
        let location = format!("{} mark {}", mark.type_, mark.name.as_deref().unwrap_or(""));
        if let Some(data) = mark.from.as_ref().and_then(|from| from.data.as_ref()) {
            self.require_data(data, scope, &location);
        }
        self.check_encodings(mark, scope, &location);
        self.check_mark_name(mark, scope);
        Ok(())
    }

    fn visit_group_mark(&mut self, mark: &MarkSpec, scope: &[u32]) -> Result<()> {
        // The group's own properties resolve in its parent scope
        let parent = &scope[..scope.len() - 1];
        let location = format!("group mark {}", mark.name.as_deref().unwrap_or(""));
        if let Some(from) = &mark.from {
            if let Some(data) = &from.data {
                self.require_data(data, parent, &location);
            }
            if let Some(facet) = &from.facet {
                self.require_data(&facet.data, parent, &location);
                self.defined_mut(scope).data.insert(facet.name.clone());
            }
        }
        self.check_encodings(mark, parent, &location);
        self.check_mark_name(mark, parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::chart::ChartSpec;
    use crate::spec::data::DataSpec;
    use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkFacetSpec, MarkSpec};
    use crate::spec::scale::{ScaleFieldReferenceSpec, ScaleDomainSpec, ScaleSpec, ScaleTypeSpec};
    use crate::spec::signal::SignalSpec;
    use crate::spec::transform::TransformSpec;

    fn base_chart() -> ChartSpec {
        let mut chart = ChartSpec::default();
        chart.data.push(DataSpec::new("origin"));
        chart
            .data
            .push(DataSpec::from_source("data_source", "origin"));
        chart.signals.push(SignalSpec::update("PlotWidthIn", "400"));
        chart
    }

    #[test]
    fn test_valid_chart_has_no_violations() {
        let mut chart = base_chart();
        let mut scale = ScaleSpec::new("scale_x", ScaleTypeSpec::Linear);
        scale.domain = Some(ScaleDomainSpec::FieldReference(ScaleFieldReferenceSpec::new(
            "data_source",
            "x",
        )));
        chart.scales.push(scale);
        let group = MarkSpec::new("group", "cells").with_facet(MarkFacetSpec {
            name: "facet_cell".to_string(),
            data: "data_source".to_string(),
            groupby: vec!["x".to_string()],
            aggregate: None,
        });
        let path = chart.add_nested_mark(&[], group).unwrap().unwrap();
        let rect = MarkSpec::new("rect", "points")
            .with_from_data("facet_cell")
            .with_update(
                MarkEncodingsSpec::new()
                    .with("x", MarkEncodingSpec::scaled("scale_x", "x"))
                    .with("width", MarkEncodingSpec::signal("PlotWidthIn / 2")),
            );
        chart.add_nested_mark(&path, rect).unwrap();
        assert_eq!(chart.unresolved_references().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_forward_and_unknown_references() {
        let mut chart = base_chart();
        // Uses data defined later in the same scope
        chart.data.insert(1, DataSpec::from_source("early", "late"));
        chart.data.push(DataSpec::new("late"));
        chart.data.push(
            DataSpec::from_source("filtered", "data_source")
                .with_transforms(vec![TransformSpec::filter("datum.x > Missing")]),
        );
        chart.signals.push(SignalSpec::update("PlotWidthIn", "1"));
        chart.signals.push(SignalSpec::update("bad", "1 +"));

        let violations = chart.unresolved_references().unwrap();
        assert_eq!(violations.len(), 4, "{:?}", violations);
        assert!(violations[0].contains("data late is not defined"));
        assert!(violations[1].contains("unknown signal Missing"));
        assert!(violations[2].contains("Duplicate signal name PlotWidthIn"));
        assert!(violations[3].contains("failed to parse"));
    }

    #[test]
    fn test_signals_may_reference_later_signals() {
        let mut chart = base_chart();
        chart.signals.push(SignalSpec::update("a", "b + 1"));
        chart.signals.push(SignalSpec::update("b", "2"));
        assert!(chart.unresolved_references().unwrap().is_empty());
    }
}
