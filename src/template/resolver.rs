//! Reference resolution and dependency ordering
//!
//! Every `Ref`, `Fn::GetAtt`, `Fn::Sub` variable and explicit `DependsOn` is
//! checked against the names declared in the template. References between
//! resources become edges of a dependency graph, which must be acyclic.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{Result, TemplateError};
use crate::substitution;

use super::document::Template;
use super::value::{Intrinsic, Value};

/// Pseudo parameters that always resolve as `Ref` targets
pub const PSEUDO_PARAMETERS: &[&str] = &[
    "AWS::AccountId",
    "AWS::NotificationARNs",
    "AWS::NoValue",
    "AWS::Partition",
    "AWS::Region",
    "AWS::StackId",
    "AWS::StackName",
    "AWS::URLSuffix",
];

/// Check whether a name is a pseudo parameter
pub fn is_pseudo_parameter(name: &str) -> bool {
    PSEUDO_PARAMETERS.contains(&name)
}

/// A reference found while walking a value
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reference {
    /// `Ref` or `${Name}`: resource, parameter or pseudo parameter
    Identity(String),
    /// `Fn::GetAtt` or `${Name.Attr}`: resource only
    Attribute(String),
    /// `DependsOn`: resource only
    Explicit(String),
}

impl Reference {
    fn target(&self) -> &str {
        match self {
            Reference::Identity(name) | Reference::Attribute(name) | Reference::Explicit(name) => {
                name
            }
        }
    }
}

/// Dependency graph of a fully resolved template
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Resources a given resource depends on, in declaration order
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: petgraph::Direction) -> Vec<String> {
        let Some(&node) = self.indices.get(name) else {
            return Vec::new();
        };
        let mut nodes: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        nodes.sort();
        nodes.dedup();
        nodes.into_iter().map(|n| self.graph[n].clone()).collect()
    }

    /// Resource names ordered so that each follows all of its dependencies
    pub fn creation_order(&self) -> Result<Vec<String>> {
        let sorted = toposort(&self.graph, None).map_err(|_| self.cycle_error())?;
        Ok(sorted.into_iter().map(|n| self.graph[n].clone()).collect())
    }

    /// Describe one cycle of the graph, members in declaration order
    fn cycle_error(&self) -> TemplateError {
        let cycle = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|mut component| {
                component.sort();
                component
            })
            .min_by_key(|component| component[0])
            .unwrap_or_default();

        let mut names: Vec<String> = cycle.iter().map(|&n| self.graph[n].clone()).collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        TemplateError::CircularDependency { cycle: names }
    }
}

/// Resolve every reference in a template and build its dependency graph
///
/// Fails on the first unresolved reference (in declaration order) or, once all
/// references resolve, on a dependency cycle.
pub fn resolve(template: &Template) -> Result<DependencyGraph> {
    let resources: HashSet<&str> = template.resources().map(|r| r.name.as_str()).collect();
    let parameters: HashSet<&str> = template.parameters().map(|p| p.name.as_str()).collect();
    let declared: Vec<&str> = template
        .parameters()
        .map(|p| p.name.as_str())
        .chain(template.resources().map(|r| r.name.as_str()))
        .collect();

    let check = |location: &str, reference: &Reference| -> Result<()> {
        let target = reference.target();
        let resolved = match reference {
            Reference::Identity(_) => {
                resources.contains(target) || parameters.contains(target) || is_pseudo_parameter(target)
            }
            Reference::Attribute(_) | Reference::Explicit(_) => resources.contains(target),
        };
        if resolved {
            Ok(())
        } else {
            Err(TemplateError::unresolved(
                location,
                target,
                find_similar(&declared, target, 2),
            ))
        }
    };

    for parameter in template.parameters() {
        let location = format!("parameter '{}'", parameter.name);
        let mut refs = Vec::new();
        if let Some(default) = &parameter.default {
            collect_references(default, &mut refs)?;
        }
        for reference in &refs {
            check(&location, reference)?;
        }
    }

    let mut graph = DiGraph::new();
    let mut indices = HashMap::new();
    for resource in template.resources() {
        let node = graph.add_node(resource.name.clone());
        indices.insert(resource.name.clone(), node);
    }

    for resource in template.resources() {
        let location = format!("resource '{}'", resource.name);
        let mut refs = Vec::new();
        for (_, value) in resource.properties.iter() {
            collect_references(value, &mut refs)?;
        }
        refs.extend(resource.depends_on.iter().cloned().map(Reference::Explicit));

        let node = indices[&resource.name];
        for reference in &refs {
            check(&location, reference)?;
            if let Some(&target) = indices.get(reference.target()) {
                graph.update_edge(target, node, ());
            }
        }
    }

    for output in template.outputs() {
        let location = format!("output '{}'", output.name);
        let mut refs = Vec::new();
        collect_references(&output.value, &mut refs)?;
        if let Some(export) = &output.export_name {
            collect_references(export, &mut refs)?;
        }
        for reference in &refs {
            check(&location, reference)?;
        }
    }

    let graph = DependencyGraph { graph, indices };
    graph.creation_order()?;
    Ok(graph)
}

/// Walk a value collecting references
fn collect_references(value: &Value, out: &mut Vec<Reference>) -> Result<()> {
    match value {
        Value::List(items) => {
            for item in items {
                collect_references(item, out)?;
            }
        }
        Value::Map(map) => {
            for item in map.values() {
                collect_references(item, out)?;
            }
        }
        Value::Intrinsic(intrinsic) => match intrinsic {
            Intrinsic::Ref(name) => out.push(Reference::Identity(name.clone())),
            Intrinsic::GetAtt { resource, .. } => out.push(Reference::Attribute(resource.clone())),
            Intrinsic::Sub {
                template,
                variables,
            } => {
                for value in variables.values() {
                    collect_references(value, out)?;
                }
                let scope: Vec<&str> = variables.keys().map(String::as_str).collect();
                for var in substitution::variables(template)? {
                    if scope.contains(&var.name.as_str()) {
                        continue;
                    }
                    match var.attribute {
                        Some(_) => out.push(Reference::Attribute(var.name)),
                        None => out.push(Reference::Identity(var.name)),
                    }
                }
            }
            Intrinsic::Join { values, .. } => {
                for item in values {
                    collect_references(item, out)?;
                }
            }
            Intrinsic::Select { list, .. } => collect_references(list, out)?,
            Intrinsic::Base64(inner) | Intrinsic::ImportValue(inner) => {
                collect_references(inner, out)?
            }
            Intrinsic::GetAZs(_) => {}
        },
        _ => {}
    }
    Ok(())
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find declared names within a maximum edit distance, closest first
fn find_similar(declared: &[&str], target: &str, max_distance: usize) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = declared
        .iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((*name, dist))
        })
        .collect();

    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
