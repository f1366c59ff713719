// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource graph: declared resources plus the typed edges between them.
//!
//! Edges are never added by hand. Each resource reports the references carried
//! by its properties and the graph records one edge per reference, so the
//! graph cannot disagree with the synthesized template.
//!
//! Before a graph is handed to a provisioning engine it must pass
//! [`ResourceGraph::validate`]:
//! - every edge target is a declared resource (no dangling references)
//! - the edges are acyclic, so a creation order exists

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::errors::GraphError;
use crate::model::{LogicalId, Relation, Resource};

/// A directed reference: `source` cannot be created before `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: LogicalId,
    pub target: LogicalId,
    pub relation: Relation,
}

/// Resources in declaration order and the edges between them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
    index: BTreeMap<LogicalId, usize>,
    edges: Vec<Edge>,
}

impl ResourceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource and records an edge for each of its references.
    ///
    /// Targets do not have to be declared yet; dangling edges are reported by
    /// [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateLogicalId`] if the id is already declared.
    pub fn add(&mut self, resource: Resource) -> Result<LogicalId, GraphError> {
        let logical_id = resource.logical_id.clone();
        if self.index.contains_key(&logical_id) {
            warn!("Rejecting duplicate logical id {}", logical_id);
            return Err(GraphError::DuplicateLogicalId {
                logical_id: logical_id.to_string(),
            });
        }

        for reference in resource.references() {
            self.edges.push(Edge {
                source: logical_id.clone(),
                target: reference.target,
                relation: reference.relation,
            });
        }

        debug!(
            "Declared {} {} at {}",
            resource.resource_type(),
            logical_id,
            resource.construct_path
        );
        self.index.insert(logical_id.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(logical_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    #[must_use]
    pub fn get(&self, logical_id: &LogicalId) -> Option<&Resource> {
        self.index.get(logical_id).map(|&i| &self.resources[i])
    }

    /// Resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Resources of one resource type, in declaration order.
    #[must_use]
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.resource_type() == resource_type)
            .collect()
    }

    /// Distinct ids `logical_id` references, in order of first reference.
    #[must_use]
    pub fn dependencies_of(&self, logical_id: &LogicalId) -> Vec<&LogicalId> {
        let mut targets: Vec<&LogicalId> = Vec::new();
        for edge in self.edges.iter().filter(|e| &e.source == logical_id) {
            if !targets.contains(&&edge.target) {
                targets.push(&edge.target);
            }
        }
        targets
    }

    /// Distinct ids referencing `logical_id`, in declaration order.
    #[must_use]
    pub fn dependents_of(&self, logical_id: &LogicalId) -> Vec<&LogicalId> {
        let mut sources: Vec<&LogicalId> = Vec::new();
        for edge in self.edges.iter().filter(|e| &e.target == logical_id) {
            if !sources.contains(&&edge.source) {
                sources.push(&edge.source);
            }
        }
        sources
    }

    /// Checks that every reference resolves and that the graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DanglingReference`] for the first edge whose target
    /// is not declared, or [`GraphError::Cycle`] if no creation order exists.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check_references()?;
        let order = self.ordered_indices()?;
        debug!(
            "Resource graph valid: {} resources, {} edges, {} ordered",
            self.resources.len(),
            self.edges.len(),
            order.len()
        );
        Ok(())
    }

    /// Resources ordered so that every resource follows everything it references.
    ///
    /// Ties are broken by declaration order, so the result is deterministic.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn topological_order(&self) -> Result<Vec<&Resource>, GraphError> {
        self.check_references()?;
        Ok(self
            .ordered_indices()?
            .into_iter()
            .map(|i| &self.resources[i])
            .collect())
    }

    /// Resources grouped by dependency depth.
    ///
    /// Wave 0 holds resources without references; every member of wave `n`
    /// references only members of earlier waves and at least one of wave `n - 1`.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn waves(&self) -> Result<Vec<Vec<&Resource>>, GraphError> {
        self.check_references()?;
        let order = self.ordered_indices()?;
        let dependencies = self.dependency_sets();

        let mut depth = vec![0usize; self.resources.len()];
        for &i in &order {
            let level = dependencies[i]
                .iter()
                .map(|&d| depth[d] + 1)
                .max()
                .unwrap_or(0);
            depth[i] = level;
        }

        let wave_count = depth.iter().max().map_or(0, |d| d + 1);
        let mut waves: Vec<Vec<&Resource>> = vec![Vec::new(); wave_count];
        for (i, resource) in self.resources.iter().enumerate() {
            waves[depth[i]].push(resource);
        }
        Ok(waves)
    }

    /// Graphviz rendering of the graph, edges labelled with their relation.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph sitestack {\n    rankdir=BT;\n");
        for resource in &self.resources {
            let _ = writeln!(
                dot,
                "    \"{}\" [label=\"{}\\n{}\"];",
                resource.logical_id,
                resource.logical_id,
                resource.resource_type()
            );
        }
        for edge in &self.edges {
            let _ = writeln!(
                dot,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                edge.source, edge.target, edge.relation
            );
        }
        dot.push_str("}\n");
        dot
    }

    fn check_references(&self) -> Result<(), GraphError> {
        match self
            .edges
            .iter()
            .find(|e| !self.index.contains_key(&e.target))
        {
            Some(edge) => Err(GraphError::DanglingReference {
                source_id: edge.source.to_string(),
                target: edge.target.to_string(),
                relation: edge.relation.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Distinct dependency indices per resource. Assumes references resolve.
    fn dependency_sets(&self) -> Vec<BTreeSet<usize>> {
        let mut dependencies = vec![BTreeSet::new(); self.resources.len()];
        for edge in &self.edges {
            if let (Some(&source), Some(&target)) =
                (self.index.get(&edge.source), self.index.get(&edge.target))
            {
                dependencies[source].insert(target);
            }
        }
        dependencies
    }

    /// Kahn's algorithm, always releasing the earliest declared ready resource.
    fn ordered_indices(&self) -> Result<Vec<usize>, GraphError> {
        let dependencies = self.dependency_sets();
        let mut dependents = vec![Vec::new(); self.resources.len()];
        let mut pending: Vec<usize> = dependencies.iter().map(BTreeSet::len).collect();
        for (source, targets) in dependencies.iter().enumerate() {
            for &target in targets {
                dependents[target].push(source);
            }
        }

        let mut ready: BTreeSet<usize> = pending
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.resources.len());

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < self.resources.len() {
            // Unordered resources that cannot reach themselves only sit downstream of a cycle.
            let members: Vec<String> = (0..self.resources.len())
                .filter(|&i| pending[i] > 0 && reaches_itself(i, &dependencies))
                .map(|i| self.resources[i].logical_id.to_string())
                .collect();
            warn!("Dependency cycle detected between {:?}", members);
            return Err(GraphError::Cycle { members });
        }

        Ok(order)
    }
}

/// Whether following dependencies from `start` leads back to `start`.
fn reaches_itself(start: usize, dependencies: &[BTreeSet<usize>]) -> bool {
    let mut visited = BTreeSet::new();
    let mut stack: Vec<usize> = dependencies[start].iter().copied().collect();
    while let Some(next) = stack.pop() {
        if next == start {
            return true;
        }
        if visited.insert(next) {
            stack.extend(dependencies[next].iter().copied());
        }
    }
    false
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod graph_tests;
