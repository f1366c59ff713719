// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hand-off to a provisioning engine.
//!
//! The engine that creates resources lives outside this crate. What the
//! declaration owes it is an order: [`DeploymentPlan`] groups resources into
//! creation waves, where every step waits only on steps of earlier waves, and
//! derives the teardown order in which removed resources are either deleted or
//! detached and retained.
//!
//! Engines plug in through the [`Provisioner`] trait. [`RecordingProvisioner`]
//! applies nothing; it records the order steps were issued in and checks each
//! step's prerequisites were issued first.

use std::fmt;
use tracing::{debug, info};

use crate::errors::{GraphError, ProvisionError};
use crate::graph::ResourceGraph;
use crate::model::{LogicalId, RemovalPolicy};

/// One resource to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanStep {
    pub logical_id: LogicalId,
    pub resource_type: String,
    /// Resources that must exist before this one is created
    pub waits_on: Vec<LogicalId>,
    pub removal_policy: RemovalPolicy,
}

/// What happens to a resource when the declaration is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownAction {
    Delete,
    /// Detached from the declaration; the resource and its data stay
    Retain,
}

impl fmt::Display for TeardownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => f.pad("delete"),
            Self::Retain => f.pad("retain"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeardownStep {
    pub logical_id: LogicalId,
    pub resource_type: String,
    pub action: TeardownAction,
}

/// Creation order of a validated resource graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentPlan {
    waves: Vec<Vec<PlanStep>>,
}

impl DeploymentPlan {
    /// Builds the plan from the graph's dependency waves.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if the graph has dangling references or cycles.
    pub fn from_graph(graph: &ResourceGraph) -> Result<Self, GraphError> {
        let waves = graph
            .waves()?
            .into_iter()
            .map(|wave| {
                wave.into_iter()
                    .map(|resource| PlanStep {
                        logical_id: resource.logical_id.clone(),
                        resource_type: resource.resource_type().to_string(),
                        waits_on: graph
                            .dependencies_of(&resource.logical_id)
                            .into_iter()
                            .cloned()
                            .collect(),
                        removal_policy: resource.removal_policy,
                    })
                    .collect()
            })
            .collect::<Vec<Vec<PlanStep>>>();

        debug!(
            "Deployment plan: {} waves, {} steps",
            waves.len(),
            waves.iter().map(Vec::len).sum::<usize>()
        );
        Ok(Self { waves })
    }

    #[must_use]
    pub fn waves(&self) -> &[Vec<PlanStep>] {
        &self.waves
    }

    /// Steps in creation order.
    pub fn steps(&self) -> impl Iterator<Item = &PlanStep> {
        self.waves.iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Reverse creation order; retained resources are detached, never deleted.
    #[must_use]
    pub fn teardown(&self) -> Vec<TeardownStep> {
        self.waves
            .iter()
            .rev()
            .flat_map(|wave| wave.iter().rev())
            .map(|step| TeardownStep {
                logical_id: step.logical_id.clone(),
                resource_type: step.resource_type.clone(),
                action: match step.removal_policy {
                    RemovalPolicy::Retain => TeardownAction::Retain,
                    RemovalPolicy::Delete => TeardownAction::Delete,
                },
            })
            .collect()
    }
}

/// Result of applying a plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Steps in the order they were issued
    pub applied: Vec<LogicalId>,
}

/// A provisioning engine that can carry out a [`DeploymentPlan`].
pub trait Provisioner {
    /// Applies every step of the plan, in an order compatible with its waves.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] for the first step that cannot be applied.
    fn apply(&mut self, plan: &DeploymentPlan) -> Result<ApplyReport, ProvisionError>;
}

/// Dry-run provisioner that records the order steps are issued in.
#[derive(Clone, Debug, Default)]
pub struct RecordingProvisioner {
    issued: Vec<LogicalId>,
}

impl RecordingProvisioner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps issued so far, across every applied plan.
    #[must_use]
    pub fn issued(&self) -> &[LogicalId] {
        &self.issued
    }

    /// Issues one step after checking its prerequisites were issued.
    ///
    /// Re-issuing an already issued step is a no-op, so a re-run converges.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PrerequisiteNotApplied`] if a prerequisite is missing.
    pub fn issue(&mut self, step: &PlanStep) -> Result<bool, ProvisionError> {
        if self.issued.contains(&step.logical_id) {
            debug!("{} already issued, skipping", step.logical_id);
            return Ok(false);
        }
        if let Some(missing) = step.waits_on.iter().find(|id| !self.issued.contains(id)) {
            return Err(ProvisionError::PrerequisiteNotApplied {
                logical_id: step.logical_id.to_string(),
                prerequisite: missing.to_string(),
            });
        }
        debug!("Issuing {} {}", step.resource_type, step.logical_id);
        self.issued.push(step.logical_id.clone());
        Ok(true)
    }
}

impl Provisioner for RecordingProvisioner {
    fn apply(&mut self, plan: &DeploymentPlan) -> Result<ApplyReport, ProvisionError> {
        let mut report = ApplyReport::default();
        for step in plan.steps() {
            if self.issue(step)? {
                report.applied.push(step.logical_id.clone());
            }
        }
        info!(
            "Dry run issued {} of {} steps",
            report.applied.len(),
            plan.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;
