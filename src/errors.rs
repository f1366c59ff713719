// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the site declaration.
//!
//! This module provides specialized error types for:
//! - Configuration loading and validation
//! - Resource graph consistency (references, identifiers, cycles)
//! - Hand-off of a deployment plan to a provisioner
//!
//! Every error exposes a CamelCase reason code so callers can report failures
//! in a structured way.

use thiserror::Error;

/// Errors raised while loading or validating a [`SiteConfig`](crate::config::SiteConfig).
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// The stack name cannot be used as a construct path root
    #[error("Invalid stack name '{stack_name}': {reason}")]
    InvalidStackName {
        /// The offending stack name
        stack_name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The target domain is not a usable zone name
    #[error("Invalid domain name '{domain}': {reason}")]
    InvalidDomain {
        /// The offending domain
        domain: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The stack region is not a region name
    #[error("Invalid region '{region}': {reason}")]
    InvalidRegion {
        /// The offending region
        region: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A bucket name breaks the storage service's naming rules
    #[error("Invalid bucket name '{bucket}': {reason}")]
    InvalidBucketName {
        /// The offending bucket name
        bucket: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A TTL string could not be parsed or is out of bounds
    #[error("Invalid TTL '{value}' for {field}: {reason}")]
    InvalidTtl {
        /// Configuration field holding the TTL
        field: String,
        /// The raw value
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The minimum TTL is larger than the default TTL
    #[error("Minimum TTL ({min_secs}s) must not exceed default TTL ({default_secs}s)")]
    TtlOrdering {
        /// Parsed minimum TTL
        min_secs: u64,
        /// Parsed default TTL
        default_secs: u64,
    },

    /// The root object is empty or looks like a path
    #[error("Invalid root object '{root_object}': {reason}")]
    InvalidRootObject {
        /// The offending root object
        root_object: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The log version tag cannot be used as a path segment
    #[error("Invalid log version '{log_version}': must be a non-empty path segment")]
    InvalidLogVersion {
        /// The offending version tag
        log_version: String,
    },

    /// An extra subject alternative name is not a valid host name
    #[error("Invalid subject alternative name '{name}': {reason}")]
    InvalidSubjectAlternativeName {
        /// The offending name
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// An extra subject alternative name is not covered by the zone
    #[error("Subject alternative name '{name}' is outside zone '{zone}'")]
    SubjectAlternativeNameOutsideZone {
        /// The offending name
        name: String,
        /// The zone it must belong to
        zone: String,
    },

    /// The configuration file could not be read
    #[error("Failed to read configuration file '{path}': {reason}")]
    Read {
        /// Path of the file
        path: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// The configuration file is not valid YAML for a site configuration
    #[error("Failed to parse configuration file '{path}': {reason}")]
    Parse {
        /// Path of the file
        path: String,
        /// Underlying parser error message
        reason: String,
    },
}

impl ConfigError {
    /// Returns the reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidStackName { .. } => "InvalidStackName",
            Self::InvalidDomain { .. } => "InvalidDomain",
            Self::InvalidRegion { .. } => "InvalidRegion",
            Self::InvalidBucketName { .. } => "InvalidBucketName",
            Self::InvalidTtl { .. } => "InvalidTtl",
            Self::TtlOrdering { .. } => "TtlOrdering",
            Self::InvalidRootObject { .. } => "InvalidRootObject",
            Self::InvalidLogVersion { .. } => "InvalidLogVersion",
            Self::InvalidSubjectAlternativeName { .. } => "InvalidSubjectAlternativeName",
            Self::SubjectAlternativeNameOutsideZone { .. } => "SubjectAlternativeNameOutsideZone",
            Self::Read { .. } => "ConfigReadFailed",
            Self::Parse { .. } => "ConfigParseFailed",
        }
    }
}

/// Errors describing an internally inconsistent resource graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two resources were declared with the same logical id
    #[error("Logical id '{logical_id}' is declared more than once")]
    DuplicateLogicalId {
        /// The duplicated id
        logical_id: String,
    },

    /// A resource references a logical id that is not declared
    #[error("Resource '{source_id}' references undeclared resource '{target}' ({relation})")]
    DanglingReference {
        /// The referencing resource
        source_id: String,
        /// The missing target
        target: String,
        /// Relation the reference expresses
        relation: String,
    },

    /// The references form a cycle, so no creation order exists
    #[error("Dependency cycle between resources: {}", members.join(", "))]
    Cycle {
        /// Logical ids that could not be ordered
        members: Vec<String>,
    },
}

impl GraphError {
    /// Returns the reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DuplicateLogicalId { .. } => "DuplicateLogicalId",
            Self::DanglingReference { .. } => "DanglingReference",
            Self::Cycle { .. } => "DependencyCycle",
        }
    }
}

/// Errors raised by a [`Provisioner`](crate::plan::Provisioner) while applying a plan.
#[derive(Error, Debug, Clone)]
pub enum ProvisionError {
    /// A step was issued before one of the resources it waits on
    #[error("Step '{logical_id}' issued before its prerequisite '{prerequisite}'")]
    PrerequisiteNotApplied {
        /// The step issued too early
        logical_id: String,
        /// The prerequisite that was not yet applied
        prerequisite: String,
    },

    /// The backend rejected a step
    ///
    /// Raised by [`Provisioner`](crate::plan::Provisioner) implementations that
    /// talk to a real engine; the dry-run provisioner never fails this way.
    #[error("Provisioning backend failed on '{logical_id}': {reason}")]
    Backend {
        /// The failing step
        logical_id: String,
        /// Backend error message
        reason: String,
    },
}

impl ProvisionError {
    /// Returns the reason code for this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::PrerequisiteNotApplied { .. } => "PrerequisiteNotApplied",
            Self::Backend { .. } => "ProvisioningBackendFailed",
        }
    }
}

/// Composite error returned when declaring a site.
#[derive(Error, Debug, Clone)]
pub enum DeclarationError {
    /// The configuration was rejected before any resource was built
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The assembled graph is inconsistent
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl DeclarationError {
    /// Returns the reason code of the underlying error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(e) => e.reason(),
            Self::Graph(e) => e.reason(),
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
