// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types

#[cfg(test)]
mod tests {
    use crate::errors::{ConfigError, DeclarationError, GraphError, ProvisionError};

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidBucketName {
            bucket: "Bad_Bucket".into(),
            reason: "uppercase letters are not allowed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid bucket name 'Bad_Bucket': uppercase letters are not allowed"
        );
        assert_eq!(err.reason(), "InvalidBucketName");
    }

    #[test]
    fn test_ttl_ordering_display() {
        let err = ConfigError::TtlOrdering {
            min_secs: 1200,
            default_secs: 900,
        };
        assert!(err.to_string().contains("1200s"));
        assert!(err.to_string().contains("900s"));
        assert_eq!(err.reason(), "TtlOrdering");
    }

    #[test]
    fn test_dangling_reference_display() {
        let err = GraphError::DanglingReference {
            source_id: "DistributionABCDEF12".into(),
            target: "MissingBucket".into(),
            relation: "origin".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DistributionABCDEF12"));
        assert!(msg.contains("MissingBucket"));
        assert!(msg.contains("origin"));
        assert_eq!(err.reason(), "DanglingReference");
    }

    #[test]
    fn test_cycle_lists_members() {
        let err = GraphError::Cycle {
            members: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle between resources: A, B");
        assert_eq!(err.reason(), "DependencyCycle");
    }

    #[test]
    fn test_declaration_error_is_transparent() {
        let inner = GraphError::DuplicateLogicalId {
            logical_id: "HostedZone".into(),
        };
        let err: DeclarationError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.reason(), "DuplicateLogicalId");

        let err: DeclarationError = ConfigError::InvalidLogVersion {
            log_version: "v0/x".into(),
        }
        .into();
        assert_eq!(err.reason(), "InvalidLogVersion");
    }

    #[test]
    fn test_provision_error_reasons() {
        let early = ProvisionError::PrerequisiteNotApplied {
            logical_id: "Distribution".into(),
            prerequisite: "Certificate".into(),
        };
        assert_eq!(early.reason(), "PrerequisiteNotApplied");

        let backend = ProvisionError::Backend {
            logical_id: "Distribution".into(),
            reason: "throttled".into(),
        };
        assert_eq!(backend.reason(), "ProvisioningBackendFailed");
        assert!(backend.to_string().contains("throttled"));
    }

    #[test]
    fn test_region_and_san_error_reasons() {
        let region = ConfigError::InvalidRegion {
            region: String::new(),
            reason: "cannot be empty".into(),
        };
        assert_eq!(region.reason(), "InvalidRegion");
        assert_eq!(region.to_string(), "Invalid region '': cannot be empty");

        let san = ConfigError::InvalidSubjectAlternativeName {
            name: "a..example.org".into(),
            reason: "label '' must be 1 to 63 characters".into(),
        };
        assert_eq!(san.reason(), "InvalidSubjectAlternativeName");
        assert!(san.to_string().starts_with("Invalid subject alternative name 'a..example.org'"));
    }
}
