// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed resource definitions for the static site topology.
//!
//! This module defines every resource the declaration emits as a plain data
//! record, together with the intrinsic expressions used to reference other
//! resources.
//!
//! # Resource Types
//!
//! ## DNS
//!
//! - [`HostedZoneProperties`] - Authoritative zone for the domain
//! - [`RecordSetProperties`] - Apex alias records (A and AAAA)
//!
//! ## TLS
//!
//! - [`CertificateProperties`] - DNS-validated wildcard certificate
//!
//! ## Storage
//!
//! - [`BucketProperties`] - Content and logging buckets
//! - [`BucketPolicyProperties`] - Read grant for the origin access identity
//!
//! ## Delivery
//!
//! - [`OriginAccessIdentityProperties`] - Principal the distribution reads as
//! - [`DistributionProperties`] - Edge distribution in front of the bucket
//!
//! # Example: Referencing Another Resource
//!
//! ```rust
//! use sitestack::model::{Expr, LogicalId};
//!
//! let zone = LogicalId::from_path("WebsiteInfraStack", "HostedZone");
//! let hosted_zone_id = Expr::Ref(zone.clone());
//!
//! assert_eq!(hosted_zone_id.referenced_ids(), vec![&zone]);
//! ```

use hickory_proto::rr::RecordType;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    LOGICAL_ID_HASH_LEN, TYPE_BUCKET, TYPE_BUCKET_POLICY, TYPE_CERTIFICATE, TYPE_DISTRIBUTION,
    TYPE_HOSTED_ZONE, TYPE_ORIGIN_ACCESS_IDENTITY, TYPE_RECORD_SET,
};

// ============================================================================
// Identifiers and Expressions
// ============================================================================

/// Identifier of a resource inside a synthesized template.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Derives the logical id of the construct at `construct_path` in `stack_name`.
    ///
    /// The id is the construct path stripped to alphanumerics followed by the
    /// first eight upper-case hex digits of the SHA-256 of the full path, so
    /// it is stable across runs and unique per path.
    #[must_use]
    pub fn from_path(stack_name: &str, construct_path: &str) -> Self {
        let full_path = format!("{stack_name}/{construct_path}");
        let readable: String = construct_path
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        let digest = format!("{:X}", Sha256::digest(full_path.as_bytes()));
        Self(format!("{readable}{}", &digest[..LOGICAL_ID_HASH_LEN]))
    }

    /// Wraps an id verbatim.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A property value: a literal or an intrinsic resolved by the provisioning engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Literal string
    Literal(String),
    /// Primary identifier of another resource (`Ref`)
    Ref(LogicalId),
    /// Named attribute of another resource (`Fn::GetAtt`)
    GetAtt(LogicalId, String),
    /// Concatenation with a separator (`Fn::Join`)
    Join(String, Vec<Expr>),
}

impl Expr {
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn get_att(target: &LogicalId, attribute: &str) -> Self {
        Self::GetAtt(target.clone(), attribute.to_string())
    }

    /// Logical ids this expression references, in order of appearance.
    #[must_use]
    pub fn referenced_ids(&self) -> Vec<&LogicalId> {
        match self {
            Self::Literal(_) => Vec::new(),
            Self::Ref(id) | Self::GetAtt(id, _) => vec![id],
            Self::Join(_, parts) => parts.iter().flat_map(Expr::referenced_ids).collect(),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => serializer.serialize_str(value),
            Self::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Self::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &(id, attribute))?;
                map.end()
            }
            Self::Join(separator, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(separator, parts))?;
                map.end()
            }
        }
    }
}

/// What a reference from one resource to another means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    /// Certificate ownership is proven with records in the zone
    ValidatesAgainst,
    /// Bucket policy attaches to the bucket
    GrantsReadOn,
    /// Bucket policy names the principal allowed to read
    GrantsReadTo,
    /// Distribution fetches content from the bucket
    Origin,
    /// Distribution reads the bucket as this identity
    OriginIdentity,
    /// Distribution presents this certificate to viewers
    ViewerCertificate,
    /// Distribution writes access logs to the bucket
    AccessLogs,
    /// Record lives in the zone
    HostedIn,
    /// Record resolves to the distribution
    AliasTarget,
}

impl Relation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidatesAgainst => "validates-against",
            Self::GrantsReadOn => "grants-read-on",
            Self::GrantsReadTo => "grants-read-to",
            Self::Origin => "origin",
            Self::OriginIdentity => "origin-identity",
            Self::ViewerCertificate => "viewer-certificate",
            Self::AccessLogs => "access-logs",
            Self::HostedIn => "hosted-in",
            Self::AliasTarget => "alias-target",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference from a resource to another resource.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    pub relation: Relation,
    pub target: LogicalId,
}

/// What the provisioning engine does with a resource removed from the declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    /// Delete the resource and its data
    #[default]
    Delete,
    /// Detach the resource but keep it and its data
    Retain,
}

impl RemovalPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Retain => "Retain",
        }
    }
}

// ============================================================================
// DNS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneProperties {
    /// Fully qualified zone name
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliasTarget {
    #[serde(rename = "DNSName")]
    pub dns_name: Expr,
    pub hosted_zone_id: String,
}

/// Alias record set at a name in the zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSetProperties {
    /// Name relative to the zone; empty for the apex
    #[serde(skip)]
    pub record_name: String,
    pub hosted_zone_id: Expr,
    /// Fully qualified record name
    pub name: String,
    #[serde(rename = "Type", serialize_with = "serialize_record_type")]
    pub record_type: RecordType,
    pub alias_target: AliasTarget,
    pub comment: String,
}

fn serialize_record_type<S: Serializer>(
    record_type: &RecordType,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(record_type)
}

// ============================================================================
// TLS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainValidationOption {
    pub domain_name: String,
    pub hosted_zone_id: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateProperties {
    /// Primary (wildcard) domain
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
    pub validation_method: String,
    pub domain_validation_options: Vec<DomainValidationOption>,
}

// ============================================================================
// Storage
// ============================================================================

/// The four public access block switches of a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    /// Every switch on.
    #[must_use]
    pub fn block_all() -> Self {
        Self {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }

    #[must_use]
    pub fn blocks_all(&self) -> bool {
        self.block_public_acls
            && self.block_public_policy
            && self.ignore_public_acls
            && self.restrict_public_buckets
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwnershipRule {
    pub object_ownership: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwnershipControls {
    pub rules: Vec<OwnershipRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketProperties {
    pub bucket_name: String,
    pub public_access_block_configuration: PublicAccessBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_controls: Option<OwnershipControls>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyPrincipal {
    pub canonical_user: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub principal: PolicyPrincipal,
    pub action: Vec<String>,
    pub resource: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

/// Policy attached to a bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketPolicyProperties {
    pub bucket: Expr,
    pub policy_document: PolicyDocument,
}

// ============================================================================
// Delivery
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginAccessIdentityConfig {
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginAccessIdentityProperties {
    pub cloud_front_origin_access_identity_config: OriginAccessIdentityConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3OriginConfig {
    pub origin_access_identity: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Origin {
    pub id: String,
    pub domain_name: Expr,
    pub s3_origin_config: S3OriginConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CookiePolicy {
    pub forward: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForwardedValues {
    pub query_string: bool,
    pub cookies: CookiePolicy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheBehavior {
    pub target_origin_id: String,
    pub viewer_protocol_policy: String,
    pub compress: bool,
    #[serde(rename = "DefaultTTL")]
    pub default_ttl: u64,
    #[serde(rename = "MinTTL")]
    pub min_ttl: u64,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub forwarded_values: ForwardedValues,
}

/// Rewrites an origin error status to a page with a substituted status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomErrorResponse {
    pub error_code: u16,
    pub response_code: u16,
    pub response_page_path: String,
    #[serde(rename = "ErrorCachingMinTTL")]
    pub error_caching_min_ttl: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewerCertificate {
    pub acm_certificate_arn: Expr,
    pub ssl_support_method: String,
    pub minimum_protocol_version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessLogging {
    pub bucket: Expr,
    pub include_cookies: bool,
    pub prefix: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    pub aliases: Vec<String>,
    pub comment: String,
    pub default_root_object: String,
    pub enabled: bool,
    pub http_version: String,
    #[serde(rename = "IPV6Enabled")]
    pub ipv6_enabled: bool,
    pub price_class: String,
    pub origins: Vec<Origin>,
    pub default_cache_behavior: CacheBehavior,
    pub custom_error_responses: Vec<CustomErrorResponse>,
    pub viewer_certificate: ViewerCertificate,
    pub logging: AccessLogging,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionProperties {
    pub distribution_config: DistributionConfig,
}

// ============================================================================
// Resources
// ============================================================================

/// Properties of a resource, by resource type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceKind {
    HostedZone(HostedZoneProperties),
    Certificate(CertificateProperties),
    Bucket(BucketProperties),
    OriginAccessIdentity(OriginAccessIdentityProperties),
    BucketPolicy(BucketPolicyProperties),
    Distribution(DistributionProperties),
    RecordSet(RecordSetProperties),
}

impl ResourceKind {
    /// Resource type name written to the template.
    #[must_use]
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::HostedZone(_) => TYPE_HOSTED_ZONE,
            Self::Certificate(_) => TYPE_CERTIFICATE,
            Self::Bucket(_) => TYPE_BUCKET,
            Self::OriginAccessIdentity(_) => TYPE_ORIGIN_ACCESS_IDENTITY,
            Self::BucketPolicy(_) => TYPE_BUCKET_POLICY,
            Self::Distribution(_) => TYPE_DISTRIBUTION,
            Self::RecordSet(_) => TYPE_RECORD_SET,
        }
    }

    /// Property receiving tags, for resource types that accept them.
    #[must_use]
    pub fn tags_property(&self) -> Option<&'static str> {
        match self {
            Self::HostedZone(_) => Some("HostedZoneTags"),
            Self::Certificate(_) | Self::Bucket(_) | Self::Distribution(_) => Some("Tags"),
            Self::OriginAccessIdentity(_) | Self::BucketPolicy(_) | Self::RecordSet(_) => None,
        }
    }

    /// Every expression that may reference another resource, with its meaning.
    fn reference_exprs(&self) -> Vec<(Relation, &Expr)> {
        match self {
            Self::HostedZone(_) | Self::Bucket(_) | Self::OriginAccessIdentity(_) => Vec::new(),
            Self::Certificate(cert) => cert
                .domain_validation_options
                .iter()
                .map(|option| (Relation::ValidatesAgainst, &option.hosted_zone_id))
                .collect(),
            Self::BucketPolicy(policy) => {
                let mut exprs = vec![(Relation::GrantsReadOn, &policy.bucket)];
                for statement in &policy.policy_document.statement {
                    exprs.push((Relation::GrantsReadTo, &statement.principal.canonical_user));
                    exprs.extend(
                        statement
                            .resource
                            .iter()
                            .map(|resource| (Relation::GrantsReadOn, resource)),
                    );
                }
                exprs
            }
            Self::Distribution(distribution) => {
                let config = &distribution.distribution_config;
                let mut exprs = Vec::new();
                for origin in &config.origins {
                    exprs.push((Relation::Origin, &origin.domain_name));
                    exprs.push((
                        Relation::OriginIdentity,
                        &origin.s3_origin_config.origin_access_identity,
                    ));
                }
                exprs.push((
                    Relation::ViewerCertificate,
                    &config.viewer_certificate.acm_certificate_arn,
                ));
                exprs.push((Relation::AccessLogs, &config.logging.bucket));
                exprs
            }
            Self::RecordSet(record) => vec![
                (Relation::HostedIn, &record.hosted_zone_id),
                (Relation::AliasTarget, &record.alias_target.dns_name),
            ],
        }
    }

    /// Typed references to other resources, deduplicated, in order of first appearance.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        let mut references: Vec<Reference> = Vec::new();
        for (relation, expr) in self.reference_exprs() {
            for target in expr.referenced_ids() {
                let reference = Reference {
                    relation,
                    target: target.clone(),
                };
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
        }
        references
    }
}

/// A declared resource: identity, lifecycle policy and properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub logical_id: LogicalId,
    /// Construct path the logical id was derived from (without the stack name)
    pub construct_path: String,
    pub removal_policy: RemovalPolicy,
    /// Region the resource must be created in, when pinned
    pub region: Option<String>,
    /// Tags specific to this resource, merged over the stack tags
    pub tags: BTreeMap<String, String>,
    pub kind: ResourceKind,
}

impl Resource {
    /// Declares a resource at `construct_path` with the default lifecycle.
    #[must_use]
    pub fn new(stack_name: &str, construct_path: &str, kind: ResourceKind) -> Self {
        Self {
            logical_id: LogicalId::from_path(stack_name, construct_path),
            construct_path: construct_path.to_string(),
            removal_policy: RemovalPolicy::Delete,
            region: None,
            tags: BTreeMap::new(),
            kind,
        }
    }

    #[must_use]
    pub fn with_removal_policy(mut self, removal_policy: RemovalPolicy) -> Self {
        self.removal_policy = removal_policy;
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn resource_type(&self) -> &'static str {
        self.kind.resource_type()
    }

    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        self.kind.references()
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
