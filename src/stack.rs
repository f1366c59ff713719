// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The static site declaration.
//!
//! [`declare_site`] assembles the full topology for one domain:
//!
//! 1. DNS zone
//! 2. DNS-validated certificate, always issued in `us-east-1`
//! 3. Content bucket and logging bucket, both private and retained on removal
//! 4. Origin access identity and the bucket policy granting it read access
//! 5. Distribution in front of the content bucket
//! 6. Apex A and AAAA alias records pointing at the distribution
//!
//! The declaration is a pure function of the configuration: evaluating it twice
//! yields identical graphs.

use hickory_proto::rr::RecordType;
use tracing::{debug, info};

use crate::config::{SiteConfig, SiteSettings};
use crate::constants::{
    BUCKET_READ_ACTIONS, CERTIFICATE_REGION, CERTIFICATE_VALIDATION_METHOD, CONSTRUCT_AAAA_RECORD,
    CONSTRUCT_A_RECORD, CONSTRUCT_CERTIFICATE, CONSTRUCT_CONTENT_BUCKET,
    CONSTRUCT_CONTENT_BUCKET_POLICY, CONSTRUCT_DISTRIBUTION, CONSTRUCT_HOSTED_ZONE,
    CONSTRUCT_LOGGING_BUCKET, CONSTRUCT_ORIGIN_ACCESS_IDENTITY, CONTENT_ORIGIN_ID,
    DISTRIBUTION_ALIAS_HOSTED_ZONE_ID, DISTRIBUTION_COMMENT, ERROR_CACHING_MIN_TTL_SECS,
    ERROR_CODE_FORBIDDEN, ERROR_CODE_NOT_FOUND, HTTP_VERSION_HTTP2_AND_3,
    LOG_BUCKET_OBJECT_OWNERSHIP, MINIMUM_PROTOCOL_VERSION, ORIGIN_ACCESS_IDENTITY_COMMENT,
    ORIGIN_ACCESS_IDENTITY_PATH_PREFIX, POLICY_VERSION, PRICE_CLASS_100, RESPONSE_CODE_NO_CONTENT,
    RESPONSE_CODE_OK, SSL_SUPPORT_METHOD_SNI_ONLY, VIEWER_PROTOCOL_POLICY_REDIRECT_TO_HTTPS,
};
use crate::errors::DeclarationError;
use crate::graph::ResourceGraph;
use crate::model::{
    AccessLogging, AliasTarget, BucketPolicyProperties, BucketProperties, CacheBehavior,
    CertificateProperties, CookiePolicy, CustomErrorResponse, DistributionConfig,
    DistributionProperties, DomainValidationOption, Expr, ForwardedValues, HostedZoneProperties,
    LogicalId, Origin, OriginAccessIdentityConfig, OriginAccessIdentityProperties,
    OwnershipControls, OwnershipRule, PolicyDocument, PolicyPrincipal, PolicyStatement,
    PublicAccessBlock, RecordSetProperties, RemovalPolicy, Resource, ResourceKind,
    S3OriginConfig, ViewerCertificate,
};

/// Tag key carrying a resource's display name
const TAG_NAME: &str = "Name";

/// Methods the distribution accepts and caches
const READ_METHODS: &[&str] = &["GET", "HEAD"];

/// Logical ids of the resources in a declared site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteResources {
    pub hosted_zone: LogicalId,
    pub certificate: LogicalId,
    pub content_bucket: LogicalId,
    pub logging_bucket: LogicalId,
    pub origin_access_identity: LogicalId,
    pub content_bucket_policy: LogicalId,
    pub distribution: LogicalId,
    pub a_record: LogicalId,
    pub aaaa_record: LogicalId,
}

impl SiteResources {
    /// Logical ids of a site declared with `stack_name`.
    #[must_use]
    pub fn for_stack(stack_name: &str) -> Self {
        let id = |path: &str| LogicalId::from_path(stack_name, path);
        Self {
            hosted_zone: id(CONSTRUCT_HOSTED_ZONE),
            certificate: id(CONSTRUCT_CERTIFICATE),
            content_bucket: id(CONSTRUCT_CONTENT_BUCKET),
            logging_bucket: id(CONSTRUCT_LOGGING_BUCKET),
            origin_access_identity: id(CONSTRUCT_ORIGIN_ACCESS_IDENTITY),
            content_bucket_policy: id(CONSTRUCT_CONTENT_BUCKET_POLICY),
            distribution: id(CONSTRUCT_DISTRIBUTION),
            a_record: id(CONSTRUCT_A_RECORD),
            aaaa_record: id(CONSTRUCT_AAAA_RECORD),
        }
    }
}

/// A validated site declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteDeclaration {
    pub settings: SiteSettings,
    pub ids: SiteResources,
    pub graph: ResourceGraph,
}

/// Declares the static site described by `config`.
///
/// # Errors
///
/// Returns [`DeclarationError::Config`] if the configuration is invalid and
/// [`DeclarationError::Graph`] if the assembled graph fails validation.
pub fn declare_site(config: &SiteConfig) -> Result<SiteDeclaration, DeclarationError> {
    let settings = config.resolve()?;
    let ids = SiteResources::for_stack(&settings.stack_name);
    let stack = settings.stack_name.as_str();

    info!(
        "Declaring static site {} in stack {}",
        settings.domain_name, stack
    );

    let mut graph = ResourceGraph::new();

    graph.add(Resource::new(
        stack,
        CONSTRUCT_HOSTED_ZONE,
        ResourceKind::HostedZone(HostedZoneProperties {
            name: settings.zone_fqdn(),
        }),
    ))?;

    graph.add(certificate(&settings, &ids))?;

    graph.add(
        Resource::new(
            stack,
            CONSTRUCT_CONTENT_BUCKET,
            ResourceKind::Bucket(BucketProperties {
                bucket_name: settings.content_bucket_name.clone(),
                public_access_block_configuration: PublicAccessBlock::block_all(),
                ownership_controls: None,
            }),
        )
        .with_removal_policy(RemovalPolicy::Retain),
    )?;

    // Log delivery writes objects with ACLs, so the bucket must accept writer ownership.
    graph.add(
        Resource::new(
            stack,
            CONSTRUCT_LOGGING_BUCKET,
            ResourceKind::Bucket(BucketProperties {
                bucket_name: settings.logging_bucket_name.clone(),
                public_access_block_configuration: PublicAccessBlock::block_all(),
                ownership_controls: Some(OwnershipControls {
                    rules: vec![OwnershipRule {
                        object_ownership: LOG_BUCKET_OBJECT_OWNERSHIP.to_string(),
                    }],
                }),
            }),
        )
        .with_removal_policy(RemovalPolicy::Retain),
    )?;

    graph.add(Resource::new(
        stack,
        CONSTRUCT_ORIGIN_ACCESS_IDENTITY,
        ResourceKind::OriginAccessIdentity(OriginAccessIdentityProperties {
            cloud_front_origin_access_identity_config: OriginAccessIdentityConfig {
                comment: ORIGIN_ACCESS_IDENTITY_COMMENT.to_string(),
            },
        }),
    ))?;

    graph.add(Resource::new(
        stack,
        CONSTRUCT_CONTENT_BUCKET_POLICY,
        ResourceKind::BucketPolicy(read_grant(&ids)),
    ))?;

    graph.add(Resource::new(
        stack,
        CONSTRUCT_DISTRIBUTION,
        ResourceKind::Distribution(distribution(&settings, &ids)),
    ))?;

    for (construct_id, record_type) in [
        (CONSTRUCT_A_RECORD, RecordType::A),
        (CONSTRUCT_AAAA_RECORD, RecordType::AAAA),
    ] {
        graph.add(Resource::new(
            stack,
            construct_id,
            ResourceKind::RecordSet(apex_alias(&settings, &ids, record_type)),
        ))?;
    }

    graph.validate()?;
    debug!(
        "Site {} declared with {} resources and {} references",
        settings.domain_name,
        graph.len(),
        graph.edges().len()
    );

    Ok(SiteDeclaration {
        settings,
        ids,
        graph,
    })
}

fn certificate(settings: &SiteSettings, ids: &SiteResources) -> Resource {
    let primary = settings.certificate_domain();
    let domain_validation_options = std::iter::once(primary.clone())
        .chain(settings.subject_alternative_names.iter().cloned())
        .map(|domain_name| DomainValidationOption {
            domain_name,
            hosted_zone_id: Expr::Ref(ids.hosted_zone.clone()),
        })
        .collect();

    Resource::new(
        &settings.stack_name,
        CONSTRUCT_CERTIFICATE,
        ResourceKind::Certificate(CertificateProperties {
            domain_name: primary,
            subject_alternative_names: settings.subject_alternative_names.clone(),
            validation_method: CERTIFICATE_VALIDATION_METHOD.to_string(),
            domain_validation_options,
        }),
    )
    .with_region(CERTIFICATE_REGION)
    .with_tag(
        TAG_NAME,
        &format!("{}{CONSTRUCT_CERTIFICATE}", settings.stack_name),
    )
}

/// Read access on the content bucket for the origin access identity only.
fn read_grant(ids: &SiteResources) -> BucketPolicyProperties {
    let bucket_arn = Expr::get_att(&ids.content_bucket, "Arn");
    BucketPolicyProperties {
        bucket: Expr::Ref(ids.content_bucket.clone()),
        policy_document: PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement {
                effect: "Allow".to_string(),
                principal: PolicyPrincipal {
                    canonical_user: Expr::get_att(
                        &ids.origin_access_identity,
                        "S3CanonicalUserId",
                    ),
                },
                action: BUCKET_READ_ACTIONS.iter().map(ToString::to_string).collect(),
                resource: vec![
                    bucket_arn.clone(),
                    Expr::Join(String::new(), vec![bucket_arn, Expr::literal("/*")]),
                ],
            }],
        },
    }
}

fn distribution(settings: &SiteSettings, ids: &SiteResources) -> DistributionProperties {
    let read_methods: Vec<String> = READ_METHODS.iter().map(ToString::to_string).collect();
    let error_response = |error_code, response_code| CustomErrorResponse {
        error_code,
        response_code,
        response_page_path: settings.root_document_path(),
        error_caching_min_ttl: ERROR_CACHING_MIN_TTL_SECS,
    };

    DistributionProperties {
        distribution_config: DistributionConfig {
            aliases: vec![settings.domain_name.clone()],
            comment: DISTRIBUTION_COMMENT.to_string(),
            default_root_object: settings.root_object.clone(),
            enabled: true,
            http_version: HTTP_VERSION_HTTP2_AND_3.to_string(),
            ipv6_enabled: true,
            price_class: PRICE_CLASS_100.to_string(),
            origins: vec![Origin {
                id: CONTENT_ORIGIN_ID.to_string(),
                domain_name: Expr::get_att(&ids.content_bucket, "RegionalDomainName"),
                s3_origin_config: S3OriginConfig {
                    origin_access_identity: Expr::Join(
                        String::new(),
                        vec![
                            Expr::literal(ORIGIN_ACCESS_IDENTITY_PATH_PREFIX),
                            Expr::Ref(ids.origin_access_identity.clone()),
                        ],
                    ),
                },
            }],
            default_cache_behavior: CacheBehavior {
                target_origin_id: CONTENT_ORIGIN_ID.to_string(),
                viewer_protocol_policy: VIEWER_PROTOCOL_POLICY_REDIRECT_TO_HTTPS.to_string(),
                compress: true,
                default_ttl: settings.default_ttl_secs,
                min_ttl: settings.min_ttl_secs,
                allowed_methods: read_methods.clone(),
                cached_methods: read_methods,
                forwarded_values: ForwardedValues {
                    query_string: false,
                    cookies: CookiePolicy {
                        forward: "none".to_string(),
                    },
                },
            },
            custom_error_responses: vec![
                error_response(ERROR_CODE_FORBIDDEN, RESPONSE_CODE_OK),
                error_response(ERROR_CODE_NOT_FOUND, RESPONSE_CODE_NO_CONTENT),
            ],
            viewer_certificate: ViewerCertificate {
                acm_certificate_arn: Expr::Ref(ids.certificate.clone()),
                ssl_support_method: SSL_SUPPORT_METHOD_SNI_ONLY.to_string(),
                minimum_protocol_version: MINIMUM_PROTOCOL_VERSION.to_string(),
            },
            logging: AccessLogging {
                bucket: Expr::get_att(&ids.logging_bucket, "RegionalDomainName"),
                include_cookies: false,
                prefix: settings.log_prefix(),
            },
        },
    }
}

/// Alias record at the zone apex resolving to the distribution.
fn apex_alias(
    settings: &SiteSettings,
    ids: &SiteResources,
    record_type: RecordType,
) -> RecordSetProperties {
    RecordSetProperties {
        record_name: String::new(),
        hosted_zone_id: Expr::Ref(ids.hosted_zone.clone()),
        name: settings.zone_fqdn(),
        record_type,
        alias_target: AliasTarget {
            dns_name: Expr::get_att(&ids.distribution, "DomainName"),
            hosted_zone_id: DISTRIBUTION_ALIAS_HOSTED_ZONE_ID.to_string(),
        },
        comment: format!("Alias record for {}", settings.domain_name),
    }
}

#[cfg(test)]
#[path = "stack_tests.rs"]
mod stack_tests;
