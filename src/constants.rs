// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the site topology.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Declaration Defaults
// ============================================================================

/// Default stack name, also the first segment of every construct path
pub const DEFAULT_STACK_NAME: &str = "WebsiteInfraStack";

/// Default target domain when none is configured
pub const DEFAULT_DOMAIN_NAME: &str = "example.org";

/// Prefix for the content bucket name derived from the domain
pub const CONTENT_BUCKET_PREFIX: &str = "static";

/// Prefix for the logging bucket name derived from the domain
pub const LOGGING_BUCKET_PREFIX: &str = "logging";

/// Default root document served for `/` and for rewritten error responses
pub const DEFAULT_ROOT_OBJECT: &str = "index.html";

/// Default version tag in the access log prefix
pub const DEFAULT_LOG_VERSION: &str = "v0";

/// Subdomain always listed as a subject alternative name
pub const WWW_SUBDOMAIN: &str = "www";

// ============================================================================
// Construct IDs
// ============================================================================

pub const CONSTRUCT_HOSTED_ZONE: &str = "HostedZone";
pub const CONSTRUCT_CERTIFICATE: &str = "DnsValidatedCertificate";
pub const CONSTRUCT_CONTENT_BUCKET: &str = "StaticSiteBucket";
pub const CONSTRUCT_LOGGING_BUCKET: &str = "LoggingBucket";
pub const CONSTRUCT_ORIGIN_ACCESS_IDENTITY: &str = "StaticSiteBucketOriginAccessIdentity";
pub const CONSTRUCT_CONTENT_BUCKET_POLICY: &str = "StaticSiteBucket/Policy";
pub const CONSTRUCT_DISTRIBUTION: &str = "CloudFrontDistribution";
pub const CONSTRUCT_A_RECORD: &str = "AliasRecordForStaticSite";
pub const CONSTRUCT_AAAA_RECORD: &str = "AaaaAliasRecordForStaticSite";

/// Number of hex digits of the path hash appended to a logical id
pub const LOGICAL_ID_HASH_LEN: usize = 8;

// ============================================================================
// Resource Types
// ============================================================================

pub const TYPE_HOSTED_ZONE: &str = "AWS::Route53::HostedZone";
pub const TYPE_CERTIFICATE: &str = "AWS::CertificateManager::Certificate";
pub const TYPE_BUCKET: &str = "AWS::S3::Bucket";
pub const TYPE_BUCKET_POLICY: &str = "AWS::S3::BucketPolicy";
pub const TYPE_ORIGIN_ACCESS_IDENTITY: &str = "AWS::CloudFront::CloudFrontOriginAccessIdentity";
pub const TYPE_DISTRIBUTION: &str = "AWS::CloudFront::Distribution";
pub const TYPE_RECORD_SET: &str = "AWS::Route53::RecordSet";

/// Template format version written at the top of every synthesized template
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

// ============================================================================
// Certificate Constants
// ============================================================================

/// Region the distribution service accepts viewer certificates from.
///
/// Fixed regardless of the region hosting the rest of the stack.
pub const CERTIFICATE_REGION: &str = "us-east-1";

/// Domain ownership validation method
pub const CERTIFICATE_VALIDATION_METHOD: &str = "DNS";

// ============================================================================
// Distribution Constants
// ============================================================================

/// Default cache TTL (15 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;

/// Minimum cache TTL (1 minute)
pub const MIN_CACHE_TTL_SECS: u64 = 60;

/// Error responses are never cached so corrected content is served on retry
pub const ERROR_CACHING_MIN_TTL_SECS: u64 = 0;

/// Upper bound accepted for any configured TTL (1 year)
pub const MAX_TTL_SECS: u64 = 31_536_000;

pub const VIEWER_PROTOCOL_POLICY_REDIRECT_TO_HTTPS: &str = "redirect-to-https";
pub const HTTP_VERSION_HTTP2_AND_3: &str = "http2and3";
pub const PRICE_CLASS_100: &str = "PriceClass_100";
pub const SSL_SUPPORT_METHOD_SNI_ONLY: &str = "sni-only";
pub const MINIMUM_PROTOCOL_VERSION: &str = "TLSv1.2_2021";
pub const DISTRIBUTION_COMMENT: &str = "Distribution for the Static Site";
pub const ORIGIN_ACCESS_IDENTITY_COMMENT: &str = "Static Site Bucket OAI";

/// Origin id of the content bucket inside the distribution config
pub const CONTENT_ORIGIN_ID: &str = "origin1";

/// Path prefix the distribution expects in front of an identity reference
pub const ORIGIN_ACCESS_IDENTITY_PATH_PREFIX: &str = "origin-access-identity/cloudfront/";

/// Hosted zone id every distribution alias target lives in
pub const DISTRIBUTION_ALIAS_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// HTTP status rewritten to the root document with a success status
pub const ERROR_CODE_FORBIDDEN: u16 = 403;

/// HTTP status rewritten to the root document with a "no content" status
pub const ERROR_CODE_NOT_FOUND: u16 = 404;

pub const RESPONSE_CODE_OK: u16 = 200;
pub const RESPONSE_CODE_NO_CONTENT: u16 = 204;

// ============================================================================
// Bucket Policy Constants
// ============================================================================

pub const POLICY_VERSION: &str = "2012-10-17";

/// Actions granted to the origin access identity on the content bucket
pub const BUCKET_READ_ACTIONS: &[&str] = &["s3:GetObject*", "s3:GetBucket*", "s3:List*"];

/// Ownership mode required for the distribution to deliver access logs
pub const LOG_BUCKET_OBJECT_OWNERSHIP: &str = "ObjectWriter";

// ============================================================================
// Bucket Naming Constants
// ============================================================================

pub const BUCKET_NAME_MIN_LEN: usize = 3;
pub const BUCKET_NAME_MAX_LEN: usize = 63;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Environment variable selecting the log output format (`json` or `text`)
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";

/// Relative directory the schema generator writes to
pub const SCHEMA_OUTPUT_DIR: &str = "deploy/schema";
