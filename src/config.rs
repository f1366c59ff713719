// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Site configuration.
//!
//! A [`SiteConfig`] carries every constant the declaration needs: the target
//! domain, bucket names, cache TTLs and the access log version tag. All fields
//! have defaults, so an empty configuration declares the reference site for
//! `example.org`.
//!
//! # Example
//!
//! ```yaml
//! stackName: WebsiteInfraStack
//! domainName: example.org
//! region: eu-west-1
//! defaultTtl: 15m
//! minTtl: 1m
//! extraSubjectAlternativeNames:
//!   - cake.example.org
//! ```
//!
//! [`SiteConfig::resolve`] validates the raw values and produces
//! [`SiteSettings`], the concrete values the declaration is built from.

use hickory_proto::rr::Name;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::debug;

use crate::constants::{
    BUCKET_NAME_MAX_LEN, BUCKET_NAME_MIN_LEN, CONTENT_BUCKET_PREFIX, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_DOMAIN_NAME, DEFAULT_LOG_VERSION, DEFAULT_ROOT_OBJECT, DEFAULT_STACK_NAME,
    LOGGING_BUCKET_PREFIX, MIN_CACHE_TTL_SECS, WWW_SUBDOMAIN,
};
use crate::duration::{format_ttl, parse_ttl};
use crate::errors::ConfigError;

/// Maximum length of a stack name
const STACK_NAME_MAX_LEN: usize = 128;

/// Maximum length of a single DNS label
const DNS_LABEL_MAX_LEN: usize = 63;

/// User-facing configuration of a static site.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteConfig {
    /// Stack name, used as the root of every construct path.
    ///
    /// Letters, digits and hyphens, starting with a letter.
    #[serde(default = "default_stack_name")]
    pub stack_name: String,

    /// Apex domain the site is served from (e.g., "example.org").
    #[serde(default = "default_domain_name")]
    pub domain_name: String,

    /// Region hosting the stack. The certificate ignores this setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Content bucket name. Defaults to `static-{domain with dashes}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_bucket_name: Option<String>,

    /// Logging bucket name. Defaults to `logging-{domain with dashes}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_bucket_name: Option<String>,

    /// Default cache TTL of the distribution, with a unit (s, m, h, d).
    #[serde(default = "default_default_ttl")]
    pub default_ttl: String,

    /// Minimum cache TTL of the distribution, with a unit (s, m, h, d).
    ///
    /// Must not exceed `defaultTtl`.
    #[serde(default = "default_min_ttl")]
    pub min_ttl: String,

    /// Root document served for `/` and for rewritten 403/404 responses.
    #[serde(default = "default_root_object")]
    pub root_object: String,

    /// Version tag inserted in the access log prefix (`logs/{domain}/{version}/`).
    #[serde(default = "default_log_version")]
    pub log_version: String,

    /// Additional names the certificate must cover, inside the zone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_subject_alternative_names: Vec<String>,
}

fn default_stack_name() -> String {
    DEFAULT_STACK_NAME.to_string()
}

fn default_domain_name() -> String {
    DEFAULT_DOMAIN_NAME.to_string()
}

fn default_default_ttl() -> String {
    format_ttl(DEFAULT_CACHE_TTL_SECS)
}

fn default_min_ttl() -> String {
    format_ttl(MIN_CACHE_TTL_SECS)
}

fn default_root_object() -> String {
    DEFAULT_ROOT_OBJECT.to_string()
}

fn default_log_version() -> String {
    DEFAULT_LOG_VERSION.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            stack_name: default_stack_name(),
            domain_name: default_domain_name(),
            region: None,
            content_bucket_name: None,
            logging_bucket_name: None,
            default_ttl: default_default_ttl(),
            min_ttl: default_min_ttl(),
            root_object: default_root_object(),
            log_version: default_log_version(),
            extra_subject_alternative_names: Vec::new(),
        }
    }
}

/// Concrete, validated values the declaration is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteSettings {
    pub stack_name: String,
    /// Lower-case domain without a trailing dot
    pub domain_name: String,
    pub region: Option<String>,
    pub content_bucket_name: String,
    pub logging_bucket_name: String,
    pub default_ttl_secs: u64,
    pub min_ttl_secs: u64,
    pub root_object: String,
    pub log_version: String,
    /// Every name covered besides the wildcard primary domain, deduplicated
    pub subject_alternative_names: Vec<String>,
}

impl SiteSettings {
    /// Wildcard name the certificate is requested for.
    #[must_use]
    pub fn certificate_domain(&self) -> String {
        format!("*.{}", self.domain_name)
    }

    /// Fully qualified zone name, with the trailing dot.
    #[must_use]
    pub fn zone_fqdn(&self) -> String {
        format!("{}.", self.domain_name)
    }

    /// Key prefix access logs are written under.
    #[must_use]
    pub fn log_prefix(&self) -> String {
        format!("logs/{}/{}/", self.domain_name, self.log_version)
    }

    /// Path error responses are rewritten to.
    #[must_use]
    pub fn root_document_path(&self) -> String {
        format!("/{}", self.root_object)
    }
}

impl SiteConfig {
    /// Configuration with every default and the given domain.
    #[must_use]
    pub fn for_domain(domain_name: &str) -> Self {
        Self {
            domain_name: domain_name.to_string(),
            ..Self::default()
        }
    }

    /// Parses a configuration from YAML. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the YAML is malformed or has unknown fields.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its content is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        debug!("Loading site configuration from {}", origin);
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&yaml, &origin)
    }

    /// Applies values given on the command line or through the environment.
    ///
    /// `None` leaves the value from the file (or the default) in place.
    #[must_use]
    pub fn with_overrides(
        mut self,
        domain_name: Option<&str>,
        region: Option<&str>,
        stack_name: Option<&str>,
    ) -> Self {
        if let Some(domain_name) = domain_name {
            self.domain_name = domain_name.to_string();
        }
        if let Some(region) = region {
            self.region = Some(region.to_string());
        }
        if let Some(stack_name) = stack_name {
            self.stack_name = stack_name.to_string();
        }
        self
    }

    /// Validates the configuration without keeping the resolved values.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    /// Validates every field and derives the concrete settings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking the stack name, the
    /// domain, the region, the bucket names, the TTLs, the root object, the log version and
    /// the extra subject alternative names in that order.
    pub fn resolve(&self) -> Result<SiteSettings, ConfigError> {
        validate_stack_name(&self.stack_name)?;
        let (zone, domain_name) = parse_zone_name(&self.domain_name)?;
        if let Some(region) = &self.region {
            validate_region(region)?;
        }

        let content_bucket_name = self
            .content_bucket_name
            .clone()
            .unwrap_or_else(|| derived_bucket_name(CONTENT_BUCKET_PREFIX, &domain_name));
        validate_bucket_name(&content_bucket_name)?;

        let logging_bucket_name = self
            .logging_bucket_name
            .clone()
            .unwrap_or_else(|| derived_bucket_name(LOGGING_BUCKET_PREFIX, &domain_name));
        validate_bucket_name(&logging_bucket_name)?;

        if content_bucket_name == logging_bucket_name {
            return Err(ConfigError::InvalidBucketName {
                bucket: logging_bucket_name,
                reason: "logging bucket must differ from the content bucket".into(),
            });
        }

        let default_ttl_secs = parse_ttl_field("defaultTtl", &self.default_ttl)?;
        let min_ttl_secs = parse_ttl_field("minTtl", &self.min_ttl)?;
        if min_ttl_secs > default_ttl_secs {
            return Err(ConfigError::TtlOrdering {
                min_secs: min_ttl_secs,
                default_secs: default_ttl_secs,
            });
        }

        validate_root_object(&self.root_object)?;

        if self.log_version.is_empty()
            || self.log_version.contains('/')
            || self.log_version.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidLogVersion {
                log_version: self.log_version.clone(),
            });
        }

        let subject_alternative_names =
            subject_alternative_names(&zone, &domain_name, &self.extra_subject_alternative_names)?;

        Ok(SiteSettings {
            stack_name: self.stack_name.clone(),
            domain_name,
            region: self.region.clone(),
            content_bucket_name,
            logging_bucket_name,
            default_ttl_secs,
            min_ttl_secs,
            root_object: self.root_object.clone(),
            log_version: self.log_version.clone(),
            subject_alternative_names,
        })
    }
}

fn validate_stack_name(stack_name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidStackName {
        stack_name: stack_name.to_string(),
        reason: reason.to_string(),
    };

    if stack_name.is_empty() || stack_name.len() > STACK_NAME_MAX_LEN {
        return Err(invalid("must be 1 to 128 characters"));
    }
    if !stack_name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !stack_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(invalid("only letters, digits and hyphens are allowed"));
    }
    Ok(())
}

/// Parses the apex domain into a DNS name, returning it with its normalized text form.
fn parse_zone_name(domain: &str) -> Result<(Name, String), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDomain {
        domain: domain.to_string(),
        reason,
    };

    let normalized = domain.trim_end_matches('.').to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(invalid("domain cannot be empty".into()));
    }

    let name = Name::from_ascii(&normalized).map_err(|e| invalid(e.to_string()))?;
    if name.is_wildcard() {
        return Err(invalid("the apex domain cannot be a wildcard".into()));
    }
    if name.num_labels() < 2 {
        return Err(invalid(
            "a zone needs at least two labels (e.g., example.org)".into(),
        ));
    }

    check_labels(&normalized, false).map_err(invalid)?;

    Ok((name, normalized))
}

/// Applies the letter-digit-hyphen rule to every label of `name`.
///
/// With `allow_wildcard`, the first label may be `*`.
fn check_labels(name: &str, allow_wildcard: bool) -> Result<(), String> {
    for (position, label) in name.split('.').enumerate() {
        if allow_wildcard && position == 0 && label == "*" {
            continue;
        }
        if label.is_empty() || label.len() > DNS_LABEL_MAX_LEN {
            return Err(format!("label '{label}' must be 1 to 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' cannot start or end with a hyphen"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!(
                "label '{label}' may only contain letters, digits and hyphens"
            ));
        }
    }
    Ok(())
}

fn validate_region(region: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRegion {
        region: region.to_string(),
        reason: reason.to_string(),
    };

    if region.trim().is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            "only lowercase letters, digits and hyphens are allowed",
        ));
    }
    if region.starts_with('-') || region.ends_with('-') {
        return Err(invalid("cannot start or end with a hyphen"));
    }
    Ok(())
}

/// `static` + `example.org` gives `static-example-org`.
fn derived_bucket_name(prefix: &str, domain_name: &str) -> String {
    format!("{prefix}-{}", domain_name.replace('.', "-"))
}

fn validate_bucket_name(bucket: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBucketName {
        bucket: bucket.to_string(),
        reason: reason.to_string(),
    };

    if bucket.len() < BUCKET_NAME_MIN_LEN || bucket.len() > BUCKET_NAME_MAX_LEN {
        return Err(invalid("must be 3 to 63 characters"));
    }
    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(invalid(
            "only lowercase letters, digits, dots and hyphens are allowed",
        ));
    }
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !bucket.starts_with(alnum) || !bucket.ends_with(alnum) {
        return Err(invalid("must start and end with a letter or digit"));
    }
    if bucket.contains("..") {
        return Err(invalid("cannot contain consecutive dots"));
    }
    if bucket.parse::<Ipv4Addr>().is_ok() {
        return Err(invalid("cannot be formatted as an IP address"));
    }
    Ok(())
}

fn parse_ttl_field(field: &str, value: &str) -> Result<u64, ConfigError> {
    parse_ttl(value)
        .map(|d| d.as_secs())
        .map_err(|e| ConfigError::InvalidTtl {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn validate_root_object(root_object: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRootObject {
        root_object: root_object.to_string(),
        reason: reason.to_string(),
    };

    if root_object.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if root_object.starts_with('/') {
        return Err(invalid("must be an object key without a leading slash"));
    }
    if root_object.chars().any(char::is_whitespace) {
        return Err(invalid("cannot contain whitespace"));
    }
    Ok(())
}

/// Builds the SAN list: the apex, `www`, then the extra names in order.
///
/// Duplicates and the wildcard primary domain itself are dropped.
fn subject_alternative_names(
    zone: &Name,
    domain_name: &str,
    extra: &[String],
) -> Result<Vec<String>, ConfigError> {
    let primary = format!("*.{domain_name}");
    let mut names = vec![
        domain_name.to_string(),
        format!("{WWW_SUBDOMAIN}.{domain_name}"),
    ];

    for raw in extra {
        let candidate = raw.trim_end_matches('.').to_ascii_lowercase();
        let outside = || ConfigError::SubjectAlternativeNameOutsideZone {
            name: raw.clone(),
            zone: domain_name.to_string(),
        };
        let malformed = |reason: String| ConfigError::InvalidSubjectAlternativeName {
            name: raw.clone(),
            reason,
        };
        check_labels(&candidate, true).map_err(&malformed)?;
        let name = Name::from_ascii(&candidate).map_err(|e| malformed(e.to_string()))?;
        if !zone.zone_of(&name) {
            return Err(outside());
        }
        if candidate != primary && !names.contains(&candidate) {
            names.push(candidate);
        }
    }

    Ok(names)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
