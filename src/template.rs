// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Template synthesis.
//!
//! Renders a [`SiteDeclaration`] into a template document the provisioning
//! engine consumes. All maps are ordered, so synthesizing the same declaration
//! twice produces byte-identical output and the same [`Template::fingerprint`].

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::constants::TEMPLATE_FORMAT_VERSION;
use crate::labels::{build_stack_tags, METADATA_PATH, METADATA_REGION, TAG_DOMAIN, TAG_STACK};
use crate::model::{Expr, RemovalPolicy, Resource};
use crate::stack::SiteDeclaration;

/// Serialization format of a synthesized template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// One resource entry of a template.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateResource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// A value exported by the stack.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateOutput {
    pub description: String,
    pub value: Value,
}

/// A synthesized template.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
    pub resources: BTreeMap<String, TemplateResource>,
    pub outputs: BTreeMap<String, TemplateOutput>,
}

impl Template {
    /// Renders every resource of the declaration with tags, lifecycle policies
    /// and explicit dependencies, plus the stack outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is invalid or a resource cannot be serialized.
    pub fn synthesize(site: &SiteDeclaration) -> Result<Self> {
        let settings = &site.settings;
        site.graph
            .validate()
            .context("Refusing to synthesize an invalid resource graph")?;

        let stack_tags = build_stack_tags(&settings.stack_name, &settings.domain_name);
        let mut resources = BTreeMap::new();
        for resource in site.graph.resources() {
            let depends_on = site
                .graph
                .dependencies_of(&resource.logical_id)
                .into_iter()
                .map(ToString::to_string)
                .collect();
            let entry = render_resource(resource, &stack_tags, depends_on)?;
            resources.insert(resource.logical_id.to_string(), entry);
        }

        let ids = &site.ids;
        let mut outputs = BTreeMap::new();
        outputs.insert(
            "DistributionDomainName".to_string(),
            output(
                "Domain name of the distribution",
                &Expr::get_att(&ids.distribution, "DomainName"),
            )?,
        );
        outputs.insert(
            "DistributionId".to_string(),
            output("Distribution id", &Expr::Ref(ids.distribution.clone()))?,
        );
        outputs.insert(
            "HostedZoneId".to_string(),
            output("Hosted zone id", &Expr::Ref(ids.hosted_zone.clone()))?,
        );
        outputs.insert(
            "NameServers".to_string(),
            TemplateOutput {
                description: format!(
                    "Name servers to publish at the registrar for {}",
                    settings.domain_name
                ),
                value: json!({
                    "Fn::Join": [",", Expr::get_att(&ids.hosted_zone, "NameServers")]
                }),
            },
        );
        outputs.insert(
            "ContentBucketName".to_string(),
            output(
                "Bucket site content is published to",
                &Expr::Ref(ids.content_bucket.clone()),
            )?,
        );

        let mut metadata = BTreeMap::new();
        metadata.insert(TAG_STACK.to_string(), settings.stack_name.clone());
        metadata.insert(TAG_DOMAIN.to_string(), settings.domain_name.clone());
        if let Some(region) = &settings.region {
            metadata.insert(METADATA_REGION.to_string(), region.clone());
        }

        let template = Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: format!("Static site hosting for {}", settings.domain_name),
            metadata,
            resources,
            outputs,
        };
        debug!(
            "Synthesized {} resources and {} outputs",
            template.resources.len(),
            template.outputs.len()
        );
        Ok(template)
    }

    /// Pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut rendered =
            serde_json::to_string_pretty(self).context("Failed to render template as JSON")?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to render template as YAML")
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Lower-case hex SHA-256 of the JSON rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn fingerprint(&self) -> Result<String> {
        let json = self.to_json()?;
        let fingerprint = format!("{:x}", Sha256::digest(json.as_bytes()));
        info!("Template fingerprint {}", fingerprint);
        Ok(fingerprint)
    }
}

fn render_resource(
    resource: &Resource,
    stack_tags: &BTreeMap<String, String>,
    depends_on: Vec<String>,
) -> Result<TemplateResource> {
    let mut properties = serde_json::to_value(&resource.kind).with_context(|| {
        format!(
            "Failed to serialize properties of {}",
            resource.logical_id
        )
    })?;

    if let (Some(tags_property), Value::Object(map)) =
        (resource.kind.tags_property(), &mut properties)
    {
        let mut tags = stack_tags.clone();
        tags.extend(resource.tags.clone());
        map.insert(tags_property.to_string(), tag_list(&tags));
    }

    let retained = resource.removal_policy == RemovalPolicy::Retain;
    let policy = retained.then(|| RemovalPolicy::Retain.as_str().to_string());

    let mut metadata = BTreeMap::new();
    metadata.insert(METADATA_PATH.to_string(), resource.construct_path.clone());
    if let Some(region) = &resource.region {
        metadata.insert(METADATA_REGION.to_string(), region.clone());
    }

    Ok(TemplateResource {
        resource_type: resource.resource_type().to_string(),
        properties,
        depends_on,
        deletion_policy: policy.clone(),
        update_replace_policy: policy,
        metadata,
    })
}

/// `[{"Key": k, "Value": v}, ...]` in key order.
fn tag_list(tags: &BTreeMap<String, String>) -> Value {
    Value::Array(
        tags.iter()
            .map(|(key, value)| {
                let mut entry = Map::new();
                entry.insert("Key".to_string(), Value::String(key.clone()));
                entry.insert("Value".to_string(), Value::String(value.clone()));
                Value::Object(entry)
            })
            .collect(),
    )
}

fn output(description: &str, value: &Expr) -> Result<TemplateOutput> {
    Ok(TemplateOutput {
        description: description.to_string(),
        value: serde_json::to_value(value).context("Failed to serialize output value")?,
    })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod template_tests;
