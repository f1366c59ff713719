// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Site configuration mirroring a real deployment, with explicit bucket names.
pub const PRODUCTION_CONFIG: &str = r"
stackName: WebsiteInfraStack
domainName: aaron-t-w.com
region: eu-west-1
contentBucketName: static-aaron-t-w
loggingBucketName: logging-aaron-t-w
defaultTtl: 15m
minTtl: 1m
";

/// Writes `yaml` to `site.yaml` inside `dir` and returns its path.
pub fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("site.yaml");
    fs::write(&path, yaml).expect("Failed to write test configuration");
    path
}

/// Every logical id referenced through `Ref` or `Fn::GetAtt` below `value`.
pub fn referenced_ids(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect(value, &mut found);
    found
}

fn collect(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("Ref") {
                found.push(id.clone());
            }
            if let Some(Value::String(id)) = map
                .get("Fn::GetAtt")
                .and_then(Value::as_array)
                .and_then(|parts| parts.first())
            {
                found.push(id.clone());
            }
            map.values().for_each(|nested| collect(nested, found));
        }
        Value::Array(items) => items.iter().for_each(|item| collect(item, found)),
        _ => {}
    }
}

/// Resources of the given type in a rendered template.
pub fn resources_of_type<'a>(template: &'a Value, resource_type: &str) -> Vec<(&'a String, &'a Value)> {
    template["Resources"]
        .as_object()
        .map(|resources| {
            resources
                .iter()
                .filter(|(_, r)| r["Type"] == resource_type)
                .collect()
        })
        .unwrap_or_default()
}
