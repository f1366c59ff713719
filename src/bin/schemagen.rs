// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Site Configuration Schema Generator
//!
//! Generates the JSON Schema of the site configuration file from the Rust
//! types defined in src/config.rs, so editors can validate configuration
//! files against the same rules the loader applies.
//!
//! Usage:
//!   cargo run --bin schemagen
//!
//! The schema is written to deploy/schema/site-config.schema.json.

use schemars::schema_for;
use sitestack::config::SiteConfig;
use sitestack::constants::SCHEMA_OUTPUT_DIR;
use std::fs;
use std::path::Path;

const SCHEMA_FILE: &str = "site-config.schema.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new(SCHEMA_OUTPUT_DIR);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    println!("Generating site configuration schema from src/config.rs...");

    let schema = schema_for!(SiteConfig);
    let mut rendered = serde_json::to_string_pretty(&schema)?;
    rendered.push('\n');

    let output_path = output_dir.join(SCHEMA_FILE);
    fs::write(&output_path, rendered)?;

    println!("  ✓ Generated {}", output_path.display());

    Ok(())
}
