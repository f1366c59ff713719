// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sitestack::{
    config::SiteConfig,
    constants::LOG_FORMAT_ENV,
    plan::{DeploymentPlan, Provisioner, RecordingProvisioner},
    stack::{declare_site, SiteDeclaration},
    template::{OutputFormat, Template},
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "sitestack",
    version,
    about = "Declare and synthesize static website hosting infrastructure"
)]
struct Cli {
    /// Path to a YAML site configuration file
    #[arg(long, short, global = true, env = "SITESTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Apex domain of the site, overriding the configuration file
    #[arg(long, global = true, env = "SITESTACK_DOMAIN")]
    domain: Option<String>,

    /// Region hosting the stack, overriding the configuration file
    #[arg(long, global = true, env = "SITESTACK_REGION")]
    region: Option<String>,

    /// Stack name, overriding the configuration file
    #[arg(long, global = true, env = "SITESTACK_STACK_NAME")]
    stack_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize the deployment template
    Synth {
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Write the template to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Build and validate the declaration without synthesizing
    Validate,

    /// Print creation waves, or the teardown order with --teardown
    Plan {
        #[arg(long)]
        teardown: bool,
    },

    /// Print the resource graph in Graphviz DOT format
    Graph,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if let Command::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "sitestack", &mut io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let site = declare_site(&config).context("Invalid site declaration")?;

    match cli.command {
        Command::Synth { format, output } => synth(&site, format, output),
        Command::Validate => validate(&site),
        Command::Plan { teardown } => plan(&site, teardown),
        Command::Graph => {
            print!("{}", site.graph.to_dot());
            Ok(())
        }
        Command::Completions { .. } => Ok(()),
    }
}

/// Initializes `tracing` on stderr so stdout carries only command output.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let config = match &cli.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => {
            debug!("No configuration file given, using defaults");
            SiteConfig::default()
        }
    };

    Ok(config.with_overrides(
        cli.domain.as_deref(),
        cli.region.as_deref(),
        cli.stack_name.as_deref(),
    ))
}

fn synth(site: &SiteDeclaration, format: OutputFormat, output: Option<PathBuf>) -> Result<()> {
    let template = Template::synthesize(site)?;
    let rendered = template.render(format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            info!(
                "Wrote template for {} to {}",
                site.settings.domain_name,
                path.display()
            );
        }
        None => io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write template to stdout")?,
    }
    Ok(())
}

fn validate(site: &SiteDeclaration) -> Result<()> {
    site.graph.validate()?;
    let template = Template::synthesize(site)?;

    println!("Stack:       {}", site.settings.stack_name);
    println!("Domain:      {}", site.settings.domain_name);
    println!("Resources:   {}", site.graph.len());
    println!("Edges:       {}", site.graph.edges().len());
    println!("Fingerprint: {}", template.fingerprint()?);
    Ok(())
}

fn plan(site: &SiteDeclaration, teardown: bool) -> Result<()> {
    let plan = DeploymentPlan::from_graph(&site.graph)?;

    if teardown {
        for step in plan.teardown() {
            println!("{:<7} {} ({})", step.action, step.logical_id, step.resource_type);
        }
        return Ok(());
    }

    for (index, wave) in plan.waves().iter().enumerate() {
        println!("Wave {index}:");
        for step in wave {
            println!("  {} ({})", step.logical_id, step.resource_type);
        }
    }

    let report = RecordingProvisioner::new()
        .apply(&plan)
        .context("Dry run of the deployment plan failed")?;
    info!("Dry run applied {} steps in order", report.applied.len());
    Ok(())
}
