// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Sitestack - Static Website Hosting Topology
//!
//! Sitestack declares the cloud resources needed to serve a static website
//! under a custom domain over HTTPS, as a typed and validated resource graph,
//! and synthesizes it into a deterministic deployment template.
//!
//! ## Overview
//!
//! One configuration value (the domain, plus optional overrides) yields:
//!
//! - A public DNS hosted zone for the domain
//! - A DNS-validated TLS certificate, always issued in `us-east-1`
//! - A private content bucket and a private access-log bucket, both retained on teardown
//! - An origin access identity with a read-only grant on the content bucket
//! - A CDN distribution serving the bucket over HTTPS only
//! - Apex `A` and `AAAA` alias records pointing at the distribution
//!
//! ## Modules
//!
//! - [`config`] - Site configuration, defaults and validation
//! - [`model`] - Typed resources and the references between them
//! - [`graph`] - Resource graph, validation and dependency ordering
//! - [`stack`] - The static-site declaration itself
//! - [`template`] - Template synthesis and fingerprinting
//! - [`plan`] - Deployment plans and the provisioning engine hand-off
//! - [`errors`] - Error types with stable reason codes
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitestack::config::SiteConfig;
//! use sitestack::stack::declare_site;
//! use sitestack::template::Template;
//!
//! let site = declare_site(&SiteConfig::for_domain("example.org"))?;
//! let template = Template::synthesize(&site)?;
//! println!("{}", template.to_json()?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod constants;
pub mod duration;
pub mod errors;
pub mod graph;
pub mod labels;
pub mod model;
pub mod plan;
pub mod stack;
pub mod template;
