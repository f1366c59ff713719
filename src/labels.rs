// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common tag and metadata keys stamped onto synthesized resources.
//!
//! This module defines the stack-wide tags and the template metadata keys to
//! ensure consistency across every resource the declaration emits.

use std::collections::BTreeMap;

// ============================================================================
// Stack Tags
// ============================================================================

/// Tag naming the stack a resource belongs to
pub const TAG_STACK: &str = "sitestack:stack";

/// Tag naming the domain the stack serves
pub const TAG_DOMAIN: &str = "sitestack:domain";

/// Tag naming the tool that declared the resource
pub const TAG_MANAGED_BY: &str = "sitestack:managed-by";

/// Value for [`TAG_MANAGED_BY`]
pub const MANAGED_BY_SITESTACK: &str = "sitestack";

// ============================================================================
// Template Metadata Keys
// ============================================================================

/// Metadata key holding the construct path a logical id was derived from
pub const METADATA_PATH: &str = "sitestack:path";

/// Metadata key holding the region a resource must be created in
pub const METADATA_REGION: &str = "sitestack:region";

/// Builds the tag set applied to every taggable resource of a stack.
#[must_use]
pub fn build_stack_tags(stack_name: &str, domain_name: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert(TAG_STACK.into(), stack_name.into());
    tags.insert(TAG_DOMAIN.into(), domain_name.into());
    tags.insert(TAG_MANAGED_BY.into(), MANAGED_BY_SITESTACK.into());
    tags
}
