// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TTL parsing for duration strings with a unit suffix.
//!
//! Supports parsing strings such as "900s", "15m", "1h" or "1d" into
//! `std::time::Duration`, bounded to at most one year.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::constants::MAX_TTL_SECS;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;

/// Parse a TTL string into a `Duration`.
///
/// Supported units:
/// - `s` (seconds): "900s"
/// - `m` (minutes): "15m" = 900 seconds
/// - `h` (hours): "1h" = 3600 seconds
/// - `d` (days): "1d" = 86400 seconds
///
/// Zero is accepted ("0s"), since error responses are cached for zero seconds.
///
/// # Examples
///
/// ```
/// use sitestack::duration::parse_ttl;
/// use std::time::Duration;
///
/// assert_eq!(parse_ttl("15m").unwrap(), Duration::from_secs(900));
/// assert_eq!(parse_ttl("60s").unwrap(), Duration::from_secs(60));
/// assert!(parse_ttl("").is_err());
/// assert!(parse_ttl("10").is_err());  // Missing unit
/// assert!(parse_ttl("10x").is_err()); // Invalid unit
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The format is invalid (missing unit, non-numeric value)
/// - The TTL is above the maximum of one year
pub fn parse_ttl(ttl_str: &str) -> Result<Duration> {
    if ttl_str.is_empty() {
        bail!("TTL string cannot be empty");
    }

    let split_pos = ttl_str
        .chars()
        .position(|c| !c.is_ascii_digit())
        .context("TTL must end with a unit (s, m, h, or d)")?;

    let (value_str, unit) = ttl_str.split_at(split_pos);

    let value: u64 = value_str
        .parse()
        .context("TTL value must be a non-negative integer")?;

    let multiplier = match unit {
        "s" => 1,
        "m" => SECONDS_PER_MINUTE,
        "h" => SECONDS_PER_HOUR,
        "d" => SECONDS_PER_DAY,
        _ => {
            bail!("Unsupported TTL unit '{unit}'. Use 's', 'm', 'h', or 'd'")
        }
    };

    let seconds = value
        .checked_mul(multiplier)
        .context("TTL value too large (overflow)")?;

    if seconds > MAX_TTL_SECS {
        bail!("TTL '{ttl_str}' exceeds maximum of {MAX_TTL_SECS}s (365 days)");
    }

    Ok(Duration::from_secs(seconds))
}

/// Format a number of seconds using the largest unit that divides it exactly.
///
/// The output always parses back with [`parse_ttl`].
#[must_use]
pub fn format_ttl(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    if seconds % SECONDS_PER_DAY == 0 {
        format!("{}d", seconds / SECONDS_PER_DAY)
    } else if seconds % SECONDS_PER_HOUR == 0 {
        format!("{}h", seconds / SECONDS_PER_HOUR)
    } else if seconds % SECONDS_PER_MINUTE == 0 {
        format!("{}m", seconds / SECONDS_PER_MINUTE)
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
