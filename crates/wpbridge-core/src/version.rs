//! Version compatibility gate
//!
//! Compares the version reported by the remote plugin against
//! [`MIN_PLUGIN_VERSION`]. Versions are dot-separated numeric components;
//! the shorter sequence is zero-padded before a left-to-right comparison.
//!
//! Parsing is lenient: a segment that is not a base-10 integer counts as `0`,
//! and a missing or blank version counts as `0.0.0`. The gate never fails.

use std::cmp::Ordering;

use serde::Serialize;

use crate::branding::MIN_PLUGIN_VERSION;

/// Version assumed when the plugin reports none
pub const UNKNOWN_VERSION: &str = "0.0.0";

/// Outcome of comparing a plugin version against the minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityVerdict {
    pub ok: bool,
    /// Version as reported by the plugin, or `0.0.0` when absent
    pub plugin_version: String,
    pub min_required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Split a version into numeric components.
fn parse_components(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Compare two version strings component by component.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = parse_components(a);
    let right = parse_components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    Ordering::Equal
}

/// `a >= b` under [`compare_versions`]
pub fn version_gte(a: &str, b: &str) -> bool {
    compare_versions(a, b) != Ordering::Less
}

/// Check a reported plugin version against the fixed minimum.
pub fn check_compatibility(reported: Option<&str>) -> CompatibilityVerdict {
    check_compatibility_against(reported, MIN_PLUGIN_VERSION)
}

/// Check a reported plugin version against an explicit minimum.
pub fn check_compatibility_against(reported: Option<&str>, min_required: &str) -> CompatibilityVerdict {
    let plugin_version = reported
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_VERSION)
        .to_string();

    let ok = version_gte(&plugin_version, min_required);
    let reason = if ok {
        None
    } else if reported.map_or(true, |v| v.trim().is_empty()) {
        Some(format!(
            "Plugin did not report a version; at least {} is required",
            min_required
        ))
    } else {
        Some(format!(
            "Plugin version {} is older than the minimum required {}; upgrade the WordPress plugin",
            plugin_version, min_required
        ))
    };

    CompatibilityVerdict {
        ok,
        plugin_version,
        min_required: min_required.to_string(),
        reason,
    }
}
