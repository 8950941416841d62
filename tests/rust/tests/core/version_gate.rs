//! Version compatibility gate properties

use pretty_assertions::assert_eq;
use std::cmp::Ordering;
use wpbridge_core::branding::MIN_PLUGIN_VERSION;
use wpbridge_core::{
    check_compatibility, check_compatibility_against, compare_versions, version_gte,
    UNKNOWN_VERSION,
};

/// Reference ordering: numeric components compared after zero-padding
fn reference_order(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    let pad = |v: &[u64]| {
        let mut v = v.to_vec();
        v.resize(len, 0);
        v
    };
    pad(a).cmp(&pad(b))
}

fn render(components: &[u64]) -> String {
    components
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[test]
fn test_documented_examples() {
    assert!(version_gte("1.2", "1.2.0"));
    assert!(!version_gte("1.1.9", "1.2.0"));
    assert!(version_gte("2.0.0", "1.9.9"));
}

#[test]
fn test_ordering_matches_padded_numeric_comparison() {
    let versions: Vec<Vec<u64>> = vec![
        vec![0],
        vec![0, 0, 1],
        vec![0, 1],
        vec![0, 1, 0],
        vec![0, 1, 0, 0],
        vec![0, 9, 9],
        vec![0, 10],
        vec![1],
        vec![1, 0, 1],
        vec![1, 2],
        vec![1, 2, 0],
        vec![1, 10, 0],
        vec![2, 0, 0],
        vec![10, 0],
    ];

    for a in &versions {
        for b in &versions {
            let expected = reference_order(a, b);
            let actual = compare_versions(&render(a), &render(b));
            assert_eq!(actual, expected, "{} vs {}", render(a), render(b));
            assert_eq!(
                version_gte(&render(a), &render(b)),
                expected != Ordering::Less
            );
        }
    }
}

#[test]
fn test_antisymmetry() {
    let pairs = [("0.2.0", "0.1.9"), ("1.0", "1.0.0"), ("3", "2.99.99")];
    for (a, b) in pairs {
        assert_eq!(compare_versions(a, b), compare_versions(b, a).reverse());
    }
}

#[test]
fn test_check_is_deterministic() {
    for input in [Some("0.2.0"), Some("0.0.5"), Some("garbage"), None] {
        assert_eq!(check_compatibility(input), check_compatibility(input));
    }
}

#[test]
fn test_missing_version_defaults_to_zero() {
    let verdict = check_compatibility(None);

    assert!(!verdict.ok);
    assert_eq!(verdict.plugin_version, UNKNOWN_VERSION);
    assert_eq!(verdict.min_required, MIN_PLUGIN_VERSION);
    assert!(verdict.reason.is_some());
}

#[test]
fn test_missing_version_against_zero_minimum() {
    assert!(check_compatibility_against(None, "0.0.0").ok);
    assert!(!check_compatibility_against(None, "0.0.1").ok);
}

#[test]
fn test_incompatible_scenario_values_are_verbatim() {
    let verdict = check_compatibility(Some("0.0.5"));

    assert!(!verdict.ok);
    assert_eq!(verdict.plugin_version, "0.0.5");
    assert_eq!(verdict.min_required, "0.1.0");
}

#[test]
fn test_minimum_itself_is_compatible() {
    assert!(check_compatibility(Some(MIN_PLUGIN_VERSION)).ok);
    assert!(check_compatibility(Some("0.1")).ok);
}

#[test]
fn test_non_numeric_segments_are_lenient() {
    assert!(!check_compatibility(Some("beta")).ok);
    assert!(check_compatibility(Some("0.2.x")).ok);
}

#[test]
fn test_verdict_serializes_camel_case() {
    let value = serde_json::to_value(check_compatibility(Some("0.0.5"))).unwrap();

    assert_eq!(value["ok"], false);
    assert_eq!(value["pluginVersion"], "0.0.5");
    assert_eq!(value["minRequired"], "0.1.0");
}
