//! Remote credential invariants

use pretty_assertions::assert_eq;
use serde_json::json;
use tests::fixtures;
use wpbridge_core::{CredentialError, RemoteCredential};

#[test]
fn test_half_credential_cannot_deserialize() {
    let url_only = json!({"baseUrl": "https://example.com"});
    let token_only = json!({"token": "t1"});

    assert!(serde_json::from_value::<RemoteCredential>(url_only).is_err());
    assert!(serde_json::from_value::<RemoteCredential>(token_only).is_err());
}

#[test]
fn test_validation_rules() {
    let https = fixtures::example_credential();
    assert!(https.validate(false).is_ok());

    let http = fixtures::credential("http://wp.local", "t1");
    assert_eq!(http.validate(false), Err(CredentialError::InsecureScheme));
    assert!(http.validate(true).is_ok());

    assert_eq!(
        RemoteCredential::new("https://example.com", "").unwrap_err(),
        CredentialError::MissingToken
    );
}

#[test]
fn test_tokens_never_appear_in_debug_output() {
    let credential = fixtures::credential("https://example.com", "secret-token")
        .with_refresh_token("secret-refresh");
    let rendered = format!("{:?}", credential);

    assert!(!rendered.contains("secret-token"));
    assert!(!rendered.contains("secret-refresh"));
    assert!(rendered.contains("https://example.com"));
}

#[test]
fn test_serialized_shape() {
    let credential = fixtures::example_credential().with_write_mode(true);
    let value = serde_json::to_value(&credential).unwrap();

    assert_eq!(
        value,
        json!({
            "baseUrl": "https://example.com/",
            "token": "t1",
            "writeModeEnabled": true
        })
    );
}
