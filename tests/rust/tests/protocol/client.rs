//! Handshake, tool invocation and error classification over HTTP

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tests::plugin::{initialize_result, legacy_initialize_result, rpc_error, rpc_result};
use tests::MockPlugin;
use wiremock::ResponseTemplate;
use wpbridge_core::ToolInvocation;
use wpbridge_mcp::{ClientConfig, ClientError, ClientFactory, HttpClientFactory, ProtocolClient};

fn factory() -> HttpClientFactory {
    HttpClientFactory::default()
}

fn fast_factory() -> HttpClientFactory {
    HttpClientFactory::new(ClientConfig {
        request_timeout: Duration::from_millis(200),
        ..ClientConfig::default()
    })
}

#[tokio::test]
async fn test_initialize_reads_server_info_version() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    let handshake = client.initialize().await.unwrap();

    assert_eq!(handshake.server_info.name, "wpbridge-plugin");
    assert_eq!(handshake.plugin_version(), Some("0.2.0"));
    assert_eq!(handshake.capabilities.tools_hash.as_deref(), Some("abc123"));
    assert_eq!(client.handshake(), Some(&handshake));
}

#[tokio::test]
async fn test_initialize_accepts_legacy_plugin_version() {
    let plugin = MockPlugin::start().await;
    plugin
        .on("initialize", rpc_result(legacy_initialize_result("0.1.3")))
        .await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    let handshake = client.initialize().await.unwrap();

    assert_eq!(handshake.plugin_version(), Some("0.1.3"));
}

#[tokio::test]
async fn test_initialize_request_framing() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;

    let credential = plugin.credential("t1").with_write_mode(true);
    let mut client = factory().create(&credential).unwrap();
    client.initialize().await.unwrap();

    let requests = plugin.requests().await;
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    let header = |name: &str| {
        request
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    assert_eq!(header("authorization").as_deref(), Some("Bearer t1"));
    assert_eq!(header("x-wpbridge-write-mode").as_deref(), Some("enabled"));
    assert!(header("accept").unwrap().contains("text/event-stream"));

    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "initialize");
    assert_eq!(body["params"]["protocolVersion"], "2025-06-18");
    assert_eq!(body["params"]["clientInfo"]["name"], "wpbridge");
}

#[tokio::test]
async fn test_call_tool_after_initialize() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin
        .on(
            "tools/call",
            rpc_result(json!({"content": [{"type": "text", "text": "3 posts"}]})),
        )
        .await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    client.initialize().await.unwrap();
    let result = client
        .call_tool(&ToolInvocation::new("wp_get_posts").with_arg("per_page", 3))
        .await
        .unwrap();

    assert_eq!(result.payload["content"][0]["text"], "3 posts");
    assert!(!result.is_error());

    let requests = plugin.requests().await;
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["params"], json!({"name": "wp_get_posts", "arguments": {"per_page": 3}}));
}

#[tokio::test]
async fn test_call_tool_before_initialize_sends_nothing() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;

    let client = factory().create(&plugin.credential("t1")).unwrap();
    let err = client
        .call_tool(&ToolInvocation::new("wp_get_posts"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotInitialized));
    assert!(plugin.requests().await.is_empty());
}

#[tokio::test]
async fn test_session_header_echoed() {
    let plugin = MockPlugin::start().await;
    let result = initialize_result("0.2.0");
    plugin
        .on("initialize", move |request: &wiremock::Request| {
            rpc_result(result.clone())(request).insert_header("Mcp-Session-Id", "sess-42")
        })
        .await;
    plugin.on("tools/list", rpc_result(json!({"tools": []}))).await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    client.initialize().await.unwrap();
    client.list_tools().await.unwrap();

    let requests = plugin.requests().await;
    assert!(requests[0].headers.get("mcp-session-id").is_none());
    assert_eq!(
        requests[1].headers.get("mcp-session-id").and_then(|v| v.to_str().ok()),
        Some("sess-42")
    );
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    for status in [401, 403] {
        let plugin = MockPlugin::start().await;
        plugin.on_status("initialize", status).await;

        let mut client = factory().create(&plugin.credential("stale")).unwrap();
        let err = client.initialize().await.unwrap_err();

        assert!(matches!(err, ClientError::Auth { status: s } if s == status));
    }
}

#[tokio::test]
async fn test_server_error_is_connection_error() {
    let plugin = MockPlugin::start().await;
    plugin.on_status("initialize", 503).await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, ClientError::Connection(_)));
}

#[tokio::test]
async fn test_not_found_is_protocol_error() {
    // No route mounted: the plugin answers 404 like a site without the plugin
    let plugin = MockPlugin::start().await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
}

#[tokio::test]
async fn test_unreachable_site_is_connection_error() {
    let plugin = MockPlugin::start().await;
    let credential = plugin.credential("t1");
    drop(plugin);

    let mut client = factory().create(&credential).unwrap();
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, ClientError::Connection(_)));
}

#[tokio::test]
async fn test_slow_plugin_times_out() {
    let plugin = MockPlugin::start().await;
    plugin
        .on_delayed("initialize", initialize_result("0.2.0"), Duration::from_secs(2))
        .await;

    let mut client = fast_factory().create(&plugin.credential("t1")).unwrap();
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout(_)));
}

#[tokio::test]
async fn test_html_page_is_protocol_error() {
    let plugin = MockPlugin::start().await;
    plugin
        .on(
            "initialize",
            ResponseTemplate::new(200).set_body_raw("<html>Maintenance</html>", "text/html"),
        )
        .await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    let err = client.initialize().await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
}

#[tokio::test]
async fn test_rpc_error_on_tool_call() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin.on("tools/call", rpc_error(-32602, "Unknown tool")).await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    client.initialize().await.unwrap();
    let err = client
        .call_tool(&ToolInvocation::new("wp_nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rpc { code: -32602, .. }));
}

#[tokio::test]
async fn test_tools_list_without_array_is_protocol_error() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin.on("tools/list", rpc_result(json!({"items": []}))).await;

    let mut client = factory().create(&plugin.credential("t1")).unwrap();
    client.initialize().await.unwrap();

    assert!(matches!(client.list_tools().await, Err(ClientError::Protocol(_))));
}
