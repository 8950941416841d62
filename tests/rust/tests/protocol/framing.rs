//! Response body variants accepted from the plugin

use pretty_assertions::assert_eq;
use serde_json::json;
use tests::plugin::{initialize_result, sse_result};
use tests::MockPlugin;
use wiremock::ResponseTemplate;
use wpbridge_core::ToolInvocation;
use wpbridge_mcp::{ClientConfig, ClientError, ClientFactory, HttpClientFactory, ProtocolClient};

#[tokio::test]
async fn test_sse_initialize_and_tool_call() {
    let plugin = MockPlugin::start().await;
    plugin.on("initialize", sse_result(initialize_result("0.3.1"))).await;
    plugin
        .on("tools/call", sse_result(json!({"content": [], "isError": true})))
        .await;

    let mut client = HttpClientFactory::default()
        .create(&plugin.credential("t1"))
        .unwrap();
    let handshake = client.initialize().await.unwrap();
    let result = client
        .call_tool(&ToolInvocation::new("wp_delete_post"))
        .await
        .unwrap();

    assert_eq!(handshake.plugin_version(), Some("0.3.1"));
    assert!(result.is_error());
}

#[tokio::test]
async fn test_site_in_subdirectory() {
    let plugin = MockPlugin::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/blog/wp-json/wpbridge/v1/mcp"))
        .respond_with(tests::plugin::rpc_result(initialize_result("0.2.0")))
        .mount(&plugin.server)
        .await;

    let credential = tests::fixtures::credential(&format!("{}/blog/", plugin.base_url()), "t1");
    let mut client = HttpClientFactory::default().create(&credential).unwrap();

    assert!(client.initialize().await.is_ok());
}

#[tokio::test]
async fn test_custom_mcp_path() {
    let plugin = MockPlugin::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/custom/mcp"))
        .respond_with(tests::plugin::rpc_result(initialize_result("0.2.0")))
        .mount(&plugin.server)
        .await;

    let factory = HttpClientFactory::new(ClientConfig {
        mcp_path: "/custom/mcp".to_string(),
        ..ClientConfig::default()
    });
    let mut client = factory.create(&plugin.credential("t1")).unwrap();

    assert!(client.initialize().await.is_ok());
}

#[tokio::test]
async fn test_sse_final_event_without_blank_line() {
    let plugin = MockPlugin::start().await;
    let envelope = json!({"jsonrpc": "2.0", "id": 1, "result": initialize_result("0.2.4")});
    let body = format!(
        ": stream open\n\nevent: message\ndata: {{\"jsonrpc\":\"2.0\",\"method\":\"notifications/message\"}}\n\ndata: {}",
        envelope
    );
    plugin
        .on("initialize", ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .await;

    let mut client = HttpClientFactory::default()
        .create(&plugin.credential("t1"))
        .unwrap();
    let handshake = client.initialize().await.unwrap();

    assert_eq!(handshake.plugin_version(), Some("0.2.4"));
}

#[tokio::test]
async fn test_oversized_reply_is_refused() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin
        .on(
            "tools/call",
            tests::plugin::rpc_result(json!({"content": [{"type": "text", "text": "x".repeat(8 * 1024)}]})),
        )
        .await;

    let factory = HttpClientFactory::new(ClientConfig {
        max_response_bytes: 4 * 1024,
        ..ClientConfig::default()
    });
    let mut client = factory.create(&plugin.credential("t1")).unwrap();
    client.initialize().await.unwrap();

    let err = client
        .call_tool(&ToolInvocation::new("wp_get_posts"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Protocol(ref message) if message.contains("exceeds")));
}

