//! Tool calls and write mode on a connected session

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tests::fixtures::session;
use tests::plugin::rpc_result;
use tests::{BridgeError, CountingStore, MockPlugin, ToolInvocation};
use wpbridge_gateway::ConnectionManager;
use wpbridge_mcp::HttpClientFactory;

async fn connected(plugin: &MockPlugin, store: Arc<CountingStore>) -> ConnectionManager {
    let manager = ConnectionManager::new(store, Arc::new(HttpClientFactory::default()));
    manager
        .connect(&session("alice"), plugin.credential("t1"))
        .await
        .unwrap();
    manager
}

fn write_mode_headers(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .filter_map(|r| r.headers.get("x-wpbridge-write-mode"))
        .filter_map(|v| v.to_str().ok().map(String::from))
        .collect()
}

#[tokio::test]
async fn test_call_tool_handshakes_then_invokes() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin
        .on("tools/call", rpc_result(json!({"content": [{"type": "text", "text": "ok"}]})))
        .await;
    let manager = connected(&plugin, Arc::new(CountingStore::new())).await;

    let result = manager
        .call_tool(&session("alice"), &ToolInvocation::new("wp_get_site_info"))
        .await
        .unwrap();

    assert_eq!(result.payload["content"][0]["text"], "ok");
    assert_eq!(
        plugin.received_methods().await,
        vec!["initialize", "initialize", "tools/call"]
    );
}

#[tokio::test]
async fn test_list_tools() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin
        .on("tools/list", rpc_result(json!({"tools": [{"name": "wp_get_posts"}]})))
        .await;
    let manager = connected(&plugin, Arc::new(CountingStore::new())).await;

    let result = manager.list_tools(&session("alice")).await.unwrap();

    assert_eq!(result.payload["tools"][0]["name"], "wp_get_posts");
}

#[tokio::test]
async fn test_call_tool_without_credential() {
    let plugin = MockPlugin::start().await;
    let manager = ConnectionManager::new(
        Arc::new(CountingStore::new()),
        Arc::new(HttpClientFactory::default()),
    );

    let err = manager
        .call_tool(&session("alice"), &ToolInvocation::new("wp_get_posts"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Unauthorized(_)));
    assert!(plugin.requests().await.is_empty());
}

#[tokio::test]
async fn test_tool_auth_rejection_requires_reconnect() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin.on_status("tools/call", 403).await;
    let store = Arc::new(CountingStore::new());
    let manager = connected(&plugin, store.clone()).await;

    let err = manager
        .call_tool(&session("alice"), &ToolInvocation::new("wp_get_posts"))
        .await
        .unwrap_err();

    assert_eq!(err, BridgeError::Auth { status: 403 });
    assert_eq!(store.peek(&session("alice")).await, None);

    let err = manager.meta(&session("alice")).await.unwrap_err();
    assert!(matches!(err, BridgeError::Unauthorized(_)));
}

#[tokio::test]
async fn test_tool_rpc_error_keeps_credential() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin
        .on("tools/call", tests::plugin::rpc_error(-32602, "Unknown tool"))
        .await;
    let store = Arc::new(CountingStore::new());
    let manager = connected(&plugin, store.clone()).await;

    let err = manager
        .call_tool(&session("alice"), &ToolInvocation::new("wp_nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Protocol(msg) if msg.contains("Unknown tool")));
    assert!(store.peek(&session("alice")).await.is_some());
}

#[tokio::test]
async fn test_outdated_plugin_blocks_tool_calls() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    let store = Arc::new(CountingStore::new());
    let manager = connected(&plugin, store.clone()).await;

    plugin.server.reset().await;
    plugin.with_version("0.0.1").await;

    let err = manager
        .call_tool(&session("alice"), &ToolInvocation::new("wp_get_posts"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::IncompatibleVersion { .. }));
    assert_eq!(plugin.received_methods().await, vec!["initialize"]);
    assert!(store.peek(&session("alice")).await.is_some());
}

#[tokio::test]
async fn test_write_mode_changes_outgoing_header() {
    let plugin = MockPlugin::start().await;
    plugin.with_version("0.2.0").await;
    plugin.on("tools/list", rpc_result(json!({"tools": []}))).await;
    let store = Arc::new(CountingStore::new());
    let manager = connected(&plugin, store.clone()).await;
    let alice = session("alice");

    assert!(manager.set_write_mode(&alice, true).await.unwrap());
    assert!(store.peek(&alice).await.unwrap().write_mode_enabled);

    plugin.server.reset().await;
    plugin.with_version("0.2.0").await;
    plugin.on("tools/list", rpc_result(json!({"tools": []}))).await;
    manager.list_tools(&alice).await.unwrap();

    assert_eq!(
        write_mode_headers(&plugin.requests().await),
        vec!["enabled", "enabled"]
    );

    assert!(!manager.set_write_mode(&alice, false).await.unwrap());
    let credential = store.peek(&alice).await.unwrap();
    assert!(!credential.write_mode_enabled);
    assert_eq!(credential.token, "t1");
}

#[tokio::test]
async fn test_write_mode_requires_connection() {
    let manager = ConnectionManager::new(
        Arc::new(CountingStore::new()),
        Arc::new(HttpClientFactory::default()),
    );

    let err = manager.set_write_mode(&session("alice"), true).await.unwrap_err();

    assert!(matches!(err, BridgeError::Unauthorized(_)));
}
