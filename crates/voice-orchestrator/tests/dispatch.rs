//! Agent dispatch client against an in-process fake of the server API.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use call_tools::LiveKitConfig;
use serde_json::{json, Value};
use voice_orchestrator::{AgentDispatchClient, CreateDispatchRequest, DispatchError};

/// (path, authorization header) of every request the fake received.
type Seen = Arc<Mutex<Vec<(String, String)>>>;

async fn deny(
    State(seen): State<Seen>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.lock().unwrap().push((uri.path().to_string(), auth));
    (
        StatusCode::FORBIDDEN,
        Json(json!({"code": "permission_denied", "msg": "no room admin"})),
    )
}

async fn client(seen: Seen) -> AgentDispatchClient {
    let app = Router::new()
        .route(
            "/twirp/livekit.AgentDispatchService/CreateDispatch",
            post(deny),
        )
        .route(
            "/twirp/livekit.AgentDispatchService/ListDispatch",
            post(deny),
        )
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    AgentDispatchClient::new(LiveKitConfig::new(
        format!("http://{}", addr),
        "APItestkey",
        "test-secret-with-enough-length-for-signing",
    ))
}

#[tokio::test]
async fn test_create_reaches_dispatch_service_with_token() {
    let seen = Seen::default();
    let client = client(seen.clone()).await;

    let result = client
        .create_dispatch(&CreateDispatchRequest::default())
        .await;
    assert!(matches!(result, Err(DispatchError::Service(_))));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/twirp/livekit.AgentDispatchService/CreateDispatch");
    assert!(seen[0].1.starts_with("Bearer "));
    assert_eq!(seen[0].1.split('.').count(), 3);
}

#[tokio::test]
async fn test_list_reaches_dispatch_service() {
    let seen = Seen::default();
    let client = client(seen.clone()).await;

    let result = client.list_dispatches("voice-assistant-room").await;
    assert!(matches!(result, Err(DispatchError::Service(_))));
    assert_eq!(
        seen.lock().unwrap()[0].0,
        "/twirp/livekit.AgentDispatchService/ListDispatch"
    );
}

#[tokio::test]
async fn test_unconfigured_client_sends_nothing() {
    let client = AgentDispatchClient::new(LiveKitConfig::default());
    let result = client
        .create_dispatch(&CreateDispatchRequest::default())
        .await;
    assert!(matches!(result, Err(DispatchError::Configuration(_))));
}
