// File: streamguard-core/tests/twitch_client_tests.rs
//
// Runs the Helix client against a local axum stand-in for Twitch.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;

use streamguard_common::models::observation::Observation;
use streamguard_common::traits::platform_traits::StatusClient;
use streamguard_core::Error;
use streamguard_core::platforms::twitch::{TwitchHelixClient, TwitchStatusClient, TwitchTokenProvider};

#[derive(Clone, Default)]
struct FakeTwitch {
    tokens_issued: Arc<AtomicUsize>,
    stream_calls: Arc<AtomicUsize>,
}

async fn issue_token(State(state): State<FakeTwitch>) -> impl IntoResponse {
    let n = state.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    axum::Json(json!({
        "access_token": format!("token-{n}"),
        "expires_in": 3600,
        "token_type": "bearer"
    }))
}

/// The first token is treated as revoked.
async fn streams(State(state): State<FakeTwitch>, headers: HeaderMap) -> impl IntoResponse {
    state.stream_calls.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth == "Bearer token-1" {
        return (StatusCode::UNAUTHORIZED, axum::Json(json!({"message": "Invalid OAuth token"})));
    }
    (
        StatusCode::OK,
        axum::Json(json!({
            "data": [{
                "id": "1",
                "user_login": "alice",
                "user_name": "Alice",
                "game_name": "Just Chatting",
                "type": "live",
                "title": "hello"
            }]
        })),
    )
}

async fn spawn_fake_twitch() -> (SocketAddr, FakeTwitch) {
    let state = FakeTwitch::default();
    let app = Router::new()
        .route("/oauth2/token", post(issue_token))
        .route("/helix/streams", get(streams))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn status_client(addr: SocketAddr) -> TwitchStatusClient {
    let tokens = Arc::new(
        TwitchTokenProvider::new("client", "secret")
            .with_token_url(&format!("http://{addr}/oauth2/token")),
    );
    TwitchStatusClient::new(
        TwitchHelixClient::new(tokens).with_base_url(&format!("http://{addr}/helix")),
    )
}

#[tokio::test]
async fn unauthorized_response_refreshes_token_once() -> Result<(), Error> {
    let (addr, fake) = spawn_fake_twitch().await;
    let client = status_client(addr);

    client.prepare().await?;
    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 1);

    let obs = client.get_status("alice").await?;
    let Observation::Live(live) = obs else { panic!("expected live observation") };
    assert_eq!(live.display_name, "Alice");
    assert_eq!(live.title.as_deref(), Some("hello"));
    assert_eq!(live.category.as_deref(), Some("Just Chatting"));
    assert_eq!(live.url, "https://www.twitch.tv/alice");

    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 2);
    assert_eq!(fake.stream_calls.load(Ordering::SeqCst), 2);

    // The refreshed token is reused.
    client.get_status("alice").await?;
    assert_eq!(fake.tokens_issued.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn rejected_credentials_fail_prepare() {
    let app = Router::new().route(
        "/oauth2/token",
        post(|| async { (StatusCode::BAD_REQUEST, "invalid client secret") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let err = status_client(addr).prepare().await.unwrap_err();
    assert!(matches!(err, Error::Credential(_)), "got {err:?}");
}
