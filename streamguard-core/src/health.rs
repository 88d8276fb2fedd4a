// File: streamguard-core/src/health.rs
//
// Tiny HTTP endpoint that lets a hosting platform see the bot is alive.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use axum_server::{Handle, Server};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use streamguard_common::models::platform::Platform;

use crate::tasks::notified_state::NotifiedState;

pub const DEFAULT_HEALTH_PORT: u16 = 5000;

#[derive(Clone)]
pub struct HealthState {
    pub started: Instant,
    pub notified: Arc<NotifiedState>,
}

impl HealthState {
    pub fn new(notified: Arc<NotifiedState>) -> Self {
        Self {
            started: Instant::now(),
            notified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LiveCounts {
    pub twitch: usize,
    pub youtube: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub live: LiveCounts,
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn root() -> &'static str {
    "Discord Bot is Running!"
}

async fn health(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        uptime_secs: state.started.elapsed().as_secs(),
        live: LiveCounts {
            twitch: state.notified.count(Platform::Twitch),
            youtube: state.notified.count(Platform::YouTube),
        },
    })
}

/// Binds `0.0.0.0:{port}` and serves in the background. Call
/// `graceful_shutdown` on the returned handle to stop it.
pub fn start_health_server(port: u16, state: HealthState) -> Handle {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = health_router(state);

    let handle = Handle::new();
    let server = Server::bind(addr)
        .handle(handle.clone())
        .serve(app.into_make_service());

    info!("Health server listening on http://{}", addr);
    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Health server error: {}", e);
        }
        info!("Health server shut down.");
    });

    handle
}
