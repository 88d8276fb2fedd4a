// File: streamguard-core/src/platforms/twitch/client.rs

use std::sync::Arc;

use reqwest::{Client as ReqwestClient, Response, StatusCode};
use tracing::warn;

use crate::Error;
use crate::platforms::twitch::auth::TwitchTokenProvider;

pub const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// A small wrapper client for calling Helix endpoints with the app token.
///
/// The bearer token comes from the injected `TwitchTokenProvider`; a 401 drops
/// the cached token and retries the request once with a fresh one.
pub struct TwitchHelixClient {
    http: Arc<ReqwestClient>,
    tokens: Arc<TwitchTokenProvider>,
    base_url: String,
}

impl TwitchHelixClient {
    pub fn new(tokens: Arc<TwitchTokenProvider>) -> Self {
        Self {
            http: Arc::new(ReqwestClient::new()),
            tokens,
            base_url: HELIX_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn tokens(&self) -> &Arc<TwitchTokenProvider> {
        &self.tokens
    }

    pub fn client_id(&self) -> &str {
        self.tokens.client_id()
    }

    /// GET `{base}/{path}` with the given query, handling token expiry.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, Error> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let resp = self.send_once(&url, query).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!("Helix {} returned 401; refreshing app token and retrying", path);
        self.tokens.invalidate().await;
        self.send_once(&url, query).await
    }

    async fn send_once(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, Error> {
        let bearer = self.tokens.bearer_token().await?;
        self.http
            .get(url)
            .query(query)
            .header("Client-Id", self.client_id())
            .header("Authorization", format!("Bearer {}", bearer))
            .send()
            .await
            .map_err(|e| Error::StatusFetch(format!("Helix network error: {}", e)))
    }
}
