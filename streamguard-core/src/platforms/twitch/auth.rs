// File: streamguard-core/src/platforms/twitch/auth.rs
//
// App access token (client-credentials grant) for Helix polling.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Error;

pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Refresh once the token has less than this much life left.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Matches Twitch's JSON from the token endpoint
#[derive(Debug, Deserialize)]
pub struct TwitchTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String, // e.g. "bearer"
}

#[derive(Debug, Clone)]
pub struct AppAccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AppAccessToken {
    pub fn from_response(resp: TwitchTokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: resp.access_token,
            expires_at: now + Duration::seconds(resp.expires_in as i64),
        }
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

/// Owns the Twitch app credential and hands out bearer tokens.
///
/// Built once in `main` and injected into the Helix client; nothing else reads
/// `CLIENT_ID` / `CLIENT_SECRET`.
pub struct TwitchTokenProvider {
    http: ReqwestClient,
    client_id: String,
    client_secret: String,
    token_url: String,
    current: Mutex<Option<AppAccessToken>>,
}

impl TwitchTokenProvider {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            http: ReqwestClient::new(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: TWITCH_TOKEN_URL.to_string(),
            current: Mutex::new(None),
        }
    }

    /// Point the provider at a different token endpoint.
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Fetches a fresh token unconditionally. Used at monitor startup, where a
    /// failure is fatal.
    pub async fn acquire(&self) -> Result<String, Error> {
        let mut guard = self.current.lock().await;
        let token = self.request_token().await?;
        let bearer = token.access_token.clone();
        info!("Obtained Twitch app access token (expires_at={})", token.expires_at);
        *guard = Some(token);
        Ok(bearer)
    }

    /// Returns the cached token, refreshing it first when it is missing or
    /// close to expiry.
    pub async fn bearer_token(&self) -> Result<String, Error> {
        let mut guard = self.current.lock().await;
        if let Some(tok) = guard.as_ref() {
            if !tok.needs_refresh(Utc::now()) {
                return Ok(tok.access_token.clone());
            }
            warn!("Twitch app token expires at {} – refreshing…", tok.expires_at);
        }

        let token = self.request_token().await?;
        let bearer = token.access_token.clone();
        debug!("Twitch app token refreshed; new expiry {}", token.expires_at);
        *guard = Some(token);
        Ok(bearer)
    }

    /// Drops the cached token so the next call fetches a new one (e.g. after a 401).
    pub async fn invalidate(&self) {
        let mut guard = self.current.lock().await;
        if guard.take().is_some() {
            warn!("Twitch app token invalidated");
        }
    }

    async fn request_token(&self) -> Result<AppAccessToken, Error> {
        let params = [
            ("client_id",     self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type",    "client_credentials"),
        ];

        let resp = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Credential(format!("HTTP error requesting app token: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(Error::Credential(format!(
                "Twitch token endpoint: HTTP {} => {}",
                status, body_text
            )));
        }

        let body = resp
            .json::<TwitchTokenResponse>()
            .await
            .map_err(|e| Error::Credential(format!("Parse error on token JSON: {e}")))?;

        Ok(AppAccessToken::from_response(body, Utc::now()))
    }
}
