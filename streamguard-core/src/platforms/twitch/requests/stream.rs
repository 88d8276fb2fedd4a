// ========================================================
// File: streamguard-core/src/platforms/twitch/requests/stream.rs
// ========================================================
use serde::Deserialize;
use tracing::debug;

use streamguard_common::models::observation::{LiveStatus, Observation};

use crate::Error;
use crate::platforms::twitch::client::TwitchHelixClient;

/// Response from "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single stream data record.
#[derive(Debug, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub type_field: String, // e.g., "live"
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: u32,
    #[serde(default)]
    pub started_at: String,
}

pub fn channel_url(login: &str) -> String {
    format!("https://www.twitch.tv/{}", login)
}

/// Turns a "Get Streams" response for `login` into an observation.
pub fn observation_from_streams(login: &str, streams: StreamsResponse) -> Observation {
    let Some(stream) = streams.data.into_iter().next() else {
        return Observation::Offline;
    };

    let display_name = if stream.user_name.is_empty() {
        login.to_string()
    } else {
        stream.user_name
    };

    Observation::Live(LiveStatus {
        display_name,
        title: Some(stream.title).filter(|t| !t.is_empty()),
        category: Some(stream.game_name).filter(|g| !g.is_empty()),
        url: channel_url(login),
        items: Vec::new(),
    })
}

/// Calls "Get Streams" for a single login.
pub async fn fetch_stream_status(
    client: &TwitchHelixClient,
    twitch_name: &str,
) -> Result<Observation, Error> {
    let streams_resp = client
        .get("streams", &[("user_login", twitch_name)])
        .await?;

    if !streams_resp.status().is_success() {
        let status = streams_resp.status();
        let body_text = streams_resp.text().await.unwrap_or_default();
        return Err(Error::StatusFetch(format!(
            "fetch_stream_status({}): HTTP {} => {}",
            twitch_name, status, body_text
        )));
    }

    let streams_body = streams_resp
        .text()
        .await
        .map_err(|e| Error::StatusFetch(format!("fetch_stream_status body error: {}", e)))?;
    let streams_data: StreamsResponse = serde_json::from_str(&streams_body)
        .map_err(|e| Error::StatusFetch(format!("fetch_stream_status parse error: {}", e)))?;

    let observation = observation_from_streams(twitch_name, streams_data);
    debug!("Twitch status for '{}': live={}", twitch_name, observation.is_live());
    Ok(observation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_stream_maps_title_and_game() {
        let body = r#"{
            "data": [{
                "id": "4123",
                "user_id": "1",
                "user_login": "alice",
                "user_name": "Alice",
                "game_id": "509658",
                "game_name": "Just Chatting",
                "type": "live",
                "title": "hello chat",
                "viewer_count": 42,
                "started_at": "2024-01-01T00:00:00Z",
                "language": "en",
                "thumbnail_url": "",
                "tag_ids": []
            }],
            "pagination": {}
        }"#;
        let parsed: StreamsResponse = serde_json::from_str(body).unwrap();
        match observation_from_streams("alice", parsed) {
            Observation::Live(live) => {
                assert_eq!(live.display_name, "Alice");
                assert_eq!(live.title.as_deref(), Some("hello chat"));
                assert_eq!(live.category.as_deref(), Some("Just Chatting"));
                assert_eq!(live.url, "https://www.twitch.tv/alice");
            }
            Observation::Offline => panic!("expected live"),
        }
    }

    #[test]
    fn empty_data_is_offline() {
        let parsed: StreamsResponse = serde_json::from_str(r#"{"data":[],"pagination":{}}"#).unwrap();
        assert_eq!(observation_from_streams("bob", parsed), Observation::Offline);
    }

    #[test]
    fn blank_game_is_dropped() {
        let body = r#"{"data":[{"id":"1","user_login":"bob","user_name":"","game_name":"","title":""}]}"#;
        let parsed: StreamsResponse = serde_json::from_str(body).unwrap();
        let Observation::Live(live) = observation_from_streams("bob", parsed) else {
            panic!("expected live");
        };
        assert_eq!(live.display_name, "bob");
        assert!(live.title.is_none());
        assert!(live.category.is_none());
    }
}
