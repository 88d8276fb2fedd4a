use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use streamguard_common::models::observation::Observation;
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::platform_traits::StatusClient;

use crate::Error;
use crate::platforms::twitch::auth::TwitchTokenProvider;
use crate::platforms::twitch::client::TwitchHelixClient;
use crate::platforms::twitch::requests::stream::fetch_stream_status;

/// Live-status source for the Twitch monitor.
pub struct TwitchStatusClient {
    helix: TwitchHelixClient,
}

impl TwitchStatusClient {
    pub fn new(helix: TwitchHelixClient) -> Self {
        Self { helix }
    }

    pub fn helix(&self) -> &TwitchHelixClient {
        &self.helix
    }
}

#[async_trait]
impl StatusClient for TwitchStatusClient {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    async fn prepare(&self) -> Result<(), Error> {
        self.helix.tokens().acquire().await?;
        info!("Twitch status client ready (client_id={})", self.helix.client_id());
        Ok(())
    }

    async fn get_status(&self, entity_name: &str) -> Result<Observation, Error> {
        fetch_stream_status(&self.helix, entity_name).await
    }
}

/// Convenience constructor used by the server binary.
pub fn twitch_status_client(client_id: &str, client_secret: &str) -> TwitchStatusClient {
    let tokens = Arc::new(TwitchTokenProvider::new(client_id, client_secret));
    TwitchStatusClient::new(TwitchHelixClient::new(tokens))
}
