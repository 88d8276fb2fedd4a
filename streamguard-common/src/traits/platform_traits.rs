use async_trait::async_trait;

use crate::error::Error;
use crate::models::observation::Observation;
use crate::models::platform::Platform;

/// Reports the current state of one streamer / channel on a platform.
#[async_trait]
pub trait StatusClient: Send + Sync {
    fn platform(&self) -> Platform;

    /// Runs once before the first poll. A failure here is fatal for the
    /// monitor that owns this client and should be an `Error::Credential`.
    async fn prepare(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Called at the start of every tick, before any `get_status`.
    fn begin_tick(&self) {}

    async fn get_status(&self, entity_name: &str) -> Result<Observation, Error>;
}

/// Delivers a formatted message to a destination channel.
///
/// `destination` and `mention` are opaque ids; only the implementation knows
/// how to resolve them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, destination: &str, message: &str, mention: Option<&str>) -> Result<(), Error>;
}
