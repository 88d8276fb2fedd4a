// File: streamguard-common/src/models/mod.rs
pub mod platform;
pub mod guild;
pub mod observation;

pub use platform::Platform;
pub use guild::{GuildConfig, NotificationTarget};
pub use observation::{LiveStatus, Observation, ReleaseItem};
