// File: streamguard-core/src/platforms/twitch/mod.rs

pub mod auth;
pub mod client;
pub mod requests;
pub mod status;

pub use auth::TwitchTokenProvider;
pub use client::TwitchHelixClient;
pub use status::TwitchStatusClient;
