// File: streamguard-core/src/platforms/mod.rs

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Connecting,
    Error(String),
}

pub mod discord;
pub mod twitch;
pub mod youtube;
