// File: streamguard-core/src/platforms/youtube/mod.rs

pub mod releases;
pub mod status;

pub use status::YouTubeStatusClient;
