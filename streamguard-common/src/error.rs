// ================================================================
// File: streamguard-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Platform access token could not be obtained. Fatal for that platform's monitor.
    #[error("Credential error: {0}")]
    Credential(String),

    /// One entity's status could not be fetched this tick.
    #[error("Status fetch error: {0}")]
    StatusFetch(String),

    /// A notification could not be delivered.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Guild has no usable notification destination for a platform.
    #[error("Config lookup error: {0}")]
    ConfigLookup(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}
