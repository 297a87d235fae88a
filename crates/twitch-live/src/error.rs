use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("streamer not found: {channel}")]
    StreamerNotFound { channel: String },

    #[error("streamer is offline: {channel}")]
    Offline { channel: String },

    #[error("no streams found for {channel}")]
    NoStreamsFound { channel: String },

    #[error("cannot select a variant from an empty catalog")]
    EmptyCatalog,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for transcoder: {0}")]
    Wait(#[source] std::io::Error),
}

impl Error {
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Terminal conditions that are a normal answer from the platform rather
    /// than a failure: the channel does not exist, is offline, or has nothing
    /// to offer.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::StreamerNotFound { .. } | Self::Offline { .. } | Self::NoStreamsFound { .. }
        )
    }
}
