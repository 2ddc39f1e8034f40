use thiserror::Error;

use crate::{length::LengthParseError, provider::TranscriptError};

#[derive(Error, Debug)]
pub enum YttsError {
    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Invalid value for {env_var}: {reason}")]
    InvalidConfig { env_var: String, reason: String },

    #[error(transparent)]
    LengthFilter(#[from] LengthParseError),

    #[error("Invalid video count: {input:?}")]
    InvalidMaximum { input: String },

    #[error("Cannot resolve channel identifier: {input}")]
    ChannelNotFound { input: String },

    #[error("Cannot find playlist id in: {input}")]
    PlaylistNotFound { input: String },

    #[error("Video not found: {id}")]
    VideoNotFound { id: String },

    #[error("YouTube API returned {status}: {message}")]
    ApiStatus { status: u16, message: String },

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, YttsError>;
