use thiserror::Error;

/// Error types for scanning and attack operations
#[derive(Error, Debug)]
pub enum CamscoutError {
    #[error("No stream found")]
    NoStreams,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dictionary Error: {0}")]
    Dictionary(String),

    #[error("RTSP Error: {0}")]
    Rtsp(String),

    #[error("SDP Error: {0}")]
    Sdp(String),

    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL Error: {0}")]
    Url(#[from] url::ParseError),
}
