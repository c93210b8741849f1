use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediacutError {
    #[error("Malformed time code: {0}")]
    TimecodeParse(String),

    #[error("No JSON array found in model response: {0}")]
    ResponseFormat(String),

    #[error("Segment index {index} out of range (store has {len} segments)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Alignment failed: {0}")]
    Alignment(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Media engine error: {0}")]
    Media(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MediacutError>;
