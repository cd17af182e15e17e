use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelcutError {
    #[error("Invalid transcript: {0}")]
    Transcript(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Usage budget exhausted: {0}")]
    BudgetExhausted(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Media tool failed: {0}")]
    MediaTool(String),

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

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ReelcutError {
    /// Whether this error came from the embedding collaborator rather than
    /// from local input or configuration.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            ReelcutError::Embedding(_)
                | ReelcutError::Api(_)
                | ReelcutError::BudgetExhausted(_)
                | ReelcutError::Timeout(_)
                | ReelcutError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReelcutError>;
