//! Error types for SocialFlow

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SocialFlowError>;

#[derive(Error, Debug)]
pub enum SocialFlowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The action is disabled in the current state (e.g. no target platforms)
    #[error("Action blocked: {0}")]
    ValidationBlocked(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SocialFlowError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SocialFlowError::InvalidInput(_) => 3,
            SocialFlowError::ValidationBlocked(_) => 3,
            SocialFlowError::Generation(GenerationError::CredentialInvalid(_)) => 2,
            SocialFlowError::Generation(GenerationError::MissingApiKey) => 2,
            SocialFlowError::Generation(_) => 1,
            SocialFlowError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures reported by the generative service collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The service answered but produced nothing usable
    #[error("Generation failed: {0}")]
    Failed(String),

    /// The credential was rejected and must be re-selected before retrying
    #[error("Credential invalid: {0}")]
    CredentialInvalid(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No API key configured for the generative service")]
    MissingApiKey,
}
