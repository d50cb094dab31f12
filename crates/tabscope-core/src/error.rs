//! Error types for the sheet model and storage.

use thiserror::Error;

use tabscope_engine::EngineError;

#[derive(Error, Debug)]
pub enum TabscopeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// Structural errors reported to the user as-is.
    #[error("{0}")]
    User(String),

    #[error("readonly mode")]
    ReadOnly,

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option {name}")]
    OptionValue { name: String, value: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl TabscopeError {
    pub fn user(msg: impl Into<String>) -> Self {
        TabscopeError::User(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TabscopeError>;
