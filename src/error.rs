//! Error types for the tabscope application

use thiserror::Error;

use tabscope_core::TabscopeError;

/// Errors that end the event loop or fail a command
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] TabscopeError),

    /// The user asked to stop and see the last error.
    #[error("aborted: {0}")]
    Aborted(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
