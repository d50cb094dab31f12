//! Error types for the value and expression engine.

use thiserror::Error;

use rhai::EvalAltResult;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("cannot convert '{value}' to {kind}")]
    Coerce { value: String, kind: &'static str },

    #[error("expression error: {0}")]
    Compile(String),

    #[error("Rhai error: {0}")]
    Rhai(
        #[from]
        #[source]
        Box<EvalAltResult>,
    ),

    #[error("cannot read {0}")]
    Lookup(String),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("regex column must be 'expr/search/replace', got '{0}'")]
    RegexSpec(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
