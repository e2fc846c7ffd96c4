use std::fmt;

use thiserror::Error;

/// Errors produced when parsing catalog text.
#[derive(Debug)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Failure to load a rule-group catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("duplicate group name '{name}'")]
    DuplicateGroup { name: String },

    #[error("group '{name}' lists no tools")]
    EmptyGroup { name: String },
}
