use thiserror::Error;

use crate::catalog::{CatalogError, ParseError};
use crate::{CheckError, SourceError};

/// Unified error type covering catalog loading, upstream lookups and checks.
///
/// Every layer keeps its own error; this one exists for callers that drive
/// several layers and want a single `?` target.
#[derive(Debug, Error)]
pub enum RuncardError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(input: &str) -> Result<usize, RuncardError> {
        let catalog = crate::RuleCatalog::from_dsl(input)?;
        Ok(catalog.len())
    }

    #[test]
    fn catalog_errors_convert() {
        let err = load("group A:\n  tools: T1\ngroup A:\n  tools: T1").unwrap_err();
        assert_eq!(err.to_string(), "duplicate group name 'A'");
    }

    #[test]
    fn source_errors_convert() {
        let err: RuncardError = SourceError::unavailable("runcard", "timeout").into();
        assert_eq!(err.to_string(), "runcard lookup failed: timeout");
    }
}
