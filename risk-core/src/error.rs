//! Error taxonomy for the risk engine

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Entity missing for this tenant. The message carries no entity detail,
    /// so a caller cannot tell "wrong tenant" from "does not exist".
    #[error("entity not found")]
    NotFound,

    /// Malformed rule configuration or malformed job payload
    #[error("validation failed: {0}")]
    Validation(String),

    /// A detector input fetch or downstream dispatch failed. Caught at the
    /// signal boundary and defaulted; never surfaced by the evaluators.
    #[error("transient dependency failure: {0}")]
    TransientDependency(String),

    /// A required core input is unusable; no meaningful score can be computed
    #[error("fatal data error: {0}")]
    FatalData(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_reveals_nothing() {
        let err = Error::NotFound;
        assert_eq!(err.to_string(), "entity not found");
    }
}
