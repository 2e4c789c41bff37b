//! Error types for Guessify.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuessError {
    #[error("Catalog data error: {0}")]
    Data(String),

    #[error("Model has not been trained yet")]
    NotReady,

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, GuessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GuessError::Data("no name column".to_string());
        assert_eq!(err.to_string(), "Catalog data error: no name column");
        assert_eq!(GuessError::NotReady.to_string(), "Model has not been trained yet");
    }
}
