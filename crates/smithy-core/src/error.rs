use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmithyError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SmithyError {
    fn from(e: serde_json::Error) -> Self {
        SmithyError::SerializationError(e.to_string())
    }
}
