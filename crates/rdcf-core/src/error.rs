use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdcfError {
    #[error("Invalid model input: {field} = {value}: {reason}")]
    InvalidModelInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    Overflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RdcfError {
    /// Shorthand for an `InvalidModelInput` carrying the offending value.
    pub fn invalid(field: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        RdcfError::InvalidModelInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for RdcfError {
    fn from(e: serde_json::Error) -> Self {
        RdcfError::SerializationError(e.to_string())
    }
}
