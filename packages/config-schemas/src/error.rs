//! Error types for the configuration schemas

use std::fmt;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// One failed schema constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value (`""` for the document root)
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() { "/" } else { &self.instance_path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Configuration schema errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Embedded schema {schema} does not compile: {reason}")]
    InvalidSchema { schema: &'static str, reason: String },

    #[error("{schema}: {} violation(s), first: {}", violations.len(), violations.first().map(ToString::to_string).unwrap_or_default())]
    Validation {
        schema: &'static str,
        violations: Vec<Violation>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
