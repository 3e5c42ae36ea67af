//! Error types for the schema compiler

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Schema compiler errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema {file}: {reason}")]
    InvalidSchema { file: String, reason: String },

    #[error("unresolved $ref {reference:?} in {location}")]
    UnresolvedRef { reference: String, location: String },

    #[error("type name {name} is defined by both {first} and {second}")]
    DuplicateType {
        name: String,
        first: String,
        second: String,
    },

    #[error("type aliases form a cycle: {}", members.join(" -> "))]
    AliasCycle { members: Vec<String> },

    #[error("invalid identifier {0:?}: expected SCREAMING_SNAKE_CASE")]
    InvalidIdentifier(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration error: {0}")]
    ConfigSource(#[from] config_crate::ConfigError),
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
