//! Runtime validation against the embedded schemas
//!
//! Each schema is compiled on first use and cached for the life of the
//! process.

use std::sync::OnceLock;

use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError, Violation};
use crate::SchemaKind;

type Compiled = std::result::Result<JSONSchema, String>;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY: OnceLock<Compiled> = OnceLock::new();
static COMPILED: [OnceLock<Compiled>; 9] = [EMPTY; 9];

fn compile(kind: SchemaKind) -> Compiled {
    let schema: Value = serde_json::from_str(kind.schema_json()).map_err(|e| e.to_string())?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| e.to_string())?;
    debug!(schema = kind.file_name(), "compiled schema");
    Ok(compiled)
}

fn compiled(kind: SchemaKind) -> Result<&'static JSONSchema> {
    COMPILED[kind.index()]
        .get_or_init(|| compile(kind))
        .as_ref()
        .map_err(|reason| SchemaError::InvalidSchema {
            schema: kind.file_name(),
            reason: reason.clone(),
        })
}

/// Validate `instance` against a schema, collecting every violation
pub fn validate(kind: SchemaKind, instance: &Value) -> Result<()> {
    let schema = compiled(kind)?;
    let result = schema.validate(instance);

    if let Err(errors) = result {
        let violations: Vec<Violation> = errors
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        debug!(schema = kind.file_name(), violations = violations.len(), "validation failed");
        return Err(SchemaError::Validation {
            schema: kind.file_name(),
            violations,
        });
    }

    Ok(())
}

/// Parse JSON text, validate it, then deserialize into `T`
pub fn parse<T: DeserializeOwned>(kind: SchemaKind, text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text)?;
    validate(kind, &value)?;
    Ok(serde_json::from_value(value)?)
}
