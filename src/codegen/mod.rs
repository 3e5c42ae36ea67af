//! Code Generation
//!
//! Compiles a set of schema documents into one Rust source file.
//!
//! Pipeline:
//! - `lower`: schema JSON -> `TypeSet` (all naming and classification)
//! - `graph`: recursion analysis, boxes by-value cycles
//! - `rust`: renders the `TypeSet`
//!
//! The emitter never reads raw schema JSON, only the type model.

pub mod rust;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checksum::Checksum;
use crate::error::{CompileError, Result};
use crate::graph::box_recursive;
use crate::lower::lower;
use crate::schema::{load_all, SchemaDocument};

// =============================================================================
// Options
// =============================================================================

/// Map type used for JSON objects without fixed properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    BTreeMap,
    HashMap,
}

impl MapType {
    /// Fully qualified path used in generated code
    pub fn path(self) -> &'static str {
        match self {
            MapType::BTreeMap => "std::collections::BTreeMap",
            MapType::HashMap => "std::collections::HashMap",
        }
    }
}

/// Knobs for the Rust emitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Turn schema `description`s into doc comments
    pub emit_docs: bool,
    pub map_type: MapType,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            emit_docs: true,
            map_type: MapType::BTreeMap,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Result of compiling a set of schemas
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Complete Rust source
    pub code: String,
    pub type_count: usize,
    /// Input file names in compile order
    pub sources: Vec<String>,
    /// Combined checksum of every input
    pub checksum: Checksum,
}

/// Compile already-loaded documents
pub fn compile_documents(docs: &[SchemaDocument], options: &CompileOptions) -> Result<GeneratedOutput> {
    if docs.is_empty() {
        return Err(CompileError::Config("no schema documents to compile".to_string()));
    }

    let mut types = lower(docs)?;
    let boxed = box_recursive(&mut types)?;

    let sources: Vec<String> = docs.iter().map(|d| d.file_name.clone()).collect();
    let checksum = Checksum::from_inputs(docs.iter().map(|d| (d.file_name.as_str(), d.text.as_str())));
    let code = rust::emit(&types, &sources, &checksum, options);

    info!(
        documents = docs.len(),
        types = types.len(),
        boxed,
        "compiled schemas"
    );

    Ok(GeneratedOutput {
        code,
        type_count: types.len(),
        sources,
        checksum,
    })
}

/// Load and compile schema files, in the order given
pub fn compile_files(paths: &[PathBuf], options: &CompileOptions) -> Result<GeneratedOutput> {
    let docs = load_all(paths)?;
    compile_documents(&docs, options)
}
