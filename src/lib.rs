//! Schema Compiler
//!
//! Build-time generation for JSON Schema configuration documents. Two
//! independent generators run over the same static list of schema files:
//!
//! - **Type compiler**: all schemas compiled together into one Rust source
//!   file of serde types (`schema.rs`)
//! - **String embedding**: each schema's raw text as a `pub const` in its own
//!   file (`<stem>_stringdata.rs`), for runtime validation
//!
//! ## Architecture
//!
//! ```text
//! *.schema.json ─┬─> lower ─> graph (box cycles) ─> codegen::rust ─> schema.rs
//!                └─> stringdata ──────────────────────────────────> site_stringdata.rs, ...
//! ```
//!
//! Output is reproducible: unchanged inputs give byte-identical files, and
//! [`Generator::check`] reports any generated file that has drifted.

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod error;
pub mod graph;
pub mod lower;
pub mod model;
pub mod names;
pub mod pipeline;
pub mod schema;
pub mod stringdata;

pub use checksum::Checksum;
pub use codegen::{compile_documents, compile_files, CompileOptions, GeneratedOutput, MapType};
pub use config::{GenerateConfig, SchemaEntry};
pub use error::{CompileError, Result};
pub use pipeline::{CheckReport, Drift, GeneratedFile, Generator};
pub use schema::SchemaDocument;
