//! Schema documents
//!
//! A [`SchemaDocument`] is one `.schema.json` file: its raw text (kept
//! verbatim for embedding) and its parsed JSON value (used for compiling).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::checksum::Checksum;
use crate::error::{CompileError, Result};

/// File suffix every schema document carries
pub const SCHEMA_SUFFIX: &str = ".schema.json";

/// A loaded JSON Schema document
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    /// File name used in `$ref`s between documents (e.g. `site.schema.json`)
    pub file_name: String,
    /// Where the document was read from (file name only for in-memory documents)
    pub path: PathBuf,
    /// Raw file text, byte-for-byte
    pub text: String,
    /// Parsed document
    pub value: Value,
}

impl SchemaDocument {
    /// Load a schema document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::parse(file_name, path.to_path_buf(), text)
    }

    /// Build a document from in-memory text
    pub fn from_text(file_name: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let file_name = file_name.into();
        let path = PathBuf::from(&file_name);
        Self::parse(file_name, path, text.into())
    }

    fn parse(file_name: String, path: PathBuf, text: String) -> Result<Self> {
        let value: Value = serde_json::from_str(&text).map_err(|source| CompileError::Json {
            path: path.clone(),
            source,
        })?;

        if !value.is_object() {
            return Err(CompileError::InvalidSchema {
                file: file_name,
                reason: "document root must be a JSON object".to_string(),
            });
        }

        Ok(Self {
            file_name,
            path,
            text,
            value,
        })
    }

    /// File name without the `.schema.json` (or `.json`) suffix
    pub fn stem(&self) -> &str {
        let name = self.file_name.as_str();
        name.strip_suffix(SCHEMA_SUFFIX)
            .or_else(|| name.strip_suffix(".json"))
            .unwrap_or(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.value.get("title").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.value.get("$id").and_then(Value::as_str)
    }

    /// Named sub-schemas under `definitions` and `$defs`, in document order
    pub fn definitions(&self) -> Vec<(&str, &str, &Value)> {
        let mut defs = Vec::new();
        for section in ["definitions", "$defs"] {
            if let Some(map) = self.value.get(section).and_then(Value::as_object) {
                for (name, schema) in map {
                    defs.push((section, name.as_str(), schema));
                }
            }
        }
        defs
    }

    /// Look up a definition by section and name
    pub fn definition(&self, section: &str, name: &str) -> Option<&Value> {
        self.value
            .get(section)
            .and_then(Value::as_object)
            .and_then(|m: &Map<String, Value>| m.get(name))
    }

    /// Checksum of the raw text
    pub fn checksum(&self) -> Checksum {
        Checksum::from_str(&self.text)
    }
}

/// Find every `*.schema.json` file under `dir`, sorted by path
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            let message = e.to_string();
            // Only filesystem loops come without an underlying io::Error
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
            CompileError::io(path, source)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_schema = entry
            .file_name()
            .to_str()
            .map(|n| n.ends_with(SCHEMA_SUFFIX))
            .unwrap_or(false);
        if is_schema {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load several documents, keeping their order
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<SchemaDocument>> {
    paths.iter().map(|p| SchemaDocument::load(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_and_accessors() {
        let doc = SchemaDocument::from_text(
            "github.schema.json",
            r#"{"title": "GitHubConnection", "definitions": {"A": {"type": "string"}}, "$defs": {"B": {}}}"#,
        )
        .unwrap();
        assert_eq!(doc.stem(), "github");
        assert_eq!(doc.title(), Some("GitHubConnection"));
        let names: Vec<_> = doc.definitions().into_iter().map(|(s, n, _)| (s, n)).collect();
        assert_eq!(names, vec![("definitions", "A"), ("$defs", "B")]);
        assert!(doc.definition("definitions", "A").is_some());
        assert!(doc.definition("definitions", "B").is_none());
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = SchemaDocument::from_text("x.schema.json", "[1, 2]").unwrap_err();
        assert!(matches!(err, CompileError::InvalidSchema { .. }));
    }

    #[test]
    fn test_malformed_json_names_file() {
        let err = SchemaDocument::from_text("broken.schema.json", "{").unwrap_err();
        assert!(err.to_string().contains("broken.schema.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = SchemaDocument::load(Path::new("/nonexistent/site.schema.json")).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }

    #[test]
    fn test_discover_keeps_io_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("schemas");
        match discover(&missing).unwrap_err() {
            CompileError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_text_kept_verbatim() {
        let text = "{\n  \"title\": \"Settings\"\n}\n";
        let doc = SchemaDocument::from_text("settings.schema.json", text).unwrap();
        assert_eq!(doc.text, text);
    }
}
