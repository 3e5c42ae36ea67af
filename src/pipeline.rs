//! Generation pipeline
//!
//! Runs the two generators over a manifest:
//! 1. every listed schema compiled together into one types file
//! 2. one stringdata file per schema, in manifest order
//!
//! `plan` builds everything in memory, `write` puts it on disk and `check`
//! reports any on-disk file that differs from what would be generated.

use std::fs;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tracing::{debug, info, warn};

use crate::codegen::compile_documents;
use crate::config::GenerateConfig;
use crate::error::{CompileError, Result};
use crate::schema::{load_all, SchemaDocument};
use crate::stringdata;

/// A generated file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name inside the output directory
    pub name: String,
    pub contents: String,
}

/// Difference between disk and generator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    Missing { name: String },
    Stale { name: String, diff: String },
}

impl Drift {
    pub fn name(&self) -> &str {
        match self {
            Drift::Missing { name } | Drift::Stale { name, .. } => name,
        }
    }
}

/// Result of [`Generator::check`]
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub checked: usize,
    pub drift: Vec<Drift>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty()
    }
}

/// Runs a manifest against a schema directory
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerateConfig,
    schema_dir: PathBuf,
}

impl Generator {
    pub fn new(config: GenerateConfig, schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            schema_dir: schema_dir.into(),
        }
    }

    /// Input paths in manifest order
    pub fn schema_paths(&self) -> Vec<PathBuf> {
        self.config
            .schemas
            .iter()
            .map(|entry| self.schema_dir.join(&entry.file))
            .collect()
    }

    pub fn load(&self) -> Result<Vec<SchemaDocument>> {
        load_all(&self.schema_paths())
    }

    /// Produce every output file in memory: types first, then stringdata
    pub fn plan(&self) -> Result<Vec<GeneratedFile>> {
        self.config.validate()?;
        let docs = self.load()?;

        let types = compile_documents(&docs, &self.config.compile_options())?;
        let mut files = Vec::with_capacity(docs.len() + 1);
        files.push(GeneratedFile {
            name: self.config.types.output.clone(),
            contents: types.code,
        });

        for (entry, doc) in self.config.schemas.iter().zip(&docs) {
            files.push(GeneratedFile {
                name: entry.stringdata_file(),
                contents: stringdata::generate(doc, &entry.const_name)?,
            });
        }

        debug!(files = files.len(), types = types.type_count, "planned generation");
        Ok(files)
    }

    /// Write every output into `out_dir`, creating it if needed.
    ///
    /// Files whose contents already match are left untouched.
    pub fn write(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let files = self.plan()?;
        fs::create_dir_all(out_dir).map_err(|e| CompileError::io(out_dir, e))?;

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let path = out_dir.join(&file.name);
            let unchanged = fs::read_to_string(&path)
                .map(|existing| existing == file.contents)
                .unwrap_or(false);
            if unchanged {
                debug!(path = %path.display(), "unchanged");
            } else {
                fs::write(&path, &file.contents).map_err(|e| CompileError::io(&path, e))?;
                debug!(path = %path.display(), "wrote");
            }
            written.push(path);
        }

        info!(out_dir = %out_dir.display(), files = written.len(), "generation complete");
        Ok(written)
    }

    /// Compare `out_dir` against what would be generated, byte for byte
    pub fn check(&self, out_dir: &Path) -> Result<CheckReport> {
        let files = self.plan()?;
        let mut report = CheckReport {
            checked: files.len(),
            drift: Vec::new(),
        };

        for file in files {
            let path = out_dir.join(&file.name);
            let existing = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(file = %file.name, "missing generated file");
                    report.drift.push(Drift::Missing { name: file.name });
                    continue;
                }
                Err(e) => return Err(CompileError::io(&path, e)),
            };

            if existing != file.contents {
                let diff = TextDiff::from_lines(&existing, &file.contents)
                    .unified_diff()
                    .context_radius(3)
                    .header(&format!("{} (on disk)", file.name), &format!("{} (generated)", file.name))
                    .to_string();
                warn!(file = %file.name, "stale generated file");
                report.drift.push(Drift::Stale { name: file.name, diff });
            }
        }

        Ok(report)
    }
}
