//! Generation manifest
//!
//! Lists which schemas get compiled and embedded, and how. Loaded from:
//! - Default values (the nine configuration schemas)
//! - Config file (`schemas.toml`)
//! - Environment variables (`SCHEMA_COMPILER__*`)
//!
//! ## Example manifest (schemas.toml):
//! ```toml
//! [types]
//! output = "schema.rs"
//! emit_docs = true
//! map_type = "btreemap"
//!
//! [[schemas]]
//! file = "site.schema.json"
//! const_name = "SITE_SCHEMA_JSON"
//!
//! [[schemas]]
//! file = "github.schema.json"
//! const_name = "GITHUB_SCHEMA_JSON"
//! stringdata_output = "github_stringdata.rs"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::codegen::{CompileOptions, MapType};
use crate::error::{CompileError, Result};
use crate::names::validate_const_name;
use crate::schema::SCHEMA_SUFFIX;

/// Manifest file name looked up in default locations
pub const MANIFEST_FILE: &str = "schemas.toml";

/// Prefix for environment overrides, e.g. `SCHEMA_COMPILER__TYPES__EMIT_DOCS=false`
pub const ENV_PREFIX: &str = "SCHEMA_COMPILER";

/// What to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Type compiler settings
    #[serde(default)]
    pub types: TypesConfig,

    /// Schemas to compile and embed, in order
    #[serde(default = "default_schemas")]
    pub schemas: Vec<SchemaEntry>,
}

/// Type compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypesConfig {
    /// File name of the generated types
    #[serde(default = "default_types_output")]
    pub output: String,

    #[serde(default = "default_true")]
    pub emit_docs: bool,

    #[serde(default)]
    pub map_type: MapType,
}

/// One schema file and its embedded constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Schema file name, relative to the schema directory
    pub file: String,

    /// Name of the generated string constant
    pub const_name: String,

    /// Override for the stringdata file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stringdata_output: Option<String>,
}

impl SchemaEntry {
    pub fn new(file: &str, const_name: &str) -> Self {
        Self {
            file: file.to_string(),
            const_name: const_name.to_string(),
            stringdata_output: None,
        }
    }

    /// Where the embedded text goes: `<stem>_stringdata.rs` unless overridden
    pub fn stringdata_file(&self) -> String {
        if let Some(output) = &self.stringdata_output {
            return output.clone();
        }
        let stem = self
            .file
            .strip_suffix(SCHEMA_SUFFIX)
            .or_else(|| self.file.strip_suffix(".json"))
            .unwrap_or(&self.file);
        format!("{}_stringdata.rs", stem)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_types_output() -> String {
    "schema.rs".to_string()
}

fn default_schemas() -> Vec<SchemaEntry> {
    vec![
        SchemaEntry::new("site.schema.json", "SITE_SCHEMA_JSON"),
        SchemaEntry::new("settings.schema.json", "SETTINGS_SCHEMA_JSON"),
        SchemaEntry::new("extension.schema.json", "EXTENSION_SCHEMA_JSON"),
        SchemaEntry::new("awscodecommit.schema.json", "AWS_CODE_COMMIT_SCHEMA_JSON"),
        SchemaEntry::new("bitbucketserver.schema.json", "BITBUCKET_SERVER_SCHEMA_JSON"),
        SchemaEntry::new("github.schema.json", "GITHUB_SCHEMA_JSON"),
        SchemaEntry::new("gitlab.schema.json", "GITLAB_SCHEMA_JSON"),
        SchemaEntry::new("gitolite.schema.json", "GITOLITE_SCHEMA_JSON"),
        SchemaEntry::new("phabricator.schema.json", "PHABRICATOR_SCHEMA_JSON"),
    ]
}

impl Default for TypesConfig {
    fn default() -> Self {
        Self {
            output: default_types_output(),
            emit_docs: true,
            map_type: MapType::default(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            types: TypesConfig::default(),
            schemas: default_schemas(),
        }
    }
}

impl GenerateConfig {
    /// Load from default locations, then `config_path`, then the environment
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        for location in [MANIFEST_FILE, ".schema-compiler.toml"] {
            builder = builder.add_source(File::with_name(location).format(FileFormat::Toml).required(false));
        }

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load exactly one manifest file, ignoring user config and environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a manifest from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Per-user manifest location (`~/.config/schema-compiler/schemas.toml` on Linux)
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "schema-compiler", "schema-compiler")
            .map(|dirs| dirs.config_dir().join(MANIFEST_FILE))
    }

    /// Save the manifest as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CompileError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| CompileError::io(path, e))
    }

    /// Reject manifests that would produce clashing or uncompilable output
    pub fn validate(&self) -> Result<()> {
        if self.schemas.is_empty() {
            return Err(CompileError::Config("manifest lists no schemas".to_string()));
        }

        let mut files = HashSet::new();
        let mut consts = HashSet::new();
        let mut outputs = HashSet::from([self.types.output.as_str().to_owned()]);

        for entry in &self.schemas {
            if !files.insert(entry.file.as_str()) {
                return Err(CompileError::Config(format!("schema {} is listed more than once", entry.file)));
            }
            if !consts.insert(entry.const_name.as_str()) {
                return Err(CompileError::Config(format!(
                    "constant {} is used by more than one schema",
                    entry.const_name
                )));
            }
            validate_const_name(&entry.const_name)?;

            let output = entry.stringdata_file();
            if !outputs.insert(output.clone()) {
                return Err(CompileError::Config(format!("output file {} is generated twice", output)));
            }
        }

        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            emit_docs: self.types.emit_docs,
            map_type: self.types.map_type,
        }
    }
}
