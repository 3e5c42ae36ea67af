//! Schema Compiler CLI
//!
//! Compiles JSON Schema files into Rust types, runs the manifest-driven
//! generation pipeline and validates documents against a schema.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use jsonschema::{Draft, JSONSchema};
use schema_compiler::schema::discover;
use schema_compiler::{compile_files, CompileOptions, Drift, GenerateConfig, Generator, MapType};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-compiler")]
#[command(about = "Compile JSON Schema configuration documents into Rust types")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile schema files into one Rust source file
    Compile {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory searched for *.schema.json when no files are given
        #[arg(long, default_value = ".")]
        schema_dir: PathBuf,

        /// Leave schema descriptions out of the generated code
        #[arg(long)]
        no_docs: bool,

        /// Map type for free-form objects
        #[arg(long, value_enum, default_value_t = MapTypeArg::Btreemap)]
        map_type: MapTypeArg,

        /// Schema files, compiled in the order given
        files: Vec<PathBuf>,
    },

    /// Run the generation manifest (types + stringdata)
    Generate {
        /// Manifest file (defaults to schemas.toml lookup)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the schema files
        #[arg(long, default_value = ".")]
        schema_dir: PathBuf,

        /// Directory receiving generated files
        #[arg(long, default_value = "generated")]
        out_dir: PathBuf,

        /// Only report files that differ from what would be generated
        #[arg(long)]
        check: bool,
    },

    /// Validate a JSON document against a schema
    Validate {
        /// Schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Document to validate
        document: PathBuf,
    },

    /// Write the default manifest
    Init {
        /// Where to write it
        #[arg(default_value = "schemas.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MapTypeArg {
    Btreemap,
    Hashmap,
}

impl From<MapTypeArg> for MapType {
    fn from(arg: MapTypeArg) -> Self {
        match arg {
            MapTypeArg::Btreemap => MapType::BTreeMap,
            MapTypeArg::Hashmap => MapType::HashMap,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Compile {
            output,
            schema_dir,
            no_docs,
            map_type,
            files,
        } => {
            let files = if files.is_empty() {
                discover(&schema_dir).with_context(|| format!("searching {}", schema_dir.display()))?
            } else {
                files
            };
            if files.is_empty() {
                bail!("no *.schema.json files found in {}", schema_dir.display());
            }

            let options = CompileOptions {
                emit_docs: !no_docs,
                map_type: map_type.into(),
            };
            let generated = compile_files(&files, &options)?;
            write_output(&output, &generated.code)?;

            println!(
                "✅ Compiled {} schema(s) into {} type(s): {}",
                generated.sources.len(),
                generated.type_count,
                output.display()
            );
            Ok(true)
        }

        Commands::Generate {
            config,
            schema_dir,
            out_dir,
            check,
        } => {
            let config = GenerateConfig::load_from(config.as_deref()).context("loading manifest")?;
            debug!(schemas = config.schemas.len(), "loaded manifest");
            let generator = Generator::new(config, &schema_dir);

            if check {
                let report = generator.check(&out_dir)?;
                if report.is_clean() {
                    println!("✅ {} generated file(s) up to date", report.checked);
                    return Ok(true);
                }
                for drift in &report.drift {
                    match drift {
                        Drift::Missing { name } => println!("❌ {} - missing", name),
                        Drift::Stale { name, diff } => {
                            println!("❌ {} - stale", name);
                            println!("{}", diff);
                        }
                    }
                }
                println!();
                println!("Run `schema-compiler generate` to regenerate.");
                return Ok(false);
            }

            let written = generator.write(&out_dir)?;
            for path in &written {
                println!("  📄 {}", path.display());
            }
            println!("✅ Generated {} file(s) in {}", written.len(), out_dir.display());
            Ok(true)
        }

        Commands::Validate { schema, document } => {
            let schema_json = read_json(&schema)?;
            let instance = read_json(&document)?;

            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&schema_json)
                .map_err(|e| anyhow!("invalid schema {}: {}", schema.display(), e))?;

            let result = compiled.validate(&instance);
            match result {
                Ok(()) => {
                    println!("✅ {} is valid", document.display());
                    Ok(true)
                }
                Err(errors) => {
                    println!("❌ {} is invalid:", document.display());
                    for error in errors {
                        let path = error.instance_path.to_string();
                        let path = if path.is_empty() { "/".to_string() } else { path };
                        println!("  {}: {}", path, error);
                    }
                    Ok(false)
                }
            }
        }

        Commands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            GenerateConfig::default().save(&path)?;
            println!("✅ Wrote default manifest to {}", path.display());
            Ok(true)
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
