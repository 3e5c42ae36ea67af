//! Schema String Embedding CLI
//!
//! Writes one schema file's raw text as a named Rust string constant.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use schema_compiler::stringdata::{generate, output_file_name};
use schema_compiler::SchemaDocument;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-stringdata")]
#[command(about = "Embed a schema file's raw text as a Rust string constant")]
struct Cli {
    /// Schema file to embed
    #[arg(short, long)]
    input: PathBuf,

    /// Constant name (SCREAMING_SNAKE_CASE)
    #[arg(short, long)]
    name: String,

    /// Output file (defaults to <stem>_stringdata.rs next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let doc = SchemaDocument::load(&cli.input)?;
    let code = generate(&doc, &cli.name)?;

    let output = cli.output.unwrap_or_else(|| {
        cli.input
            .parent()
            .map(|dir| dir.join(output_file_name(&doc)))
            .unwrap_or_else(|| PathBuf::from(output_file_name(&doc)))
    });
    fs::write(&output, code).with_context(|| format!("writing {}", output.display()))?;

    info!(input = %cli.input.display(), constant = %cli.name, "embedded schema");
    println!("✅ {} -> {} ({})", doc.file_name, output.display(), cli.name);
    Ok(())
}
