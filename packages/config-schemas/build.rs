//! Generates the configuration types and embedded schema text into OUT_DIR.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use schema_compiler::{GenerateConfig, Generator};

fn main() -> anyhow::Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let manifest = manifest_dir.join("schemas.toml");
    println!("cargo:rerun-if-changed={}", manifest.display());

    let config = GenerateConfig::from_file(&manifest).context("loading schemas.toml")?;
    let generator = Generator::new(config, manifest_dir.join("schemas"));
    for path in generator.schema_paths() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    generator
        .write(&out_dir)
        .context("generating configuration types")?;
    Ok(())
}
