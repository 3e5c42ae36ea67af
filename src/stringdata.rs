//! String embedding
//!
//! Emits a schema file's raw text as a `pub const` so the schema can be
//! validated against at runtime without touching the filesystem.

use crate::error::Result;
use crate::names::validate_const_name;
use crate::schema::SchemaDocument;

/// First line of every generated stringdata file
pub const GENERATED_MARKER: &str = "// Code generated by schema-stringdata. DO NOT EDIT.";

/// Output file name for a document, e.g. `site_stringdata.rs`
pub fn output_file_name(doc: &SchemaDocument) -> String {
    format!("{}_stringdata.rs", doc.stem())
}

/// Render `doc` as a source file declaring `const_name`
pub fn generate(doc: &SchemaDocument, const_name: &str) -> Result<String> {
    validate_const_name(const_name)?;

    let mut output = String::with_capacity(doc.text.len() + 256);
    output.push_str(GENERATED_MARKER);
    output.push_str(&format!("\n//\n// Source: {}\n", doc.file_name));
    output.push_str(&format!("// Checksum: sha256:{}\n\n", doc.checksum()));
    output.push_str(&format!("/// Raw text of `{}`.\n", doc.file_name));
    output.push_str(&format!("pub const {}: &str = {};\n", const_name, string_literal(&doc.text)));
    Ok(output)
}

/// Rust literal whose value is exactly `text`.
///
/// Raw strings can't hold a carriage return, so text containing one is
/// escaped instead.
pub fn string_literal(text: &str) -> String {
    if text.contains('\r') {
        return format!("{:?}", text);
    }
    let hashes = "#".repeat(raw_hash_count(text));
    format!("r{hashes}\"{text}\"{hashes}")
}

/// Fewest `#`s such that `"` followed by that many `#`s never occurs in `text`
fn raw_hash_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut needed = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' {
            let run = bytes[i + 1..].iter().take_while(|&&c| c == b'#').count();
            needed = needed.max(run + 1);
        }
    }
    needed
}
