//! Rust Code Emitter
//!
//! Renders a [`TypeSet`] as Rust source with serde derives.
//!
//! Key constraints:
//! - Output is plain `//` comments plus items, so it can be `include!`d
//! - Types appear in discovery order; nothing here reorders or renames
//! - Same `TypeSet` and options always give the same text

use crate::checksum::Checksum;
use crate::model::{EnumVariant, Field, Flattened, TypeDef, TypeDefKind, TypeExpr, TypeSet, UnionVariant};

use super::{CompileOptions, MapType};

/// First line of every generated file
pub const GENERATED_MARKER: &str = "// Code generated by schema-compiler. DO NOT EDIT.";

const DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";

// =============================================================================
// Public API
// =============================================================================

/// Emit a complete source file for `types`
pub fn emit(types: &TypeSet, sources: &[String], checksum: &Checksum, options: &CompileOptions) -> String {
    let mut output = String::new();
    emit_header(&mut output, sources, checksum);
    output.push_str("use serde::{Deserialize, Serialize};\n");

    for def in types.iter() {
        output.push('\n');
        emit_type(&mut output, def, options);
    }

    output
}

/// Render a type expression as Rust
pub fn render_type(expr: &TypeExpr, map_type: MapType) -> String {
    match expr {
        TypeExpr::String => "String".to_string(),
        TypeExpr::Integer => "i64".to_string(),
        TypeExpr::Number => "f64".to_string(),
        TypeExpr::Boolean => "bool".to_string(),
        TypeExpr::Any => "serde_json::Value".to_string(),
        TypeExpr::Array(inner) => format!("Vec<{}>", render_type(inner, map_type)),
        TypeExpr::Map(inner) => format!("{}<String, {}>", map_type.path(), render_type(inner, map_type)),
        TypeExpr::Optional(inner) => format!("Option<{}>", render_type(inner, map_type)),
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Boxed(inner) => format!("Box<{}>", render_type(inner, map_type)),
    }
}

// =============================================================================
// Header
// =============================================================================

fn emit_header(output: &mut String, sources: &[String], checksum: &Checksum) {
    output.push_str(GENERATED_MARKER);
    output.push_str("\n//\n// Sources:\n");
    for source in sources {
        output.push_str(&format!("//   {}\n", source));
    }
    output.push_str(&format!("//\n// Checksum: sha256:{}\n\n", checksum));
}

// =============================================================================
// Type Emission
// =============================================================================

fn emit_type(output: &mut String, def: &TypeDef, options: &CompileOptions) {
    if options.emit_docs {
        emit_docs(output, def.description.as_deref(), "");
    }

    match &def.kind {
        TypeDefKind::Struct { fields, flatten, additional } => {
            emit_struct(output, &def.name, fields, flatten, additional.as_ref(), options);
        }
        TypeDefKind::StringEnum { variants } => {
            emit_string_enum(output, &def.name, variants);
        }
        TypeDefKind::TaggedUnion { tag, variants } => {
            output.push_str(DERIVES);
            output.push_str(&format!("\n#[serde(tag = {:?})]\n", tag));
            emit_union_body(output, &def.name, variants, options.map_type);
        }
        TypeDefKind::Untagged { variants } => {
            output.push_str(DERIVES);
            output.push_str("\n#[serde(untagged)]\n");
            emit_union_body(output, &def.name, variants, options.map_type);
        }
        TypeDefKind::Alias { target } => {
            output.push_str(&format!("pub type {} = {};\n", def.name, render_type(target, options.map_type)));
        }
    }
}

fn emit_docs(output: &mut String, description: Option<&str>, indent: &str) {
    let Some(description) = description else {
        return;
    };
    for line in description.lines() {
        let line = line.trim();
        if line.is_empty() {
            output.push_str(&format!("{}///\n", indent));
        } else {
            output.push_str(&format!("{}/// {}\n", indent, line));
        }
    }
}

// =============================================================================
// Struct Emission
// =============================================================================

fn emit_struct(
    output: &mut String,
    name: &str,
    fields: &[Field],
    flatten: &[Flattened],
    additional: Option<&TypeExpr>,
    options: &CompileOptions,
) {
    output.push_str(DERIVES);
    output.push_str(&format!("\npub struct {} {{\n", name));

    for field in fields {
        if options.emit_docs {
            emit_docs(output, field.description.as_deref(), "    ");
        }

        let mut attrs = Vec::new();
        if field.needs_rename() {
            attrs.push(format!("rename = {:?}", field.json_name));
        }
        if !field.required && field.ty.is_optional() {
            attrs.push("default".to_string());
            attrs.push("skip_serializing_if = \"Option::is_none\"".to_string());
        }
        if !attrs.is_empty() {
            output.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
        }
        output.push_str(&format!(
            "    pub {}: {},\n",
            field.rust_name,
            render_type(&field.ty, options.map_type)
        ));
    }

    for member in flatten {
        output.push_str("    #[serde(flatten)]\n");
        output.push_str(&format!(
            "    pub {}: {},\n",
            member.rust_name,
            render_type(&member.ty, options.map_type)
        ));
    }

    if let Some(values) = additional {
        let mut field_name = "additional_properties".to_string();
        while fields.iter().any(|f| f.rust_name == field_name) || flatten.iter().any(|f| f.rust_name == field_name) {
            field_name.push('_');
        }
        output.push_str("    #[serde(flatten)]\n");
        output.push_str(&format!(
            "    pub {}: {},\n",
            field_name,
            render_type(&TypeExpr::map(values.clone()), options.map_type)
        ));
    }

    output.push_str("}\n");
}

// =============================================================================
// Enum Emission
// =============================================================================

fn emit_string_enum(output: &mut String, name: &str, variants: &[EnumVariant]) {
    output.push_str(DERIVES);
    output.push_str(&format!("\npub enum {} {{\n", name));

    for variant in variants {
        if variant.rust_name != variant.value {
            output.push_str(&format!("    #[serde(rename = {:?})]\n", variant.value));
        }
        output.push_str(&format!("    {},\n", variant.rust_name));
    }

    output.push_str("}\n");
}

fn emit_union_body(output: &mut String, name: &str, variants: &[UnionVariant], map_type: MapType) {
    output.push_str(&format!("pub enum {} {{\n", name));

    for variant in variants {
        if let Some(value) = &variant.tag_value {
            if *value != variant.rust_name {
                output.push_str(&format!("    #[serde(rename = {:?})]\n", value));
            }
        }
        output.push_str(&format!(
            "    {}({}),\n",
            variant.rust_name,
            render_type(&variant.ty, map_type)
        ));
    }

    output.push_str("}\n");
}
