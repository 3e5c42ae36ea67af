//! Name Conversion
//!
//! Turns JSON property names, definition keys and enum values into Rust
//! identifiers. All functions are pure and deterministic: the same input
//! always yields the same identifier.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CompileError, Result};

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Is this a reserved word in Rust 2021?
pub fn is_rust_keyword(s: &str) -> bool {
    RUST_KEYWORDS.contains(&s)
}

/// Convert to PascalCase.
///
/// Words are separated by any non-alphanumeric character. Only the first
/// letter of each word is touched, so `AWSCodeCommit` keeps its acronym,
/// unless the whole input has no lowercase letters (`CRAM-MD5` -> `CramMd5`).
pub fn to_pascal_case(s: &str) -> String {
    let all_caps = !s.chars().any(|c| c.is_ascii_lowercase());
    let mut result = String::with_capacity(s.len());

    for word in s.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.push(first.to_ascii_uppercase());
        }
        for c in chars {
            if all_caps {
                result.push(c.to_ascii_lowercase());
            } else {
                result.push(c);
            }
        }
    }

    if result.is_empty() {
        return "Empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'V');
    }
    if is_rust_keyword(&result) {
        result.push('_');
    }
    result
}

/// Convert to snake_case, keeping acronyms together (`gitURLType` -> `git_url_type`)
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }

        if c.is_ascii_uppercase() {
            let boundary = match i.checked_sub(1).map(|p| chars[p]) {
                Some(prev) if prev.is_ascii_lowercase() || prev.is_ascii_digit() => true,
                Some(prev) if prev.is_ascii_uppercase() => chars
                    .get(i + 1)
                    .map(|next| next.is_ascii_lowercase())
                    .unwrap_or(false),
                _ => false,
            };
            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    while result.ends_with('_') {
        result.pop();
    }
    if result.is_empty() {
        return "field".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert_str(0, "field_");
    }
    if is_rust_keyword(&result) {
        result.push('_');
    }
    result
}

/// Is `s` usable as a plain (non-raw) Rust identifier?
pub fn is_rust_identifier(s: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));
    s != "_" && re.is_match(s) && !is_rust_keyword(s)
}

/// Check that `name` is a SCREAMING_SNAKE_CASE constant name
pub fn validate_const_name(name: &str) -> Result<()> {
    static CONST_NAME: OnceLock<Regex> = OnceLock::new();
    let re = CONST_NAME.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("const pattern"));
    if re.is_match(name) && is_rust_identifier(name) {
        Ok(())
    } else {
        Err(CompileError::InvalidIdentifier(name.to_string()))
    }
}

/// Hands out unique names within one scope (fields of a struct, variants of an enum)
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `base` if unused, otherwise `base2`, `base3`, ...
    pub fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
