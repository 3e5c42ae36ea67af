//! Checksum utilities for generated-output headers

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of schema text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    pub fn from_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Combined checksum over several named inputs.
    ///
    /// Each input contributes its name and length so that moving bytes
    /// between files changes the result.
    pub fn from_inputs<'a>(inputs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut hasher = Sha256::new();
        for (name, content) in inputs {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(content.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"{"title": "Settings"}"#;
        assert_eq!(Checksum::from_str(content), Checksum::from_str(content));
        assert_ne!(Checksum::from_str(content), Checksum::from_str("{}"));
    }

    #[test]
    fn test_inputs_boundary_matters() {
        let a = Checksum::from_inputs([("a.schema.json", "{}{"), ("b.schema.json", "}")]);
        let b = Checksum::from_inputs([("a.schema.json", "{}"), ("b.schema.json", "{}")]);
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }
}
