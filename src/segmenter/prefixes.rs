// WHY: Protected prefixes keep abbreviations like "Dr." from ending a sentence
// Same line format as Moses nonbreaking_prefix files so existing lists load unchanged

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

/// Marker for prefixes that are only protected before a number, e.g. "No #NUMERIC_ONLY#"
pub const NUMERIC_ONLY_MARKER: &str = "#NUMERIC_ONLY#";

/// Prefixes that do not end a sentence when followed by a period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixTable {
    prefixes: BTreeSet<String>,
    numeric_only: BTreeSet<String>,
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse prefix-file content: one prefix per line, `#` starts a comment
    pub fn parse(content: &str) -> Self {
        let mut table = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if let Some(prefix) = line.strip_suffix(NUMERIC_ONLY_MARKER) {
                let prefix = prefix.trim();
                if !prefix.is_empty() {
                    table.numeric_only.insert(prefix.to_string());
                }
                continue;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            table.prefixes.insert(line.to_string());
        }
        table
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&content);
        info!(
            "Loaded {} protected prefixes ({} numeric-only) from {}",
            table.prefixes.len(),
            table.numeric_only.len(),
            path.display()
        );
        Ok(table)
    }

    /// Decode a table produced by [`PrefixTable::to_serialized`]
    pub fn from_serialized(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_serialized(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn insert(&mut self, prefix: impl Into<String>) {
        self.prefixes.insert(prefix.into());
    }

    pub fn insert_numeric_only(&mut self, prefix: impl Into<String>) {
        self.numeric_only.insert(prefix.into());
    }

    /// Protected regardless of what follows
    pub fn is_nonbreaking(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    /// Protected only when the next word starts with a digit
    pub fn is_numeric_only(&self, prefix: &str) -> bool {
        self.numeric_only.contains(prefix)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len() + self.numeric_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Anything in this file, followed by a period, does not end a sentence.
Dr
Mr

#Numbers only
No #NUMERIC_ONLY#
Art #NUMERIC_ONLY#
";

    #[test]
    fn test_parse_prefix_file() {
        let table = PrefixTable::parse(SAMPLE);
        assert!(table.is_nonbreaking("Dr"));
        assert!(table.is_nonbreaking("Mr"));
        assert!(!table.is_nonbreaking("No"));
        assert!(table.is_numeric_only("No"));
        assert!(table.is_numeric_only("Art"));
        assert!(!table.is_nonbreaking("#Numbers only"));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_serialized_round_trip() {
        let table = PrefixTable::parse(SAMPLE);
        let bytes = table.to_serialized().unwrap();
        assert_eq!(PrefixTable::from_serialized(&bytes).unwrap(), table);
    }

    #[test]
    fn test_malformed_serialized_is_error() {
        assert!(PrefixTable::from_serialized(b"not json").is_err());
    }
}
