//! Tag list reader
//!
//! Tags arrive one per line, usually exported straight from the vault
//! (`#project/alpha`, `#Needs_Review`). Each line is turned into a
//! readable lowercase phrase before embedding.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::error::{Result, VaultError};

/// Leading marker on vault tags
pub const TAG_MARKER: char = '#';
/// Separator for nested tags
pub const PATH_SEPARATOR: &str = "/";

/// Normalize a raw tag line.
///
/// `#project/alpha` becomes `project, alpha` and `#Needs_Review` becomes
/// `needs review`. Applying it twice gives the same result as applying it once.
pub fn normalize_tag(raw: &str) -> String {
    raw.replace(PATH_SEPARATOR, ", ")
        .replace('_', " ")
        .trim_start_matches(|c: char| c == TAG_MARKER || c.is_whitespace())
        .trim_end()
        .to_lowercase()
}

/// Read and normalize tags, one per non-empty line, in file order.
pub fn read_tags(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(VaultError::not_found(path));
    }

    let content = fs::read_to_string(path)?;

    Ok(content
        .lines()
        .map(normalize_tag)
        .filter(|tag| !tag.is_empty())
        .collect())
}

/// Drop repeated tags, keeping the first occurrence.
pub fn unique_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}
