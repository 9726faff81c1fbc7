//! Tag embedding cache
//!
//! Embeddings are paid for, so they are kept in a bincode archive next to
//! the tag list and only missing tags are sent to the provider. Entries are
//! never evicted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::error::{Result, VaultError};

/// Persistent tag -> embedding mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingCache {
    entries: BTreeMap<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the archive at `path`.
    ///
    /// A missing archive is the first-run case and yields an empty cache.
    /// An unreadable or corrupt archive is treated the same way.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No embedding cache yet");
                return Self::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read embedding cache, starting empty");
                return Self::new();
            }
        };

        match Self::deserialize(&data) {
            Some(cache) => {
                debug!(path = %path.display(), entries = cache.len(), "Loaded embedding cache");
                cache
            }
            None => {
                warn!(path = %path.display(), "Embedding cache is corrupt, starting empty");
                Self::new()
            }
        }
    }

    pub fn deserialize(data: &[u8]) -> Option<Self> {
        let cache: Self = bincode::deserialize(data).ok()?;
        cache.has_uniform_dimension().then_some(cache)
    }

    /// Overwrite the archive at `path` with the full mapping.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data =
            bincode::serialize(self).map_err(|e| VaultError::Serialization(e.to_string()))?;

        // Write next to the target first so a failed write keeps the old archive
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, path)?;

        debug!(path = %path.display(), entries = self.len(), "Saved embedding cache");
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<&[f32]> {
        self.entries.get(tag).map(Vec::as_slice)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Add an embedding. All vectors in one cache share a dimension.
    pub fn insert(&mut self, tag: impl Into<String>, embedding: Vec<f32>) -> Result<()> {
        let tag = tag.into();
        if let Some(expected) = self.dimension() {
            if embedding.len() != expected {
                return Err(VaultError::DimensionMismatch {
                    tag,
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        self.entries.insert(tag, embedding);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by every entry, `None` when empty
    pub fn dimension(&self) -> Option<usize> {
        self.entries.values().next().map(Vec::len)
    }

    /// Tags from `tags` that have no embedding yet, in the given order
    pub fn missing<'a>(&self, tags: &'a [String]) -> Vec<&'a str> {
        tags.iter()
            .map(String::as_str)
            .filter(|tag| !self.contains(tag))
            .collect()
    }

    /// Cached (tag, embedding) pairs for `tags`, in the given order
    pub fn select<'a>(&'a self, tags: &'a [String]) -> Vec<(&'a str, &'a [f32])> {
        tags.iter()
            .filter_map(|tag| self.get(tag).map(|e| (tag.as_str(), e)))
            .collect()
    }

    /// Every cached pair, ordered by tag
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(tag, embedding)| (tag.as_str(), embedding.as_slice()))
    }

    fn has_uniform_dimension(&self) -> bool {
        let mut lengths = self.entries.values().map(Vec::len);
        match lengths.next() {
            Some(first) => lengths.all(|len| len == first),
            None => true,
        }
    }
}
