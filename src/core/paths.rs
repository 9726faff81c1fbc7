//! Project path management
//!
//! Handles project root detection and file path resolution.

use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::{Result, VaultError};

/// Environment variable for project path configuration
pub const PROJECT_PATH_ENV: &str = "VAULTSMITH_PROJECT_PATH";

/// Project paths wrapper that combines config and resolved paths
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub tags: PathBuf,
    pub cache: PathBuf,
    pub distances: PathBuf,
    pub config: Config,
}

impl ProjectPaths {
    /// Resolve the project root and load its config.
    /// Fails if the chosen root does not exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = match explicit {
            Some(path) => path.to_path_buf(),
            None => get_project_root(),
        };

        if !root.is_dir() {
            return Err(VaultError::not_found(root));
        }

        Ok(Self::from_root(root))
    }

    /// Create ProjectPaths from a specific root directory
    pub fn from_root(root: PathBuf) -> Self {
        let config = Config::load(&root);
        Self::from_root_with_config(root, config)
    }

    /// Create ProjectPaths with explicit config
    pub fn from_root_with_config(root: PathBuf, config: Config) -> Self {
        let resolved = config.resolve_paths(&root);

        Self {
            tags: resolved.tags,
            cache: resolved.cache,
            distances: resolved.distances,
            root,
            config,
        }
    }

    /// Replace the tag source, relative paths resolve against the project root
    pub fn with_tags_file(mut self, tags: &Path) -> Self {
        self.tags = if tags.is_absolute() {
            tags.to_path_buf()
        } else {
            self.root.join(tags)
        };
        self
    }
}

/// Get project root path from environment variable or current directory.
/// Priority: VAULTSMITH_PROJECT_PATH env var > current directory
pub fn get_project_root() -> PathBuf {
    if let Ok(path) = std::env::var(PROJECT_PATH_ENV) {
        let project_path = PathBuf::from(&path);
        if project_path.exists() {
            return project_path;
        }
        tracing::warn!(
            env = PROJECT_PATH_ENV,
            path = %path,
            "Project path does not exist, falling back to current directory"
        );
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
