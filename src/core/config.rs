//! vaultsmith configuration module
//!
//! Config is read from `.vaultsmith.json` in the project directory.
//! Every field has a default, so a partial file (or no file) is fine.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = ".vaultsmith.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// File names, relative to the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_tags_file")]
    pub tags: String,

    #[serde(default = "default_cache_file")]
    pub cache: String,

    #[serde(default = "default_distances_file")]
    pub distances: String,
}

fn default_tags_file() -> String {
    "tags.txt".to_string()
}

fn default_cache_file() -> String {
    "tag_embeddings.bin".to_string()
}

fn default_distances_file() -> String {
    "cosine_distances.csv".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            tags: default_tags_file(),
            cache: default_cache_file(),
            distances: default_distances_file(),
        }
    }
}

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";
/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Environment variable holding the API credential
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for the remote embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt. 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Tags per request. 1 means one request per tag.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_batch_size() -> usize {
    1
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            batch_size: default_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of nearest pairs printed after a run
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

impl Config {
    pub fn load(project_root: &Path) -> Self {
        let config_path = project_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Failed to load config, using defaults"
                );
                Self::default()
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, project_root: &Path) -> Result<()> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Get resolved paths based on project root
    pub fn resolve_paths(&self, project_root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            root: project_root.to_path_buf(),
            tags: project_root.join(&self.files.tags),
            cache: project_root.join(&self.files.cache),
            distances: project_root.join(&self.files.distances),
        }
    }
}

/// Resolved absolute paths for a project
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub tags: PathBuf,
    pub cache: PathBuf,
    pub distances: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.files.tags, "tags.txt");
        assert_eq!(config.embedding.model, "text-embedding-3-large");
        assert_eq!(config.embedding.batch_size, 1);
        assert_eq!(config.report.top, 20);
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{"embedding": {"model": "text-embedding-3-small", "maxRetries": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.embedding.max_retries, 0);
        assert_eq!(config.embedding.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.files.cache, "tag_embeddings.bin");
    }

    #[test]
    fn test_load_missing_and_invalid() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert_eq!(Config::load(temp_dir.path()).report.top, 20);

        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "{ not json")?;
        assert_eq!(Config::load(temp_dir.path()).files.tags, "tags.txt");

        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.files.tags = "vault-tags.txt".to_string();
        config.report.top = 5;
        config.save(temp_dir.path())?;

        let loaded = Config::load(temp_dir.path());
        assert_eq!(loaded.files.tags, "vault-tags.txt");
        assert_eq!(loaded.report.top, 5);

        let paths = loaded.resolve_paths(temp_dir.path());
        assert_eq!(paths.tags, temp_dir.path().join("vault-tags.txt"));
        Ok(())
    }
}
