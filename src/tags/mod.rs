//! Tag similarity module for vaultsmith
//!
//! Finds tags that mean nearly the same thing so they can be merged.
//!
//! # Components
//!
//! - `reader`: tag list loading and normalization
//! - `cache`: on-disk tag embedding archive
//! - `provider`: embedding provider trait
//! - `openai`: OpenAI-compatible remote provider
//! - `similarity`: pairwise cosine distances and CSV output
//! - `pipeline`: the end-to-end run

pub mod cache;
pub mod openai;
pub mod pipeline;
pub mod provider;
pub mod reader;
pub mod similarity;

pub use cache::EmbeddingCache;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use pipeline::{fill_cache, run_similarity, FillReport, RunOptions, SimilarityRun};
pub use provider::{EmbeddingProvider, ProviderError};
pub use reader::{normalize_tag, read_tags, unique_tags};
pub use similarity::{cosine_distance, nearest_pairs, pairwise_distances, DistanceRecord};
