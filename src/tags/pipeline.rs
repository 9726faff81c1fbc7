//! Tag similarity pipeline
//!
//! read tags -> fill cache gaps through the provider -> persist cache
//! -> pairwise distances -> CSV table.

use serde::Serialize;
use tracing::{info, warn};

use super::cache::EmbeddingCache;
use super::provider::{EmbeddingProvider, ProviderError};
use super::reader::{read_tags, unique_tags};
use super::similarity::{pairwise_distances, write_csv, DistanceRecord};
use crate::core::error::Result;
use crate::core::paths::ProjectPaths;

/// Outcome of filling the cache for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    /// Distinct tags requested
    pub requested: usize,
    /// Tags already present in the cache
    pub cached: usize,
    /// Tags embedded by the provider during this run
    pub embedded: usize,
    /// Whether the archive was rewritten
    pub saved: bool,
}

/// Options for [`run_similarity`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Compare every cached tag, not just the ones in the tag file
    pub include_cached: bool,
}

/// Result of a full similarity run
#[derive(Debug, Clone)]
pub struct SimilarityRun {
    pub tags: Vec<String>,
    pub fill: FillReport,
    pub records: Vec<DistanceRecord>,
}

/// Embed every tag missing from `cache`.
///
/// Repeated tags are embedded once and counted once. Tags are sent in
/// first-occurrence order, `batch_size` per provider call. On failure the tags embedded so far stay
/// in `cache` and the error is returned.
pub fn fill_cache<P>(
    tags: &[String],
    cache: &mut EmbeddingCache,
    provider: &P,
    batch_size: usize,
) -> Result<FillReport>
where
    P: EmbeddingProvider + ?Sized,
{
    let tags = unique_tags(tags);
    let missing: Vec<String> = cache.missing(&tags).into_iter().map(String::from).collect();

    let mut report = FillReport {
        requested: tags.len(),
        cached: tags.len() - missing.len(),
        ..Default::default()
    };

    for batch in missing.chunks(batch_size.max(1)) {
        let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
        info!(model = provider.model(), tags = ?texts, "Embedding tags");

        let embeddings = match texts.as_slice() {
            [text] => vec![provider.embed(text)?],
            _ => provider.embed_batch(&texts)?,
        };

        if embeddings.len() != batch.len() {
            return Err(ProviderError::Parse(format!(
                "provider returned {} embeddings for {} tags",
                embeddings.len(),
                batch.len()
            ))
            .into());
        }

        for (tag, embedding) in batch.iter().zip(embeddings) {
            cache.insert(tag.clone(), embedding)?;
            report.embedded += 1;
        }
    }

    Ok(report)
}

/// Run the whole pipeline for a project and write the distance table.
pub fn run_similarity<P>(
    paths: &ProjectPaths,
    provider: &P,
    options: &RunOptions,
) -> Result<SimilarityRun>
where
    P: EmbeddingProvider + ?Sized,
{
    let tags = unique_tags(&read_tags(&paths.tags)?);
    info!(count = tags.len(), path = %paths.tags.display(), "Read tags");

    let mut cache = EmbeddingCache::load(&paths.cache);
    if !cache.is_empty() {
        info!(
            entries = cache.len(),
            "Found previously calculated embeddings, only embedding new tags"
        );
    }
    let initial_len = cache.len();

    let batch_size = paths.config.embedding.batch_size;
    let mut fill = match fill_cache(&tags, &mut cache, provider, batch_size) {
        Ok(fill) => fill,
        Err(e) => {
            if cache.len() > initial_len {
                // Keep what was already paid for before giving up
                match cache.save(&paths.cache) {
                    Ok(()) => warn!(
                        saved = cache.len() - initial_len,
                        "Saved embeddings fetched before the failure"
                    ),
                    Err(save_err) => {
                        warn!(error = %save_err, "Failed to save partial embedding cache")
                    }
                }
            }
            return Err(e);
        }
    };

    if fill.embedded > 0 {
        cache.save(&paths.cache)?;
        fill.saved = true;
    }

    let records = if options.include_cached {
        let entries: Vec<(&str, &[f32])> = cache.iter().collect();
        pairwise_distances(&entries)
    } else {
        pairwise_distances(&cache.select(&tags))
    };

    write_csv(&paths.distances, &records)?;
    info!(
        pairs = records.len(),
        path = %paths.distances.display(),
        "Wrote cosine distances"
    );

    Ok(SimilarityRun {
        tags,
        fill,
        records,
    })
}
