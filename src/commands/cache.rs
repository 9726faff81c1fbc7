//! Cache command - inspect the tag embedding archive

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use std::path::Path;

use crate::core::paths::ProjectPaths;
use crate::tags::EmbeddingCache;

pub fn run(project: Option<&Path>, list: bool, json: bool) -> Result<()> {
    let paths = ProjectPaths::resolve(project).context("Failed to resolve project path")?;
    let cache_path = &paths.cache;

    if !cache_path.exists() {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "exists": false,
                    "path": cache_path.display().to_string(),
                })
            );
        } else {
            println!(
                "{} No embedding cache at {}. Run {} first.",
                "!".yellow().bold(),
                cache_path.display(),
                "vaultsmith similar".cyan()
            );
        }
        return Ok(());
    }

    let cache = EmbeddingCache::load(cache_path);
    let metadata = std::fs::metadata(cache_path)?;
    let file_size = metadata.len();
    let modified = metadata
        .modified()
        .ok()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string());
    let tags: Vec<&str> = cache.iter().map(|(tag, _)| tag).collect();

    if json {
        let mut value = serde_json::json!({
            "exists": true,
            "path": cache_path.display().to_string(),
            "entries": cache.len(),
            "dimension": cache.dimension(),
            "file_size_bytes": file_size,
            "modified": modified,
        });
        if list {
            value["tags"] = serde_json::json!(tags);
        }
        println!("{}", value);
        return Ok(());
    }

    println!("{}", "Embedding Cache".bold());
    println!();
    println!("  {} Path: {}", "→".dimmed(), cache_path.display());
    println!(
        "  {} {} tags embedded",
        "→".dimmed(),
        cache.len().to_string().cyan()
    );
    match cache.dimension() {
        Some(dim) => println!("  {} Dimension: {}", "→".dimmed(), dim),
        None => println!(
            "  {} {}",
            "!".yellow().bold(),
            "Cache is empty or unreadable".yellow()
        ),
    }
    println!(
        "  {} Size: {:.2} KB",
        "→".dimmed(),
        file_size as f64 / 1024.0
    );
    if let Some(modified) = modified {
        println!("  {} Last updated: {}", "→".dimmed(), modified);
    }

    if list && !tags.is_empty() {
        println!();
        for tag in tags {
            println!("  • {}", tag);
        }
    }

    Ok(())
}
