//! Similar command - embed vault tags and rank near-duplicate pairs

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

use crate::core::paths::ProjectPaths;
use crate::tags::similarity::{nearest_pairs, DistanceRecord};
use crate::tags::{run_similarity, FillReport, OpenAiProvider, RunOptions};

const TAG_COLUMN_MAX: usize = 32;

#[derive(Serialize)]
struct SimilarResult<'a> {
    tags: usize,
    fill: &'a FillReport,
    pairs: usize,
    cache_path: String,
    distances_path: String,
    nearest: &'a [DistanceRecord],
}

pub fn run(
    project: Option<&Path>,
    tags_file: Option<&Path>,
    top: Option<usize>,
    include_cached: bool,
    json: bool,
) -> Result<()> {
    let mut paths = ProjectPaths::resolve(project).context("Failed to resolve project path")?;
    if let Some(tags_file) = tags_file {
        paths = paths.with_tags_file(tags_file);
    }

    let provider = OpenAiProvider::from_embedding_config(&paths.config.embedding)
        .context("Failed to set up embedding provider")?;

    if !json {
        println!(
            "{} Embedding tags from {} with {}",
            "→".dimmed(),
            paths.tags.display(),
            paths.config.embedding.model.cyan()
        );
    }

    let options = RunOptions { include_cached };
    let run = run_similarity(&paths, &provider, &options)?;

    let top = top.unwrap_or(paths.config.report.top);
    let nearest = nearest_pairs(&run.records, top);

    if json {
        let result = SimilarResult {
            tags: run.tags.len(),
            fill: &run.fill,
            pairs: run.records.len(),
            cache_path: paths.cache.display().to_string(),
            distances_path: paths.distances.display().to_string(),
            nearest: &nearest,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_fill(&run.fill, &paths);
    println!(
        "{} {} pairs written to {}",
        "✓".green().bold(),
        run.records.len().to_string().cyan(),
        paths.distances.display()
    );
    println!();

    print_nearest(&nearest);
    Ok(())
}

fn print_fill(fill: &FillReport, paths: &ProjectPaths) {
    println!(
        "  {} {} tags ({} cached, {} newly embedded)",
        "→".dimmed(),
        fill.requested,
        fill.cached,
        fill.embedded.to_string().green()
    );
    if fill.saved {
        println!("  {} Cache updated: {}", "→".dimmed(), paths.cache.display());
    }
}

fn print_nearest(nearest: &[DistanceRecord]) {
    if nearest.is_empty() {
        println!("{}", "Not enough tags to compare.".yellow());
        return;
    }

    println!("{}", "Most similar tag pairs".bold());
    println!("{}", "=".repeat(60));

    let width = nearest
        .iter()
        .map(|r| display_tag(&r.key1).width())
        .max()
        .unwrap_or(0);

    for record in nearest {
        let distance = format!("{:.4}", record.cosine_distance);
        let distance_colored = if record.cosine_distance < 0.2 {
            distance.green()
        } else if record.cosine_distance < 0.4 {
            distance.yellow()
        } else {
            distance.dimmed()
        };

        let key1 = display_tag(&record.key1);
        let padding = " ".repeat(width.saturating_sub(key1.width()));
        println!(
            "  [{}] {}{}  ↔  {}",
            distance_colored,
            key1.cyan(),
            padding,
            display_tag(&record.key2).cyan()
        );
    }

    println!("{}", "=".repeat(60));
}

/// Truncate long tags for the table (width-aware for CJK)
fn display_tag(tag: &str) -> String {
    if tag.width() <= TAG_COLUMN_MAX {
        return tag.to_string();
    }

    let mut out = String::new();
    for c in tag.chars() {
        if out.width() + c.to_string().width() > TAG_COLUMN_MAX - 3 {
            break;
        }
        out.push(c);
    }
    out.push_str("...");
    out
}
