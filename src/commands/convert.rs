//! Convert command - wrap code files into Markdown notes

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::convert::{convert_folder, ConvertOptions};

pub fn run(folder: &Path, recursive: bool, json: bool) -> Result<()> {
    let options = ConvertOptions { recursive };
    let report = convert_folder(folder, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.converted.is_empty() && report.failed.is_empty() {
        println!(
            "{} No .py or .R files found in {}",
            "→".dimmed(),
            folder.display()
        );
        return Ok(());
    }

    for file in &report.converted {
        println!(
            "  {} {} → {}",
            "✓".green(),
            file.source.display(),
            file.note.display().to_string().cyan()
        );
    }
    for file in &report.failed {
        println!("  {} {} - {}", "✗".red(), file.source.display(), file.error);
    }

    println!();
    println!(
        "Converted: {} notes, {} errors",
        report.converted.len().to_string().green(),
        report.failed.len().to_string().red()
    );

    Ok(())
}
