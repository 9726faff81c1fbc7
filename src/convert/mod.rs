//! Code-note converter
//!
//! Wraps Python and R scripts into Markdown notes so they can be searched
//! and linked from the vault. Each `foo.py` gets a sibling `foo.md`.

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::error::{Result, VaultError};

/// Tag written on the first line of every generated note
pub const CODE_IMPORT_TAG: &str = "#code_import";

/// File extension -> code block language
pub const EXTENSION_LANGUAGES: &[(&str, &str)] = &[("py", "python"), ("r", "r"), ("R", "r")];

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Descend into subfolders (hidden folders are skipped)
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub note: PathBuf,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertReport {
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<FailedFile>,
}

/// Language for a source file, if it is one we convert
pub fn language_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    EXTENSION_LANGUAGES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Markdown note body for a script
pub fn render_note(language: &str, code: &str) -> String {
    format!(
        "{} #{}\n```{}\n{}\n```\n",
        CODE_IMPORT_TAG,
        language,
        language,
        code.trim_end_matches(['\n', '\r'])
    )
}

/// Convert every supported script under `folder`.
///
/// Existing notes with the same stem are overwritten. A file that cannot be
/// read or written is recorded in the report and does not stop the rest.
/// When two scripts share a stem (`foo.py`, `foo.R`) the first one keeps
/// `foo.md` and the other is reported as failed. Hidden files are skipped.
pub fn convert_folder(folder: &Path, options: &ConvertOptions) -> Result<ConvertReport> {
    if !folder.exists() {
        return Err(VaultError::not_found(folder));
    }
    if !folder.is_dir() {
        return Err(VaultError::NotADirectory {
            path: folder.to_path_buf(),
        });
    }

    let sources = if options.recursive {
        collect_recursive(folder)
    } else {
        collect_flat(folder)?
    };

    let mut report = ConvertReport::default();
    let mut written: HashMap<PathBuf, PathBuf> = HashMap::new();

    for (source, language) in sources {
        debug!(source = %source.display(), language, "Converting");
        let note = source.with_extension("md");

        if let Some(owner) = written.get(&note) {
            warn!(
                source = %source.display(),
                note = %note.display(),
                owner = %owner.display(),
                "Note already written from another script, skipping"
            );
            report.failed.push(FailedFile {
                error: format!(
                    "{} was already written from {}",
                    note.display(),
                    owner.display()
                ),
                source,
            });
            continue;
        }

        match convert_file(&source, &note, language) {
            Ok(()) => {
                written.insert(note.clone(), source.clone());
                report.converted.push(ConvertedFile {
                    source,
                    note,
                    language: language.to_string(),
                });
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Failed to convert");
                report.failed.push(FailedFile {
                    source,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn convert_file(source: &Path, note: &Path, language: &str) -> std::io::Result<()> {
    let code = fs::read_to_string(source)?;
    fs::write(note, render_note(language, &code))
}

/// Scripts directly inside `folder`, grouped by extension
fn collect_flat(folder: &Path) -> Result<Vec<(PathBuf, &'static str)>> {
    let escaped = glob::Pattern::escape(&folder.to_string_lossy());
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let mut sources = Vec::new();

    for (ext, language) in EXTENSION_LANGUAGES {
        let pattern = format!("{}/*.{}", escaped, ext);
        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| VaultError::Io(std::io::Error::other(e.to_string())))?;

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file() && language_for(p) == Some(*language))
            .filter(|p| !sources.iter().any(|(s, _)| s == p))
            .collect();
        matched.sort();

        sources.extend(matched.into_iter().map(|p| (p, *language)));
    }

    Ok(sources)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn collect_recursive(folder: &Path) -> Vec<(PathBuf, &'static str)> {
    let mut sources: Vec<(PathBuf, &'static str)> = WalkDir::new(folder)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_name().to_str().map(is_hidden).unwrap_or(false)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let language = language_for(e.path())?;
            Some((e.into_path(), language))
        })
        .collect();

    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn test_language_for() {
        assert_eq!(language_for(Path::new("a/analysis.py")), Some("python"));
        assert_eq!(language_for(Path::new("plot.R")), Some("r"));
        assert_eq!(language_for(Path::new("plot.r")), Some("r"));
        assert_eq!(language_for(Path::new("notes.md")), None);
        assert_eq!(language_for(Path::new("Makefile")), None);
    }

    #[test]
    fn test_render_note() {
        let note = render_note("python", "import os\nprint(os.getcwd())\n\n");
        assert_eq!(
            note,
            "#code_import #python\n```python\nimport os\nprint(os.getcwd())\n```\n"
        );
    }

    #[test]
    fn test_convert_flat_folder() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("clean.py"), "x = 1\n")?;
        fs::write(root.join("plot.R"), "plot(1:10)\n")?;
        fs::write(root.join("readme.txt"), "ignored")?;
        fs::create_dir(root.join("nested"))?;
        fs::write(root.join("nested/deep.py"), "y = 2\n")?;

        let report = convert_folder(root, &ConvertOptions::default())?;

        assert_eq!(report.converted.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(
            fs::read_to_string(root.join("clean.md"))?,
            "#code_import #python\n```python\nx = 1\n```\n"
        );
        assert!(fs::read_to_string(root.join("plot.md"))?.starts_with("#code_import #r\n```r\n"));
        assert!(!root.join("nested/deep.md").exists());
        assert!(!root.join("readme.md").exists());
        Ok(())
    }

    #[test]
    fn test_convert_flat_skips_hidden_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join(".scratch.py"), "pass\n")?;
        fs::write(root.join(".session.R"), "q()\n")?;
        fs::write(root.join("etl.py"), "pass\n")?;

        let report = convert_folder(root, &ConvertOptions::default())?;

        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.converted[0].source, root.join("etl.py"));
        assert!(!root.join(".scratch.md").exists());
        assert!(!root.join(".session.md").exists());
        Ok(())
    }

    #[test]
    fn test_shared_stem_keeps_first_note() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("foo.py"), "x = 1\n")?;
        fs::write(root.join("foo.R"), "y <- 2\n")?;

        let report = convert_folder(root, &ConvertOptions::default())?;

        assert_eq!(report.converted.len(), 1);
        assert_eq!(report.converted[0].source, root.join("foo.py"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].source, root.join("foo.R"));
        assert!(report.failed[0].error.contains("foo.py"));
        assert_eq!(
            fs::read_to_string(root.join("foo.md"))?,
            "#code_import #python\n```python\nx = 1\n```\n"
        );
        Ok(())
    }

    #[test]
    fn test_rerun_overwrites_previous_notes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("etl.py"), "old = 1\n")?;
        convert_folder(root, &ConvertOptions::default())?;

        fs::write(root.join("etl.py"), "new = 2\n")?;
        let report = convert_folder(root, &ConvertOptions::default())?;

        assert_eq!(report.converted.len(), 1);
        assert!(report.failed.is_empty());
        assert!(fs::read_to_string(root.join("etl.md"))?.contains("new = 2"));
        Ok(())
    }

    #[test]
    fn test_convert_recursive_skips_hidden() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("scripts/stats"))?;
        fs::create_dir_all(root.join(".obsidian"))?;
        fs::write(root.join("scripts/etl.py"), "pass\n")?;
        fs::write(root.join("scripts/stats/model.r"), "lm(y ~ x)\n")?;
        fs::write(root.join(".obsidian/hidden.py"), "pass\n")?;

        let report = convert_folder(root, &ConvertOptions { recursive: true })?;

        assert_eq!(report.converted.len(), 2);
        assert!(root.join("scripts/etl.md").exists());
        assert!(root.join("scripts/stats/model.md").exists());
        assert!(!root.join(".obsidian/hidden.md").exists());
        Ok(())
    }

    #[test]
    fn test_missing_and_non_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("script.py");
        fs::write(&file, "pass\n")?;

        let err = convert_folder(&temp_dir.path().join("missing"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound { .. }));

        let err = convert_folder(&file, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, VaultError::NotADirectory { .. }));
        Ok(())
    }
}
