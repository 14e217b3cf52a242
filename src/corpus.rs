//! Facilities for discovering input files and loading text corpora.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{Result, WbpeError};

/// Discovers files rooted at the provided input paths according to the
/// ingest configuration.
///
/// Directories are traversed recursively by default; set
/// [`IngestConfig::recursive`] to `false` to limit discovery to the first
/// level. Symlink traversal is controlled through
/// [`IngestConfig::follow_symlinks`].
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(WbpeError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| WbpeError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            if cfg.recursive {
                let walker = WalkDir::new(path).follow_links(cfg.follow_symlinks);
                for entry in walker {
                    let entry = entry.map_err(|err| WbpeError::Internal(err.to_string()))?;
                    if entry.file_type().is_file() {
                        files.push(entry.path().to_path_buf());
                    }
                }
            } else {
                for entry in fs::read_dir(path)
                    .map_err(|err| WbpeError::io(err, Some(path.to_path_buf())))?
                {
                    let entry =
                        entry.map_err(|err| WbpeError::io(err, Some(path.to_path_buf())))?;
                    let entry_path = entry.path();
                    if entry_path.is_file() {
                        files.push(entry_path);
                    }
                }
            }
        } else if metadata.is_file() {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(WbpeError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Loads a text corpus into a single newline-joined string.
///
/// Files are loaded in discovery order and must be valid UTF-8. Empty files
/// are tolerated; an empty overall corpus is valid training input.
pub fn load_text_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<String> {
    let file_paths = collect_paths(inputs, cfg)?;
    let mut corpus = String::new();
    for file_path in file_paths {
        let contents = fs::read_to_string(&file_path)
            .map_err(|err| WbpeError::io(err, Some(file_path.clone())))?;
        if !corpus.is_empty() {
            corpus.push('\n');
        }
        corpus.push_str(&contents);
    }
    Ok(corpus)
}
