//! Depth-bounded project tree scan.
//!
//! One recursive walk collects everything the signal passes need:
//! per-name file and directory counts, per-extension counts, and the list
//! of HTML files. Helper directories are counted but never descended, so a
//! vendored `node_modules` tree cannot dominate the signal tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Maximum directory depth for the recursive scan.
pub const MAX_SCAN_DEPTH: usize = 3;

/// Directories that are counted as a signal but never descended into.
const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", ".idea", ".vscode"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("project path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("project path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Raw counts collected by a single tree walk.
#[derive(Debug, Clone, Default)]
pub struct TreeScan {
    pub file_counts: BTreeMap<String, u32>,
    pub dir_counts: BTreeMap<String, u32>,
    pub extension_counts: BTreeMap<String, u32>,
    pub html_files: Vec<PathBuf>,
}

/// Walk `root` up to [`MAX_SCAN_DEPTH`] levels of subdirectories.
///
/// Unreadable entries are skipped with a warning; only a missing or
/// non-directory root is an error, and the caller decides whether that
/// degrades the classification.
pub fn scan_tree(root: &Path) -> Result<TreeScan, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingPath(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut scan = TreeScan::default();
    // Depth 0 is the root itself; entries one level below it are depth 1.
    let mut walker = WalkDir::new(root)
        .max_depth(MAX_SCAN_DEPTH + 1)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry during scan");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type().is_dir() {
            *scan.dir_counts.entry(name.clone()).or_insert(0) += 1;
            if EXCLUDED_DIRS.contains(&name.as_str()) {
                walker.skip_current_dir();
            }
        } else {
            *scan.file_counts.entry(name).or_insert(0) += 1;
            if let Some(ext) = entry.path().extension() {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                if ext == ".html" {
                    scan.html_files.push(entry.path().to_path_buf());
                }
                *scan.extension_counts.entry(ext).or_insert(0) += 1;
            }
        }
    }

    debug!(
        files = scan.file_counts.values().sum::<u32>(),
        dirs = scan.dir_counts.values().sum::<u32>(),
        html_files = scan.html_files.len(),
        "project tree scan completed"
    );
    Ok(scan)
}
