use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;
use walkdir::WalkDir;

use crate::error::CollectError;

/// A file in the documents directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        LocalFile {
            path: path.into(),
            size_bytes,
        }
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_pdf(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

/// List regular files directly inside `dir`, sorted by name. Hidden files are skipped.
pub fn scan_documents(dir: &Path) -> Result<Vec<LocalFile>> {
    if !dir.is_dir() {
        return Err(CollectError::MissingDirectory(dir.to_path_buf()).into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let size = entry.metadata()?.len();
        files.push(LocalFile::new(entry.path(), size));
    }

    info!("Scanned {} files in {}", files.len(), dir.display());
    Ok(files)
}
