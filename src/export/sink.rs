use std::{
    path::PathBuf,
    time::Instant,
};

use anyhow::Context as _;

use crate::foundation::error::StampResult;

/// Receives exported images, one call per text line, in input order.
pub trait DownloadSink {
    /// Save one encoded PNG under `file_name`.
    fn download(&mut self, file_name: &str, png: &[u8]) -> StampResult<()>;
}

/// Writes each download into a directory. File names are used verbatim.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`; the directory is created on first download.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn download(&mut self, file_name: &str, png: &[u8]) -> StampResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "saved download");
        Ok(())
    }
}

/// One captured download.
#[derive(Debug, Clone)]
pub struct Download {
    /// File name offered to the user.
    pub file_name: String,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// When the download was triggered.
    pub at: Instant,
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    downloads: Vec<Download>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the captured downloads in the order they arrived.
    pub fn downloads(&self) -> &[Download] {
        &self.downloads
    }

    /// Captured file names in order.
    pub fn file_names(&self) -> Vec<&str> {
        self.downloads.iter().map(|d| d.file_name.as_str()).collect()
    }
}

impl DownloadSink for InMemorySink {
    fn download(&mut self, file_name: &str, png: &[u8]) -> StampResult<()> {
        self.downloads.push(Download {
            file_name: file_name.to_string(),
            png: png.to_vec(),
            at: Instant::now(),
        });
        Ok(())
    }
}

/// File name for an exported line: the line text verbatim plus `.png`.
pub fn download_file_name(line: &str) -> String {
    format!("{line}.png")
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
