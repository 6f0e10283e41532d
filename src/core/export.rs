//! Scorecard export sinks.
//!
//! Exports are one-way: the orchestrator hands over the scorecard and does
//! not look at what the sink does with it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Export failure
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no scorecard has been generated")]
    MissingScorecard,

    #[error("failed to serialize scorecard: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for scorecard exports
pub trait ExportSink: Send + Sync {
    /// Save `payload` as a downloadable JSON file named `filename`
    fn download(&self, filename: &str, payload: &serde_json::Value) -> Result<PathBuf, ExportError>;

    /// Open `html` as a printable view
    fn open_printable(&self, html: &str) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, filename: &str, contents: &[u8]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(filename);
        std::fs::write(&path, contents).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), "Exported scorecard");
        Ok(path)
    }
}

impl ExportSink for FileExportSink {
    fn download(&self, filename: &str, payload: &serde_json::Value) -> Result<PathBuf, ExportError> {
        let json = serde_json::to_vec_pretty(payload)?;
        self.write(filename, &json)
    }

    fn open_printable(&self, html: &str) -> Result<PathBuf, ExportError> {
        let suffix = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "scorecard-print-{}-{}.html",
            Utc::now().format("%Y%m%d-%H%M%S"),
            &suffix[..8]
        );
        self.write(&filename, html.as_bytes())
    }
}

/// File name for a structured scorecard download
pub fn scorecard_filename(model_id: &str) -> String {
    let slug: String = model_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("scorecard-{}-{}.json", slug, Utc::now().format("%Y-%m-%d"))
}
