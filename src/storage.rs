use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

use crate::transcript::Transcript;

/// Writes transcript exports to a directory
pub struct StorageManager {
    export_dir: PathBuf,
}

impl StorageManager {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        StorageManager {
            export_dir: export_dir.into(),
        }
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("Failed to create export directory {}", self.export_dir.display()))?;
        Ok(())
    }

    /// Write the transcript to `chat_<unix-epoch>.txt` and return its path
    pub fn export_transcript(&self, transcript: &Transcript) -> Result<PathBuf> {
        self.export_transcript_at(transcript, Utc::now())
    }

    pub fn export_transcript_at(&self, transcript: &Transcript, now: DateTime<Utc>) -> Result<PathBuf> {
        self.ensure_directories()?;

        let path = self.export_dir.join(export_file_name(now));
        fs::write(&path, transcript.to_export_text())
            .with_context(|| format!("Failed to write chat export {}", path.display()))?;

        Ok(path)
    }
}

pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("chat_{}.txt", now.timestamp())
}
