//! Line-oriented conversation transcripts.
//!
//! A transcript is the ordered list of non-empty, stripped lines of one source
//! text. Line indices count only the kept lines.

use crate::error::{KnowhowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported transcript file extensions.
const TRANSCRIPT_EXTENSIONS: &[&str] = &["txt", "md", "log"];

/// A loaded transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Document ID (the file stem for transcripts loaded from disk).
    pub id: String,
    /// Non-empty, stripped lines in source order.
    pub lines: Vec<String>,
}

impl Transcript {
    /// Build a transcript from raw text.
    pub fn from_text(id: impl Into<String>, text: &str) -> Self {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Self { id: id.into(), lines }
    }

    /// Load a transcript file. The document ID is the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| KnowhowError::InvalidInput(format!("Invalid transcript path: {}", path.display())))?
            .to_string();

        let text = std::fs::read_to_string(path)?;
        let transcript = Self::from_text(id, &text);
        debug!("Loaded transcript '{}' ({} lines)", transcript.id, transcript.len());
        Ok(transcript)
    }

    /// Load every transcript file in a directory, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && Self::is_transcript_file(p))
            .collect();
        paths.sort();

        paths.iter().map(|p| Self::load(p)).collect()
    }

    /// Load a mix of files and directories, in argument order.
    pub fn load_paths(paths: &[PathBuf]) -> Result<Vec<Self>> {
        let mut transcripts = Vec::new();
        for path in paths {
            if path.is_dir() {
                transcripts.extend(Self::load_dir(path)?);
            } else if path.is_file() {
                transcripts.push(Self::load(path)?);
            } else {
                return Err(KnowhowError::InvalidInput(format!(
                    "Transcript not found: {}",
                    path.display()
                )));
            }
        }
        Ok(transcripts)
    }

    fn is_transcript_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| TRANSCRIPT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the transcript has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
