//! Log source — owns file I/O for a parse session.
//!
//! The file is consumed as a single whole-file read and split on `\n`
//! exactly, so a log ending in a newline yields a final empty line. That
//! trailing artifact is why [`ParseSession::parse_all`](crate::ParseSession::parse_all)
//! unconditionally discards the last line's record.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures that abort a session before it starts. Every record's year
/// derives from the modification time, so a source without one is fatal.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read log file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read modification time of {}: {source}", path.display())]
    NoModificationTime {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    fn unreadable(path: &Path, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    fn no_mtime(path: &Path, source: std::io::Error) -> Self {
        Self::NoModificationTime {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One log file, read whole and held as an ordered line sequence together
/// with the file's last-modification time.
#[derive(Debug, Clone)]
pub struct LogSource {
    lines: Vec<String>,
    modified: DateTime<Utc>,
}

impl LogSource {
    /// Read a log file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| SourceError::unreadable(path, e))?;
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| SourceError::no_mtime(path, e))?;

        Ok(Self::from_parts(&content, DateTime::<Utc>::from(modified)))
    }

    /// Build a source from content already in memory, for embedders and
    /// tests that control the modification time.
    pub fn from_parts(content: &str, modified: DateTime<Utc>) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
            modified,
        }
    }

    /// All lines in original order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Random access by original line position.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last-modification time of the underlying file.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }
}
