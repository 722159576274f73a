//! Source media identity and probed durations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier of a source: its canonical absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(PathBuf);

impl SourceId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name for log lines; falls back to the full path.
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for SourceId {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for SourceId {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

/// A registered source file. Immutable once probed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMedia {
    id: SourceId,
    duration_secs: f64,
}

/// Errors raised when building a [`SourceMedia`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source {id} has unusable duration {duration_secs}s")]
    InvalidDuration { id: SourceId, duration_secs: f64 },
}

impl SourceMedia {
    /// Create a source, enforcing `duration > 0` and finite.
    pub fn new(id: impl Into<SourceId>, duration_secs: f64) -> Result<Self, SourceError> {
        let id = id.into();
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(SourceError::InvalidDuration { id, duration_secs });
        }
        Ok(Self { id, duration_secs })
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// True duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration_secs
    }
}
