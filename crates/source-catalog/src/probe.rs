//! Duration probe backends.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Errors raised by a probe backend.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Could not read a duration from probe output {output:?}")]
    Unparseable { output: String },
}

/// Trait for duration probe backends (ffprobe, fixtures, ...).
#[async_trait]
pub trait DurationProber: Send + Sync {
    /// Probe the duration of the media file at `path`, in seconds.
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Probes durations by running `ffprobe` on the container.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    pub fn new() -> Self {
        Self::with_binary("ffprobe")
    }

    /// Use a specific `ffprobe` executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check whether the binary can be launched.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurationProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        let binary = self.binary.display().to_string();

        // kill_on_drop: a probe abandoned by a timeout must not outlive it.
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                binary: binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                binary,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        "ffprobe"
    }
}

/// Parse the first line of `ffprobe` output as seconds.
fn parse_duration(raw: &str) -> Result<f64, ProbeError> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .ok_or_else(|| ProbeError::Unparseable {
            output: raw.trim().to_string(),
        })
}
