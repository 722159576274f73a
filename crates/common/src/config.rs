//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReelcutError, ReelcutResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timeline, validation and plan settings.
    pub edit: EditSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// What the job driver does when a single instruction cannot be translated
/// or validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the instruction as skipped and keep going.
    #[default]
    Skip,
    /// Fail the whole job on the first bad instruction.
    Abort,
}

/// Settings for one edit job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// Filler inserted between sources in the composite timeline (seconds).
    pub gap_duration_secs: f64,

    /// Length of a synthesized clip when a candidate collapses to nothing.
    /// Sources shorter than this cannot host a synthesized clip.
    pub min_clip_secs: f64,

    /// Desired total duration of the edit plan (seconds).
    pub target_duration_secs: f64,

    /// Accepted deviation from the target (seconds).
    pub duration_tolerance_secs: f64,

    /// Transition used when an instruction carries no hint
    /// (`cut`, `cross_fade`, `dissolve`, `fade_to_black`).
    pub default_transition: String,

    /// Duration of the default transition (seconds).
    pub default_transition_secs: f64,

    /// Upper bound on a single duration probe (seconds).
    pub probe_timeout_secs: u64,

    /// Per-instruction failure handling.
    pub failure_policy: FailurePolicy,

    /// Build an even-split plan when no instruction survives.
    pub fallback_when_empty: bool,

    /// Longest clip the fallback planner cuts from one source (seconds).
    pub max_fallback_clip_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reelcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            gap_duration_secs: 1.0,
            min_clip_secs: 2.0,
            target_duration_secs: 60.0,
            duration_tolerance_secs: 0.5,
            default_transition: "cross_fade".to_string(),
            default_transition_secs: 0.5,
            probe_timeout_secs: 10,
            failure_policy: FailurePolicy::Skip,
            fallback_when_empty: false,
            max_fallback_clip_secs: 30.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditSettings {
    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> ReelcutResult<()> {
        let non_negative = [
            ("gap_duration_secs", self.gap_duration_secs),
            ("duration_tolerance_secs", self.duration_tolerance_secs),
            ("default_transition_secs", self.default_transition_secs),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ReelcutError::config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        let positive = [
            ("min_clip_secs", self.min_clip_secs),
            ("target_duration_secs", self.target_duration_secs),
            ("max_fallback_clip_secs", self.max_fallback_clip_secs),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReelcutError::config(format!(
                    "{name} must be a finite, positive number (got {value})"
                )));
            }
        }

        if self.probe_timeout_secs == 0 {
            return Err(ReelcutError::config("probe_timeout_secs must be at least 1"));
        }

        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file. Unlike [`AppConfig::load`], a
    /// missing or malformed file is an error.
    pub fn load_from(path: impl AsRef<Path>) -> ReelcutResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReelcutError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.edit.validate()?;
        Ok(config)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reelcut").join("config.json")
}
