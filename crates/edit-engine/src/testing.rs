//! Shared fixtures for job and batch tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelcut_source_catalog::{DurationProber, ProbeError, SourceCatalog};

/// Durations keyed by file name.
pub(crate) struct FixtureProber {
    durations: HashMap<String, f64>,
}

#[async_trait]
impl DurationProber for FixtureProber {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.durations
            .get(&name)
            .copied()
            .ok_or(ProbeError::Unparseable { output: name })
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

pub(crate) fn fixture_catalog(entries: &[(&str, f64)]) -> Arc<SourceCatalog> {
    let prober = FixtureProber {
        durations: entries
            .iter()
            .map(|(name, d)| (name.to_string(), *d))
            .collect(),
    };
    Arc::new(SourceCatalog::new(Arc::new(prober), Duration::from_secs(5)))
}

/// Fresh directory under the temp dir holding an empty file per entry.
pub(crate) fn fixture_dir(name: &str, entries: &[(&str, f64)]) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for (file, _) in entries {
        std::fs::write(dir.join(file), b"").unwrap();
    }
    dir
}
