//! The per-job source catalog.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reelcut_edit_model::{SourceId, SourceMedia};

use crate::probe::{DurationProber, FfprobeProber};

/// Errors raised by the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Source {path} is unreadable: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Source {id} was never registered")]
    UnknownSource { id: SourceId },
}

impl CatalogError {
    fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Registered sources keyed by canonical path.
///
/// The first successful probe of a path wins; later registrations of the
/// same file return the stored entry without probing again.
pub struct SourceCatalog {
    prober: Arc<dyn DurationProber>,
    probe_timeout: Duration,
    sources: RwLock<HashMap<SourceId, SourceMedia>>,
}

impl SourceCatalog {
    pub fn new(prober: Arc<dyn DurationProber>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            probe_timeout,
            sources: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog backed by `ffprobe` from `PATH`.
    pub fn with_ffprobe(probe_timeout: Duration) -> Self {
        Self::new(Arc::new(FfprobeProber::new()), probe_timeout)
    }

    /// Register a source file, probing its duration on first sight.
    pub async fn register(&self, path: impl AsRef<Path>) -> Result<SourceMedia, CatalogError> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| CatalogError::unreadable(path, format!("cannot resolve path: {e}")))?;
        let id = SourceId::new(canonical.clone());

        if let Some(existing) = self.lookup(&id) {
            return Ok(existing);
        }

        // Prove the file opens, then release it before the probe runs.
        {
            let file = tokio::fs::File::open(&canonical)
                .await
                .map_err(|e| CatalogError::unreadable(&canonical, format!("cannot open: {e}")))?;
            let metadata = file
                .metadata()
                .await
                .map_err(|e| CatalogError::unreadable(&canonical, format!("cannot stat: {e}")))?;
            if !metadata.is_file() {
                return Err(CatalogError::unreadable(&canonical, "not a regular file"));
            }
        }

        let duration =
            match tokio::time::timeout(self.probe_timeout, self.prober.probe(&canonical)).await {
                Ok(Ok(duration)) => duration,
                Ok(Err(e)) => return Err(CatalogError::unreadable(&canonical, e.to_string())),
                Err(_) => {
                    return Err(CatalogError::unreadable(
                        &canonical,
                        format!(
                            "{} probe timed out after {:?}",
                            self.prober.name(),
                            self.probe_timeout
                        ),
                    ))
                }
            };

        let media = SourceMedia::new(id.clone(), duration)
            .map_err(|e| CatalogError::unreadable(&canonical, e.to_string()))?;

        let stored = self
            .sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(media)
            .clone();

        tracing::info!(
            source = %stored.id().file_name(),
            duration_secs = stored.duration(),
            backend = self.prober.name(),
            "Registered source"
        );

        Ok(stored)
    }

    /// Register several files, preserving order. Stops at the first
    /// unreadable source.
    pub async fn register_all<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<Vec<SourceMedia>, CatalogError> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(self.register(path).await?);
        }
        Ok(sources)
    }

    /// The registered source with this id.
    pub fn get(&self, id: &SourceId) -> Result<SourceMedia, CatalogError> {
        self.lookup(id)
            .ok_or_else(|| CatalogError::UnknownSource { id: id.clone() })
    }

    /// True duration of a registered source.
    pub fn duration(&self, id: &SourceId) -> Result<f64, CatalogError> {
        self.get(id).map(|source| source.duration())
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.lookup(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, id: &SourceId) -> Option<SourceMedia> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl std::fmt::Debug for SourceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCatalog")
            .field("prober", &self.prober.name())
            .field("probe_timeout", &self.probe_timeout)
            .field("sources", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Durations keyed by file name; counts probe calls.
    struct FixtureProber {
        durations: HashMap<String, f64>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl FixtureProber {
        fn new(entries: &[(&str, f64)]) -> Self {
            Self {
                durations: entries
                    .iter()
                    .map(|(name, d)| (name.to_string(), *d))
                    .collect(),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl DurationProber for FixtureProber {
        async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
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

    fn fixture_dir(name: &str, files: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"not really video").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let dir = fixture_dir("reelcut_test_catalog_register", &["a.mp4", "b.mp4"]);
        let prober = Arc::new(FixtureProber::new(&[("a.mp4", 10.0), ("b.mp4", 20.0)]));
        let catalog = SourceCatalog::new(prober.clone(), Duration::from_secs(5));

        let sources = catalog
            .register_all(&[dir.join("a.mp4"), dir.join("b.mp4")])
            .await
            .unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].id().file_name(), "b.mp4");
        assert!((catalog.duration(sources[0].id()).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(catalog.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_registration_probes_once() {
        let dir = fixture_dir("reelcut_test_catalog_once", &["a.mp4"]);
        let prober = Arc::new(FixtureProber::new(&[("a.mp4", 10.0)]));
        let catalog = SourceCatalog::new(prober.clone(), Duration::from_secs(5));

        let first = catalog.register(dir.join("a.mp4")).await.unwrap();
        // A non-canonical spelling of the same file resolves to the same entry.
        let second = catalog
            .register(dir.join(".").join("a.mp4"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let prober = Arc::new(FixtureProber::new(&[]));
        let catalog = SourceCatalog::new(prober, Duration::from_secs(5));

        let err = catalog
            .register("/nonexistent/reelcut/missing.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::SourceUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_directory_is_unreadable() {
        let dir = fixture_dir("reelcut_test_catalog_dir", &[]);
        let catalog = SourceCatalog::new(Arc::new(FixtureProber::new(&[])), Duration::from_secs(5));

        let err = catalog.register(&dir).await.unwrap_err();
        assert!(err.to_string().contains("not a regular file"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_failed_probe_is_unreadable() {
        let dir = fixture_dir("reelcut_test_catalog_probe_fail", &["corrupt.mp4"]);
        let catalog = SourceCatalog::new(Arc::new(FixtureProber::new(&[])), Duration::from_secs(5));

        let err = catalog.register(dir.join("corrupt.mp4")).await.unwrap_err();
        assert!(matches!(err, CatalogError::SourceUnreadable { .. }));
        assert!(catalog.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_zero_duration_is_unreadable() {
        let dir = fixture_dir("reelcut_test_catalog_zero", &["empty.mp4"]);
        let prober = Arc::new(FixtureProber::new(&[("empty.mp4", 0.0)]));
        let catalog = SourceCatalog::new(prober, Duration::from_secs(5));

        assert!(catalog.register(dir.join("empty.mp4")).await.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let dir = fixture_dir("reelcut_test_catalog_timeout", &["slow.mp4"]);
        let mut prober = FixtureProber::new(&[("slow.mp4", 10.0)]);
        prober.delay = Duration::from_secs(5);
        let catalog = SourceCatalog::new(Arc::new(prober), Duration::from_millis(50));

        let err = catalog.register(dir.join("slow.mp4")).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let catalog = SourceCatalog::new(Arc::new(FixtureProber::new(&[])), Duration::from_secs(5));
        let err = catalog.duration(&SourceId::from("/media/never.mp4")).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSource { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_registration_agrees() {
        let dir = fixture_dir("reelcut_test_catalog_concurrent", &["a.mp4"]);
        let prober = Arc::new(FixtureProber::new(&[("a.mp4", 12.0)]));
        let catalog = Arc::new(SourceCatalog::new(prober, Duration::from_secs(5)));

        let mut handles = vec![];
        for _ in 0..8 {
            let catalog = catalog.clone();
            let path = dir.join("a.mp4");
            handles.push(tokio::spawn(async move { catalog.register(path).await }));
        }
        for handle in handles {
            let source = handle.await.unwrap().unwrap();
            assert!((source.duration() - 12.0).abs() < 1e-9);
        }
        assert_eq!(catalog.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
