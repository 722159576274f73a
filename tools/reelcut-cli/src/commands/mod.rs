pub mod compose;
pub mod locate;
pub mod plan;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reelcut_common::config::EditSettings;
use reelcut_edit_engine::{prepare, EditJob, PreparedJob};
use reelcut_source_catalog::SourceCatalog;

/// Probe `sources` with ffprobe and build their composite timeline.
async fn prepare_sources(
    sources: Vec<PathBuf>,
    settings: EditSettings,
    artifact: Option<PathBuf>,
) -> anyhow::Result<PreparedJob> {
    let catalog = Arc::new(SourceCatalog::with_ffprobe(Duration::from_secs(
        settings.probe_timeout_secs,
    )));

    let mut job = EditJob::new(sources, settings);
    if let Some(artifact) = artifact {
        job = job.with_composite_artifact(artifact);
    }

    prepare(&job, catalog)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare sources: {e}"))
}

/// Print `json` or write it to `output`.
fn emit(json: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
