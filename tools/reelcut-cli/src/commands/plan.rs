//! Run a full edit job against analysis output.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reelcut_common::config::EditSettings;
use reelcut_edit_engine::{load_instructions, write_report};

pub async fn run(
    sources: Vec<PathBuf>,
    instructions: PathBuf,
    settings: EditSettings,
    artifact: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let instructions = load_instructions(&instructions)
        .map_err(|e| anyhow::anyhow!("Failed to load instructions: {e}"))?;

    let prepared = super::prepare_sources(sources, settings, artifact).await?;
    eprintln!(
        "Composite timeline: {} sources, {:.3}s total",
        prepared.sources().len(),
        prepared.total_duration()
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling job");
            cancel_on_signal.store(true, Ordering::SeqCst);
        }
    });

    let report = prepared
        .plan(&instructions, &cancel)
        .map_err(|e| anyhow::anyhow!("Edit job failed: {e}"))?;

    eprintln!(
        "Planned {} clips, {:.3}s of {:.3}s target",
        report.plan.len(),
        report.achieved_duration(),
        report.plan.target_duration_secs
    );
    if !report.skipped.is_empty() {
        eprintln!("  Skipped {} instructions", report.skipped.len());
    }
    if !report.adjustments.is_empty() {
        eprintln!("  Repaired {} clips", report.adjustments.len());
    }
    if let Some(shortfall) = &report.plan.shortfall {
        eprintln!("  Short of target by {:.3}s", shortfall.missing_secs);
    }
    if report.used_fallback {
        eprintln!("  Used even-split fallback");
    }

    match output {
        Some(path) => {
            write_report(&report, &path)
                .map_err(|e| anyhow::anyhow!("Failed to write report: {e}"))?;
            eprintln!("Report written to: {}", path.display());
            Ok(())
        }
        None => super::emit(&serde_json::to_string_pretty(&report)?, None),
    }
}
