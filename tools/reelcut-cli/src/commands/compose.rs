//! Probe sources and print their composite timeline.

use std::path::PathBuf;

use reelcut_common::config::EditSettings;

pub async fn run(
    sources: Vec<PathBuf>,
    settings: EditSettings,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let prepared = super::prepare_sources(sources, settings, None).await?;

    eprintln!(
        "Composite timeline: {} sources, {:.3}s total",
        prepared.sources().len(),
        prepared.total_duration()
    );

    let json = serde_json::to_string_pretty(prepared.mapping())?;
    super::emit(&json, output)
}
