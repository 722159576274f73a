//! Map a composite timestamp to its source, or a source offset back onto
//! the composite timeline.

use std::path::PathBuf;

use reelcut_common::config::EditSettings;
use reelcut_timeline_core::{CompositeMapping, Position};

/// Which direction to map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    /// Composite seconds to a source and local offset.
    At(f64),
    /// A source index and local offset to composite seconds.
    SourceOffset { source_index: usize, local_secs: f64 },
}

pub async fn run(
    sources: Vec<PathBuf>,
    settings: EditSettings,
    query: Query,
) -> anyhow::Result<()> {
    let prepared = super::prepare_sources(sources, settings, None).await?;
    println!("{}", describe(prepared.mapping(), query)?);
    Ok(())
}

fn describe(mapping: &CompositeMapping, query: Query) -> anyhow::Result<String> {
    match query {
        Query::At(at) => {
            let position = mapping.locate(at).map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(match position {
                Position::Source {
                    segment,
                    local_secs,
                } => format!(
                    "{at}s is in source #{}\n  File: {}\n  Local offset: {local_secs:.3}s",
                    segment.source_index, segment.source_id
                ),
                Position::Filler { gap, next } => format!(
                    "{at}s is filler ({:.3}s..{:.3}s)\n  Snaps to source #{} ({}) at 0s",
                    gap.composite_start, gap.composite_end, next.source_index, next.source_id
                ),
            })
        }
        Query::SourceOffset {
            source_index,
            local_secs,
        } => {
            let segment = mapping
                .segment(source_index)
                .ok_or_else(|| anyhow::anyhow!("No source #{source_index} in this timeline"))?;
            let composite = mapping.to_composite(source_index, local_secs).ok_or_else(|| {
                anyhow::anyhow!(
                    "{local_secs}s is outside source #{source_index} ({:.3}s long)",
                    segment.duration()
                )
            })?;
            Ok(format!(
                "Source #{source_index} at {local_secs}s is composite {composite:.3}s\n  File: {}",
                segment.source_id
            ))
        }
    }
}
