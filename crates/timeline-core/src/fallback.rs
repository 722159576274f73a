//! Even-split candidate clips for when the analysis step yields nothing
//! usable.
//!
//! Each source contributes one clip from its start, `min(target / n, max)`
//! seconds long, until the target is covered. The clips still go through
//! validation, so a short source is clamped like any other candidate.

use reelcut_edit_model::{Attributes, CandidateClip, SourceMedia};

/// Attribute marking clips produced by the fallback planner.
pub const ORIGIN_ATTRIBUTE: &str = "origin";

/// Value of [`ORIGIN_ATTRIBUTE`] on fallback clips.
pub const FALLBACK_ORIGIN: &str = "fallback";

/// Cut one clip per source from the start, spreading `target_secs` evenly.
///
/// Clips are numbered by source position in `instruction_index` since no
/// real instruction stands behind them.
pub fn fallback_candidates(
    sources: &[SourceMedia],
    target_secs: f64,
    max_clip_secs: f64,
) -> Vec<CandidateClip> {
    let positive = |secs: f64| secs.is_finite() && secs > 0.0;
    if sources.is_empty() || !positive(target_secs) || !positive(max_clip_secs) {
        return vec![];
    }

    let per_clip = (target_secs / sources.len() as f64).min(max_clip_secs);
    let mut attributes = Attributes::new();
    attributes.insert(ORIGIN_ATTRIBUTE.to_string(), FALLBACK_ORIGIN.into());

    sources
        .iter()
        .enumerate()
        .map_while(|(i, source)| {
            let offset = i as f64 * per_clip;
            if offset >= target_secs {
                return None;
            }
            let length = (offset + per_clip).min(target_secs) - offset;
            Some(CandidateClip {
                source_id: source.id().clone(),
                instruction_index: i,
                local_start: 0.0,
                local_end: length,
                attributes: attributes.clone(),
            })
        })
        .collect()
}
