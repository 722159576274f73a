//! Composite-time instructions to source-local candidate clips.
//!
//! # Algorithm
//!
//! 1. **Reject** inverted, empty or non-finite ranges outright.
//! 2. **Bound** both ends to `[0, total_duration]`.
//! 3. **Snap** any end point that lands in filler to the start of the next
//!    segment.
//! 4. **Walk** every segment the snapped range overlaps and emit the
//!    intersection in local time. Filler inside the range contributes
//!    nothing, so a range spanning one gap yields two clips whose lengths
//!    sum to the span minus the gap.

use reelcut_edit_model::{CandidateClip, EditInstruction, TimelineEntry};

use crate::composite::{CompositeMapping, MappingOverflow};
use crate::BOUNDARY_EPSILON;

/// Why an instruction could not be translated. Each error concerns only the
/// instruction that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("Instruction range {start}s..{end}s is degenerate")]
    DegenerateInstruction { start: f64, end: f64 },

    #[error(transparent)]
    MappingOverflow(#[from] MappingOverflow),

    #[error("Instruction range {start}s..{end}s covers only filler")]
    FillerOnly { start: f64, end: f64 },
}

/// Translate one instruction into candidate clips, in composite order.
///
/// `index` is the instruction's position in its batch; it is stamped on
/// every emitted clip along with a copy of the instruction's attributes.
pub fn translate(
    index: usize,
    instruction: &EditInstruction,
    mapping: &CompositeMapping,
) -> Result<Vec<CandidateClip>, TranslateError> {
    let start = instruction.composite_start;
    let end = instruction.composite_end;

    if !start.is_finite() || !end.is_finite() || end <= start {
        return Err(TranslateError::DegenerateInstruction { start, end });
    }

    let total = mapping.total_duration();
    let start = absorb_rounding(start, 0.0);
    let end = absorb_rounding(end, total);
    if start < 0.0 || start >= total {
        return Err(mapping.overflow(start).into());
    }
    if end > total {
        return Err(mapping.overflow(end).into());
    }

    let (first_entry, snapped_start) = snap_start(mapping, start)?;
    let (last_entry, snapped_end) = snap_end(mapping, end)?;

    if snapped_end - snapped_start <= BOUNDARY_EPSILON {
        return Err(TranslateError::FillerOnly { start, end });
    }

    let mut clips = vec![];
    for entry_index in first_entry..=last_entry {
        let Some(TimelineEntry::Segment(segment)) = mapping.entry(entry_index) else {
            continue;
        };

        let from = snapped_start.max(segment.composite_start);
        let to = snapped_end.min(segment.composite_end);
        if to - from <= BOUNDARY_EPSILON {
            continue;
        }

        let clip = CandidateClip {
            source_id: segment.source_id.clone(),
            instruction_index: index,
            local_start: segment.to_local(from),
            // The composite end is a rounded sum; reaching it means the
            // source's own end.
            local_end: if to >= segment.composite_end {
                segment.duration()
            } else {
                segment.to_local(to)
            },
            attributes: instruction.attributes.clone(),
        };
        tracing::debug!(
            instruction = index,
            source = %segment.source_id.file_name(),
            local_start = clip.local_start,
            local_end = clip.local_end,
            "Translated clip"
        );
        clips.push(clip);
    }

    if clips.is_empty() {
        return Err(TranslateError::FillerOnly { start, end });
    }

    Ok(clips)
}

/// Pull a value that missed `edge` by rounding noise onto the edge.
fn absorb_rounding(value: f64, edge: f64) -> f64 {
    if (value - edge).abs() <= BOUNDARY_EPSILON {
        edge
    } else {
        value
    }
}

/// Entry index and snapped position for an inclusive range start.
fn snap_start(mapping: &CompositeMapping, t: f64) -> Result<(usize, f64), TranslateError> {
    let index = mapping.entry_index_at(t);
    snap_into_segment(mapping, index, t)
}

/// Entry index and snapped position for an exclusive range end.
fn snap_end(mapping: &CompositeMapping, t: f64) -> Result<(usize, f64), TranslateError> {
    let index = mapping.entry_index_ending_at(t);
    snap_into_segment(mapping, index, t)
}

/// Points in filler move forward to the start of the next segment.
fn snap_into_segment(
    mapping: &CompositeMapping,
    index: usize,
    t: f64,
) -> Result<(usize, f64), TranslateError> {
    match mapping.entry(index) {
        Some(TimelineEntry::Segment(_)) => Ok((index, t)),
        Some(TimelineEntry::Gap(_)) => match mapping.entry(index + 1) {
            Some(TimelineEntry::Segment(next)) => Ok((index + 1, next.composite_start)),
            // A gap never trails the timeline; treat it as running off the end.
            _ => Err(mapping.overflow(t).into()),
        },
        None => Err(mapping.overflow(t).into()),
    }
}
