//! Composite timeline construction and offset mapping.
//!
//! # Layout
//!
//! Sources are laid out in the given order with a fixed filler gap between
//! neighbours:
//!
//! ```text
//! [ source 0 ][gap][ source 1 ][gap][ source 2 ]
//! 0          D0  D0+g       ...              total
//! ```
//!
//! No gap precedes the first source or follows the last. Every entry covers
//! a half-open range, so each `t` in `[0, total)` belongs to exactly one
//! entry. Entry starts are kept in a sorted array for binary search.

use reelcut_edit_model::{Gap, Segment, SourceMedia, TimelineEntry};
use serde::Serialize;

use crate::BOUNDARY_EPSILON;

/// The composite timeline of one job. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeMapping {
    entries: Vec<TimelineEntry>,
    gap_duration_secs: f64,
    total_duration_secs: f64,

    /// Start offset of every entry, ascending.
    #[serde(skip)]
    boundaries: Vec<f64>,

    /// Entry index of each source's segment, by source index.
    #[serde(skip)]
    segment_entries: Vec<usize>,
}

/// Errors raised while composing a timeline.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("Cannot compose a timeline from zero sources")]
    EmptySourceList,

    #[error("Gap duration must be finite and non-negative (got {0}s)")]
    InvalidGapDuration(f64),
}

/// A composite timestamp outside `[0, total_duration]`.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Timestamp {timestamp}s is outside the composite timeline [0, {total_duration}s]")]
pub struct MappingOverflow {
    pub timestamp: f64,
    pub total_duration: f64,
}

/// Where a composite timestamp lands.
#[derive(Debug, Clone, PartialEq)]
pub enum Position<'a> {
    /// Inside a source, at `local_secs` from its start.
    Source {
        segment: &'a Segment,
        local_secs: f64,
    },
    /// Inside filler. `next` is the segment the point snaps to.
    Filler { gap: Gap, next: &'a Segment },
}

/// Build the composite timeline for `sources` in the given order.
///
/// A zero `gap_duration_secs` places sources back to back without Gap
/// entries.
pub fn compose(
    sources: &[SourceMedia],
    gap_duration_secs: f64,
) -> Result<CompositeMapping, CompositeError> {
    if sources.is_empty() {
        return Err(CompositeError::EmptySourceList);
    }
    if !gap_duration_secs.is_finite() || gap_duration_secs < 0.0 {
        return Err(CompositeError::InvalidGapDuration(gap_duration_secs));
    }

    let mut entries = Vec::with_capacity(sources.len() * 2 - 1);
    let mut segment_entries = Vec::with_capacity(sources.len());
    let mut cursor = 0.0;

    for (source_index, source) in sources.iter().enumerate() {
        let end = cursor + source.duration();
        segment_entries.push(entries.len());
        entries.push(TimelineEntry::Segment(Segment {
            source_id: source.id().clone(),
            source_index,
            composite_start: cursor,
            composite_end: end,
            source_duration_secs: source.duration(),
        }));
        cursor = end;

        let is_last = source_index + 1 == sources.len();
        if !is_last && gap_duration_secs > 0.0 {
            let gap_end = cursor + gap_duration_secs;
            entries.push(TimelineEntry::Gap(Gap {
                composite_start: cursor,
                composite_end: gap_end,
            }));
            cursor = gap_end;
        }
    }

    let boundaries = entries.iter().map(TimelineEntry::composite_start).collect();

    tracing::debug!(
        sources = sources.len(),
        gap_secs = gap_duration_secs,
        total_secs = cursor,
        "Composed timeline"
    );

    Ok(CompositeMapping {
        entries,
        gap_duration_secs,
        total_duration_secs: cursor,
        boundaries,
        segment_entries,
    })
}

impl CompositeMapping {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration_secs
    }

    pub fn gap_duration(&self) -> f64 {
        self.gap_duration_secs
    }

    /// Segments in composite order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.entries.iter().filter_map(TimelineEntry::as_segment)
    }

    /// The segment of the source at `source_index` in the composed list.
    pub fn segment(&self, source_index: usize) -> Option<&Segment> {
        self.segment_entries
            .get(source_index)
            .and_then(|&entry| self.entries[entry].as_segment())
    }

    /// Index of the entry containing `t`, treating entries as `[start, end)`.
    /// Caller guarantees `0 <= t < total`.
    pub(crate) fn entry_index_at(&self, t: f64) -> usize {
        self.boundaries
            .partition_point(|&start| start <= t)
            .saturating_sub(1)
    }

    /// Index of the entry whose range ends at or after `t`, treating entries
    /// as `(start, end]`. Used for exclusive range ends. Caller guarantees
    /// `0 < t <= total`.
    pub(crate) fn entry_index_ending_at(&self, t: f64) -> usize {
        self.boundaries
            .partition_point(|&start| start < t)
            .saturating_sub(1)
    }

    pub(crate) fn entry(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    /// Map a composite timestamp to the source (or filler) it falls in.
    pub fn locate(&self, t: f64) -> Result<Position<'_>, MappingOverflow> {
        if !t.is_finite() || t < 0.0 || t >= self.total_duration_secs {
            return Err(self.overflow(t));
        }

        let index = self.entry_index_at(t);
        match &self.entries[index] {
            TimelineEntry::Segment(segment) => Ok(Position::Source {
                segment,
                local_secs: segment.to_local(t),
            }),
            TimelineEntry::Gap(gap) => {
                let next = self
                    .entries
                    .get(index + 1)
                    .and_then(TimelineEntry::as_segment)
                    .ok_or_else(|| self.overflow(t))?;
                Ok(Position::Filler { gap: *gap, next })
            }
        }
    }

    /// Map a source-local offset back onto the composite timeline.
    ///
    /// Returns `None` for an unknown source index or an offset outside
    /// `[0, duration]`.
    pub fn to_composite(&self, source_index: usize, local_secs: f64) -> Option<f64> {
        let segment = self.segment(source_index)?;
        let in_range = local_secs.is_finite()
            && local_secs >= 0.0
            && local_secs <= segment.duration() + BOUNDARY_EPSILON;
        in_range.then(|| segment.to_composite(local_secs.min(segment.duration())))
    }

    pub(crate) fn overflow(&self, timestamp: f64) -> MappingOverflow {
        MappingOverflow {
            timestamp,
            total_duration: self.total_duration_secs,
        }
    }

    /// Re-check the layout invariants. Returns one message per problem.
    pub fn verify(&self) -> Vec<String> {
        let mut problems = vec![];

        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => {
                if first.is_gap() || last.is_gap() {
                    problems.push("Timeline must start and end with a segment".to_string());
                }
                if first.composite_start().abs() > BOUNDARY_EPSILON {
                    problems.push(format!(
                        "Timeline starts at {}s instead of 0",
                        first.composite_start()
                    ));
                }
                if (last.composite_end() - self.total_duration_secs).abs() > BOUNDARY_EPSILON {
                    problems.push(format!(
                        "Last entry ends at {}s but total is {}s",
                        last.composite_end(),
                        self.total_duration_secs
                    ));
                }
            }
            _ => problems.push("Timeline has no entries".to_string()),
        }

        for (i, pair) in self.entries.windows(2).enumerate() {
            let (left, right) = (&pair[0], &pair[1]);
            if (left.composite_end() - right.composite_start()).abs() > BOUNDARY_EPSILON {
                problems.push(format!(
                    "Entries {i} and {} are not contiguous ({}s vs {}s)",
                    i + 1,
                    left.composite_end(),
                    right.composite_start()
                ));
            }
            if left.is_gap() && right.is_gap() {
                problems.push(format!("Entries {i} and {} are adjacent gaps", i + 1));
            }
        }

        for entry in &self.entries {
            if let TimelineEntry::Gap(gap) = entry {
                if (gap.duration() - self.gap_duration_secs).abs() > BOUNDARY_EPSILON {
                    problems.push(format!(
                        "Gap at {}s lasts {}s, expected {}s",
                        gap.composite_start,
                        gap.duration(),
                        self.gap_duration_secs
                    ));
                }
            }
        }

        let segment_count = self.segments().count();
        let content: f64 = self.segments().map(Segment::duration).sum();
        let filler = segment_count.saturating_sub(1) as f64 * self.gap_duration_secs;
        if (content + filler - self.total_duration_secs).abs() > 1e-6 {
            problems.push(format!(
                "Content {content}s plus filler {filler}s does not equal total {}s",
                self.total_duration_secs
            ));
        }

        problems
    }
}
