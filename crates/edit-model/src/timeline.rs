//! Placements inside the composite timeline.
//!
//! The composite timeline lays sources end-to-end with fixed filler gaps
//! between them. Every entry covers a half-open range `[start, end)`.

use serde::{Deserialize, Serialize};

use crate::source::SourceId;

/// One source's placement in the composite timeline. Local time 0 of the
/// source sits at `composite_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Source this segment plays.
    pub source_id: SourceId,
    /// Position of the source in the composed list.
    pub source_index: usize,
    pub composite_start: f64,
    pub composite_end: f64,
    /// True duration of the source. `composite_end - composite_start` can
    /// differ from it by rounding.
    pub source_duration_secs: f64,
}

/// Filler between two segments. Carries no source content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub composite_start: f64,
    pub composite_end: f64,
}

/// An entry of the composite timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Segment(Segment),
    Gap(Gap),
}

impl Segment {
    /// Duration of the source, not of its composite span.
    pub fn duration(&self) -> f64 {
        self.source_duration_secs
    }

    /// Convert a composite offset to a local offset within this source,
    /// kept inside `[0, duration]`.
    pub fn to_local(&self, composite_secs: f64) -> f64 {
        (composite_secs - self.composite_start)
            .min(self.source_duration_secs)
            .max(0.0)
    }

    /// Convert a local offset within this source to a composite offset.
    pub fn to_composite(&self, local_secs: f64) -> f64 {
        self.composite_start + local_secs
    }
}

impl Gap {
    pub fn duration(&self) -> f64 {
        self.composite_end - self.composite_start
    }
}

impl TimelineEntry {
    pub fn composite_start(&self) -> f64 {
        match self {
            Self::Segment(segment) => segment.composite_start,
            Self::Gap(gap) => gap.composite_start,
        }
    }

    pub fn composite_end(&self) -> f64 {
        match self {
            Self::Segment(segment) => segment.composite_end,
            Self::Gap(gap) => gap.composite_end,
        }
    }

    /// Whether `t` lies in this entry's half-open range.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.composite_start() && t < self.composite_end()
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Self::Segment(segment) => Some(segment),
            Self::Gap(_) => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap(_))
    }
}
