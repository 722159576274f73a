//! Clamp and repair candidate clips against their source's true duration.
//!
//! This is the last gate before a renderer sees a clip reference. Whatever
//! the translator produced, the output here always satisfies
//! `0 <= local_start < local_end <= duration`, or the clip is rejected.
//!
//! Repairs, in order:
//!
//! 1. A non-finite or negative start becomes 0; a non-finite end becomes
//!    the duration.
//! 2. A start at or past the end of the source is remapped to 0.
//! 3. An end past the source is clamped to the duration.
//! 4. A range that is still empty is replaced by a minimal clip of
//!    `min_clip_secs` starting at the repaired start.

use reelcut_edit_model::{CandidateClip, ClipAdjustment, SourceId, SourceMedia, ValidatedClip};

/// A validated clip and the repairs it needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub clip: ValidatedClip,
    pub adjustments: Vec<ClipAdjustment>,
}

impl Validated {
    pub fn was_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

/// A candidate that no repair can save.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidClipError {
    #[error("Source {source_id} ({duration}s) is too short to host a {min_clip_secs}s clip")]
    SourceTooShort {
        source_id: SourceId,
        duration: f64,
        min_clip_secs: f64,
    },

    #[error("Clip references {clip_source} but was validated against {source_id}")]
    SourceMismatch {
        clip_source: SourceId,
        source_id: SourceId,
    },
}

/// Validate `clip` against `source`.
pub fn validate(
    clip: CandidateClip,
    source: &SourceMedia,
    min_clip_secs: f64,
) -> Result<Validated, InvalidClipError> {
    if &clip.source_id != source.id() {
        return Err(InvalidClipError::SourceMismatch {
            clip_source: clip.source_id,
            source_id: source.id().clone(),
        });
    }

    let duration = source.duration();
    let too_short = || InvalidClipError::SourceTooShort {
        source_id: source.id().clone(),
        duration,
        min_clip_secs,
    };

    let mut adjustments = vec![];
    let mut start = clip.local_start;
    let mut end = clip.local_end;

    if !start.is_finite() {
        adjustments.push(ClipAdjustment::StartNotFinite);
        start = 0.0;
    } else if start < 0.0 {
        adjustments.push(ClipAdjustment::StartBeforeZero { requested: start });
        start = 0.0;
    }
    if !end.is_finite() {
        adjustments.push(ClipAdjustment::EndNotFinite { duration });
        end = duration;
    }

    if start >= duration {
        adjustments.push(ClipAdjustment::StartPastEnd {
            requested: start,
            duration,
        });
        start = 0.0;
    }
    if end > duration {
        adjustments.push(ClipAdjustment::EndPastDuration {
            requested: end,
            duration,
        });
        end = duration;
    }

    if start >= end {
        if min_clip_secs.is_nan() || min_clip_secs <= 0.0 || duration < min_clip_secs {
            return Err(too_short());
        }
        end = (start + min_clip_secs).min(duration);
        if start >= end {
            return Err(too_short());
        }
        adjustments.push(ClipAdjustment::MinimalClipSynthesized { start, end });
    }

    if !adjustments.is_empty() {
        tracing::warn!(
            instruction = clip.instruction_index,
            source = %source.id().file_name(),
            requested_start = clip.local_start,
            requested_end = clip.local_end,
            start,
            end,
            adjustments = adjustments.len(),
            "Clip adjusted to fit source duration"
        );
    }

    let validated = ValidatedClip::new(source, clip.instruction_index, start, end, clip.attributes)
        .ok_or_else(too_short)?;

    Ok(Validated {
        clip: validated,
        adjustments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reelcut_edit_model::Attributes;

    fn source(duration: f64) -> SourceMedia {
        SourceMedia::new("/media/a.mp4", duration).unwrap()
    }

    fn candidate(start: f64, end: f64) -> CandidateClip {
        CandidateClip {
            source_id: SourceId::from("/media/a.mp4"),
            instruction_index: 0,
            local_start: start,
            local_end: end,
            attributes: Attributes::new(),
        }
    }

    fn range(validated: &Validated) -> (f64, f64) {
        (validated.clip.local_start(), validated.clip.local_end())
    }

    #[test]
    fn test_in_range_clip_is_unchanged() {
        let validated = validate(candidate(2.0, 7.5), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (2.0, 7.5));
        assert!(!validated.was_adjusted());
    }

    #[test]
    fn test_clamps_both_ends() {
        let validated = validate(candidate(-5.0, 20.0), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (0.0, 10.0));
        assert_eq!(
            validated.adjustments,
            vec![
                ClipAdjustment::StartBeforeZero { requested: -5.0 },
                ClipAdjustment::EndPastDuration {
                    requested: 20.0,
                    duration: 10.0
                },
            ]
        );
    }

    #[test]
    fn test_start_past_end_remaps_to_zero() {
        let validated = validate(candidate(12.0, 18.0), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (0.0, 10.0));
        assert_eq!(validated.adjustments.len(), 2);
    }

    #[test]
    fn test_empty_range_gets_minimal_clip() {
        let validated = validate(candidate(4.0, 4.0), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (4.0, 6.0));
        assert!(matches!(
            validated.adjustments.last(),
            Some(ClipAdjustment::MinimalClipSynthesized { .. })
        ));
    }

    #[test]
    fn test_minimal_clip_is_capped_by_duration() {
        let validated = validate(candidate(9.0, 3.0), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (9.0, 10.0));
    }

    #[test]
    fn test_source_too_short_for_minimal_clip() {
        let err = validate(candidate(1.0, 1.0), &source(1.5), 2.0).unwrap_err();
        assert!(matches!(err, InvalidClipError::SourceTooShort { .. }));
    }

    #[test]
    fn test_short_source_still_hosts_valid_clip() {
        let validated = validate(candidate(0.2, 1.0), &source(1.5), 2.0).unwrap();
        assert_eq!(range(&validated), (0.2, 1.0));
    }

    #[test]
    fn test_non_finite_bounds() {
        let validated = validate(candidate(f64::NAN, f64::INFINITY), &source(10.0), 2.0).unwrap();
        assert_eq!(range(&validated), (0.0, 10.0));
        assert_eq!(validated.adjustments.len(), 2);
    }

    #[test]
    fn test_source_mismatch() {
        let other = SourceMedia::new("/media/b.mp4", 10.0).unwrap();
        let err = validate(candidate(0.0, 1.0), &other, 2.0).unwrap_err();
        assert!(matches!(err, InvalidClipError::SourceMismatch { .. }));
    }

    proptest! {
        #[test]
        fn prop_output_always_within_source(
            start in -100.0f64..100.0,
            end in -100.0f64..100.0,
            duration in 2.0f64..60.0,
        ) {
            let validated = validate(candidate(start, end), &source(duration), 2.0).unwrap();
            let (s, e) = range(&validated);
            prop_assert!(s >= 0.0);
            prop_assert!(s < e);
            prop_assert!(e <= duration);
        }

        #[test]
        fn prop_valid_clips_pass_through(
            duration in 1.0f64..60.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            prop_assume!(hi - lo > 1e-6);
            let (start, end) = (lo * duration, hi * duration);
            let validated = validate(candidate(start, end), &source(duration), 2.0).unwrap();
            prop_assert_eq!(range(&validated), (start, end));
            prop_assert!(!validated.was_adjusted());
        }
    }
}
