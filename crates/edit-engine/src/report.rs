//! Job reports and instruction files.

use std::path::{Path, PathBuf};

use serde::Serialize;

use reelcut_common::error::{ReelcutError, ReelcutResult};
use reelcut_edit_model::{
    parse_instructions, ClipAdjustment, EditInstruction, EditPlan, RenderRecord, SourceId,
    SourceMedia,
};
use reelcut_timeline_core::{CompositeMapping, Validated};

/// Everything a job produced, ready for the render step.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// RFC 3339 timestamp.
    pub generated_at: String,

    /// Sources as probed, in timeline order.
    pub sources: Vec<SourceMedia>,

    /// The composite timeline the instructions were read against.
    pub composite: CompositeMapping,

    pub composite_artifact: Option<PathBuf>,

    pub plan: EditPlan,

    /// The plan flattened for the renderer.
    pub render_records: Vec<RenderRecord>,

    /// Clips the validator had to repair.
    pub adjustments: Vec<AdjustmentRecord>,

    /// Instructions dropped under the skip policy.
    pub skipped: Vec<SkippedInstruction>,

    /// Whether the plan came from the even-split fallback.
    pub used_fallback: bool,
}

/// Repairs applied to one clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentRecord {
    pub instruction_index: usize,
    pub source_id: SourceId,
    pub adjustments: Vec<ClipAdjustment>,
}

impl AdjustmentRecord {
    pub(crate) fn from_validated(validated: &Validated) -> Self {
        Self {
            instruction_index: validated.clip.instruction_index(),
            source_id: validated.clip.source_id().clone(),
            adjustments: validated.adjustments.clone(),
        }
    }
}

/// An instruction that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInstruction {
    pub index: usize,
    pub reason: String,
}

impl JobReport {
    pub fn achieved_duration(&self) -> f64 {
        self.plan.achieved_duration_secs
    }
}

/// Write a report as pretty JSON, creating parent directories.
pub fn write_report(report: &JobReport, path: &Path) -> ReelcutResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        clips = report.render_records.len(),
        "Wrote job report"
    );
    Ok(())
}

/// Read analysis output from a file.
pub fn load_instructions(path: &Path) -> ReelcutResult<Vec<EditInstruction>> {
    if !path.exists() {
        return Err(ReelcutError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    let instructions = parse_instructions(&text)
        .map_err(|e| ReelcutError::instructions(format!("{}: {e}", path.display())))?;

    tracing::debug!(
        path = %path.display(),
        count = instructions.len(),
        "Loaded instructions"
    );
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_edit_model::ValidatedClip;
    use reelcut_timeline_core::{compose, PlanBuilder};

    fn sample_report() -> JobReport {
        let source = SourceMedia::new("/footage/intro.mp4", 10.0).unwrap();
        let clip = ValidatedClip::new(&source, 0, 1.0, 9.0, Default::default()).unwrap();
        let plan = PlanBuilder::with_defaults().build(vec![clip]).unwrap();

        JobReport {
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            composite: compose(std::slice::from_ref(&source), 1.0).unwrap(),
            sources: vec![source],
            composite_artifact: None,
            render_records: plan.render_records(),
            plan,
            adjustments: vec![],
            skipped: vec![SkippedInstruction {
                index: 3,
                reason: "covers only filler".to_string(),
            }],
            used_fallback: false,
        }
    }

    #[test]
    fn test_write_report() {
        let dir = std::env::temp_dir().join("reelcut_test_report_write");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("report.json");

        write_report(&sample_report(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["render_records"][0]["local_start"], 1.0);
        assert_eq!(value["render_records"][0]["source_path"], "/footage/intro.mp4");
        assert_eq!(value["composite"]["entries"][0]["kind"], "segment");
        assert_eq!(value["skipped"][0]["index"], 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_fenced_instructions() {
        let path = std::env::temp_dir().join("reelcut_test_report_instructions.json");
        std::fs::write(
            &path,
            "```json\n[{\"start\": 0.0, \"end\": 4.5, \"attributes\": {\"mood\": \"calm\"}}]\n```\n",
        )
        .unwrap();

        let instructions = load_instructions(&path).unwrap();
        assert_eq!(instructions.len(), 1);
        assert!((instructions[0].composite_end - 4.5).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_malformed_instructions() {
        let path = std::env::temp_dir().join("reelcut_test_report_malformed.json");
        std::fs::write(&path, r#"[{"start": 0.0, "end": 1.0}, {"start": "soon"}]"#).unwrap();

        let err = load_instructions(&path).unwrap_err();
        assert!(matches!(err, ReelcutError::Instructions { .. }));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_instructions() {
        let path = std::env::temp_dir().join("reelcut_test_report_missing.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            load_instructions(&path),
            Err(ReelcutError::FileNotFound { .. })
        ));
    }
}
