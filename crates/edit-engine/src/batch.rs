//! Concurrent jobs over one shared catalog.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use reelcut_edit_model::EditInstruction;
use reelcut_source_catalog::SourceCatalog;

use crate::job::{run_job, EditJob, JobError};
use crate::report::JobReport;

/// A job paired with the instructions already produced for it.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job: EditJob,
    pub instructions: Vec<EditInstruction>,
}

/// Run every job as its own task. Results come back in submission order;
/// one job failing does not affect the others.
pub async fn run_batch(
    jobs: Vec<BatchJob>,
    catalog: Arc<SourceCatalog>,
    cancel: Arc<AtomicBool>,
) -> Vec<Result<JobReport, JobError>> {
    tracing::info!(jobs = jobs.len(), "Starting batch");

    let handles: Vec<_> = jobs
        .into_iter()
        .enumerate()
        .map(|(position, batch)| {
            let catalog = catalog.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = run_job(&batch.job, &batch.instructions, catalog, &cancel).await;
                if let Err(e) = &result {
                    tracing::warn!(job = position, error = %e, "Batch job failed");
                }
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(JobError::Task(e.to_string())),
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_catalog, fixture_dir};
    use reelcut_common::config::EditSettings;
    use std::sync::atomic::Ordering;

    const FIXTURE: &[(&str, f64)] = &[("a.mp4", 12.0), ("b.mp4", 8.0)];

    fn settings() -> EditSettings {
        EditSettings {
            target_duration_secs: 10.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let dir = fixture_dir("reelcut_test_batch_order", FIXTURE);
        let catalog = fixture_catalog(FIXTURE);

        let jobs = vec![
            BatchJob {
                job: EditJob::new(vec![dir.join("a.mp4")], settings()),
                instructions: vec![EditInstruction::new(0.0, 10.0)],
            },
            BatchJob {
                job: EditJob::new(vec![dir.join("missing.mp4")], settings()),
                instructions: vec![],
            },
            BatchJob {
                job: EditJob::new(vec![dir.join("b.mp4"), dir.join("a.mp4")], settings()),
                instructions: vec![EditInstruction::new(0.0, 8.0)],
            },
        ];

        let results = run_batch(jobs, catalog.clone(), Arc::new(AtomicBool::new(false))).await;

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap();
        assert!(first.render_records[0].source_path.ends_with("a.mp4"));
        assert!(matches!(results[1], Err(JobError::Catalog(_))));
        let third = results[2].as_ref().unwrap();
        assert!(third.render_records[0].source_path.ends_with("b.mp4"));
        // Both jobs registered a.mp4; the catalog holds it once.
        assert_eq!(catalog.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_cancelled_batch() {
        let dir = fixture_dir("reelcut_test_batch_cancel", FIXTURE);
        let cancel = Arc::new(AtomicBool::new(false));
        cancel.store(true, Ordering::SeqCst);

        let jobs = vec![BatchJob {
            job: EditJob::new(vec![dir.join("a.mp4")], settings()),
            instructions: vec![EditInstruction::new(0.0, 10.0)],
        }];
        let results = run_batch(jobs, fixture_catalog(FIXTURE), cancel).await;
        assert!(matches!(results[0], Err(JobError::Cancelled)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
