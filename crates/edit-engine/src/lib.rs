//! Reelcut Edit Engine
//!
//! Drives one edit job from source paths to a finished report.
//!
//! # Pipeline
//!
//! ```text
//! paths ── SourceCatalog ── compose ──► CompositeMapping ──► analysis step
//!                                              │                  │
//!                                              │          EditInstruction[]
//!                                              ▼                  │
//!                          translate ◄────────────────────────────┘
//!                              │
//!                          validate (catalog durations)
//!                              │
//!                          PlanBuilder ──► JobReport (plan, render records, audit)
//! ```
//!
//! Preparation and planning are separate calls so the composite duration
//! can be handed to the analysis step before any instruction exists.

pub mod batch;
pub mod job;
pub mod report;

pub use batch::{run_batch, BatchJob};
pub use job::{prepare, run_job, EditJob, InstructionError, JobError, PreparedJob};
pub use report::{load_instructions, write_report, AdjustmentRecord, JobReport, SkippedInstruction};

#[cfg(test)]
mod testing;
