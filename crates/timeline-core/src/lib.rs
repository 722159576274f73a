//! Reelcut Timeline Core
//!
//! Turns composite-time edit instructions into safe, source-local clips:
//! - **Composite:** Lay sources end-to-end with filler gaps and map offsets both ways
//! - **Translate:** Split instructions across segment boundaries, skipping filler
//! - **Validate:** Clamp or repair every clip against its source's true duration
//! - **Plan:** Order, trim to a target duration, and place transitions
//! - **Fallback:** Even-split clips for when no instruction survives
//!
//! This crate is pure computation: no I/O, no clocks, no global state.
//! Identical inputs always produce identical outputs.

pub mod composite;
pub mod fallback;
pub mod plan;
pub mod translate;
pub mod validate;

pub use composite::{compose, CompositeError, CompositeMapping, MappingOverflow, Position};
pub use fallback::fallback_candidates;
pub use plan::{PlanBuilder, PlanConfig, PlanError};
pub use translate::{translate, TranslateError};
pub use validate::{validate, InvalidClipError, Validated};

/// Slack for comparing composite timestamps produced by summing durations.
pub const BOUNDARY_EPSILON: f64 = 1e-9;
