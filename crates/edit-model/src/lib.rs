//! Reelcut Edit Model
//!
//! Defines the data contracts that flow through an edit job:
//! - **Sources:** Probed media files and their true durations
//! - **Timeline:** Segment and filler placements inside the composite timeline
//! - **Instructions:** Untrusted composite-time directives from the analysis step
//! - **Clips:** Source-local candidates and their validated form
//! - **Plan:** The ordered, trimmed result handed to a renderer
//!
//! All times are seconds as `f64`. Composite times are offsets into the
//! virtual timeline; local times are offsets into one source file.

pub mod clip;
pub mod instruction;
pub mod plan;
pub mod source;
pub mod timeline;

pub use clip::*;
pub use instruction::*;
pub use plan::*;
pub use source::*;
pub use timeline::*;
