//! Reelcut Source Catalog
//!
//! Registers source files for a job and records their true durations.
//! Each file is probed once; later lookups are pure reads, so a populated
//! catalog can be shared between concurrent jobs behind an `Arc`.

pub mod catalog;
pub mod probe;

pub use catalog::{CatalogError, SourceCatalog};
pub use probe::{DurationProber, FfprobeProber, ProbeError};
