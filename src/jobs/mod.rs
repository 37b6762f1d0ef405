//! Splitting file lists into batch jobs.
//!
//! - fixed-size contiguous job groups (`grouper`)
//! - Condor manifests for the skimming step (`manifest`)

pub mod grouper;
pub mod manifest;

pub use grouper::{GroupError, group_files, job_count, job_files};
pub use manifest::{ManifestError, ManifestLine, SkimInputs, build_skim_inputs, dataset_lines, suffixed_path};
