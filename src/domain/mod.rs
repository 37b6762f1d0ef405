//! Domain types used throughout the tool.
//!
//! This module defines:
//!
//! - year codes and their luminosities (`Year`)
//! - sample descriptors returned by the resolver (`SampleInfo`, `SampleKind`)
//! - plotting categories (`Category`)
//! - the analysis table driving the completeness checker (`Analysis`)

pub mod types;

pub use types::*;
