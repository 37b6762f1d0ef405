//! `skim-prep` library crate.
//!
//! The binary (`skimprep`) is a thin wrapper around this library so that:
//!
//! - sample resolution, grouping and checking are testable without spawning processes
//! - the DAS client sits behind a trait and can be faked
//! - each former helper script maps to one subcommand over shared code

pub mod app;
pub mod check;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod jobs;
pub mod report;
