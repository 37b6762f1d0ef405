//! Sample lookup and remote dataset discovery.
//!
//! - static sample table + user catalog overrides (`catalog`)
//! - DAS client subprocess wrapper (`das`)

pub mod catalog;
pub mod das;

pub use catalog::{CatalogFile, ResolveError, SampleCatalog, das_name_from_dir, dir_from_das_name};
pub use das::{DasClient, DasError, DatasetQuery, parse_das_output};
