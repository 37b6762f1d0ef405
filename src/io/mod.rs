//! Input/output helpers.
//!
//! - skim directory enumeration + retry (`listing`)
//! - `<sample_id> <year> [no] [# comment]` job configs (`sample_config`)
//! - one-path-per-line file lists (`filelist`)
//! - sibling-file config rewriting (`rewrite`)

pub mod filelist;
pub mod listing;
pub mod rewrite;
pub mod sample_config;

pub use filelist::FileList;
pub use listing::{ListError, list_root_files, list_sample_files, list_with_retry};
pub use rewrite::RewriteError;
pub use sample_config::{ConfigEntry, SampleConfigError, parse_sample_config, read_sample_config};
