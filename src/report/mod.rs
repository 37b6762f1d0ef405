//! Reporting utilities: terminal formatting of configurations and check results.

pub mod format;

pub use format::{format_check_report, format_custom_config, format_lumi, format_sample_config};
