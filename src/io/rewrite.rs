//! Line-oriented config rewriting.
//!
//! Every rewrite reads one file and writes a *different* one; the input is
//! never touched.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Year;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("input file {0} does not exist")]
    MissingInput(PathBuf),

    #[error("refusing to overwrite the input file {0}")]
    SamePath(PathBuf),

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Years covered by the WZ sample tables, in output order.
pub const WZ_YEARS: [Year; 6] = Year::ALL;
/// MadGraph WZ sample per year in [`WZ_YEARS`].
pub const WZ_MADGRAPH: [u32; 6] = [179, 279, 379, 479, 579, 579];
/// Powheg WZ sample per year in [`WZ_YEARS`].
pub const WZ_POWHEG: [u32; 6] = [103, 203, 303, 403, 503, 503];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WzGenerator {
    MadGraph,
    Powheg,
}

impl WzGenerator {
    pub fn from_flag(is_madgraph: bool) -> Self {
        if is_madgraph { WzGenerator::MadGraph } else { WzGenerator::Powheg }
    }

    pub fn sample_ids(self) -> [u32; 6] {
        match self {
            WzGenerator::MadGraph => WZ_MADGRAPH,
            WzGenerator::Powheg => WZ_POWHEG,
        }
    }
}

/// Sample ID of a config line (its first token), if it has one.
pub fn line_sample_id(line: &str) -> Option<u32> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    trimmed.split_whitespace().next()?.parse().ok()
}

/// Drop lines whose sample ID is in `denylist`; keep everything else verbatim.
pub fn strip_samples<'a>(text: &'a str, denylist: &BTreeSet<u32>) -> Vec<&'a str> {
    text.lines()
        .filter(|line| line_sample_id(line).is_none_or(|id| !denylist.contains(&id)))
        .collect()
}

/// Every WZ sample of both generators.
pub fn wz_denylist() -> BTreeSet<u32> {
    WZ_MADGRAPH.into_iter().chain(WZ_POWHEG).collect()
}

/// New job config: the preferred generator's WZ lines first, then the input
/// with all WZ lines removed.
pub fn remake_wz_jobs(input: &str, preferred: WzGenerator) -> String {
    let mut out = String::new();
    for (id, year) in preferred.sample_ids().into_iter().zip(WZ_YEARS) {
        out.push_str(&format!("{id} {year}\n"));
    }
    for line in strip_samples(input, &wz_denylist()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// `foo.cfg` -> `foo_new.cfg` (or `foo` -> `foo_new`).
pub fn sibling_path(input: &Path, tag: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let new_name = match file_name.strip_suffix(".cfg") {
        Some(stem) => format!("{stem}_{tag}.cfg"),
        None => format!("{file_name}_{tag}"),
    };
    input.with_file_name(new_name)
}

/// Read `input`, transform it, write `output`. `output` must differ from `input`.
pub fn rewrite_file<F>(input: &Path, output: &Path, transform: F) -> Result<(), RewriteError>
where
    F: FnOnce(&str) -> String,
{
    if !input.exists() {
        return Err(RewriteError::MissingInput(input.to_path_buf()));
    }
    if same_file(input, output) {
        return Err(RewriteError::SamePath(output.to_path_buf()));
    }

    let text = fs::read_to_string(input).map_err(|source| RewriteError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    fs::write(output, transform(&text)).map_err(|source| RewriteError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    tracing::info!("Wrote {} (from {})", output.display(), input.display());
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
