//! DAS (Data Aggregation Service) file discovery via the `dasgoclient` CLI.
//!
//! The client prints one logical file name per line; we keep the `/store/...`
//! lines and turn them into XRootD URLs through a redirector.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Logical file names served through XRootD start with this prefix.
pub const STORE_PREFIX: &str = "/store/";

#[derive(Error, Debug)]
pub enum DasError {
    #[error("DAS client '{program}' not found on PATH: {source}")]
    ClientNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run DAS client: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("DAS query for {dataset} failed ({status}): {stderr}")]
    QueryFailed {
        dataset: String,
        status: String,
        stderr: String,
    },
}

/// Dataset -> file URL enumeration.
///
/// The subprocess client is the production implementation; tests and the
/// pipeline code only depend on this seam.
pub trait DatasetQuery {
    fn query_files(&self, dataset: &str) -> Result<Vec<String>, DasError>;
}

pub struct DasClient {
    program: PathBuf,
    redirector: String,
}

impl DasClient {
    pub fn new(program: impl Into<PathBuf>, redirector: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            redirector: redirector.into(),
        }
    }

    /// Locate `program` on PATH (or accept it as a path) before any query runs.
    pub fn locate(program: &str, redirector: impl Into<String>) -> Result<Self, DasError> {
        let resolved = which::which(program).map_err(|source| DasError::ClientNotFound {
            program: program.to_string(),
            source,
        })?;
        Ok(Self::new(resolved, redirector))
    }
}

impl DatasetQuery for DasClient {
    fn query_files(&self, dataset: &str) -> Result<Vec<String>, DasError> {
        let query = file_query(dataset);
        tracing::info!("DAS query: {} -query '{query}'", self.program.display());

        let output = Command::new(&self.program)
            .args(["-query", &query])
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(DasError::QueryFailed {
                dataset: dataset.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let files = parse_das_output(&stdout, &self.redirector);
        if files.is_empty() {
            tracing::warn!("DAS returned no files for {dataset}");
        } else {
            tracing::info!("Found {} files for {dataset}", files.len());
        }
        Ok(files)
    }
}

/// DAS query string listing the files of a dataset.
pub fn file_query(dataset: &str) -> String {
    format!("file dataset={dataset}")
}

/// Keep `/store/` lines of DAS output and convert them to XRootD URLs.
pub fn parse_das_output(stdout: &str, redirector: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(STORE_PREFIX))
        .map(|line| xrootd_url(redirector, line))
        .collect()
}

/// `root://<redirector>/<lfn>`; the LFN keeps its leading slash.
pub fn xrootd_url(redirector: &str, lfn: &str) -> String {
    format!("root://{redirector}/{lfn}")
}
