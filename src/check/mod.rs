//! Pre-submission completeness check.
//!
//! For every enabled line of an analysis job config, resolve the sample's
//! skim files and verify each one exists and is at least `min_file_size`
//! bytes. Unlike everything else in the tool this scan accumulates problems
//! instead of stopping at the first one, so a single run reports everything
//! that still has to be produced.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::data::SampleCatalog;
use crate::domain::{Analysis, Year};
use crate::io::{list_sample_files, read_sample_config};
use crate::jobs::{GroupError, job_count};

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("failed to write report '{path}': {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a sample failed the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    Missing { path: String },
    TooSmall { path: String, bytes: u64 },
    NoFiles { directory: String },
    Unresolved { message: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing { path } => write!(f, "{path}"),
            Problem::TooSmall { path, bytes } => write!(f, "{path} (too small: {bytes} bytes)"),
            Problem::NoFiles { directory } => write!(f, "NO FILES found in {directory}"),
            Problem::Unresolved { message } => write!(f, "ERROR resolving sample: {message}"),
        }
    }
}

/// Check a single file. `None` means it is present and large enough.
pub fn check_file(path: &Path, min_size: u64) -> Option<Problem> {
    match fs::metadata(path) {
        Err(_) => Some(Problem::Missing {
            path: path.display().to_string(),
        }),
        Ok(meta) if meta.len() < min_size => Some(Problem::TooSmall {
            path: path.display().to_string(),
            bytes: meta.len(),
        }),
        Ok(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleCheck {
    pub sample_id: u32,
    pub year: Year,
    pub total: usize,
    pub jobs: usize,
    pub problems: Vec<Problem>,
}

impl SampleCheck {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Knobs shared by every sample of a run.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    pub min_file_size: u64,
    /// Overrides each analysis' default job group size.
    pub group_override: Option<usize>,
}

pub fn check_sample(
    catalog: &SampleCatalog,
    sample_id: u32,
    year: Year,
    skim_type: &str,
    group: usize,
    min_size: u64,
) -> Result<SampleCheck, CheckError> {
    let mut check = SampleCheck {
        sample_id,
        year,
        total: 0,
        jobs: 0,
        problems: Vec::new(),
    };

    let info = match catalog.resolve(sample_id, skim_type, Some(year)) {
        Ok(info) => info,
        Err(err) => {
            check.problems.push(Problem::Unresolved {
                message: err.to_string(),
            });
            return Ok(check);
        }
    };

    let files = list_sample_files(&info);
    if files.is_empty() {
        let directory = info
            .primary_directory()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        check.problems.push(Problem::NoFiles { directory });
        return Ok(check);
    }

    check.total = files.len();
    check.jobs = job_count(files.len(), group)?;
    check.problems = files
        .iter()
        .filter_map(|f| check_file(Path::new(f), min_size))
        .collect();

    tracing::debug!(
        "sample {sample_id} {year}: {} files, {} problem(s)",
        check.total,
        check.problems.len()
    );
    Ok(check)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub analysis: Analysis,
    pub name: String,
    pub skim_type: String,
    pub group: usize,
    pub config_path: PathBuf,
    /// Set when the job config itself could not be read.
    pub config_error: Option<String>,
    pub samples: Vec<SampleCheck>,
    pub skipped: Vec<(u32, Year)>,
}

impl AnalysisReport {
    pub fn n_ok(&self) -> usize {
        self.samples.iter().filter(|s| s.is_ok()).count()
    }

    pub fn n_problems(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_ok()).count() + usize::from(self.config_error.is_some())
    }

    pub fn problem_samples(&self) -> impl Iterator<Item = &SampleCheck> {
        self.samples.iter().filter(|s| !s.is_ok())
    }
}

pub fn check_analysis(
    catalog: &SampleCatalog,
    analysis: Analysis,
    config_dir: &Path,
    options: CheckOptions,
) -> Result<AnalysisReport, CheckError> {
    let group = options.group_override.unwrap_or_else(|| analysis.default_group());
    if group == 0 {
        return Err(GroupError::ZeroGroupSize.into());
    }

    let config_path = config_dir.join(analysis.config_file_name());
    let mut report = AnalysisReport {
        analysis,
        name: analysis.name().to_string(),
        skim_type: analysis.skim_type().to_string(),
        group,
        config_path: config_path.clone(),
        config_error: None,
        samples: Vec::new(),
        skipped: Vec::new(),
    };

    let entries = match read_sample_config(&config_path) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("{}: {err}", analysis.name());
            report.config_error = Some(err.to_string());
            return Ok(report);
        }
    };

    for entry in entries {
        if entry.skip {
            report.skipped.push((entry.sample_id, entry.year));
            continue;
        }
        report.samples.push(check_sample(
            catalog,
            entry.sample_id,
            entry.year,
            analysis.skim_type(),
            group,
            options.min_file_size,
        )?);
    }

    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub analyses: Vec<AnalysisReport>,
}

impl CompletenessReport {
    pub fn total_ok(&self) -> usize {
        self.analyses.iter().map(AnalysisReport::n_ok).sum()
    }

    pub fn total_problems(&self) -> usize {
        self.analyses.iter().map(AnalysisReport::n_problems).sum()
    }

    pub fn all_present(&self) -> bool {
        self.total_problems() == 0
    }

    /// 0 when every file is present, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_present() { 0 } else { 1 }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), CheckError> {
        let file = File::create(path).map_err(|source| CheckError::Export {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

pub fn check_analyses(
    catalog: &SampleCatalog,
    analyses: &[Analysis],
    config_dir: &Path,
    options: CheckOptions,
) -> Result<CompletenessReport, CheckError> {
    let analyses = analyses
        .iter()
        .map(|&analysis| check_analysis(catalog, analysis, config_dir, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompletenessReport { analyses })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 1000;

    fn write_bytes(path: &Path, n: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; n]).unwrap();
    }

    fn options() -> CheckOptions {
        CheckOptions {
            min_file_size: MIN,
            group_override: None,
        }
    }

    #[test]
    fn check_file_flags_missing_and_small_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.root");
        let exact = dir.path().join("exact.root");
        let big = dir.path().join("big.root");
        write_bytes(&small, 999);
        write_bytes(&exact, 1000);
        write_bytes(&big, 5000);

        assert!(matches!(
            check_file(&dir.path().join("absent.root"), MIN),
            Some(Problem::Missing { .. })
        ));
        assert_eq!(
            check_file(&small, MIN),
            Some(Problem::TooSmall {
                path: small.display().to_string(),
                bytes: 999
            })
        );
        assert_eq!(check_file(&exact, MIN), None);
        assert_eq!(check_file(&big, MIN), None);
    }

    #[test]
    fn problem_messages_match_report_wording() {
        let p = Problem::TooSmall {
            path: "/a.root".into(),
            bytes: 12,
        };
        assert_eq!(p.to_string(), "/a.root (too small: 12 bytes)");
        let p = Problem::NoFiles {
            directory: "/skims/3l/X".into(),
        };
        assert_eq!(p.to_string(), "NO FILES found in /skims/3l/X");
    }

    #[test]
    fn sample_check_counts_files_and_jobs() {
        let base = tempfile::tempdir().unwrap();
        let catalog = SampleCatalog::new(base.path());
        let info = catalog.resolve(179, "3l", None).unwrap();
        let dir = info.primary_directory().unwrap();
        for i in 0..10 {
            write_bytes(&dir.join(format!("out_{i}.root")), 2000);
        }
        write_bytes(&dir.join("out_10.root"), 10);

        let check = check_sample(&catalog, 179, Year::Y2022, "3l", 4, MIN).unwrap();
        assert_eq!(check.total, 11);
        assert_eq!(check.jobs, 3);
        assert_eq!(check.problems.len(), 1);
        assert!(matches!(check.problems[0], Problem::TooSmall { bytes: 10, .. }));
    }

    #[test]
    fn sample_without_files_or_resolution_is_a_problem() {
        let base = tempfile::tempdir().unwrap();
        let catalog = SampleCatalog::new(base.path());

        let empty = check_sample(&catalog, 179, Year::Y2022, "3l", 1, MIN).unwrap();
        assert!(matches!(empty.problems.as_slice(), [Problem::NoFiles { .. }]));

        let unknown = check_sample(&catalog, 998, Year::Y2022, "3l", 1, MIN).unwrap();
        assert!(matches!(unknown.problems.as_slice(), [Problem::Unresolved { .. }]));
    }

    #[test]
    fn analysis_report_aggregates_and_sets_exit_code() {
        let base = tempfile::tempdir().unwrap();
        let configs = tempfile::tempdir().unwrap();
        let catalog = SampleCatalog::new(base.path());

        let ok_dir = catalog.resolve(179, "3l", None).unwrap().directories[0].clone();
        write_bytes(&ok_dir.join("a.root"), 4096);

        fs::write(
            configs.path().join("wzAnalysis_input_condor_jobs.cfg"),
            "# wz\n179 20220\n279 20221\n1022 20240 no\n",
        )
        .unwrap();

        let report = check_analyses(&catalog, &[Analysis::Wz], configs.path(), options()).unwrap();
        let wz = &report.analyses[0];
        assert_eq!(wz.n_ok(), 1);
        assert_eq!(wz.n_problems(), 1);
        assert_eq!(wz.skipped, vec![(1022, Year::Y2024)]);
        assert_eq!(wz.group, 1);
        assert_eq!(report.exit_code(), 1);

        // Once the missing sample is produced the gate opens.
        let missing_dir = catalog.resolve(279, "3l", None).unwrap().directories[0].clone();
        write_bytes(&missing_dir.join("a.root"), 4096);
        let report = check_analyses(&catalog, &[Analysis::Wz], configs.path(), options()).unwrap();
        assert!(report.all_present());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn missing_config_counts_as_a_problem() {
        let base = tempfile::tempdir().unwrap();
        let configs = tempfile::tempdir().unwrap();
        let catalog = SampleCatalog::new(base.path());

        let report = check_analyses(&catalog, &[Analysis::Fake], configs.path(), options()).unwrap();
        assert!(report.analyses[0].config_error.is_some());
        assert_eq!(report.total_problems(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn zero_group_override_is_rejected() {
        let base = tempfile::tempdir().unwrap();
        let catalog = SampleCatalog::new(base.path());
        let options = CheckOptions {
            min_file_size: MIN,
            group_override: Some(0),
        };
        let err = check_analysis(&catalog, Analysis::Wz, base.path(), options).unwrap_err();
        assert!(matches!(err, CheckError::Group(GroupError::ZeroGroupSize)));
    }

    #[test]
    fn report_exports_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        CompletenessReport::default().write_json(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["analyses"].as_array().unwrap().is_empty());
    }
}
