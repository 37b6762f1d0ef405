//! Skim-step inputs built from DAS.
//!
//! For every dataset line (`A+B+C`) the DAS file list is appended to one flat
//! file list, and a Condor manifest line `<sample> <job> <group> <dataset>` is
//! emitted for every `group` files.

use std::fmt;

use thiserror::Error;

use super::grouper::{GroupError, job_count};
use crate::data::{DasError, DatasetQuery, das_name_from_dir};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Das(#[from] DasError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    pub sample_index: usize,
    pub job_index: usize,
    pub group: usize,
    pub dataset_line: String,
}

impl fmt::Display for ManifestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.sample_index, self.job_index, self.group, self.dataset_line
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub dataset_line: String,
    pub files: usize,
    pub jobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkimInputs {
    pub files: Vec<String>,
    pub manifest: Vec<ManifestLine>,
    pub datasets: Vec<DatasetSummary>,
}

/// Dataset lines of a skim input config: trimmed, blanks and `#` lines dropped.
pub fn dataset_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn build_skim_inputs(
    query: &dyn DatasetQuery,
    datasets: &[String],
    group: usize,
) -> Result<SkimInputs, ManifestError> {
    if group == 0 {
        return Err(GroupError::ZeroGroupSize.into());
    }

    let mut out = SkimInputs::default();
    for (sample_index, line) in datasets.iter().enumerate() {
        let files = query.query_files(&das_name_from_dir(line))?;
        let jobs = job_count(files.len(), group)?;

        out.manifest.extend((0..jobs).map(|job_index| ManifestLine {
            sample_index,
            job_index,
            group,
            dataset_line: line.clone(),
        }));
        out.datasets.push(DatasetSummary {
            dataset_line: line.clone(),
            files: files.len(),
            jobs,
        });
        out.files.extend(files);
    }
    Ok(out)
}

/// Insert `_<suffix>` before a trailing `.cfg`, or append it.
pub fn suffixed_path(path: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return path.to_string();
    }
    match path.strip_suffix(".cfg") {
        Some(stem) => format!("{stem}_{suffix}.cfg"),
        None => format!("{path}_{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeDas(HashMap<String, usize>);

    impl DatasetQuery for FakeDas {
        fn query_files(&self, dataset: &str) -> Result<Vec<String>, DasError> {
            let n = self.0.get(dataset).copied().unwrap_or(0);
            Ok((0..n).map(|i| format!("root://h//store{dataset}/{i}.root")).collect())
        }
    }

    #[test]
    fn manifest_has_one_line_per_job() {
        let das = FakeDas(HashMap::from([("/A/B/NANOAODSIM".to_string(), 12), ("/C/D/NANOAODSIM".to_string(), 5)]));
        let lines = dataset_lines("A+B+NANOAODSIM\n\n# skipped\nC+D+NANOAODSIM\nE+F+NANOAODSIM\n");
        let inputs = build_skim_inputs(&das, &lines, 5).unwrap();

        assert_eq!(inputs.files.len(), 17);
        let rendered: Vec<String> = inputs.manifest.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "0 0 5 A+B+NANOAODSIM",
                "0 1 5 A+B+NANOAODSIM",
                "0 2 5 A+B+NANOAODSIM",
                "1 0 5 C+D+NANOAODSIM",
            ]
        );
        assert_eq!(inputs.datasets[2], DatasetSummary {
            dataset_line: "E+F+NANOAODSIM".to_string(),
            files: 0,
            jobs: 0,
        });
    }

    #[test]
    fn zero_group_is_rejected_before_querying() {
        let das = FakeDas(HashMap::new());
        let err = build_skim_inputs(&das, &["A+B+C".to_string()], 0).unwrap_err();
        assert!(matches!(err, ManifestError::Group(GroupError::ZeroGroupSize)));
    }

    #[test]
    fn suffix_goes_before_cfg_extension() {
        assert_eq!(suffixed_path("skim_input_files_fromDAS.cfg", "2025d"), "skim_input_files_fromDAS_2025d.cfg");
        assert_eq!(suffixed_path("manifest", "2025d"), "manifest_2025d");
        assert_eq!(suffixed_path("x.cfg", ""), "x.cfg");
    }
}
