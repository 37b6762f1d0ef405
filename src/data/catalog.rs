//! Sample table: sample ID (+ skim type, year) -> directories, cross-section, category.
//!
//! MC IDs encode `campaign * 100 + process`, so `179` is the MadGraph WZ sample
//! in the 2022 campaign and `479` the same process in 2023 BPix. Data IDs are
//! stream codes (`1022` = MuonEG) that fan out into one dataset per era.
//!
//! A TOML catalog can add or replace entries:
//!
//! ```toml
//! [[mc]]
//! id = 180
//! dataset = "/WZto3LNu_TuneCP5_13p6TeV_powheg-pythia8/Run3Summer22NanoAODv12-130X_mcRun3_2022_realistic_v5-v2/NANOAODSIM"
//! xsec = 4.924
//! category = "kPlotWZ"
//!
//! [[data]]
//! id = 1022
//! year = 20240
//! datasets = ["/MuonEG/Run2024C-MINIv6NANOv15-v1/NANOAOD"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Category, SampleInfo, SampleKind, Year};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("invalid sample ID {0}: not in the sample table")]
    UnknownSample(u32),

    #[error("data sample {0} needs a year to resolve")]
    YearRequired(u32),

    #[error("data sample {id} has no datasets for year {year}")]
    NoDataForYear { id: u32, year: Year },

    #[error("sample catalog '{path}': {message}")]
    Catalog { path: PathBuf, message: String },
}

struct McProcess {
    code: u32,
    name: &'static str,
    xsec: f64,
    category: Category,
}

/// Campaign digit -> processing string of the NanoAOD production.
const MC_CAMPAIGNS: [(u32, &str); 5] = [
    (1, "Run3Summer22NanoAODv12-130X_mcRun3_2022_realistic_v5-v2"),
    (2, "Run3Summer22EENanoAODv12-130X_mcRun3_2022_realistic_postEE_v6-v2"),
    (3, "Run3Summer23NanoAODv12-130X_mcRun3_2023_realistic_v14-v2"),
    (4, "Run3Summer23BPixNanoAODv12-130X_mcRun3_2023_realistic_postBPix_v2-v3"),
    (5, "RunIII2024Summer24NanoAODv15-150X_mcRun3_2024_realistic_v2-v2"),
];

const MC_PROCESSES: &[McProcess] = &[
    McProcess {
        code: 1,
        name: "TTto2L2Nu_TuneCP5_13p6TeV_powheg-pythia8",
        xsec: 98.04,
        category: Category::TT,
    },
    McProcess {
        code: 2,
        name: "DYto2L-2Jets_MLL-50_TuneCP5_13p6TeV_amcatnloFXFX-pythia8",
        xsec: 6688.0,
        category: Category::DY,
    },
    McProcess {
        code: 3,
        name: "WZto3LNu_TuneCP5_13p6TeV_powheg-pythia8",
        xsec: 4.924,
        category: Category::WZ,
    },
    McProcess {
        code: 5,
        name: "ZZto4L_TuneCP5_13p6TeV_powheg-pythia8",
        xsec: 1.39,
        category: Category::ZZ,
    },
    McProcess {
        code: 7,
        name: "TWminusto2L2Nu_TuneCP5_13p6TeV_powheg-pythia8",
        xsec: 3.8,
        category: Category::TW,
    },
    McProcess {
        code: 10,
        name: "WWto2L2Nu_TuneCP5_13p6TeV_powheg-pythia8",
        xsec: 12.98,
        category: Category::WW,
    },
    McProcess {
        code: 21,
        name: "TTZ-ZtoQQ-1Jets_TuneCP5_13p6TeV_amcatnloFXFX-pythia8",
        xsec: 0.6,
        category: Category::TVX,
    },
    McProcess {
        code: 31,
        name: "WZZ_TuneCP5_13p6TeV_amcatnlo-pythia8",
        xsec: 0.06,
        category: Category::VVV,
    },
    McProcess {
        code: 41,
        name: "GluGluHToZZto4L_M-125_TuneCP5_13p6TeV_powheg2-JHUGenV752-pythia8",
        xsec: 0.0137,
        category: Category::Higgs,
    },
    McProcess {
        code: 79,
        name: "WZto3LNu-1Jets-4FS_TuneCP5_13p6TeV_amcatnloFXFX-pythia8",
        xsec: 5.315,
        category: Category::WZ,
    },
];

/// Data stream code -> primary dataset.
const DATA_STREAMS: [(u32, &str); 4] = [
    (1011, "Muon"),
    (1022, "MuonEG"),
    (1033, "EGamma"),
    (1044, "JetMET"),
];

fn data_eras(year: Year) -> &'static [&'static str] {
    match year.code() {
        20220 => &["2022C-22Sep2023-v1", "2022D-22Sep2023-v1"],
        20221 => &["2022E-22Sep2023-v1", "2022F-22Sep2023-v2", "2022G-22Sep2023-v1"],
        20230 => &[
            "2023C-22Sep2023_v1-v1",
            "2023C-22Sep2023_v2-v1",
            "2023C-22Sep2023_v3-v1",
            "2023C-22Sep2023_v4-v1",
        ],
        20231 => &["2023D-22Sep2023_v1-v1", "2023D-22Sep2023_v2-v1"],
        20240 => &[
            "2024C-MINIv6NANOv15-v1",
            "2024D-MINIv6NANOv15-v1",
            "2024E-MINIv6NANOv15-v1",
            "2024F-MINIv6NANOv15-v1",
            "2024G-MINIv6NANOv15-v1",
            "2024H-MINIv6NANOv15-v1",
            "2024I-MINIv6NANOv15-v1",
        ],
        _ => &[],
    }
}

/// Convert a skim directory name (`A+B+C`) to a DAS dataset name (`/A/B/C`).
pub fn das_name_from_dir(dir: &str) -> String {
    format!("/{}", dir.trim().trim_start_matches('+').replace('+', "/"))
}

/// Convert a DAS dataset name (`/A/B/C`) to a skim directory name (`A+B+C`).
///
/// Names already in directory form pass through unchanged.
pub fn dir_from_das_name(name: &str) -> String {
    name.trim().trim_start_matches('/').replace('/', "+")
}

/// TOML catalog file layered over the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub mc: Vec<McEntry>,
    #[serde(default)]
    pub data: Vec<DataEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McEntry {
    pub id: u32,
    /// DAS name (`/A/B/C`) or directory form (`A+B+C`).
    pub dataset: String,
    pub xsec: f64,
    #[serde(default = "default_category")]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataEntry {
    pub id: u32,
    pub year: Year,
    pub datasets: Vec<String>,
}

fn default_category() -> String {
    "kPlotOther".to_string()
}

impl CatalogFile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ResolveError> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| ResolveError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        for entry in &file.mc {
            if SampleKind::of(entry.id) != SampleKind::Mc {
                return Err(ResolveError::Catalog {
                    path: path.to_path_buf(),
                    message: format!("[[mc]] entry {} uses a data ID", entry.id),
                });
            }
        }
        for entry in &file.data {
            if SampleKind::of(entry.id) != SampleKind::Data {
                return Err(ResolveError::Catalog {
                    path: path.to_path_buf(),
                    message: format!("[[data]] entry {} uses an MC ID", entry.id),
                });
            }
        }
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let text = fs::read_to_string(path).map_err(|e| ResolveError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }
}

#[derive(Debug, Clone)]
struct McOverride {
    dataset_dir: String,
    xsec: f64,
    category: Category,
}

/// Resolves sample IDs against the built-in table plus catalog overrides.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    skim_base_dir: PathBuf,
    mc_overrides: BTreeMap<u32, McOverride>,
    data_overrides: BTreeMap<(u32, Year), Vec<String>>,
}

impl SampleCatalog {
    pub fn new(skim_base_dir: impl Into<PathBuf>) -> Self {
        Self {
            skim_base_dir: skim_base_dir.into(),
            mc_overrides: BTreeMap::new(),
            data_overrides: BTreeMap::new(),
        }
    }

    pub fn with_overrides(mut self, file: CatalogFile) -> Result<Self, ResolveError> {
        for entry in file.mc {
            let category = entry.category.parse::<Category>().map_err(|message| ResolveError::Catalog {
                path: PathBuf::new(),
                message,
            })?;
            self.mc_overrides.insert(
                entry.id,
                McOverride {
                    dataset_dir: dir_from_das_name(&entry.dataset),
                    xsec: entry.xsec,
                    category,
                },
            );
        }
        for entry in file.data {
            let dirs = entry.datasets.iter().map(|d| dir_from_das_name(d)).collect();
            self.data_overrides.insert((entry.id, entry.year), dirs);
        }
        Ok(self)
    }

    /// Resolve a sample. MC lookups ignore `year` apart from a consistency
    /// warning; data lookups require it.
    pub fn resolve(&self, sample_id: u32, skim_type: &str, year: Option<Year>) -> Result<SampleInfo, ResolveError> {
        let (dataset_dirs, cross_section, category) = match SampleKind::of(sample_id) {
            SampleKind::Mc => {
                let (dir, xsec, category) = self.lookup_mc(sample_id)?;
                if let Some(year) = year {
                    if !self.mc_overrides.contains_key(&sample_id) && year.campaign() != sample_id / 100 {
                        tracing::warn!(
                            "MC sample {sample_id} belongs to campaign {} but year {year} uses campaign {}",
                            sample_id / 100,
                            year.campaign()
                        );
                    }
                }
                (vec![dir], xsec, category)
            }
            SampleKind::Data => {
                let year = year.ok_or(ResolveError::YearRequired(sample_id))?;
                (self.lookup_data(sample_id, year)?, 1.0, Category::Data)
            }
        };

        let directories = dataset_dirs
            .iter()
            .map(|dir| self.skim_base_dir.join(skim_type).join(dir))
            .collect();

        Ok(SampleInfo {
            id: sample_id,
            kind: SampleKind::of(sample_id),
            dataset_dirs,
            directories,
            cross_section,
            category,
        })
    }

    /// DAS dataset name (`/A/B/C`) of an MC sample.
    pub fn das_dataset(&self, sample_id: u32) -> Result<String, ResolveError> {
        if SampleKind::of(sample_id) != SampleKind::Mc {
            return Err(ResolveError::UnknownSample(sample_id));
        }
        let (dir, _, _) = self.lookup_mc(sample_id)?;
        Ok(das_name_from_dir(&dir))
    }

    fn lookup_mc(&self, sample_id: u32) -> Result<(String, f64, Category), ResolveError> {
        if let Some(entry) = self.mc_overrides.get(&sample_id) {
            return Ok((entry.dataset_dir.clone(), entry.xsec, entry.category));
        }

        let campaign_digit = sample_id / 100;
        let process_code = sample_id % 100;
        let campaign = MC_CAMPAIGNS
            .iter()
            .find(|(digit, _)| *digit == campaign_digit)
            .map(|(_, tag)| *tag)
            .ok_or(ResolveError::UnknownSample(sample_id))?;
        let process = MC_PROCESSES
            .iter()
            .find(|p| p.code == process_code)
            .ok_or(ResolveError::UnknownSample(sample_id))?;

        Ok((
            format!("{}+{}+NANOAODSIM", process.name, campaign),
            process.xsec,
            process.category,
        ))
    }

    fn lookup_data(&self, sample_id: u32, year: Year) -> Result<Vec<String>, ResolveError> {
        if let Some(dirs) = self.data_overrides.get(&(sample_id, year)) {
            return Ok(dirs.clone());
        }

        let stream = DATA_STREAMS
            .iter()
            .find(|(code, _)| *code == sample_id)
            .map(|(_, name)| *name)
            .ok_or(ResolveError::UnknownSample(sample_id))?;
        let eras = data_eras(year);
        if eras.is_empty() {
            return Err(ResolveError::NoDataForYear { id: sample_id, year });
        }

        Ok(eras
            .iter()
            .map(|era| format!("{stream}+Run{era}+NANOAOD"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_mc_by_campaign_and_process() {
        let catalog = SampleCatalog::new("/skims");
        let info = catalog.resolve(179, "3l", None).unwrap();
        assert_eq!(info.kind, SampleKind::Mc);
        assert_eq!(info.category, Category::WZ);
        assert!((info.cross_section - 5.315).abs() < 1e-12);
        assert_eq!(
            info.dataset_dirs,
            vec![
                "WZto3LNu-1Jets-4FS_TuneCP5_13p6TeV_amcatnloFXFX-pythia8+Run3Summer22NanoAODv12-130X_mcRun3_2022_realistic_v5-v2+NANOAODSIM"
                    .to_string()
            ]
        );
        assert_eq!(
            info.primary_directory().unwrap(),
            Path::new("/skims/3l").join(&info.dataset_dirs[0])
        );
    }

    #[test]
    fn unknown_ids_are_errors_not_sentinels() {
        let catalog = SampleCatalog::new("/skims");
        assert_eq!(catalog.resolve(999, "3l", None), Err(ResolveError::UnknownSample(999)));
        assert_eq!(catalog.resolve(104, "3l", None), Err(ResolveError::UnknownSample(104)));
        assert_eq!(
            catalog.resolve(1099, "2l", Some(Year::Y2022)),
            Err(ResolveError::UnknownSample(1099))
        );
    }

    #[test]
    fn data_needs_a_year_and_fans_out_per_era() {
        let catalog = SampleCatalog::new("/skims");
        assert_eq!(catalog.resolve(1022, "2l", None), Err(ResolveError::YearRequired(1022)));

        let info = catalog.resolve(1022, "2l", Some(Year::Y2022EE)).unwrap();
        assert_eq!(info.kind, SampleKind::Data);
        assert_eq!(info.category, Category::Data);
        assert_eq!(info.directories.len(), 3);
        assert_eq!(info.dataset_dirs[0], "MuonEG+Run2022E-22Sep2023-v1+NANOAOD");

        assert_eq!(
            catalog.resolve(1022, "2l", Some(Year::Y2025)),
            Err(ResolveError::NoDataForYear {
                id: 1022,
                year: Year::Y2025
            })
        );
    }

    #[test]
    fn das_and_directory_names_convert_both_ways() {
        let das = "/MuonEG/Run2024C-MINIv6NANOv15-v1/NANOAOD";
        let dir = dir_from_das_name(das);
        assert_eq!(dir, "MuonEG+Run2024C-MINIv6NANOv15-v1+NANOAOD");
        assert_eq!(das_name_from_dir(&dir), das);
        assert_eq!(dir_from_das_name(&dir), dir);
    }

    #[test]
    fn das_dataset_is_only_defined_for_mc() {
        let catalog = SampleCatalog::new("/skims");
        assert_eq!(
            catalog.das_dataset(203).unwrap(),
            "/WZto3LNu_TuneCP5_13p6TeV_powheg-pythia8/Run3Summer22EENanoAODv12-130X_mcRun3_2022_realistic_postEE_v6-v2/NANOAODSIM"
        );
        assert!(catalog.das_dataset(1022).is_err());
    }

    #[test]
    fn catalog_file_overrides_and_extends_builtins() {
        let text = r#"
            [[mc]]
            id = 180
            dataset = "/WZ/Custom-v1/NANOAODSIM"
            xsec = 1.5
            category = "kPlotWZ"

            [[data]]
            id = 1022
            year = 20250
            datasets = ["/MuonEG/Run2025C-PromptReco-v1/NANOAOD"]
        "#;
        let file = CatalogFile::parse(text, Path::new("samples.toml")).unwrap();
        let catalog = SampleCatalog::new("/skims").with_overrides(file).unwrap();

        let mc = catalog.resolve(180, "3l", None).unwrap();
        assert_eq!(mc.dataset_dirs, vec!["WZ+Custom-v1+NANOAODSIM".to_string()]);
        assert_eq!(mc.category, Category::WZ);

        let data = catalog.resolve(1022, "2l", Some(Year::Y2025)).unwrap();
        assert_eq!(data.dataset_dirs, vec!["MuonEG+Run2025C-PromptReco-v1+NANOAOD".to_string()]);
    }

    #[test]
    fn catalog_file_rejects_misplaced_ids() {
        let text = "[[mc]]\nid = 1500\ndataset = \"/X/Y/Z\"\nxsec = 1.0\n";
        let err = CatalogFile::parse(text, Path::new("samples.toml")).unwrap_err();
        assert!(matches!(err, ResolveError::Catalog { .. }));
    }
}
