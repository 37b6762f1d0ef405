//! Shared domain types.
//!
//! Everything here is a small value type: samples are looked up by value from
//! the catalog and nothing owns them beyond a single command invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sample IDs at or above this value are collision data, below it simulation.
pub const DATA_ID_THRESHOLD: u32 = 1000;

/// A data-taking period code as used in the job configs (e.g. `20221`).
///
/// The last digit splits a calendar year into its two detector conditions
/// (pre/post EE for 2022, pre/post BPix for 2023).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Year(u32);

impl Year {
    pub const Y2022: Year = Year(20220);
    pub const Y2022EE: Year = Year(20221);
    pub const Y2023: Year = Year(20230);
    pub const Y2023BPIX: Year = Year(20231);
    pub const Y2024: Year = Year(20240);
    pub const Y2025: Year = Year(20250);

    pub const ALL: [Year; 6] = [
        Year::Y2022,
        Year::Y2022EE,
        Year::Y2023,
        Year::Y2023BPIX,
        Year::Y2024,
        Year::Y2025,
    ];

    pub fn new(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|y| y.0 == code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    /// Simulation campaign digit (the hundreds digit of MC sample IDs).
    ///
    /// 2025 data is analysed with the 2024 simulation.
    pub fn campaign(self) -> u32 {
        match self.0 {
            20220 => 1,
            20221 => 2,
            20230 => 3,
            20231 => 4,
            _ => 5,
        }
    }

    /// Integrated luminosity in fb^-1, where a certified value exists.
    pub fn lumi_fb(self) -> Option<f64> {
        match self.0 {
            20220 => Some(7.98),
            20221 => Some(26.67),
            20230 => Some(17.79),
            20231 => Some(9.45),
            20240 => Some(109.08),
            _ => None,
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Year {
    type Error = String;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Year::new(code).ok_or_else(|| {
            let valid: Vec<String> = Year::ALL.iter().map(|y| y.to_string()).collect();
            format!("unknown year code {code} (valid: {})", valid.join(", "))
        })
    }
}

impl From<Year> for u32 {
    fn from(year: Year) -> Self {
        year.0
    }
}

impl FromStr for Year {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid year '{s}': expected a code such as 20220"))?;
        Year::try_from(code)
    }
}

/// Simulation or collision data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Mc,
    Data,
}

impl SampleKind {
    pub fn of(sample_id: u32) -> Self {
        if sample_id >= DATA_ID_THRESHOLD {
            SampleKind::Data
        } else {
            SampleKind::Mc
        }
    }
}

/// Plotting category a sample contributes to.
///
/// Parses both the short form (`WZ`) and the plotting name (`kPlotWZ`),
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Data,
    WZ,
    ZZ,
    TT,
    TW,
    WW,
    DY,
    TVX,
    VVV,
    Higgs,
    NonPrompt,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Data,
        Category::WZ,
        Category::ZZ,
        Category::TT,
        Category::TW,
        Category::WW,
        Category::DY,
        Category::TVX,
        Category::VVV,
        Category::Higgs,
        Category::NonPrompt,
        Category::Other,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            Category::Data => "Data",
            Category::WZ => "WZ",
            Category::ZZ => "ZZ",
            Category::TT => "TT",
            Category::TW => "TW",
            Category::WW => "WW",
            Category::DY => "DY",
            Category::TVX => "TVX",
            Category::VVV => "VVV",
            Category::Higgs => "Higgs",
            Category::NonPrompt => "NonPrompt",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kPlot{}", self.short_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix("kPlot").unwrap_or(trimmed);
        Category::ALL
            .into_iter()
            .find(|c| c.short_name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Resolved description of one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInfo {
    pub id: u32,
    pub kind: SampleKind,
    /// Skim directory names in `A+B+C` form, one per DAS dataset.
    pub dataset_dirs: Vec<String>,
    /// Full skim directories, in the same order as `dataset_dirs`.
    pub directories: Vec<PathBuf>,
    /// Cross-section in pb (1.0 for data).
    pub cross_section: f64,
    pub category: Category,
}

impl SampleInfo {
    pub fn primary_directory(&self) -> Option<&Path> {
        self.directories.first().map(PathBuf::as_path)
    }

    /// Primary-dataset name, i.e. the first `+`-separated component.
    pub fn pd_type(&self) -> Option<&str> {
        self.dataset_dirs
            .first()
            .and_then(|dir| dir.split('+').next())
            .filter(|s| !s.is_empty())
    }
}

/// Analyses whose job configs the completeness checker knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analysis {
    Wz,
    Fake,
    Trigger,
    Met,
    Pu,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::Wz,
        Analysis::Fake,
        Analysis::Trigger,
        Analysis::Met,
        Analysis::Pu,
    ];

    /// Name used for the `<name>_input_condor_jobs.cfg` job config.
    pub fn name(self) -> &'static str {
        match self {
            Analysis::Wz => "wzAnalysis",
            Analysis::Fake => "fakeAnalysis",
            Analysis::Trigger => "triggerAnalysis",
            Analysis::Met => "metAnalysis",
            Analysis::Pu => "puAnalysis",
        }
    }

    pub fn skim_type(self) -> &'static str {
        match self {
            Analysis::Wz => "3l",
            Analysis::Fake => "1l",
            Analysis::Trigger | Analysis::Pu => "2l",
            Analysis::Met => "met",
        }
    }

    pub fn default_group(self) -> usize {
        match self {
            Analysis::Wz => 1,
            _ => 9,
        }
    }

    pub fn config_file_name(self) -> String {
        format!("{}_input_condor_jobs.cfg", self.name())
    }
}

/// `--ana` selector: one analysis or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisSelector {
    Wz,
    Fake,
    Trigger,
    Met,
    Pu,
    All,
}

impl AnalysisSelector {
    pub fn analyses(self) -> Vec<Analysis> {
        match self {
            AnalysisSelector::Wz => vec![Analysis::Wz],
            AnalysisSelector::Fake => vec![Analysis::Fake],
            AnalysisSelector::Trigger => vec![Analysis::Trigger],
            AnalysisSelector::Met => vec![Analysis::Met],
            AnalysisSelector::Pu => vec![Analysis::Pu],
            AnalysisSelector::All => Analysis::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_parses_known_codes_only() {
        assert_eq!("20231".parse::<Year>(), Ok(Year::Y2023BPIX));
        assert!("2022".parse::<Year>().is_err());
        assert!("abc".parse::<Year>().is_err());
    }

    #[test]
    fn year_campaign_digits_follow_mc_numbering() {
        let digits: Vec<u32> = Year::ALL.iter().map(|y| y.campaign()).collect();
        assert_eq!(digits, vec![1, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn category_accepts_plot_names() {
        assert_eq!("kPlotWZ".parse::<Category>(), Ok(Category::WZ));
        assert_eq!("nonprompt".parse::<Category>(), Ok(Category::NonPrompt));
        assert_eq!(Category::Other.to_string(), "kPlotOther");
        assert!("kPlotNope".parse::<Category>().is_err());
    }

    #[test]
    fn sample_kind_splits_at_threshold() {
        assert_eq!(SampleKind::of(999), SampleKind::Mc);
        assert_eq!(SampleKind::of(1022), SampleKind::Data);
    }

    #[test]
    fn pd_type_is_first_component() {
        let info = SampleInfo {
            id: 1022,
            kind: SampleKind::Data,
            dataset_dirs: vec!["MuonEG+Run2024C-MINIv6NANOv15-v1+NANOAOD".to_string()],
            directories: vec![],
            cross_section: 1.0,
            category: Category::Data,
        };
        assert_eq!(info.pd_type(), Some("MuonEG"));
    }
}
