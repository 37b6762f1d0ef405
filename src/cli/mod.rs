//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! resolution and checking code. Long flags keep aliases for the camelCase
//! names older job scripts still pass (`--whichJob`, `--skimType`, ...).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{AnalysisSelector, Category, Year};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "skimprep",
    version,
    about = "Resolve, group and verify CMS NanoAOD sample files for batch jobs"
)]
pub struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub log_level: u8,

    /// Settings file merged over ./skimprep.toml.
    #[arg(long, global = true, value_name = "TOML")]
    pub config_file: Option<PathBuf>,

    /// Base directory of the skim tree.
    #[arg(long, global = true, value_name = "DIR")]
    pub skim_base: Option<PathBuf>,

    /// Directory for generated file lists.
    #[arg(long, global = true, value_name = "DIR")]
    pub filelist_dir: Option<PathBuf>,

    /// Listing attempts before giving up (1 = no retry).
    #[arg(long, global = true)]
    pub attempts: Option<u32>,

    /// Seconds to wait between listing attempts.
    #[arg(long, global = true)]
    pub retry_delay: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query DAS and write XRootD file lists for MC samples, data or a dataset.
    Resolve(ResolveArgs),
    /// Print the files of one job (one path per line) for Condor transfer.
    Collect(CollectArgs),
    /// Resolve a sample, list its files and show the job configuration.
    Inspect(InspectArgs),
    /// Verify every skim an analysis needs exists before submitting.
    Check(CheckArgs),
    /// Regenerate an analysis job config with the preferred WZ generator.
    RemakeJobs(RemakeJobsArgs),
    /// Build the skim input file list and Condor manifest from DAS.
    SkimInputs(SkimInputsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    /// MC sample ID.
    #[arg(long)]
    pub sample: Option<u32>,

    /// Condor jobs config; resolves every enabled MC sample in it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Data mode (requires --type, --year and --das).
    #[arg(long)]
    pub data: bool,

    /// Data stream ID, e.g. 1022 for MuonEG.
    #[arg(long = "type", value_name = "ID")]
    pub data_type: Option<u32>,

    #[arg(long)]
    pub year: Option<Year>,

    /// DAS dataset name, e.g. /MuonEG/Run2024C-MINIv6NANOv15-v1/NANOAOD.
    #[arg(long, value_name = "NAME")]
    pub das: Option<String>,

    /// Custom output file (with --das).
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// XRootD redirector host.
    #[arg(long)]
    pub redirector: Option<String>,

    /// Re-resolve samples whose file list already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CollectArgs {
    /// Sample ID.
    pub sample: u32,

    pub year: Year,

    /// Job index (0-based).
    pub job: usize,

    #[arg(default_value = "2l")]
    pub skim: String,

    /// Files per job.
    #[arg(default_value_t = 10)]
    pub group: usize,

    /// Read `<filelist-dir>/<sample>.txt` instead of listing skim directories.
    #[arg(long)]
    pub direct: bool,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// Sample ID from the sample table.
    #[arg(long, alias = "switchSample", conflicts_with = "path")]
    pub sample: Option<u32>,

    /// Sample directory to use instead of a table lookup.
    #[arg(long, alias = "samplePath")]
    pub path: Option<PathBuf>,

    #[arg(long, default_value = "20220")]
    pub year: Year,

    /// Job index; all files when omitted.
    #[arg(long, alias = "whichJob")]
    pub job: Option<usize>,

    #[arg(long, alias = "skimType", default_value = "2l")]
    pub skim: String,

    /// Files per job.
    #[arg(long, default_value_t = 1)]
    pub group: usize,

    /// Cross-section for --path (required there).
    #[arg(long, alias = "customXsec")]
    pub xsec: Option<f64>,

    /// Category for --path (default kPlotOther).
    #[arg(long, alias = "customCategory")]
    pub category: Option<Category>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[arg(long, value_enum, default_value_t = AnalysisSelector::Wz)]
    pub ana: AnalysisSelector,

    /// Override the analysis' files-per-job.
    #[arg(long)]
    pub group: Option<usize>,

    /// Print OK/SKIPPED lines and the first missing files per sample.
    #[arg(long)]
    pub verbose: bool,

    /// Directory holding the `<analysis>_input_condor_jobs.cfg` files.
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Minimum acceptable file size in bytes.
    #[arg(long)]
    pub min_size: Option<u64>,

    /// Also write the full report as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RemakeJobsArgs {
    /// Analysis prefix of `<ana>Analysis_input_condor_jobs.cfg`.
    #[arg(long, default_value = "wz")]
    pub ana: String,

    /// 1 keeps the MadGraph WZ samples, 0 the Powheg ones.
    #[arg(
        long = "is-wz-mg",
        alias = "isWZMG",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub is_wz_mg: u8,

    #[arg(long, alias = "inputFolder", default_value = ".")]
    pub input_folder: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SkimInputsArgs {
    /// One dataset per line in `A+B+C` form.
    #[arg(long, alias = "inputCfg", default_value = "skim_input_samples_fromDAS.cfg")]
    pub input_cfg: String,

    #[arg(long, alias = "outputCfg", default_value = "skim_input_files_fromDAS.cfg")]
    pub output_cfg: String,

    #[arg(
        long,
        alias = "outputForCondorCfg",
        default_value = "skim_input_condor_jobs_fromDAS.cfg"
    )]
    pub output_for_condor_cfg: String,

    /// Files per skim job.
    #[arg(long, default_value_t = 5)]
    pub group: usize,

    /// Inserted before `.cfg` in both output names, e.g. 2025d.
    #[arg(long)]
    pub suffix: Option<String>,

    /// XRootD redirector host.
    #[arg(long)]
    pub redirector: Option<String>,
}
