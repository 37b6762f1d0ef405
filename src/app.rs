//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - loads layered settings and the sample catalog
//! - dispatches to one subcommand handler
//! - prints reports and writes output files

use std::fs;
use std::path::Path;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use crate::check::{CheckOptions, check_analyses};
use crate::cli::{
    CheckArgs, Cli, CollectArgs, Command, InspectArgs, RemakeJobsArgs, ResolveArgs, SkimInputsArgs,
};
use crate::config::{ConfigLoader, RetryPolicy, ToolConfig};
use crate::data::{DasClient, DatasetQuery};
use crate::domain::{Category, Year};
use crate::error::AppError;
use crate::io::rewrite::{WzGenerator, remake_wz_jobs, rewrite_file, sibling_path};
use crate::io::{FileList, list_root_files, list_with_retry, read_sample_config};
use crate::jobs::{build_skim_inputs, dataset_lines, job_files, suffixed_path};
use crate::report::{format_check_report, format_custom_config, format_lumi, format_sample_config};

pub mod pipeline;

use pipeline::Context;

/// Entry point for the `skimprep` binary.
pub fn run() -> Result<(), AppError> {
    run_from(std::env::args_os())
}

/// Parse `argv` and run one subcommand.
///
/// Malformed arguments print clap's usage and exit 1; `--help` and
/// `--version` exit 0.
pub fn run_from<I, T>(argv: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(()),
                _ => Err(AppError::failure("")),
            };
        }
    };

    init_logging(cli.log_level);

    let config = apply_overrides(ConfigLoader::load(cli.config_file.as_deref())?, &cli);
    tracing::debug!("Settings: {config:?}");
    let ctx = Context::new(config)?;

    match cli.command {
        Command::Resolve(args) => handle_resolve(&ctx, args),
        Command::Collect(args) => handle_collect(&ctx, args),
        Command::Inspect(args) => handle_inspect(&ctx, args),
        Command::Check(args) => handle_check(&ctx, args),
        Command::RemakeJobs(args) => handle_remake_jobs(args),
        Command::SkimInputs(args) => handle_skim_inputs(&ctx, args),
    }
}

/// `RUST_LOG` wins; otherwise `-v` count picks the level.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    // A second init (tests driving `run_from` twice) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// CLI flags sit on top of every other settings source.
pub fn apply_overrides(mut config: ToolConfig, cli: &Cli) -> ToolConfig {
    if let Some(dir) = &cli.skim_base {
        config.skim_base_dir = dir.clone();
    }
    if let Some(dir) = &cli.filelist_dir {
        config.filelist_dir = dir.clone();
    }
    if cli.attempts.is_some() || cli.retry_delay.is_some() {
        config.retry = RetryPolicy::new(
            cli.attempts.unwrap_or(config.retry.attempts),
            cli.retry_delay.unwrap_or(config.retry.delay_secs),
        );
    }
    config
}

fn das_client(ctx: &Context, redirector: Option<&str>) -> Result<DasClient, AppError> {
    let redirector = redirector.unwrap_or(&ctx.config.redirector);
    Ok(DasClient::locate(&ctx.config.das_client, redirector)?)
}

fn handle_resolve(ctx: &Context, args: ResolveArgs) -> Result<(), AppError> {
    // Usage errors are reported before the DAS client is looked up.
    let mode = ResolveMode::from_args(&args)?;
    let client = das_client(ctx, args.redirector.as_deref())?;
    run_resolve(ctx, &client, mode, args.force)
}

/// What `resolve` was asked to do, in flag priority order.
#[derive(Debug, Clone, PartialEq)]
enum ResolveMode<'a> {
    Custom { dataset: &'a str, output: &'a Path },
    Data { data_type: u32, year: Year, dataset: &'a str },
    Sample(u32),
    Config(&'a Path),
}

impl<'a> ResolveMode<'a> {
    fn from_args(args: &'a ResolveArgs) -> Result<Self, AppError> {
        if let (Some(dataset), Some(output)) = (args.das.as_deref(), args.output.as_deref()) {
            return Ok(ResolveMode::Custom { dataset, output });
        }
        if args.data {
            return match (args.data_type, args.year, args.das.as_deref()) {
                (Some(data_type), Some(year), Some(dataset)) => Ok(ResolveMode::Data {
                    data_type,
                    year,
                    dataset,
                }),
                _ => Err(AppError::failure(
                    "Error: --data requires --type, --year and --das",
                )),
            };
        }
        if let Some(sample) = args.sample {
            return Ok(ResolveMode::Sample(sample));
        }
        if let Some(config) = args.config.as_deref() {
            return Ok(ResolveMode::Config(config));
        }
        Err(AppError::failure(
            "Usage: skimprep resolve (--sample <ID> | --config <PATH> | --data --type <ID> --year <YEAR> --das <NAME> | --das <NAME> --output <PATH>)",
        ))
    }
}

fn run_resolve(ctx: &Context, query: &dyn DatasetQuery, mode: ResolveMode<'_>, force: bool) -> Result<(), AppError> {
    match mode {
        ResolveMode::Custom { dataset, output } => {
            let n = pipeline::write_custom_list(ctx, query, dataset, output)?;
            println!("Wrote {n} files to {}", output.display());
        }
        ResolveMode::Data {
            data_type,
            year,
            dataset,
        } => {
            let (path, n) = pipeline::write_data_list(ctx, query, data_type, year, dataset)?;
            println!("Added {n} files to {}", path.display());
        }
        ResolveMode::Sample(sample_id) => {
            let path = ctx.mc_list_path(sample_id);
            if path.exists() && !force {
                println!("{} already exists (use --force to re-resolve)", path.display());
                return Ok(());
            }
            let (path, n) = pipeline::write_mc_list(ctx, query, sample_id)?;
            println!("Wrote {n} files to {}", path.display());
        }
        ResolveMode::Config(path) => {
            let entries = read_sample_config(path)?;
            let summary = pipeline::resolve_config_batch(ctx, query, &entries, force);
            print!("{}", summary.render());
            if !summary.is_ok() {
                return Err(AppError::failure(format!(
                    "Error: {} sample(s) could not be resolved",
                    summary.failed.len()
                )));
            }
        }
    }
    Ok(())
}

fn handle_collect(ctx: &Context, args: CollectArgs) -> Result<(), AppError> {
    let files = if args.direct {
        pipeline::files_for_job_from_list(ctx, args.sample, args.group, args.job)?
    } else {
        pipeline::files_for_job(ctx, args.sample, args.year, &args.skim, args.group, args.job)?
    };
    for file in files {
        println!("{file}");
    }
    Ok(())
}

fn handle_inspect(ctx: &Context, args: InspectArgs) -> Result<(), AppError> {
    let (header, files) = match (args.sample, &args.path) {
        (Some(sample_id), _) => {
            let info = ctx.catalog.resolve(sample_id, &args.skim, Some(args.year))?;
            let header = format_sample_config(&info, args.year, args.job, &args.skim);
            (header, pipeline::list_local(ctx, &info)?)
        }
        (None, Some(path)) => {
            let xsec = args
                .xsec
                .ok_or_else(|| AppError::failure("Error: --path requires --xsec"))?;
            let category = args.category.unwrap_or(Category::Other);
            let header = format_custom_config(path, xsec, category, args.year, args.job);
            if !path.exists() {
                return Err(AppError::failure(format!(
                    "Error: sample path {} does not exist",
                    path.display()
                )));
            }
            let what = path.display().to_string();
            let files = list_with_retry(&ctx.config.retry, &what, || {
                Ok(list_root_files(path)
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect())
            })?;
            (header, files)
        }
        (None, None) => {
            return Err(AppError::failure("Error: one of --sample or --path is required"));
        }
    };

    println!("{header}");
    println!("{}", format_lumi(args.year));

    let selected = match args.job {
        Some(job) => job_files(&files, args.group, job)?,
        None => files.as_slice(),
    };
    println!("Processing {} of {} files:", selected.len(), files.len());
    for file in selected {
        println!("  {file}");
    }
    Ok(())
}

fn handle_check(ctx: &Context, args: CheckArgs) -> Result<(), AppError> {
    let options = CheckOptions {
        min_file_size: args.min_size.unwrap_or(ctx.config.min_file_size),
        group_override: args.group,
    };
    let report = check_analyses(&ctx.catalog, &args.ana.analyses(), &args.config_dir, options)?;

    print!("{}", format_check_report(&report, args.verbose));

    if let Some(path) = &args.json {
        report.write_json(path)?;
        tracing::info!("Wrote JSON report to {}", path.display());
    }

    match report.exit_code() {
        0 => Ok(()),
        code => Err(AppError::new(code, "")),
    }
}

fn handle_remake_jobs(args: RemakeJobsArgs) -> Result<(), AppError> {
    let input = args
        .input_folder
        .join(format!("{}Analysis_input_condor_jobs.cfg", args.ana));
    let output = sibling_path(&input, "new");
    let preferred = WzGenerator::from_flag(args.is_wz_mg == 1);

    rewrite_file(&input, &output, |text| remake_wz_jobs(text, preferred))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn handle_skim_inputs(ctx: &Context, args: SkimInputsArgs) -> Result<(), AppError> {
    let suffix = args.suffix.as_deref().unwrap_or("");
    let output_cfg = suffixed_path(&args.output_cfg, suffix);
    let manifest_cfg = suffixed_path(&args.output_for_condor_cfg, suffix);

    let text = fs::read_to_string(&args.input_cfg)
        .map_err(|err| AppError::failure(format!("Error: cannot read {}: {err}", args.input_cfg)))?;
    let datasets = dataset_lines(&text);
    if datasets.is_empty() {
        return Err(AppError::failure(format!(
            "Error: no datasets listed in {}",
            args.input_cfg
        )));
    }

    let client = das_client(ctx, args.redirector.as_deref())?;
    let inputs = build_skim_inputs(&client, &datasets, args.group)?;

    FileList::new(inputs.files.clone()).write_to(Path::new(&output_cfg), false)?;
    let manifest = FileList::new(inputs.manifest.iter().map(ToString::to_string).collect());
    manifest.write_to(Path::new(&manifest_cfg), false)?;

    for summary in &inputs.datasets {
        println!(
            "{}: {} files, {} jobs",
            summary.dataset_line, summary.files, summary.jobs
        );
    }
    println!("Wrote {} files to {output_cfg}", inputs.files.len());
    println!("Wrote {} jobs to {manifest_cfg}", inputs.manifest.len());
    Ok(())
}
