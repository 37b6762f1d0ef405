//! Shared "resolve pipeline" used by the subcommands.
//!
//! resolve sample -> list files (with retry) -> group -> job slice
//!
//! DAS access goes through `&dyn DatasetQuery` so the file-list writers can be
//! exercised without the real client.

use std::path::{Path, PathBuf};

use crate::config::ToolConfig;
use crate::data::{CatalogFile, DatasetQuery, SampleCatalog};
use crate::domain::{SampleInfo, SampleKind, Year};
use crate::error::AppError;
use crate::io::{ConfigEntry, FileList, ListError, list_sample_files, list_with_retry};
use crate::jobs::job_files;

/// Settings and catalog shared by one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ToolConfig,
    pub catalog: SampleCatalog,
}

impl Context {
    /// Build the catalog from `config`, layering the optional catalog file.
    pub fn new(config: ToolConfig) -> Result<Self, AppError> {
        let mut catalog = SampleCatalog::new(config.skim_base_dir.clone());
        if let Some(path) = &config.catalog {
            tracing::debug!("Loading sample catalog {}", path.display());
            catalog = catalog.with_overrides(CatalogFile::load(path)?)?;
        }
        Ok(Self { config, catalog })
    }

    pub fn mc_list_path(&self, sample_id: u32) -> PathBuf {
        self.config.filelist_dir.join(format!("{sample_id}.txt"))
    }

    pub fn data_list_path(&self, data_type: u32, year: Year) -> PathBuf {
        self.config.filelist_dir.join(format!("data_{data_type}_{year}.txt"))
    }
}

/// Local skim files of a resolved sample, retried per the configured policy.
pub fn list_local(ctx: &Context, info: &SampleInfo) -> Result<Vec<String>, ListError> {
    let what = format!("sample {}", info.id);
    list_with_retry(&ctx.config.retry, &what, || {
        let files = list_sample_files(info);
        tracing::debug!("Listed {} files for {what}", files.len());
        Ok(files)
    })
}

/// DAS file URLs of `dataset`, retried per the configured policy.
pub fn list_remote(ctx: &Context, query: &dyn DatasetQuery, dataset: &str) -> Result<Vec<String>, ListError> {
    list_with_retry(&ctx.config.retry, dataset, || {
        tracing::info!("Querying DAS for {dataset}");
        Ok(query.query_files(dataset)?)
    })
}

/// Files one job processes: resolve, list local skims, then take the job's group.
pub fn files_for_job(
    ctx: &Context,
    sample_id: u32,
    year: Year,
    skim_type: &str,
    group: usize,
    job: usize,
) -> Result<Vec<String>, AppError> {
    let info = ctx.catalog.resolve(sample_id, skim_type, Some(year))?;
    let files = list_local(ctx, &info)?;
    Ok(job_files(&files, group, job)?.to_vec())
}

/// Same as `files_for_job`, but reading a list written earlier by `resolve`.
pub fn files_for_job_from_list(ctx: &Context, sample_id: u32, group: usize, job: usize) -> Result<Vec<String>, AppError> {
    let path = ctx.mc_list_path(sample_id);
    if !path.exists() {
        return Err(AppError::failure(format!(
            "Error: no file list for sample {sample_id} at {} (run `skimprep resolve --sample {sample_id}` first)",
            path.display()
        )));
    }
    let list = FileList::read(&path)?;
    Ok(job_files(&list.entries, group, job)?.to_vec())
}

/// Write the DAS file list of an arbitrary dataset to `output`.
pub fn write_custom_list(
    ctx: &Context,
    query: &dyn DatasetQuery,
    dataset: &str,
    output: &Path,
) -> Result<usize, AppError> {
    let files = list_remote(ctx, query, dataset)?;
    let list = FileList::new(files)
        .sorted()
        .with_header(format!("DAS: {dataset}"))
        .with_count_and_timestamp();
    list.write_to(output, false)?;
    Ok(list.len())
}

/// Write one era of a data stream, appending to the per-year list when present.
pub fn write_data_list(
    ctx: &Context,
    query: &dyn DatasetQuery,
    data_type: u32,
    year: Year,
    dataset: &str,
) -> Result<(PathBuf, usize), AppError> {
    if SampleKind::of(data_type) != SampleKind::Data {
        return Err(AppError::failure(format!(
            "Error: --type {data_type} is not a data stream ID"
        )));
    }

    let path = ctx.data_list_path(data_type, year);
    let files = list_remote(ctx, query, dataset)?;
    let mut list = FileList::new(files).sorted();
    let append = path.exists();
    if !append {
        list = list.with_header(format!("data stream {data_type} year {year}"));
    }
    let count = format!("{} files", list.len());
    list = list.with_header(format!("DAS: {dataset}")).with_header(count);
    list.write_to(&path, append)?;
    Ok((path, list.len()))
}

/// Write `<filelist_dir>/<id>.txt` for one MC sample.
pub fn write_mc_list(ctx: &Context, query: &dyn DatasetQuery, sample_id: u32) -> Result<(PathBuf, usize), AppError> {
    let dataset = ctx.catalog.das_dataset(sample_id)?;
    let files = list_remote(ctx, query, &dataset)?;
    let list = FileList::new(files)
        .sorted()
        .with_header(format!("MC sample {sample_id}"))
        .with_header(format!("DAS: {dataset}"))
        .with_count_and_timestamp();
    let path = ctx.mc_list_path(sample_id);
    list.write_to(&path, false)?;
    Ok((path, list.len()))
}

/// Outcome of resolving every MC sample of a jobs config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub written: Vec<(u32, usize)>,
    pub existing: Vec<u32>,
    pub disabled: Vec<u32>,
    pub data: Vec<u32>,
    pub failed: Vec<(u32, String)>,
}

impl BatchSummary {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Resolved:          {}\n", self.written.len()));
        out.push_str(&format!("Already present:   {}\n", self.existing.len()));
        out.push_str(&format!("Disabled ('no'):   {}\n", self.disabled.len()));
        out.push_str(&format!("Data (skipped):    {}\n", self.data.len()));
        out.push_str(&format!("Failed:            {}\n", self.failed.len()));
        for (sample_id, message) in &self.failed {
            out.push_str(&format!("  {sample_id}: {message}\n"));
        }
        out
    }
}

/// Resolve each distinct MC sample of `entries`; failures are collected, not fatal.
pub fn resolve_config_batch(
    ctx: &Context,
    query: &dyn DatasetQuery,
    entries: &[ConfigEntry],
    force: bool,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut seen = std::collections::BTreeSet::new();

    for entry in entries {
        let id = entry.sample_id;
        // A disabled line must not hide a later enabled line of the same sample.
        if entry.skip {
            summary.disabled.push(id);
            continue;
        }
        if !seen.insert(id) {
            continue;
        }
        if SampleKind::of(id) == SampleKind::Data {
            summary.data.push(id);
            continue;
        }
        if !force && ctx.mc_list_path(id).exists() {
            tracing::info!("File list for sample {id} exists; skipping");
            summary.existing.push(id);
            continue;
        }
        match write_mc_list(ctx, query, id) {
            Ok((_, n)) => summary.written.push((id, n)),
            Err(err) => {
                tracing::warn!("Sample {id}: {err}");
                summary.failed.push((id, err.to_string()));
            }
        }
    }
    summary
}
