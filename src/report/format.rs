//! Formatted terminal output.
//!
//! We keep formatting code in one place so the resolver, lister and checker
//! stay free of printing and output changes are localized.

use std::path::Path;

use crate::check::{AnalysisReport, CompletenessReport, SampleCheck};
use crate::domain::{Category, SampleInfo, Year};

const RULE_WIDTH: usize = 60;
/// Problems listed per sample in verbose mode before eliding the rest.
const VERBOSE_PROBLEM_LIMIT: usize = 5;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Configuration block printed before a job's file list.
pub fn format_sample_config(info: &SampleInfo, year: Year, job: Option<usize>, skim_type: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", rule()));
    out.push_str("Analysis Configuration (sample lookup):\n");
    out.push_str(&format!("  sample: {}\n", info.id));
    out.push_str(&format!("  year: {year}\n"));
    out.push_str(&format!("  job: {}\n", fmt_job(job)));
    out.push_str(&format!("  skim type: {skim_type}\n"));
    for dir in &info.directories {
        out.push_str(&format!("  directory: {}\n", dir.display()));
    }
    out.push_str(&format!("  cross section: {}\n", info.cross_section));
    out.push_str(&format!("  category: {}\n", info.category));
    out.push_str(&format!("  PD type: {}\n", info.pd_type().unwrap_or("Unknown")));
    out.push_str(&rule());
    out
}

/// Configuration block for an explicit sample directory.
pub fn format_custom_config(path: &Path, xsec: f64, category: Category, year: Year, job: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", rule()));
    out.push_str("Analysis Configuration (custom path):\n");
    out.push_str(&format!("  sample path: {}\n", path.display()));
    out.push_str(&format!("  cross section: {xsec}\n"));
    out.push_str(&format!("  category: {category}\n"));
    out.push_str(&format!("  year: {year}\n"));
    out.push_str(&format!("  job: {}\n", fmt_job(job)));
    out.push_str(&rule());
    out
}

pub fn format_lumi(year: Year) -> String {
    match year.lumi_fb() {
        Some(lumi) => format!("Luminosity for year {year}: {lumi} fb^-1"),
        None => format!("Luminosity for year {year}: not available"),
    }
}

fn fmt_job(job: Option<usize>) -> String {
    job.map(|j| j.to_string()).unwrap_or_else(|| "all".to_string())
}

/// Full completeness report: per-analysis sections then an overall summary.
pub fn format_check_report(report: &CompletenessReport, verbose: bool) -> String {
    let mut out = String::new();

    for analysis in &report.analyses {
        out.push_str(&format_analysis_section(analysis, verbose));
    }

    out.push_str(&format!("\n{}\nSUMMARY\n{}\n", rule(), rule()));
    out.push_str(&format!("  Total samples OK:       {}\n", report.total_ok()));
    out.push_str(&format!("  Total samples MISSING:  {}\n", report.total_problems()));

    if report.all_present() {
        out.push_str("\nAll skims present. Ready to submit.\n");
        return out;
    }

    out.push_str("\nMissing samples by analysis:\n");
    for analysis in report.analyses.iter().filter(|a| a.n_problems() > 0) {
        out.push_str(&format!("\n  {}:\n", analysis.name));
        if let Some(err) = &analysis.config_error {
            out.push_str(&format!("    {err}\n"));
        }
        for sample in analysis.problem_samples() {
            out.push_str(&format!(
                "    sample={} year={}: {}/{} files missing\n",
                sample.sample_id,
                sample.year,
                sample.problems.len(),
                sample.total
            ));
        }
    }
    out.push_str("\nSkims must be produced before submitting analysis jobs.\n");
    out
}

fn format_analysis_section(analysis: &AnalysisReport, verbose: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", rule()));
    out.push_str(&format!(
        "Checking {} (skimType={})\n",
        analysis.name, analysis.skim_type
    ));
    out.push_str(&format!("{}\n", rule()));

    if let Some(err) = &analysis.config_error {
        out.push_str(&format!("  {err}\n"));
    }

    if verbose {
        for (sample_id, year) in &analysis.skipped {
            out.push_str(&format!("  [{sample_id:>5} {year}] SKIPPED (marked 'no')\n"));
        }
    }

    for sample in &analysis.samples {
        out.push_str(&format_sample_line(sample, verbose));
    }

    out.push_str(&format!(
        "\n  Result: {} OK, {} with problems\n",
        analysis.n_ok(),
        analysis.n_problems()
    ));
    out
}

fn format_sample_line(sample: &SampleCheck, verbose: bool) -> String {
    let mut out = String::new();
    let tag = format!("[{:>5} {}]", sample.sample_id, sample.year);

    if sample.is_ok() {
        if verbose {
            out.push_str(&format!("  {tag} OK ({} files, {} jobs)\n", sample.total, sample.jobs));
        }
        return out;
    }

    if verbose {
        for problem in sample.problems.iter().take(VERBOSE_PROBLEM_LIMIT) {
            out.push_str(&format!("    MISSING: {problem}\n"));
        }
        if sample.problems.len() > VERBOSE_PROBLEM_LIMIT {
            out.push_str(&format!(
                "    ... and {} more\n",
                sample.problems.len() - VERBOSE_PROBLEM_LIMIT
            ));
        }
    }
    out.push_str(&format!(
        "  {tag} MISSING {}/{} files\n",
        sample.problems.len(),
        sample.total
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::check::Problem;
    use crate::domain::{Analysis, SampleKind};

    fn sample(id: u32, problems: usize) -> SampleCheck {
        SampleCheck {
            sample_id: id,
            year: Year::Y2022,
            total: 8,
            jobs: 8,
            problems: (0..problems)
                .map(|i| Problem::Missing {
                    path: format!("/skims/f{i}.root"),
                })
                .collect(),
        }
    }

    fn report(samples: Vec<SampleCheck>) -> CompletenessReport {
        CompletenessReport {
            analyses: vec![AnalysisReport {
                analysis: Analysis::Wz,
                name: "wzAnalysis".to_string(),
                skim_type: "3l".to_string(),
                group: 1,
                config_path: PathBuf::from("wzAnalysis_input_condor_jobs.cfg"),
                config_error: None,
                samples,
                skipped: vec![(1022, Year::Y2024)],
            }],
        }
    }

    #[test]
    fn clean_report_says_ready() {
        let text = format_check_report(&report(vec![sample(179, 0)]), false);
        assert!(text.contains("Result: 1 OK, 0 with problems"));
        assert!(text.contains("All skims present. Ready to submit."));
        assert!(!text.contains("[  179 20220] OK"));
    }

    #[test]
    fn problems_are_listed_and_elided_in_verbose_mode() {
        let text = format_check_report(&report(vec![sample(179, 0), sample(279, 7)]), true);
        assert!(text.contains("[  179 20220] OK (8 files, 8 jobs)"));
        assert!(text.contains("[ 1022 20240] SKIPPED (marked 'no')"));
        assert!(text.contains("[  279 20220] MISSING 7/8 files"));
        assert_eq!(text.matches("    MISSING: ").count(), 5);
        assert!(text.contains("... and 2 more"));
        assert!(text.contains("sample=279 year=20220: 7/8 files missing"));
        assert!(text.contains("Skims must be produced"));
    }

    #[test]
    fn sample_config_block_lists_every_directory() {
        let info = SampleInfo {
            id: 1022,
            kind: SampleKind::Data,
            dataset_dirs: vec!["MuonEG+A+NANOAOD".into(), "MuonEG+B+NANOAOD".into()],
            directories: vec![PathBuf::from("/s/2l/MuonEG+A+NANOAOD"), PathBuf::from("/s/2l/MuonEG+B+NANOAOD")],
            cross_section: 1.0,
            category: Category::Data,
        };
        let text = format_sample_config(&info, Year::Y2024, Some(3), "2l");
        assert_eq!(text.matches("  directory: ").count(), 2);
        assert!(text.contains("  job: 3"));
        assert!(text.contains("  category: kPlotData"));
        assert!(text.contains("  PD type: MuonEG"));
    }

    #[test]
    fn lumi_line_handles_unknown_years() {
        assert_eq!(format_lumi(Year::Y2022), "Luminosity for year 20220: 7.98 fb^-1");
        assert!(format_lumi(Year::Y2025).ends_with("not available"));
    }
}
