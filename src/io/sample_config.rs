//! Job config parsing.
//!
//! Format, one sample per line:
//!
//! ```text
//! # comment
//! 179 20220
//! 1022 20240 no   # disabled
//! ```
//!
//! Blank and `#`-prefixed lines are ignored. A third token equal to `no`
//! disables the line.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Year;

/// Skip flag value that disables a config line.
pub const SKIP_FLAG: &str = "no";

#[derive(Error, Debug)]
pub enum SampleConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    /// 1-based line number in the source file.
    pub line: usize,
    pub sample_id: u32,
    pub year: Year,
    pub skip: bool,
    pub comment: Option<String>,
}

/// Parse one line. `Ok(None)` for blank and comment lines.
pub fn parse_line(raw: &str) -> Result<Option<ConfigEntry>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (body, comment) = match trimmed.split_once('#') {
        Some((body, comment)) => (body, Some(comment.trim().to_string()).filter(|c| !c.is_empty())),
        None => (trimmed, None),
    };

    let mut tokens = body.split_whitespace();
    let sample_id = tokens
        .next()
        .ok_or_else(|| "missing sample ID".to_string())?;
    let sample_id: u32 = sample_id
        .parse()
        .map_err(|_| format!("invalid sample ID '{sample_id}'"))?;
    let year: Year = tokens
        .next()
        .ok_or_else(|| format!("sample {sample_id}: missing year"))?
        .parse()?;
    let skip = tokens.next() == Some(SKIP_FLAG);

    Ok(Some(ConfigEntry {
        line: 0,
        sample_id,
        year,
        skip,
        comment,
    }))
}

pub fn parse_sample_config(text: &str) -> Result<Vec<ConfigEntry>, SampleConfigError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        match parse_line(raw) {
            Ok(Some(mut entry)) => {
                entry.line = line;
                entries.push(entry);
            }
            Ok(None) => {}
            Err(message) => return Err(SampleConfigError::Malformed { line, message }),
        }
    }
    Ok(entries)
}

pub fn read_sample_config(path: &Path) -> Result<Vec<ConfigEntry>, SampleConfigError> {
    if !path.exists() {
        return Err(SampleConfigError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| SampleConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_sample_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_skip_flags_and_comments() {
        let text = "\
# header
179 20220

1022 20240 no # muon-eg, disabled
103 20230   # powheg
";
        let entries = parse_sample_config(text).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].sample_id, 179);
        assert_eq!(entries[0].year, Year::Y2022);
        assert!(!entries[0].skip);
        assert_eq!(entries[0].line, 2);

        assert_eq!(entries[1].sample_id, 1022);
        assert!(entries[1].skip);
        assert_eq!(entries[1].comment.as_deref(), Some("muon-eg, disabled"));

        assert!(!entries[2].skip);
        assert_eq!(entries[2].comment.as_deref(), Some("powheg"));
    }

    #[test]
    fn other_third_tokens_do_not_skip() {
        let entry = parse_line("179 20220 yes").unwrap().unwrap();
        assert!(!entry.skip);
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let err = parse_sample_config("179 20220\nabc 20220\n").unwrap_err();
        match err {
            SampleConfigError::Malformed { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_line("179").is_err());
        assert!(parse_line("179 1999").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sample_config(&dir.path().join("x.cfg")).unwrap_err();
        assert!(matches!(err, SampleConfigError::NotFound(_)));
    }
}
