//! Enumerate the ROOT files that make up a sample.
//!
//! Local listing walks the resolved skim directories; remote listing goes
//! through [`crate::data::DatasetQuery`]. Either one can be wrapped in
//! [`list_with_retry`], which replaces the old "sleep 10 s and try once more".

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use thiserror::Error;

use crate::config::RetryPolicy;
use crate::data::DasError;
use crate::domain::SampleInfo;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("no files found for {what} after {attempts} attempt(s)")]
    Empty { what: String, attempts: u32 },

    #[error(transparent)]
    Das(#[from] DasError),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// All `*.root` files below `dir`, sorted by path.
///
/// A directory that does not exist simply has no files.
pub fn list_root_files(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    collect_root_files(dir, &mut out);
    out.sort();
    out
}

fn collect_root_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::debug!("Cannot read directory {}", dir.display());
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if is_hidden(&path) {
                continue;
            }
            collect_root_files(&path, out);
            continue;
        }

        if file_type.is_file() && is_root_file(&path) {
            out.push(path);
        }
    }
}

fn is_root_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("root")
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Files of every directory of `info`, concatenated in catalog order.
pub fn list_sample_files(info: &SampleInfo) -> Vec<String> {
    info.directories
        .iter()
        .flat_map(|dir| list_root_files(dir))
        .map(|path| path.display().to_string())
        .collect()
}

/// Run `list` until it yields files or `policy` runs out of attempts.
///
/// Errors from an attempt are retried like empty results; the error of the
/// final attempt is returned as-is.
pub fn list_with_retry<F>(policy: &RetryPolicy, what: &str, mut list: F) -> Result<Vec<String>, ListError>
where
    F: FnMut() -> Result<Vec<String>, ListError>,
{
    let attempts = policy.max_attempts();
    for attempt in 1..=attempts {
        let last = attempt == attempts;
        match list() {
            Ok(files) if !files.is_empty() => return Ok(files),
            Ok(_) if last => {
                return Err(ListError::Empty {
                    what: what.to_string(),
                    attempts,
                });
            }
            Err(err) if last => return Err(err),
            Ok(_) => tracing::warn!(
                "No files found for {what} (attempt {attempt}/{attempts}); retrying in {}s",
                policy.delay_secs
            ),
            Err(err) => tracing::warn!(
                "Listing {what} failed (attempt {attempt}/{attempts}): {err}; retrying in {}s",
                policy.delay_secs
            ),
        }
        thread::sleep(policy.delay());
    }

    Err(ListError::Empty {
        what: what.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn lists_root_files_recursively_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.root"));
        touch(&dir.path().join("a.root"));
        touch(&dir.path().join("sub/c.root"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join(".hidden/d.root"));

        let files = list_root_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.root", "b.root", "sub/c.root"]);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_root_files(&dir.path().join("absent")).is_empty());
    }

    #[test]
    fn retry_returns_first_non_empty_listing() {
        let calls = Cell::new(0);
        let files = list_with_retry(&RetryPolicy::new(3, 0), "sample 179", || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Ok(vec![])
            } else {
                Ok(vec!["a.root".to_string()])
            }
        })
        .unwrap();
        assert_eq!(files, vec!["a.root".to_string()]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn retry_gives_up_after_policy_attempts() {
        let calls = Cell::new(0);
        let err = list_with_retry(&RetryPolicy::new(2, 0), "sample 179", || {
            calls.set(calls.get() + 1);
            Ok(vec![])
        })
        .unwrap_err();
        assert_eq!(calls.get(), 2);
        assert!(matches!(err, ListError::Empty { attempts: 2, .. }));
    }

    #[test]
    fn retry_surfaces_the_last_error() {
        let calls = Cell::new(0);
        let err = list_with_retry(&RetryPolicy::new(2, 0), "dataset", || {
            calls.set(calls.get() + 1);
            Err(ListError::Io {
                path: PathBuf::from("x"),
                source: std::io::Error::other("boom"),
            })
        })
        .unwrap_err();
        assert_eq!(calls.get(), 2);
        assert!(matches!(err, ListError::Io { .. }));
    }
}
