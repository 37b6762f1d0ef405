//! Plain-text file lists: optional `# ...` metadata lines, then one path or
//! URL per line.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;

use super::listing::ListError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileList {
    /// Metadata lines without the leading `# `.
    pub header: Vec<String>,
    pub entries: Vec<String>,
}

impl FileList {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            header: Vec::new(),
            entries,
        }
    }

    pub fn with_header(mut self, line: impl Into<String>) -> Self {
        self.header.push(line.into());
        self
    }

    /// Standard trailer: file count and generation timestamp.
    pub fn with_count_and_timestamp(self) -> Self {
        let count = format!("{} files", self.entries.len());
        self.with_header(count)
            .with_header(format!("generated: {}", Local::now().to_rfc3339()))
    }

    pub fn sorted(mut self) -> Self {
        self.entries.sort();
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(&format!("# {line}\n"));
        }
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    pub fn parse(text: &str) -> Self {
        let mut list = FileList::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if let Some(meta) = line.strip_prefix('#') {
                list.header.push(meta.trim().to_string());
                continue;
            }
            list.entries.push(line.to_string());
        }
        list
    }

    pub fn read(path: &Path) -> Result<Self, ListError> {
        let text = fs::read_to_string(path).map_err(|source| ListError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Write (or append to) `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path, append: bool) -> Result<(), ListError> {
        let io_err = |source| ListError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut file = if append {
            OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?
        } else {
            File::create(path).map_err(io_err)?
        };
        file.write_all(self.render().as_bytes()).map_err(io_err)?;

        tracing::info!("Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}
