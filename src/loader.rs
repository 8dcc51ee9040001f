//! Reading records back from the content directory.
//!
//! A record is a Markdown file whose front matter sits between `---` lines:
//!
//! ```text
//! ---
//! title: "Deep Learning for X"
//! authors: ["Jane Doe"]
//! year: 2021
//! ...
//! ---
//!
//! Body text.
//! ```
//!
//! Records may have been edited by hand, so unknown keys are ignored and only
//! `title` is required.

use crate::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Links block of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordLinks {
    pub pdf: Option<String>,
    pub code: Option<String>,
}

/// Front matter of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(rename = "type", default)]
    pub publication_type: Option<String>,
    #[serde(default)]
    pub links: RecordLinks,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// File the record was read from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Parse one record's content.
pub fn parse_record(content: &str, path: &Path) -> Result<StoredRecord> {
    let front_matter = extract_front_matter(content).ok_or_else(|| ImportError::FrontMatter {
        path: path.to_path_buf(),
        message: "no front matter found (expected --- delimiters)".into(),
    })?;

    let mut record: StoredRecord =
        serde_yaml::from_str(front_matter).map_err(|e| ImportError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    record.path = path.to_path_buf();
    Ok(record)
}

/// Read every record with `extension` in `dir`, sorted by file name.
///
/// Files that cannot be read or parsed are logged and left out.
///
/// # Errors
///
/// Returns an `Io` error when the directory itself cannot be listed.
pub fn load_records<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<StoredRecord>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .map_err(ImportError::from)
            .and_then(|content| parse_record(&content, &path));
        match parsed {
            Ok(record) => records.push(record),
            Err(err) => warn!("Ignoring {}: {}", path.display(), err),
        }
    }
    Ok(records)
}

fn extract_front_matter(content: &str) -> Option<&str> {
    let rest = content.trim_start().strip_prefix("---")?;
    let end = rest.find("\n---")?;
    Some(&rest[..end])
}
