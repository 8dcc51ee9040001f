//! Turn a BibTeX export into editable publication records.
//!
//! `bibrecords` reads a batch citation file, normalizes every entry (authors,
//! venue, abstract), writes one Markdown record with a YAML front matter block
//! per entry, and can later count the stored records by year for a chart.
//!
//! # Key Features
//!
//! - **Entry parsing**: BibTeX grammar via the `biblatex` crate, with a
//!   per-entry fallback so one broken entry does not hide the rest
//! - **Normalization**:
//!   - "Family, Given" author names re-ordered to "Given Family"
//!   - Venue picked from `booktitle`, `journal`, `school` in that order
//!   - Description synthesized when no abstract is present
//! - **Record synthesis**:
//!   - Deterministic `{year}-{surname}-{slug}.md` file names
//!   - Escaped front matter that stays valid YAML
//!   - Overwrite or skip-existing modes, opt-in collision disambiguation
//! - **Aggregation**: per-year publication counts, numeric or legacy lexical
//!   ordering, CSV export
//!
//! # Basic Usage
//!
//! ```rust
//! use bibrecords::{BibtexParser, EntryParser};
//!
//! let input = r#"@article{doe2021,
//!   title = {Deep Learning for X},
//!   author = {Doe, Jane},
//!   year = {2021},
//!   journal = {Journal of X}
//! }"#;
//!
//! let entries = BibtexParser::new().parse(input).unwrap();
//! assert_eq!(entries[0].citation_key.as_deref(), Some("doe2021"));
//! ```
//!
//! # Importing a File
//!
//! ```no_run
//! use bibrecords::{ImportConfig, import_file};
//!
//! let config = ImportConfig::default();
//! let summary = import_file("citations.bib", "src/content/publications", &config).unwrap();
//! println!("Successfully imported {} publications.", summary.imported);
//! ```
//!
//! # Counting by Year
//!
//! ```rust
//! use bibrecords::aggregate::{YearOrder, aggregate_years};
//!
//! let buckets = aggregate_years([Some(2019), Some(2019), Some(2021)], YearOrder::Numeric);
//! assert_eq!(buckets[0].year, 2019);
//! assert_eq!(buckets[0].count, 2);
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`ImportError`]. The only
//! error that stops a batch is a missing source file; problems with single
//! entries are reported as skips and the run carries on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub mod aggregate;
pub mod bibtex;
pub mod config;
pub mod loader;
pub mod pipeline;
pub mod publication;
pub mod record;
mod regex;
mod utils;

// Reexports
pub use bibtex::{BibtexParser, SkipReason};
pub use config::{CollisionPolicy, ImportConfig, WriteMode};
pub use pipeline::{ImportSummary, import_file, import_str};
pub use publication::{NormalizedPublication, PublicationType};
pub use record::{RecordWriter, WriteOutcome, record_filename, render_record};

/// A specialized Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Represents errors that can occur while importing or reading records.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BibTeX file not found at {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid front matter in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },
}

impl From<toml::de::Error> for ImportError {
    fn from(err: toml::de::Error) -> Self {
        ImportError::Config(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::InvalidFormat(err.to_string())
    }
}

/// One bibliographic entry as it appears in the batch file.
///
/// Field names are lower case. Values are the field text as the `biblatex`
/// grammar reads it, which is more than brace flattening: `@string`
/// abbreviations are expanded, `--` becomes an en dash and `---` an em dash,
/// math loses its `$` delimiters, and blank lines inside a value become ` — `.
/// An abbreviation that is never defined is kept as its bare name. Cleaning
/// and validation happen later, in [`NormalizedPublication::try_from`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitationEntry {
    /// Citation key, `None` when the entry has no usable key
    pub citation_key: Option<String>,
    /// Lower-case entry type, e.g. `article`, `book`, `phdthesis`
    pub entry_type: String,
    /// Field name to raw value
    pub fields: BTreeMap<String, String>,
}

impl RawCitationEntry {
    /// Placeholder used in reports for entries without a key.
    pub const UNKNOWN_KEY: &'static str = "<unknown>";

    /// The citation key, or a placeholder suitable for log messages.
    pub fn display_key(&self) -> &str {
        self.citation_key.as_deref().unwrap_or(Self::UNKNOWN_KEY)
    }

    /// Raw value of a field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Trait for implementing batch entry parsers.
pub trait EntryParser {
    /// Parse a string containing one or more entries.
    ///
    /// # Arguments
    ///
    /// * `input` - The full text of a batch citation file
    ///
    /// # Returns
    ///
    /// The entries in source order. Entries the grammar could not read are
    /// returned as [`ParsedEntry::Unparseable`] so callers can count them.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if the input cannot be read as the format at all
    fn parse_all(&self, input: &str) -> Result<Vec<ParsedEntry>>;

    /// Parse a string and keep only the readable entries.
    fn parse(&self, input: &str) -> Result<Vec<RawCitationEntry>> {
        Ok(self
            .parse_all(input)?
            .into_iter()
            .filter_map(|parsed| match parsed {
                ParsedEntry::Entry(entry) => Some(entry),
                ParsedEntry::Unparseable { .. } => None,
            })
            .collect())
    }
}

/// Result of reading one entry-sized chunk of a batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry {
    Entry(RawCitationEntry),
    /// A chunk the grammar rejected, with whatever key could be recovered
    Unparseable {
        citation_key: Option<String>,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_display() {
        let error = ImportError::InvalidFormat("Invalid entry".to_string());
        assert_eq!(error.to_string(), "Parse error: Invalid entry");

        let error = ImportError::SourceNotFound(PathBuf::from("citations.bib"));
        assert_eq!(error.to_string(), "BibTeX file not found at citations.bib");
    }

    #[test]
    fn test_display_key_placeholder() {
        let entry = RawCitationEntry::default();
        assert_eq!(entry.display_key(), "<unknown>");

        let entry = RawCitationEntry {
            citation_key: Some("doe2021".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.display_key(), "doe2021");
    }
}
