//! Batch import: source file to record files.
//!
//! Entries are handled one at a time in source order. A missing source file
//! is the only condition that stops the run; everything else is counted in
//! the [`ImportSummary`] and reported through `tracing`.

use crate::bibtex::{BibtexParser, SkipReason, normalize_entry};
use crate::config::ImportConfig;
use crate::record::{RecordWriter, WriteOutcome};
use crate::{EntryParser, ImportError, ParsedEntry, RawCitationEntry, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Counts for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Entries found in the source, readable or not
    pub found: usize,
    /// Records written (created or overwritten)
    pub imported: usize,
    /// Entries rejected by the parser or the validation gate
    pub skipped: usize,
    /// Records left alone because they already existed
    pub unchanged: usize,
    /// Records whose write failed
    pub failed: usize,
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    /// `(citation key, reason)` for every skipped entry
    pub skips: Vec<(String, SkipReason)>,
}

impl ImportSummary {
    fn skip(&mut self, key: &str, reason: SkipReason) {
        warn!("Skipping entry {}: {}", key, reason);
        self.skipped += 1;
        self.skips.push((key.to_string(), reason));
    }
}

/// Import the BibTeX file at `source` into `output_dir`.
///
/// # Errors
///
/// Returns [`ImportError::SourceNotFound`] before touching anything when the
/// source file does not exist, and `Io` errors for an unreadable source or an
/// output directory that cannot be created. Per-entry problems never fail the
/// run.
pub fn import_file<S, O>(source: S, output_dir: O, config: &ImportConfig) -> Result<ImportSummary>
where
    S: AsRef<Path>,
    O: AsRef<Path>,
{
    let source = source.as_ref();
    if !source.exists() {
        return Err(ImportError::SourceNotFound(source.to_path_buf()));
    }

    let content = std::fs::read_to_string(source)?;
    import_str(&content, output_dir, config)
}

/// Import BibTeX text into `output_dir`.
pub fn import_str<O: AsRef<Path>>(
    content: &str,
    output_dir: O,
    config: &ImportConfig,
) -> Result<ImportSummary> {
    let mut writer = RecordWriter::new(output_dir, config)?;
    let parsed = BibtexParser::new().parse_all(content)?;

    let mut summary = ImportSummary {
        found: parsed.len(),
        ..Default::default()
    };
    info!("Found {} entries. Processing...", summary.found);

    for item in parsed {
        let entry = match item {
            ParsedEntry::Entry(entry) => entry,
            ParsedEntry::Unparseable {
                citation_key,
                message,
            } => {
                let key = citation_key.as_deref().unwrap_or(RawCitationEntry::UNKNOWN_KEY);
                summary.skip(key, SkipReason::Unparseable(message));
                continue;
            }
        };

        let publication = match normalize_entry(&entry, config) {
            Ok(publication) => publication,
            Err(reason) => {
                summary.skip(entry.display_key(), reason);
                continue;
            }
        };

        match writer.write(&publication) {
            Ok(WriteOutcome::Written(path)) => {
                summary.imported += 1;
                summary.written.push(path);
            }
            Ok(WriteOutcome::SkippedExisting(_)) => summary.unchanged += 1,
            Err(err) => {
                error!("Failed to write entry {}: {}", entry.display_key(), err);
                summary.failed += 1;
            }
        }
    }

    info!("Successfully imported {} publications.", summary.imported);
    Ok(summary)
}
