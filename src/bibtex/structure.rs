//! Projection of raw BibTeX entries into publications.
//!
//! # Field Processing Strategy
//! - **Cleaning**: every value loses its grouping braces and surrounding space
//! - **Priority-based**: the venue is the first non-empty field of the
//!   configured list, then the configured fallback
//! - **Gate**: an empty title or a missing or non-numeric year skips the entry

use crate::config::ImportConfig;
use crate::publication::{NormalizedPublication, PublicationType};
use crate::utils::{clean_field, parse_authors, parse_year};
use crate::RawCitationEntry;
use serde::Serialize;
use thiserror::Error;

/// Why an entry did not produce a record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    #[error("Missing title")]
    MissingTitle,

    #[error("Missing year")]
    MissingYear,

    #[error("Invalid year: '{0}'")]
    InvalidYear(String),

    #[error("Unparseable entry: {0}")]
    Unparseable(String),
}

/// Clean and validate one entry.
///
/// # Errors
///
/// Returns the [`SkipReason`] when the entry cannot become a record. A skip is
/// not a failure of the batch; callers report it and move on.
pub fn normalize_entry(
    entry: &RawCitationEntry,
    config: &ImportConfig,
) -> Result<NormalizedPublication, SkipReason> {
    let title = clean_field(entry.field("title"));
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }

    let year_text = clean_field(entry.field("year"));
    if year_text.is_empty() {
        return Err(SkipReason::MissingYear);
    }
    let year = parse_year(&year_text).ok_or(SkipReason::InvalidYear(year_text))?;

    let authors = parse_authors(entry.field("author"));
    let venue = resolve_venue(entry, config);
    let publication_type = PublicationType::from_entry_type(&entry.entry_type);

    let abstract_text = clean_field(entry.field("abstract"));
    let description = if abstract_text.is_empty() {
        format!("Published in {}.", venue)
    } else {
        abstract_text
    };

    let source_url = Some(clean_field(entry.field("url"))).filter(|url| !url.is_empty());

    Ok(NormalizedPublication {
        citation_key: entry.citation_key.clone(),
        title,
        year,
        authors,
        venue,
        publication_type,
        description,
        source_url,
    })
}

/// First non-empty venue field, or the configured fallback.
fn resolve_venue(entry: &RawCitationEntry, config: &ImportConfig) -> String {
    config
        .venue_fields
        .iter()
        .map(|name| clean_field(entry.field(name)))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| config.default_venue.clone())
}

impl TryFrom<&RawCitationEntry> for NormalizedPublication {
    type Error = SkipReason;

    fn try_from(entry: &RawCitationEntry) -> Result<Self, Self::Error> {
        normalize_entry(entry, &ImportConfig::default())
    }
}
