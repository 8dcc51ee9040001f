//! The cleaned, validated projection of a citation entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of publication shown on the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationType {
    Book,
    Paper,
}

impl PublicationType {
    /// Maps a BibTeX entry type: `book` is a book, everything else a paper.
    pub fn from_entry_type(entry_type: &str) -> Self {
        if entry_type == "book" {
            PublicationType::Book
        } else {
            PublicationType::Paper
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::Book => "book",
            PublicationType::Paper => "paper",
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A publication ready to be written as a record.
///
/// Built from a [`RawCitationEntry`](crate::RawCitationEntry) by
/// [`normalize_entry`](crate::bibtex::normalize_entry); `title` is never
/// empty and `year` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPublication {
    /// Citation key of the source entry, kept for reporting
    pub citation_key: Option<String>,
    pub title: String,
    pub year: i32,
    /// Display names in "Given Family" order
    pub authors: Vec<String>,
    pub venue: String,
    pub publication_type: PublicationType,
    pub description: String,
    /// Primary external link
    pub source_url: Option<String>,
}

impl NormalizedPublication {
    /// First author's display name, if any.
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}
