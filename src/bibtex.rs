//! BibTeX parser implementation.
//!
//! Splits a `.bib` document into [`RawCitationEntry`] values and projects each
//! one into a [`NormalizedPublication`](crate::NormalizedPublication).
//!
//! # Example
//!
//! ```
//! use bibrecords::{BibtexParser, EntryParser, ImportConfig};
//! use bibrecords::bibtex::normalize_entry;
//!
//! let input = r#"@phdthesis{roe2019,
//!   title = {On {Things}},
//!   author = {Roe, Richard},
//!   year = 2019,
//!   school = {Example University}
//! }"#;
//!
//! let entries = BibtexParser::new().parse(input).unwrap();
//! let publication = normalize_entry(&entries[0], &ImportConfig::default()).unwrap();
//! assert_eq!(publication.title, "On Things");
//! assert_eq!(publication.venue, "Example University");
//! assert_eq!(publication.description, "Published in Example University.");
//! ```

mod parse;
mod structure;

use crate::{EntryParser, ParsedEntry, Result};
use parse::bibtex_parse;

pub use structure::{SkipReason, normalize_entry};

/// Parser for BibTeX batch files.
///
/// The grammar itself is handled by the `biblatex` crate. When a document
/// does not parse as a whole, every `@type{...}` block is retried on its own
/// so a single broken entry only costs that entry.
#[derive(Debug, Clone, Default)]
pub struct BibtexParser;

impl BibtexParser {
    /// Creates a new BibTeX parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibrecords::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EntryParser for BibtexParser {
    /// Parses a string containing zero or more BibTeX entries.
    ///
    /// An empty document is not an error; it simply yields no entries.
    fn parse_all(&self, input: &str) -> Result<Vec<ParsedEntry>> {
        Ok(bibtex_parse(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_bibtex() {
        let input = r#"
@article{doe2021,
  title = {Deep Learning for X},
  author = {Doe, Jane and Smith, Bob},
  year = {2021},
  journal = {Journal of X},
  url = {https://example.org/doe2021.pdf}
}
"#;
        let entries = BibtexParser::new().parse(input).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.citation_key.as_deref(), Some("doe2021"));
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.field("title"), Some("Deep Learning for X"));
        assert_eq!(entry.field("author"), Some("Doe, Jane and Smith, Bob"));
        assert_eq!(entry.field("year"), Some("2021"));
        assert_eq!(entry.field("url"), Some("https://example.org/doe2021.pdf"));
    }

    #[test]
    fn test_parse_keeps_source_order() {
        let input = r#"
@book{zeta, title = {Zeta}, year = 2001}
@article{alpha, title = {Alpha}, year = 2002}
@phdthesis{mid, title = {Mid}, year = 2003, school = {Uni}}
"#;
        let entries = BibtexParser::new().parse(input).unwrap();
        let keys: Vec<_> = entries
            .iter()
            .map(|e| e.citation_key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(entries[0].entry_type, "book");
        assert_eq!(entries[2].entry_type, "phdthesis");
    }

    #[test]
    fn test_parse_empty_input() {
        let entries = BibtexParser::new().parse("").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_broken_entry_does_not_hide_others() {
        let input = r#"@article{good1,
  title = {First},
  year = 2020
}
@article{broken,
  title = {Unclosed,
  year = 2020

@article{good2,
  title = {Second},
  year = 2021
}
"#;
        let parsed = BibtexParser::new().parse_all(input).unwrap();
        let good: Vec<_> = parsed
            .iter()
            .filter_map(|p| match p {
                ParsedEntry::Entry(e) => e.citation_key.as_deref(),
                ParsedEntry::Unparseable { .. } => None,
            })
            .collect();
        assert_eq!(good, vec!["good1", "good2"]);
        assert!(parsed.iter().any(|p| matches!(
            p,
            ParsedEntry::Unparseable { citation_key: Some(key), .. } if key == "broken"
        )));
    }
}
