//! BibTeX parsing implementation.
//!
//! This module turns `.bib` text into [`ParsedEntry`] values using the
//! `biblatex` grammar.

use crate::regex::Regex;
use crate::{ParsedEntry, RawCitationEntry};
use biblatex::{Bibliography, Chunk, Entry, ParseError, ParseErrorKind, Spanned};
use std::sync::LazyLock;
use tracing::debug;

/// Start of an `@type` block at the beginning of a line, indentation allowed.
static ENTRY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*@[a-zA-Z]").unwrap());

/// Citation key of an `@type{key,` header, for reporting broken entries.
static ENTRY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\s*[a-zA-Z]+\s*[{(]\s*([^,\s{}()]+)\s*,").unwrap());

/// Parse a whole BibTeX document, falling back to entry-by-entry parsing.
pub(crate) fn bibtex_parse(text: &str) -> Vec<ParsedEntry> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match parse_lenient(text) {
        Ok(bibliography) => bibliography
            .iter()
            .map(|entry| ParsedEntry::Entry(raw_entry(entry)))
            .collect(),
        Err(err) => {
            debug!("whole-file parse failed ({err}), retrying entry by entry");
            parse_individually(text)
        }
    }
}

/// Split the document at `@type` lines and parse every block on its own.
///
/// `@string` blocks are prepended to every entry block so abbreviations
/// still resolve.
fn parse_individually(text: &str) -> Vec<ParsedEntry> {
    let blocks = split_blocks(text);
    let abbreviations: String = blocks
        .iter()
        .filter(|block| is_string_block(block))
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    let mut parsed = Vec::new();
    for block in blocks.iter().filter(|block| !is_string_block(block)) {
        let bibliography = if abbreviations.is_empty() {
            parse_lenient(block)
        } else {
            parse_lenient(&format!("{abbreviations}\n{block}")).or_else(|_| parse_lenient(block))
        };

        match bibliography {
            Ok(bibliography) => {
                parsed.extend(
                    bibliography
                        .iter()
                        .map(|entry| ParsedEntry::Entry(raw_entry(entry))),
                );
            }
            Err(err) => parsed.push(ParsedEntry::Unparseable {
                citation_key: block_key(block),
                message: err.to_string(),
            }),
        }
    }
    parsed
}

/// Parse with the grammar, keeping an undefined abbreviation as its bare name.
///
/// Each time the grammar reports an unknown abbreviation, an `@string` that
/// maps the name to itself is prepended and the parse is retried.
fn parse_lenient(text: &str) -> Result<Bibliography, ParseError> {
    let mut defined: Vec<String> = Vec::new();
    loop {
        let prelude: String = defined
            .iter()
            .map(|name| format!("@string{{{name} = {{{name}}}}}\n"))
            .collect();
        match Bibliography::parse(&format!("{prelude}{text}")) {
            Err(ParseError {
                kind: ParseErrorKind::UnknownAbbreviation(name),
                ..
            }) if !defined.contains(&name) => {
                debug!("undefined abbreviation {name:?} kept as text");
                defined.push(name);
            }
            result => return result,
        }
    }
}

fn split_blocks(text: &str) -> Vec<&str> {
    let positions: Vec<usize> = ENTRY_START.find_iter(text).map(|m| m.start()).collect();
    positions
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = positions.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim_start()
        })
        .collect()
}

fn is_string_block(block: &str) -> bool {
    block
        .get(1..7)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("string"))
}

fn block_key(block: &str) -> Option<String> {
    ENTRY_KEY
        .captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Flatten a parsed entry into raw strings.
fn raw_entry(entry: &Entry) -> RawCitationEntry {
    let key = entry.key.trim();
    RawCitationEntry {
        citation_key: (!key.is_empty()).then(|| key.to_string()),
        entry_type: entry.entry_type.to_string().to_lowercase(),
        fields: entry
            .fields
            .iter()
            .map(|(name, chunks)| (name.to_lowercase(), chunks_to_string(chunks)))
            .collect(),
    }
}

/// Convert biblatex chunks to a plain string.
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|chunk| match &chunk.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("@article{doe2021,\n title = {X}", Some("doe2021"))]
    #[case("@Book ( key-1 , title = {X}", Some("key-1"))]
    #[case("@article{,\n title = {X}", None)]
    #[case("@article{\n", None)]
    fn test_block_key(#[case] block: &str, #[case] expected: Option<&str>) {
        assert_eq!(block_key(block).as_deref(), expected);
    }

    #[test]
    fn test_split_blocks() {
        let text = "% header\n@article{a, title={A}}\n\n@book{b, title={B}}\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("@article{a"));
        assert!(blocks[1].starts_with("@book{b"));
    }

    #[test]
    fn test_split_blocks_accepts_indented_entries() {
        let text = "@article{a, title={A}}\n  @book{b, title={B}}\n\t@string{jx = {X}}\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].starts_with("@book{b"));
        assert!(is_string_block(blocks[2]));
        assert_eq!(block_key(blocks[1]).as_deref(), Some("b"));
    }

    #[test]
    fn test_indented_entry_after_broken_one_is_kept() {
        let text = "@article{broken,\n  title = {Unclosed\n  @article{good2, title = {B}, year = 2021}\n";
        let parsed = bibtex_parse(text);
        assert_eq!(parsed.len(), 2);
        assert!(matches!(
            &parsed[0],
            ParsedEntry::Unparseable { citation_key: Some(key), .. } if key == "broken"
        ));
        let ParsedEntry::Entry(entry) = &parsed[1] else {
            panic!("expected an entry");
        };
        assert_eq!(entry.citation_key.as_deref(), Some("good2"));
    }

    #[test]
    fn test_undefined_abbreviation_kept_as_name() {
        let parsed = bibtex_parse(
            "@article{a1, title = {First}, year = 2020, journal = nature, publisher = acm}",
        );
        assert_eq!(parsed.len(), 1);
        let ParsedEntry::Entry(entry) = &parsed[0] else {
            panic!("expected an entry");
        };
        assert_eq!(entry.field("journal"), Some("nature"));
        assert_eq!(entry.field("publisher"), Some("acm"));
    }

    #[test]
    fn test_undefined_abbreviation_in_fallback() {
        let text = r#"@string{jx = "Journal of X"}
@article{good, title = {Good}, journal = nature, publisher = jx, year = 2020}
@article{bad,
  title = {Unclosed
"#;
        let parsed = bibtex_parse(text);
        let ParsedEntry::Entry(entry) = &parsed[0] else {
            panic!("expected an entry");
        };
        assert_eq!(entry.field("journal"), Some("nature"));
        assert_eq!(entry.field("publisher"), Some("Journal of X"));
        assert!(matches!(parsed[1], ParsedEntry::Unparseable { .. }));
    }

    #[test]
    fn test_is_string_block() {
        assert!(is_string_block("@string{jx = {Journal of X}}"));
        assert!(is_string_block("@STRING{jx = {Journal of X}}"));
        assert!(!is_string_block("@article{a, title={A}}"));
        assert!(!is_string_block("@str"));
    }

    #[test]
    fn test_grouping_braces_are_flattened() {
        let parsed = bibtex_parse("@article{a, title = {The {GPU} Era}, year = 2020}");
        let ParsedEntry::Entry(entry) = &parsed[0] else {
            panic!("expected an entry");
        };
        assert_eq!(entry.field("title"), Some("The GPU Era"));
    }

    #[test]
    fn test_abbreviations_resolve_in_fallback() {
        let text = r#"@string{jx = "Journal of X"}
@article{good,
  title = {Good},
  journal = jx,
  year = 2020
}
@article{bad,
  title = {Unclosed
"#;
        let parsed = bibtex_parse(text);
        let ParsedEntry::Entry(entry) = &parsed[0] else {
            panic!("expected an entry");
        };
        assert_eq!(entry.field("journal"), Some("Journal of X"));
        assert!(matches!(parsed[1], ParsedEntry::Unparseable { .. }));
    }
}
