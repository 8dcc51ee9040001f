//! Record synthesis.
//!
//! Turns a [`NormalizedPublication`] into a Markdown file with a YAML front
//! matter block and writes it into the content directory.
//!
//! ## File Names
//!
//! `{year}-{surname}-{slug}.{ext}`, where `surname` is the last word of the
//! first author (or `unknown`) with path separators replaced by `-`, and
//! `slug` is the title slug cut to 30 characters. Names are not unique: two entries sharing year, surname and
//! slug prefix map to the same file. Under [`CollisionPolicy::LastWins`] the
//! later entry replaces the earlier one; [`CollisionPolicy::Disambiguate`]
//! appends `-2`, `-3`, ... instead.
//!
//! ## Example
//!
//! ```
//! use bibrecords::{ImportConfig, NormalizedPublication, PublicationType, record_filename};
//!
//! let publication = NormalizedPublication {
//!     citation_key: None,
//!     title: "Deep Learning for X".to_string(),
//!     year: 2021,
//!     authors: vec!["Jane Doe".to_string()],
//!     venue: "Journal of X".to_string(),
//!     publication_type: PublicationType::Paper,
//!     description: "Published in Journal of X.".to_string(),
//!     source_url: None,
//! };
//! let name = record_filename(&publication, &ImportConfig::default());
//! assert_eq!(name, "2021-Doe-deep-learning-for-x.md");
//! ```

use crate::config::{CollisionPolicy, ImportConfig, WriteMode};
use crate::publication::NormalizedPublication;
use crate::utils::{escape_quoted, file_safe, slugify, surname, truncate_chars};
use crate::Result;
use itertools::Itertools;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Derive the record file name for a publication.
///
/// Pure function of the publication and the configuration; it never looks at
/// the file system.
pub fn record_filename(publication: &NormalizedPublication, config: &ImportConfig) -> String {
    format!("{}.{}", record_stem(publication, config), config.extension)
}

fn record_stem(publication: &NormalizedPublication, config: &ImportConfig) -> String {
    let first_author = file_safe(
        publication
            .first_author()
            .and_then(surname)
            .unwrap_or(&config.unknown_author),
    );
    let slug = slugify(&publication.title);
    let slug = truncate_chars(&slug, config.slug_max_chars);
    format!("{}-{}-{}", publication.year, first_author, slug)
}

/// Render the full record: front matter, a blank line, then the description.
pub fn render_record(publication: &NormalizedPublication, config: &ImportConfig) -> String {
    let authors = publication
        .authors
        .iter()
        .map(|author| format!("\"{}\"", escape_quoted(author)))
        .join(", ");
    let pdf = publication
        .source_url
        .as_deref()
        .unwrap_or(&config.placeholder_link);

    [
        "---".to_string(),
        format!("title: \"{}\"", escape_quoted(&publication.title)),
        format!("authors: [{}]", authors),
        format!("year: {}", publication.year),
        format!("venue: \"{}\"", escape_quoted(&publication.venue)),
        format!("type: \"{}\"", publication.publication_type),
        "links:".to_string(),
        format!("  pdf: \"{}\"", escape_quoted(pdf)),
        format!("  code: \"{}\"", escape_quoted(&config.placeholder_link)),
        format!("description: \"{}\"", escape_quoted(&publication.description)),
        format!("featured: {}", config.featured),
        "---".to_string(),
        String::new(),
        publication.description.clone(),
    ]
    .join("\n")
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or overwritten
    Written(PathBuf),
    /// The file already existed and [`WriteMode::SkipExisting`] left it alone
    SkippedExisting(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::SkippedExisting(path) => path,
        }
    }
}

/// Writes records into one content directory.
///
/// Keeps track of the names produced during its lifetime, which is what
/// [`CollisionPolicy::Disambiguate`] compares against.
#[derive(Debug)]
pub struct RecordWriter<'a> {
    output_dir: PathBuf,
    config: &'a ImportConfig,
    produced: HashSet<String>,
}

impl<'a> RecordWriter<'a> {
    /// Creates the writer, creating `output_dir` and its parents if needed.
    pub fn new<P: AsRef<Path>>(output_dir: P, config: &'a ImportConfig) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            config,
            produced: HashSet::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one record according to the configured modes.
    pub fn write(&mut self, publication: &NormalizedPublication) -> Result<WriteOutcome> {
        let file_name = self.claim_name(publication);
        let path = self.output_dir.join(&file_name);

        if self.config.write_mode == WriteMode::SkipExisting && path.exists() {
            debug!("Keeping existing {}", file_name);
            return Ok(WriteOutcome::SkippedExisting(path));
        }

        fs::write(&path, render_record(publication, self.config))?;
        info!("Generated: {}", file_name);
        Ok(WriteOutcome::Written(path))
    }

    /// Pick the file name for this publication and remember it.
    fn claim_name(&mut self, publication: &NormalizedPublication) -> String {
        let base = record_filename(publication, self.config);
        let name = match self.config.collision_policy {
            CollisionPolicy::LastWins => base,
            CollisionPolicy::Disambiguate if !self.produced.contains(&base) => base,
            CollisionPolicy::Disambiguate => {
                let stem = record_stem(publication, self.config);
                (2..)
                    .map(|n| format!("{}-{}.{}", stem, n, self.config.extension))
                    .find(|candidate| !self.produced.contains(candidate))
                    .unwrap_or(base)
            }
        };
        self.produced.insert(name.clone());
        name
    }
}
