//! Import configuration.
//!
//! Every fallback constant the importer writes into a record lives here, so a
//! site can change the placeholders (or a test can) without touching the
//! synthesizer.
//!
//! # Example
//!
//! ```
//! use bibrecords::config::{CollisionPolicy, ImportConfig, WriteMode};
//!
//! let mut config = ImportConfig::new();
//! config
//!     .set_write_mode(WriteMode::SkipExisting)
//!     .set_collision_policy(CollisionPolicy::Disambiguate)
//!     .set_default_venue("Preprint");
//! ```
//!
//! The same settings can be read from TOML:
//!
//! ```
//! use bibrecords::config::{ImportConfig, WriteMode};
//!
//! let config = ImportConfig::from_toml_str(r#"
//! write_mode = "skip-existing"
//! default_venue = "Preprint"
//! "#).unwrap();
//! assert_eq!(config.write_mode, WriteMode::SkipExisting);
//! assert_eq!(config.placeholder_link, "#");
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default venue fields, tried in order.
const DEFAULT_VENUE_FIELDS: &[&str] = &["booktitle", "journal", "school"];

/// What to do when a record file already exists on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Create or overwrite, without looking at what is there
    #[default]
    Overwrite,
    /// Leave existing files alone
    SkipExisting,
}

/// What to do when two entries of one run derive the same file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The later entry replaces the earlier one
    #[default]
    LastWins,
    /// Append `-2`, `-3`, ... to later names
    Disambiguate,
}

/// Settings for the record synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Venue used when none of `venue_fields` has a value
    pub default_venue: String,
    /// Fields tried, in order, to find a venue
    pub venue_fields: Vec<String>,
    /// Link written when an entry has no URL, and for the code link
    pub placeholder_link: String,
    /// Surname used in file names when an entry has no authors
    pub unknown_author: String,
    /// Maximum number of characters of the title slug in file names
    pub slug_max_chars: usize,
    /// Record file extension, without the dot
    pub extension: String,
    /// Value of the `featured` flag on imported records
    pub featured: bool,
    pub write_mode: WriteMode,
    pub collision_policy: CollisionPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_venue: "Unknown Venue".to_string(),
            venue_fields: DEFAULT_VENUE_FIELDS.iter().map(|s| s.to_string()).collect(),
            placeholder_link: "#".to_string(),
            unknown_author: "unknown".to_string(),
            slug_max_chars: 30,
            extension: "md".to_string(),
            featured: false,
            write_mode: WriteMode::Overwrite,
            collision_policy: CollisionPolicy::LastWins,
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(crate::ImportError::Config(format!(
                "extension must be a bare file extension, got '{}'",
                self.extension
            )));
        }
        if self.unknown_author.trim().is_empty() {
            return Err(crate::ImportError::Config(
                "unknown_author must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn set_default_venue(&mut self, venue: &str) -> &mut Self {
        self.default_venue = venue.to_string();
        self
    }

    pub fn set_venue_fields(&mut self, fields: Vec<String>) -> &mut Self {
        self.venue_fields = fields;
        self
    }

    pub fn set_placeholder_link(&mut self, link: &str) -> &mut Self {
        self.placeholder_link = link.to_string();
        self
    }

    pub fn set_write_mode(&mut self, mode: WriteMode) -> &mut Self {
        self.write_mode = mode;
        self
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) -> &mut Self {
        self.collision_policy = policy;
        self
    }
}
