//! TOML configuration for the message decoder.
//!
//! Every field has a default, so an empty document (or a missing file) yields
//! a decoder that handles the standard record layouts:
//!
//! ```toml
//! [records]
//! state_table_width = 29
//! fit_width = 100
//!
//! [screens]
//! boundary = "auto"
//! ```
//!
//! Record widths count the record data plus its trailing FS slot.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::segment::{
    AutoBoundary, IndexScanBoundary, RecordShape, ScreenBoundary, SeparatorBoundary,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The TOML parsed but describes an unusable decoder.
    #[error("invalid decoder config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level decoder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecoderConfig {
    #[serde(default)]
    pub records: RecordConfig,
    #[serde(default)]
    pub screens: ScreenConfig,
}

/// Framed widths of the fixed-width customization records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordConfig {
    /// State table record width, FS slot included.
    #[serde(default = "default_state_table_width")]
    pub state_table_width: usize,
    /// FIT record width, FS slot included.
    #[serde(default = "default_fit_width")]
    pub fit_width: usize,
}

/// Screen load segmentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenConfig {
    #[serde(default)]
    pub boundary: ScreenBoundaryKind,
}

/// Built-in screen record boundary strategies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScreenBoundaryKind {
    /// End each record at the next unescaped FS.
    Separator,
    /// Find the next record by its 3-digit index.
    IndexScan,
    /// Separator when the payload carries one, index scan otherwise.
    #[default]
    Auto,
}

impl ScreenBoundaryKind {
    /// Instantiates the strategy.
    pub fn build(self) -> Box<dyn ScreenBoundary> {
        match self {
            ScreenBoundaryKind::Separator => Box::new(SeparatorBoundary),
            ScreenBoundaryKind::IndexScan => Box::new(IndexScanBoundary),
            ScreenBoundaryKind::Auto => Box::new(AutoBoundary),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_state_table_width() -> usize {
    RecordShape::STATE_TABLE.width
}
fn default_fit_width() -> usize {
    RecordShape::FIT.width
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            state_table_width: default_state_table_width(),
            fit_width: default_fit_width(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl DecoderConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for a record width below 2.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: DecoderConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads configuration from `path`, returning the defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", otherwise as [`DecoderConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Checks that every record width leaves room for data and its FS slot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = [
            ("state_table_width", self.records.state_table_width),
            ("fit_width", self.records.fit_width),
        ];
        for (name, width) in widths {
            if width < 2 {
                return Err(ConfigError::Invalid(format!(
                    "records.{name} must be at least 2, got {width}"
                )));
            }
        }
        Ok(())
    }

    pub fn state_table_shape(&self) -> RecordShape {
        RecordShape::STATE_TABLE.with_width(self.records.state_table_width)
    }

    pub fn fit_shape(&self) -> RecordShape {
        RecordShape::FIT.with_width(self.records.fit_width)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
