use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::{Style, DIFF, PRETTY};

#[derive(Debug, Error)]
pub enum FormatError {
    /// Raised when a dialect name does not resolve; nothing is rendered.
    #[error("unknown style: {0}")]
    UnknownStyle(String),
}

/// The closed set of shipped output dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    #[default]
    Pretty,
    Diff,
}

impl StyleKind {
    pub fn style(&self) -> &'static dyn Style {
        match self {
            StyleKind::Pretty => &PRETTY,
            StyleKind::Diff => &DIFF,
        }
    }
}

impl FromStr for StyleKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(StyleKind::Pretty),
            "diff" => Ok(StyleKind::Diff),
            _ => Err(FormatError::UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style().name())
    }
}

/// Options to control the formatting of subjects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Sort record entries alphabetically by key.
    pub sort: bool,
    /// Which output dialect to use.
    pub style: StyleKind,
    /// Override the style's default byte-blob chunk size.
    pub chunk_size: Option<usize>,
    /// Include every enumerable property, own and inherited.
    pub include_enumerable: bool,
    /// Include enumerable getter properties of the immediate prototype.
    pub include_getters: bool,
    /// Render markup-like values as opaque source strings when the
    /// dialect supports it.
    pub markup_string: bool,
    /// Indentation unit.
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            sort: false,
            style: StyleKind::default(),
            chunk_size: None,
            include_enumerable: false,
            include_getters: false,
            markup_string: true,
            indent: "  ".to_string(),
        }
    }
}
