//! Uncaught browser exception filtering
//!
//! The dashboard is a third-party single-page app whose internal warnings are
//! not test signals. Each uncaught exception message is checked once against
//! an allow-list of benign patterns; anything else fails the scenario.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named group of substrings; any one of them marks a message as benign
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenignPattern {
    pub name: String,
    pub substrings: Vec<String>,
}

impl BenignPattern {
    pub fn new<I, S>(name: impl Into<String>, substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            substrings: substrings.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.substrings
            .iter()
            .any(|s| !s.is_empty() && message.contains(s.as_str()))
    }

    /// The fixed set of benign patterns
    pub fn defaults() -> Vec<BenignPattern> {
        vec![
            BenignPattern::new("resize-observer", ["ResizeObserver loop limit exceeded"]),
            BenignPattern::new("network", ["NetworkError", "Failed to fetch"]),
            BenignPattern::new("hydration", ["Hydration", "hydration"]),
            BenignPattern::new("chunk-load", ["ChunkLoadError", "Loading chunk"]),
        ]
    }
}

/// Classification of one uncaught exception
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExceptionVerdict {
    /// Benign; does not fail the scenario
    Suppress { pattern: String },
    Propagate,
}

impl ExceptionVerdict {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, ExceptionVerdict::Suppress { .. })
    }
}

impl fmt::Display for ExceptionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionVerdict::Suppress { pattern } => write!(f, "suppress ({pattern})"),
            ExceptionVerdict::Propagate => write!(f, "propagate"),
        }
    }
}

/// Allow-list filter for uncaught exceptions
#[derive(Clone, Debug)]
pub struct ExceptionFilter {
    patterns: Vec<BenignPattern>,
}

impl Default for ExceptionFilter {
    fn default() -> Self {
        Self {
            patterns: BenignPattern::defaults(),
        }
    }
}

impl ExceptionFilter {
    /// A filter that suppresses nothing
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Build from configuration
    pub fn from_config(config: &ExceptionsConfig) -> Self {
        let mut filter = if config.include_defaults {
            Self::default()
        } else {
            Self::empty()
        };
        filter.patterns.extend(config.extra_patterns.iter().cloned());
        filter
    }

    pub fn patterns(&self) -> &[BenignPattern] {
        &self.patterns
    }

    /// First matching pattern wins
    pub fn classify(&self, message: &str) -> ExceptionVerdict {
        self.patterns
            .iter()
            .find(|p| p.matches(message))
            .map(|p| ExceptionVerdict::Suppress {
                pattern: p.name.clone(),
            })
            .unwrap_or(ExceptionVerdict::Propagate)
    }
}

/// `exceptions` section of the run configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionsConfig {
    #[serde(default = "default_true")]
    pub include_defaults: bool,
    #[serde(default)]
    pub extra_patterns: Vec<BenignPattern>,
}

fn default_true() -> bool {
    true
}

impl Default for ExceptionsConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            extra_patterns: Vec::new(),
        }
    }
}
