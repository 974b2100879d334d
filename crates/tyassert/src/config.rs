//! Engine configuration.
//!
//! Configuration is plain data with serde defaults, loadable from TOML:
//!
//! ```toml
//! sort_trials = 100
//! render_depth = 2
//! placeholder_width = 30
//! max_ancestor_depth = 256
//! seed = 42
//! ```
//!
//! Every key is optional; an empty document yields [`EngineConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of shuffled trials per expected ordering.
pub const DEFAULT_SORT_TRIALS: usize = 100;

/// Default nesting depth rendered before composites are elided.
pub const DEFAULT_RENDER_DEPTH: usize = 2;

/// Renderings longer than this many characters are shown as a placeholder in
/// trace lines.
pub const DEFAULT_PLACEHOLDER_WIDTH: usize = 30;

/// Default cap on the number of types visited when following `parent`.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 256;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of its permitted range.
    #[error("invalid config: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Tunables for the assertion engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Shuffled trials run per expected ordering by the sort validator.
    #[serde(default = "default_sort_trials")]
    pub sort_trials: usize,

    /// Maximum nesting depth rendered for composite values.
    #[serde(default = "default_render_depth")]
    pub render_depth: usize,

    /// Renderings longer than this are replaced by `...` in trace lines.
    #[serde(default = "default_placeholder_width")]
    pub placeholder_width: usize,

    /// Maximum number of types visited along an ancestor chain.
    #[serde(default = "default_max_ancestor_depth")]
    pub max_ancestor_depth: usize,

    /// Seed for the shuffle RNG. A random seed is drawn when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

const fn default_sort_trials() -> usize {
    DEFAULT_SORT_TRIALS
}

const fn default_render_depth() -> usize {
    DEFAULT_RENDER_DEPTH
}

const fn default_placeholder_width() -> usize {
    DEFAULT_PLACEHOLDER_WIDTH
}

const fn default_max_ancestor_depth() -> usize {
    DEFAULT_MAX_ANCESTOR_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sort_trials: DEFAULT_SORT_TRIALS,
            render_depth: DEFAULT_RENDER_DEPTH,
            placeholder_width: DEFAULT_PLACEHOLDER_WIDTH,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, contains unknown keys, or a
    /// value fails [`EngineConfig::validate`].
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sets a fixed shuffle seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the number of shuffled trials per ordering.
    #[must_use]
    pub const fn with_sort_trials(mut self, trials: usize) -> Self {
        self.sort_trials = trials;
        self
    }

    /// Sets the ancestor traversal cap.
    #[must_use]
    pub const fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }

    /// Checks that every tunable is within range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero trial count, zero render
    /// depth or zero ancestor cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sort_trials == 0 {
            return Err(ConfigError::validation("sort_trials must be at least 1"));
        }
        if self.render_depth == 0 {
            return Err(ConfigError::validation("render_depth must be at least 1"));
        }
        if self.max_ancestor_depth == 0 {
            return Err(ConfigError::validation(
                "max_ancestor_depth must be at least 1",
            ));
        }
        Ok(())
    }
}
