//! Configuration types for deckstyle runs.
//!
//! All types implement [`serde::Deserialize`] so the CLI can load them from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`EditConfig`] - Controls how the action interpreter treats missing
//!   targets and how deep reference chains may nest.
//!
//! # Example
//!
//! ```
//! # use deckstyle::config::AppConfig;
//! # use deckstyle_core::action::MissingTargetPolicy;
//! let config = AppConfig::default();
//! assert_eq!(config.edit().missing_target(), MissingTargetPolicy::Warn);
//! assert_eq!(config.edit().max_reference_depth(), 32);
//! ```

use serde::Deserialize;

use deckstyle_core::action::MissingTargetPolicy;

/// Default bound on nested `use` references.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 32;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Edit configuration section.
    #[serde(default)]
    edit: EditConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified edit configuration.
    pub fn new(edit: EditConfig) -> Self {
        Self { edit }
    }

    /// Returns the edit configuration.
    pub fn edit(&self) -> &EditConfig {
        &self.edit
    }
}

/// Settings for the action interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct EditConfig {
    /// What to do with an action whose element is not under its card.
    #[serde(default)]
    missing_target: MissingTargetPolicy,

    /// Maximum number of `use` elements a position lookup may follow.
    #[serde(default = "default_max_reference_depth")]
    max_reference_depth: usize,
}

fn default_max_reference_depth() -> usize {
    DEFAULT_MAX_REFERENCE_DEPTH
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            missing_target: MissingTargetPolicy::default(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }
}

impl EditConfig {
    /// Creates a new [`EditConfig`].
    ///
    /// # Arguments
    ///
    /// * `missing_target` - Policy for actions whose element is missing.
    /// * `max_reference_depth` - Bound on nested references.
    pub fn new(missing_target: MissingTargetPolicy, max_reference_depth: usize) -> Self {
        Self {
            missing_target,
            max_reference_depth,
        }
    }

    pub fn missing_target(&self) -> MissingTargetPolicy {
        self.missing_target
    }

    pub fn max_reference_depth(&self) -> usize {
        self.max_reference_depth
    }
}
