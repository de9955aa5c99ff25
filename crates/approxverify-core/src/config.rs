//! Verifier tuning knobs.
//!
//! Defaults reproduce the fixed policy the fuzz corpus was recorded with;
//! changing them changes pass/fail outcomes on existing corpora.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

///
/// CONSTANTS
///

/// Relative standard error of approx_distinct at its default configuration.
pub const DEFAULT_ERROR: f64 = 0.023;

/// Gap threshold, in standard errors.
pub const DEFAULT_GAP_STDDEVS: f64 = 2.0;

/// Group count at which the outlier budget starts to apply.
pub const DEFAULT_LARGE_SAMPLE_GROUPS: usize = 50;

/// Large-gap outliers tolerated once the sample is large enough.
///
/// A fixed cap rather than a share of the group count.
pub const DEFAULT_LARGE_SAMPLE_OUTLIER_BUDGET: usize = 3;

///
/// VerifierConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Tolerance used when the aggregate call has no explicit error argument.
    pub default_error: f64,
    pub gap_stddevs: f64,
    pub large_sample_groups: usize,
    pub large_sample_outlier_budget: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            default_error: DEFAULT_ERROR,
            gap_stddevs: DEFAULT_GAP_STDDEVS,
            large_sample_groups: DEFAULT_LARGE_SAMPLE_GROUPS,
            large_sample_outlier_budget: DEFAULT_LARGE_SAMPLE_OUTLIER_BUDGET,
        }
    }
}

impl VerifierConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_error > 0.0 && self.default_error < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "default_error must be in (0, 1), got {}",
                self.default_error
            )));
        }
        if !(self.gap_stddevs.is_finite() && self.gap_stddevs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "gap_stddevs must be a positive number, got {}",
                self.gap_stddevs
            )));
        }
        if self.large_sample_groups == 0 {
            return Err(ConfigError::Invalid(
                "large_sample_groups must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Relative gap above which a group counts as a large-gap outlier.
    #[must_use]
    pub fn gap_threshold(&self, error: f64) -> f64 {
        self.gap_stddevs * error
    }

    /// Number of large-gap outliers allowed for `num_groups` candidate groups.
    #[must_use]
    pub const fn outlier_budget(&self, num_groups: usize) -> usize {
        if num_groups >= self.large_sample_groups {
            self.large_sample_outlier_budget
        } else {
            0
        }
    }
}

///
/// TESTS
///
