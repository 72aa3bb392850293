//! Configuration management
//!
//! Selector search bounds, fitter tolerances and logging, loadable from TOML.

use crate::error::{Error, Result};
use crate::selectors::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the cross-validated selector averages fold log-likelihoods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldAveraging {
    /// Each candidate is scored by the mean of its own folds
    #[default]
    PerCandidate,
    /// One running list across all candidates, averaged after each candidate
    Cumulative,
}

/// Model selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// State count used by the constant selector and as search fallback
    pub n_constant: usize,
    /// Smallest state count searched (inclusive)
    pub min_n_components: usize,
    /// Largest state count searched (inclusive)
    pub max_n_components: usize,
    /// Seed handed to every fit
    pub random_state: u64,
    /// Log every fit at info level
    pub verbose: bool,
    /// Number of cross-validation folds
    pub n_folds: usize,
    /// EM iteration cap per fit
    pub max_iter: usize,
    /// Cross-validation averaging mode
    pub fold_averaging: FoldAveraging,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            n_constant: 3,
            min_n_components: 2,
            max_n_components: 10,
            random_state: 14,
            verbose: false,
            n_folds: 3,
            max_iter: 1000,
            fold_averaging: FoldAveraging::PerCandidate,
        }
    }
}

impl SelectorConfig {
    /// Set the search interval
    pub fn with_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.min_n_components = min_n;
        self.max_n_components = max_n;
        self
    }

    /// Set the fallback / constant state count
    pub fn with_constant(mut self, n_constant: usize) -> Self {
        self.n_constant = n_constant;
        self
    }

    /// Set the fitting seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Check the search interval and fold count
    pub fn validate(&self) -> Result<()> {
        if self.min_n_components == 0 {
            return Err(Error::invalid_config("min_n_components must be at least 1"));
        }
        if self.min_n_components > self.max_n_components {
            return Err(Error::invalid_config(format!(
                "min_n_components ({}) > max_n_components ({})",
                self.min_n_components, self.max_n_components
            )));
        }
        if self.n_folds < 2 {
            return Err(Error::invalid_config("n_folds must be at least 2"));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid_config("max_iter must be positive"));
        }
        Ok(())
    }

    /// Candidate state counts in ascending order
    pub fn candidates(&self) -> std::ops::RangeInclusive<usize> {
        self.min_n_components..=self.max_n_components
    }

    /// Fallback state count clamped into the search interval
    ///
    /// On an inverted interval the upper bound wins.
    pub fn fallback_states(&self) -> usize {
        self.n_constant
            .max(self.min_n_components)
            .min(self.max_n_components)
    }
}

/// Gaussian HMM fitter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitterConfig {
    /// EM stops once the log-likelihood gain drops below this
    pub tol: f64,
    /// Floor added to every variance
    pub min_covar: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            tol: 1e-2,
            min_covar: 1e-3,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Strategy used when the command line does not choose one
    pub strategy: StrategyKind,
    pub selector: SelectorConfig,
    pub fitter: FitterConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.selector.validate()?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
