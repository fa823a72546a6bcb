// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Configuration of a hybrid run.
//!
//! `HybridConfig` is read from JSON; every field is optional and falls back
//! to its default. The command line overrides individual values afterwards.

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use waymark_bnb::monitor::frontier::FrontierSamplingConfig;
use waymark_ga::config::{EvolutionConfig, InvalidEvolutionConfig};

/// The error type for loading and validating a `HybridConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON or has fields of the wrong type.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds a value outside its admissible range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<InvalidEvolutionConfig> for ConfigError {
    fn from(value: InvalidEvolutionConfig) -> Self {
        ConfigError::InvalidValue {
            field: value.field(),
            reason: value.to_string(),
        }
    }
}

/// Parameters of a `HybridSolver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Number of exact search workers.
    pub portfolio_size: usize,
    /// When the exact workers publish their frontier.
    pub frontier: FrontierSamplingConfig,
    /// Parameters of the evolutionary engine.
    pub evolution: EvolutionConfig,
    /// Generations per refiner pass.
    pub refiner_generations: u64,
    /// Whether the evolutionary refiner runs at all.
    pub refiner_enabled: bool,
    /// Upper bound on refiner passes; unbounded when absent.
    pub max_refiner_passes: Option<u64>,
    /// Base seed for every random generator of the run. Drawn from the
    /// operating system when absent.
    pub seed: Option<u64>,
    /// Wall clock budget of the exact portfolio in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Number of exact solutions after which the portfolio stops.
    pub solution_limit: Option<u64>,
    /// How long the orchestrator waits for a portfolio event before polling
    /// the coordination state.
    pub poll_interval_ms: u64,
    /// Search progress is logged at most this often per worker.
    pub search_log_interval_ms: Option<u64>,
    /// Refiner progress is logged every this many generations.
    pub evolution_log_interval: Option<u64>,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            portfolio_size: 5,
            frontier: FrontierSamplingConfig::default(),
            evolution: EvolutionConfig::default(),
            refiner_generations: 10_000,
            refiner_enabled: true,
            max_refiner_passes: None,
            seed: None,
            time_limit_ms: None,
            solution_limit: None,
            poll_interval_ms: 50,
            search_log_interval_ms: None,
            evolution_log_interval: None,
        }
    }
}

impl HybridConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: HybridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file and validates it.
    pub fn from_path<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    #[inline]
    pub fn with_portfolio_size(mut self, portfolio_size: usize) -> Self {
        self.portfolio_size = portfolio_size;
        self
    }

    #[inline]
    pub fn with_frontier(mut self, frontier: FrontierSamplingConfig) -> Self {
        self.frontier = frontier;
        self
    }

    #[inline]
    pub fn with_evolution(mut self, evolution: EvolutionConfig) -> Self {
        self.evolution = evolution;
        self
    }

    #[inline]
    pub fn with_refiner_generations(mut self, refiner_generations: u64) -> Self {
        self.refiner_generations = refiner_generations;
        self
    }

    #[inline]
    pub fn with_refiner_enabled(mut self, refiner_enabled: bool) -> Self {
        self.refiner_enabled = refiner_enabled;
        self
    }

    #[inline]
    pub fn with_max_refiner_passes(mut self, max_refiner_passes: Option<u64>) -> Self {
        self.max_refiner_passes = max_refiner_passes;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit_ms = time_limit.map(|limit| limit.as_millis() as u64);
        self
    }

    #[inline]
    pub fn with_solution_limit(mut self, solution_limit: Option<u64>) -> Self {
        self.solution_limit = solution_limit;
        self
    }

    #[inline]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval_ms = poll_interval.as_millis() as u64;
        self
    }

    #[inline]
    pub fn with_search_log_interval(mut self, interval: Option<Duration>) -> Self {
        self.search_log_interval_ms = interval.map(|interval| interval.as_millis() as u64);
        self
    }

    #[inline]
    pub fn with_evolution_log_interval(mut self, interval: Option<u64>) -> Self {
        self.evolution_log_interval = interval;
        self
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn search_log_interval(&self) -> Option<Duration> {
        self.search_log_interval_ms.map(Duration::from_millis)
    }

    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portfolio_size == 0 {
            return Err(invalid("portfolio_size", "must be at least 1"));
        }
        if self.frontier.sample_interval == 0 {
            return Err(invalid("frontier.sample_interval", "must be positive"));
        }
        self.evolution.validate()?;
        if self.refiner_generations == 0 {
            return Err(invalid("refiner_generations", "must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be positive"));
        }
        if self.evolution_log_interval == Some(0) {
            return Err(invalid("evolution_log_interval", "must be positive"));
        }
        Ok(())
    }
}

#[inline]
fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_owned(),
    }
}
