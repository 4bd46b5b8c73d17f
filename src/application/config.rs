//! Decomposition algorithm configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::port::SolveOptions;

/// Configuration for logic-based outer approximation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoaConfig {
    /// Maximum number of master iterations.
    #[serde(default = "default_iteration_limit")]
    pub iteration_limit: usize,
    /// Weight of the OA slack penalty in the master objective.
    #[serde(default = "default_oa_penalty_factor")]
    pub oa_penalty_factor: f64,
    /// Absolute bound gap at which the run is declared converged.
    #[serde(default = "default_absolute_gap_tolerance")]
    pub absolute_gap_tolerance: f64,
    /// Relative bound gap at which the run is declared converged.
    #[serde(default = "default_relative_gap_tolerance")]
    pub relative_gap_tolerance: f64,
    /// Distance from 0/1 above which a master binary is reported as fractional.
    #[serde(default = "default_integer_tolerance")]
    pub integer_tolerance: f64,
    /// Gradient coefficients at or below this magnitude are dropped from cuts.
    #[serde(default = "default_zero_tolerance")]
    pub zero_tolerance: f64,
    /// Big-M used for disjunct-local cuts when variable bounds cannot supply one.
    #[serde(default = "default_big_m")]
    pub big_m: f64,
    /// Relax every OA cut with a penalized non-negative slack.
    #[serde(default = "default_oa_slacks")]
    pub oa_slacks: bool,
    /// Total wall-clock limit in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    /// Selector of the master MILP adapter.
    #[serde(default = "default_mip_solver")]
    pub mip_solver: String,
    /// Selector of the subproblem NLP adapter.
    #[serde(default = "default_nlp_solver")]
    pub nlp_solver: String,
    /// Per-call options for the MILP adapter.
    #[serde(default)]
    pub mip_options: SolverOptionsConfig,
    /// Per-call options for the NLP adapter.
    #[serde(default)]
    pub nlp_options: SolverOptionsConfig,
}

/// Per-call adapter options as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SolverOptionsConfig {
    /// Seconds per call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    /// Relative optimality gap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_gap: Option<f64>,
}

impl SolverOptionsConfig {
    /// Options for one call, capped by the time left in the run.
    #[must_use]
    pub fn to_options(&self, remaining: Option<Duration>) -> SolveOptions {
        let configured = self.time_limit.and_then(seconds);
        let time_limit = match (configured, remaining) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        SolveOptions {
            time_limit,
            relative_gap: self.relative_gap,
        }
    }

    fn validate(&self, time_field: &'static str, gap_field: &'static str) -> Result<(), ConfigError> {
        if let Some(t) = self.time_limit {
            duration(time_field, t)?;
        }
        if let Some(g) = self.relative_gap {
            non_negative(gap_field, g)?;
        }
        Ok(())
    }
}

impl Default for LoaConfig {
    fn default() -> Self {
        Self {
            iteration_limit: default_iteration_limit(),
            oa_penalty_factor: default_oa_penalty_factor(),
            absolute_gap_tolerance: default_absolute_gap_tolerance(),
            relative_gap_tolerance: default_relative_gap_tolerance(),
            integer_tolerance: default_integer_tolerance(),
            zero_tolerance: default_zero_tolerance(),
            big_m: default_big_m(),
            oa_slacks: default_oa_slacks(),
            time_limit: None,
            mip_solver: default_mip_solver(),
            nlp_solver: default_nlp_solver(),
            mip_options: SolverOptionsConfig::default(),
            nlp_options: SolverOptionsConfig::default(),
        }
    }
}

impl LoaConfig {
    /// Check every option against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field,
    /// or [`ConfigError::MissingField`] for an empty solver selector.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "iteration_limit",
                reason: "must be at least 1".into(),
            });
        }
        non_negative("oa_penalty_factor", self.oa_penalty_factor)?;
        non_negative("absolute_gap_tolerance", self.absolute_gap_tolerance)?;
        non_negative("relative_gap_tolerance", self.relative_gap_tolerance)?;
        non_negative("integer_tolerance", self.integer_tolerance)?;
        if self.integer_tolerance >= 0.5 {
            return Err(ConfigError::InvalidValue {
                field: "integer_tolerance",
                reason: format!("must be below 0.5, got {}", self.integer_tolerance),
            });
        }
        non_negative("zero_tolerance", self.zero_tolerance)?;
        positive("big_m", self.big_m)?;
        if let Some(t) = self.time_limit {
            duration("time_limit", t)?;
        }
        if self.mip_solver.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "mip_solver" });
        }
        if self.nlp_solver.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "nlp_solver" });
        }
        self.mip_options
            .validate("mip_options.time_limit", "mip_options.relative_gap")?;
        self.nlp_options
            .validate("nlp_options.time_limit", "nlp_options.relative_gap")?;
        Ok(())
    }

    /// Total time limit as a duration.
    ///
    /// `None` for a value [`validate`](Self::validate) would reject.
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit.and_then(seconds)
    }
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be a finite non-negative number, got {value}"),
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be a finite positive number, got {value}"),
        })
    }
}

fn duration(field: &'static str, value: f64) -> Result<(), ConfigError> {
    positive(field, value)?;
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: format!("{value} seconds is not a representable duration: {e}"),
    })?;
    Ok(())
}

const fn default_iteration_limit() -> usize {
    100
}

const fn default_oa_penalty_factor() -> f64 {
    1000.0
}

const fn default_absolute_gap_tolerance() -> f64 {
    1e-6
}

const fn default_relative_gap_tolerance() -> f64 {
    1e-4
}

const fn default_integer_tolerance() -> f64 {
    1e-5
}

const fn default_zero_tolerance() -> f64 {
    1e-9
}

const fn default_big_m() -> f64 {
    1e4
}

const fn default_oa_slacks() -> bool {
    true
}

fn default_mip_solver() -> String {
    "highs".to_string()
}

fn default_nlp_solver() -> String {
    "ipopt".to_string()
}
