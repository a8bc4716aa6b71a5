//! Run configuration: formulation switches, solver options, decoding tolerance.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// How the big-M constant of the time-propagation constraints is chosen.
///
/// M must exceed `s[i,k] + service(i) + time(i,j) - s[j,k]` for every arc that
/// is not selected, or feasible solutions are cut off; a larger M than
/// necessary weakens the LP relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BigM {
    /// Derived per instance from the time horizon and the longest arc.
    #[default]
    Auto,
    /// A fixed constant, e.g. `100000.0`.
    Fixed(f64),
}

/// Whether time-window bounds apply to every `(node, vehicle)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowGating {
    /// Customer windows bind only when the vehicle visits the customer.
    #[default]
    Visited,
    /// Windows bind for every pair, visited or not.
    Unconditional,
}

/// Switches for the model builder.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ModelConfig {
    pub big_m: BigM,
    pub window_gating: WindowGating,
}

/// Options forwarded to the solver adapter.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct SolveOptions {
    /// Wall-clock limit for one solve; `None` runs to completion.
    pub time_limit: Option<Duration>,
}

/// Options for the solution decoder.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Absolute tolerance for near-binary arc values and bound checks.
    pub tolerance: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

/// Complete configuration of a build-solve-decode run.
///
/// # Examples
///
/// ```
/// use u_cvrptw::config::{BigM, RunConfig, WindowGating};
///
/// let config = RunConfig::from_json(r#"{
///     "model": {"big_m": {"fixed": 100000.0}, "window_gating": "unconditional"},
///     "solve": {"time_limit": {"secs": 60, "nanos": 0}}
/// }"#).unwrap();
/// assert_eq!(config.model.big_m, BigM::Fixed(100000.0));
/// assert_eq!(config.model.window_gating, WindowGating::Unconditional);
/// assert_eq!(config.decode.tolerance, 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub solve: SolveOptions,
    pub decode: DecodeOptions,
}

impl RunConfig {
    /// Parses a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::Parse(e.to_string()))
    }
}
