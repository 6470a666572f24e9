//! Engine configuration.
//!
//! [`EngineConfig`] is the flat option set handed to the engine and to
//! planners at construction. It derives `serde` so a host can load it from
//! whatever source it already uses; the engine itself reads no files.

use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default per-step timeout in milliseconds.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 30_000;

/// Default upper bound on the number of steps a planner may generate.
pub const DEFAULT_MAX_STEPS: usize = 20;

/// How much detail planners should put into generated plans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum PlanningDepth {
    /// Only the essential steps
    Shallow,

    /// The domain's standard step graph
    #[default]
    Medium,

    /// Standard steps plus optional analysis steps
    Deep,
}

impl FromStr for PlanningDepth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shallow" => Ok(PlanningDepth::Shallow),
            "medium" => Ok(PlanningDepth::Medium),
            "deep" => Ok(PlanningDepth::Deep),
            _ => Err(format!("Invalid planning depth: {s}")),
        }
    }
}

impl PlanningDepth {
    /// Convert to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningDepth::Shallow => "shallow",
            PlanningDepth::Medium => "medium",
            PlanningDepth::Deep => "deep",
        }
    }
}

/// Options recognised by the engine and by domain planners.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Resolve every step to a simulated handler instead of real work
    pub fallback_mode: bool,

    /// Upper bound on the number of steps a planner may generate
    pub max_steps: usize,

    /// Default per-step timeout in milliseconds
    pub step_timeout_ms: u64,

    /// Detail hint consumed by planners only
    pub planning_depth: PlanningDepth,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_mode: false,
            max_steps: DEFAULT_MAX_STEPS,
            step_timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            planning_depth: PlanningDepth::default(),
        }
    }
}

impl EngineConfig {
    /// Default per-step timeout as a [`Duration`].
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Rejects values the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(EngineError::invalid_input("maxSteps").with_reason("must be at least 1"));
        }
        if self.step_timeout_ms == 0 {
            return Err(
                EngineError::invalid_input("stepTimeout").with_reason("must be greater than zero")
            );
        }
        Ok(())
    }
}
