//! Per-call parameter structures for engine operations.

use std::time::Duration;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Options for [`crate::Engine::execute_plan`] and
/// [`crate::Engine::execute_step`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct ExecuteOptions {
    /// Halt the pass at the first failed step
    pub stop_on_error: bool,

    /// Per-step timeout in milliseconds, overriding the configured default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ExecuteOptions {
    /// Options that halt on the first failure.
    pub fn stop_on_error() -> Self {
        Self {
            stop_on_error: true,
            ..Default::default()
        }
    }

    /// Overrides the per-step timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Rejects a zero per-step timeout, which no handler could beat.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == Some(0) {
            return Err(EngineError::invalid_input("timeout").with_reason("must be greater than zero"));
        }
        Ok(())
    }

    /// Timeout to apply, falling back to `default`.
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_ms.map_or(default, Duration::from_millis)
    }
}
