//! Execution outcome types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::PlanStatus;

/// Outcome of running (or skipping) a single step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Whether the step succeeded
    pub success: bool,

    /// Id of the step this result belongs to
    pub step_id: String,

    /// Payload returned by the handler
    #[serde(default)]
    pub data: Value,

    /// One-line human-readable description
    pub summary: String,

    /// Error message, present only when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock time spent in the handler
    #[serde(default)]
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Creates a successful result.
    pub fn success(step_id: impl Into<String>, summary: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            step_id: step_id.into(),
            data,
            summary: summary.into(),
            error: None,
            duration_ms: 0,
        }
    }

    /// Creates a failed result carrying `error`.
    pub fn failure(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            step_id: step_id.into(),
            data: Value::Null,
            summary: format!("Failed: {error}"),
            error: Some(error),
            duration_ms: 0,
        }
    }

    /// Creates the result recorded for a step that was bypassed.
    pub fn skipped(step_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            success: true,
            step_id: step_id.into(),
            data: json!({ "type": "skipped", "reason": reason }),
            summary: format!("Skipped: {reason}"),
            error: None,
            duration_ms: 0,
        }
    }

    /// Whether this result records a skip rather than a handler run.
    pub fn is_skip(&self) -> bool {
        self.data.get("type").and_then(Value::as_str) == Some("skipped")
    }

    /// Sets the measured duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Outcome of a plan-wide execution pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanExecutionResult {
    /// Id of the executed plan
    pub plan_id: String,

    /// Domain of the executed plan
    pub domain: String,

    /// Whether the plan ended completed
    pub success: bool,

    /// Final plan status
    pub status: PlanStatus,

    /// Ids of the steps processed during this pass, in order
    pub executed_steps: Vec<String>,

    /// Every recorded step result, keyed by step id
    pub results: BTreeMap<String, ExecutionResult>,

    /// Rendered run summary
    pub summary: String,
}
