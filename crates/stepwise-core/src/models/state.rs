//! Observable engine state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ExecutionResult, Plan};

/// Snapshot of an engine, as returned by [`crate::Engine::state`].
///
/// Two snapshots taken without an intervening mutation compare equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    /// Currently loaded plan
    pub plan: Option<Plan>,

    /// Step whose handler is running
    pub current_step: Option<String>,

    /// Steps processed since the plan was loaded, in order
    pub executed_steps: Vec<String>,

    /// Recorded results keyed by step id
    pub results: BTreeMap<String, ExecutionResult>,

    /// Whether an execution is in flight
    pub is_loading: bool,

    /// Most recent error message
    pub error: Option<String>,

    /// Whether the loaded plan reached a final status
    pub is_complete: bool,
}
