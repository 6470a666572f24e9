//! Handlers shipped with the engine.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ExecutionContext, HandlerOutput, StepHandler};
use crate::models::Step;

/// Action type of the generic manual handler.
pub const MANUAL_ACTION: &str = "manual";

/// Records a step as handed to an operator. Used as the resolution fallback
/// for action types without a dedicated handler.
pub struct ManualHandler;

#[async_trait]
impl StepHandler for ManualHandler {
    async fn handle(
        &self,
        step: &Step,
        _context: &ExecutionContext,
    ) -> anyhow::Result<HandlerOutput> {
        Ok(
            HandlerOutput::success(format!("Step '{}' recorded for manual completion", step.name))
                .with_data(json!({
                    "manual": true,
                    "actionType": step.action_type,
                    "instructions": step.description,
                })),
        )
    }
}

/// Reports success for any step without doing work. Used in fallback mode
/// when a domain has no canned handler for an action type.
pub struct SimulatedHandler;

#[async_trait]
impl StepHandler for SimulatedHandler {
    async fn handle(
        &self,
        step: &Step,
        _context: &ExecutionContext,
    ) -> anyhow::Result<HandlerOutput> {
        Ok(
            HandlerOutput::success(format!("Simulated {} for '{}'", step.action_type, step.name))
                .with_data(json!({ "simulated": true, "actionType": step.action_type })),
        )
    }
}

/// Fallback-mode handler returning a fixed payload.
///
/// `{name}` in the summary is replaced with the step name.
pub struct CannedHandler {
    summary: String,
    data: Value,
}

impl CannedHandler {
    pub fn new(summary: impl Into<String>, data: Value) -> Self {
        Self {
            summary: summary.into(),
            data,
        }
    }
}

#[async_trait]
impl StepHandler for CannedHandler {
    async fn handle(
        &self,
        step: &Step,
        _context: &ExecutionContext,
    ) -> anyhow::Result<HandlerOutput> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.insert("simulated".to_string(), Value::Bool(true));
        }
        Ok(HandlerOutput::success(self.summary.replace("{name}", &step.name)).with_data(data))
    }
}
