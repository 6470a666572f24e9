//! Step handlers: the callables that perform a step's actual work.
//!
//! A handler receives the step and an [`ExecutionContext`] holding every
//! result recorded so far in the run, and returns a [`HandlerOutput`] or an
//! error. Handlers are looked up by the step's `action_type` through a
//! [`HandlerRegistry`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stepwise_core::handlers::{handler_fn, HandlerOutput, HandlerRegistry};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     "lint",
//!     handler_fn(|step, _context| async move {
//!         Ok(HandlerOutput::success(format!("Linted {}", step.name)))
//!     }),
//! );
//! assert!(registry.resolve("lint").is_some());
//! assert!(registry.resolve("deploy").is_none());
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ExecutionResult, Step};

pub mod builtin;
pub mod registry;

pub use builtin::{CannedHandler, ManualHandler, SimulatedHandler, MANUAL_ACTION};
pub use registry::HandlerRegistry;

/// Performs the work behind one action type.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Runs `step`. Returning `Err`, or an output with `success == false`,
    /// marks the step failed.
    async fn handle(&self, step: &Step, context: &ExecutionContext)
        -> anyhow::Result<HandlerOutput>;
}

/// Payload a handler returns; the engine turns it into an
/// [`ExecutionResult`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerOutput {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HandlerOutput {
    /// A successful output with no data.
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Value::Null,
            summary: summary.into(),
            error: None,
        }
    }

    /// A reported failure.
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            data: Value::Null,
            summary: format!("Failed: {error}"),
            error: Some(error),
        }
    }

    /// Attaches a data payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Converts into the result recorded for `step_id`.
    pub fn into_result(self, step_id: &str) -> ExecutionResult {
        ExecutionResult {
            success: self.success,
            step_id: step_id.to_string(),
            data: self.data,
            summary: self.summary,
            error: if self.success { None } else { self.error },
            duration_ms: 0,
        }
    }
}

/// Results recorded so far in a run, visible to every later handler.
///
/// The context handed to a handler is a snapshot; handlers cannot alter
/// results already recorded for other steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    pub plan_id: String,
    pub domain: String,
    results: BTreeMap<String, ExecutionResult>,
}

impl ExecutionContext {
    /// Creates an empty context for a plan.
    pub fn new(plan_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            domain: domain.into(),
            results: BTreeMap::new(),
        }
    }

    /// Records a result. An id that already has a result keeps the first one.
    pub fn record(&mut self, result: ExecutionResult) {
        self.results.entry(result.step_id.clone()).or_insert(result);
    }

    /// Result recorded for `step_id`.
    pub fn result(&self, step_id: &str) -> Option<&ExecutionResult> {
        self.results.get(step_id)
    }

    /// Whether `step_id` completed successfully.
    pub fn is_completed(&self, step_id: &str) -> bool {
        self.result(step_id).is_some_and(|result| result.success && !result.is_skip())
    }

    /// All recorded results keyed by step id.
    pub fn results(&self) -> &BTreeMap<String, ExecutionResult> {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Handler built from an async closure over owned arguments.
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> StepHandler for FnHandler<F>
where
    F: Fn(Step, ExecutionContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<HandlerOutput>> + Send + 'static,
{
    async fn handle(
        &self,
        step: &Step,
        context: &ExecutionContext,
    ) -> anyhow::Result<HandlerOutput> {
        (self.0)(step.clone(), context.clone()).await
    }
}

/// Wraps an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn StepHandler>
where
    F: Fn(Step, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<HandlerOutput>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}
