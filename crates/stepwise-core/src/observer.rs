//! Lifecycle notifications.
//!
//! The [`ObserverBus`] delivers each [`EngineEvent`] synchronously to every
//! subscriber, in subscription order. Delivery is best-effort: an observer
//! that returns an error or panics is logged and skipped, and the remaining
//! observers still receive the event.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::models::ExecutionResult;

/// Events published by the engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EngineEvent {
    /// A plan is about to be created for a domain
    PlanStart { domain: String },
    /// A plan was created and loaded
    #[serde(rename_all = "camelCase")]
    PlanCreated {
        plan_id: String,
        domain: String,
        step_count: usize,
    },
    /// A plan-wide pass is starting
    #[serde(rename_all = "camelCase")]
    PlanExecuteStart { plan_id: String, step_count: usize },
    /// A step handler is about to run
    #[serde(rename_all = "camelCase")]
    StepExecuteStart {
        plan_id: String,
        step_id: String,
        action_type: String,
    },
    /// A step completed
    #[serde(rename_all = "camelCase")]
    StepExecuted {
        plan_id: String,
        step_id: String,
        result: ExecutionResult,
    },
    /// A step failed
    #[serde(rename_all = "camelCase")]
    StepExecuteError {
        plan_id: String,
        step_id: String,
        error: String,
    },
    /// A step was skipped without running
    #[serde(rename_all = "camelCase")]
    StepSkipped {
        plan_id: String,
        step_id: String,
        reason: String,
    },
    /// A plan-wide pass finished
    #[serde(rename_all = "camelCase")]
    PlanExecuteComplete { plan_id: String, success: bool },
    /// A plan-level operation failed
    #[serde(rename_all = "camelCase")]
    PlanExecuteError {
        plan_id: Option<String>,
        error: String,
    },
    /// Engine state was cleared
    Reset,
}

impl EngineEvent {
    /// Event name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::PlanStart { .. } => "planStart",
            EngineEvent::PlanCreated { .. } => "planCreated",
            EngineEvent::PlanExecuteStart { .. } => "planExecuteStart",
            EngineEvent::StepExecuteStart { .. } => "stepExecuteStart",
            EngineEvent::StepExecuted { .. } => "stepExecuted",
            EngineEvent::StepExecuteError { .. } => "stepExecuteError",
            EngineEvent::StepSkipped { .. } => "stepSkipped",
            EngineEvent::PlanExecuteComplete { .. } => "planExecuteComplete",
            EngineEvent::PlanExecuteError { .. } => "planExecuteError",
            EngineEvent::Reset => "reset",
        }
    }
}

/// Receives engine events.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &EngineEvent) -> anyhow::Result<()>;
}

impl<F> Observer for F
where
    F: Fn(&EngineEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &EngineEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Handle returned by [`ObserverBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered list of subscribers.
#[derive(Default)]
pub struct ObserverBus {
    next_id: u64,
    observers: Vec<(ObserverId, Arc<dyn Observer>)>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer after all existing ones.
    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Delivers `event` to every observer and returns how many of them
    /// failed.
    pub fn publish(&self, event: &EngineEvent) -> usize {
        let mut failures = 0;
        for (id, observer) in &self.observers {
            match catch_unwind(AssertUnwindSafe(|| observer.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    warn!("Observer {:?} failed on {}: {e:#}", id, event.name());
                }
                Err(_) => {
                    failures += 1;
                    warn!("Observer {:?} panicked on {}", id, event.name());
                }
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
