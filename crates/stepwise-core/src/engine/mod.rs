//! The execution engine.
//!
//! An [`Engine`] owns its handler registry, domain registry, observer bus and
//! the state of the one plan it is working on. Steps of a plan run strictly
//! one after another in plan order; the only suspension point is the race
//! between a step handler and its timeout.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ DomainPlanner│──▶│    Engine    │──▶│   Handler    │   │   Summary    │
//! │ (create_plan)│   │ (plan_ops,   │   │   Registry   │   │  Generator   │
//! └──────────────┘   │  step_ops)   │──▶└──────────────┘   └──────────────┘
//!                    └──────┬───────┘                             ▲
//!                           │ EngineEvent                         │
//!                           ▼                                     │
//!                    ┌──────────────┐                             │
//!                    │ ObserverBus  │      end of each pass ──────┘
//!                    └──────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`Engine`] instances
//! - [`plan_ops`]: Plan creation, loading, plan-wide execution and reset
//! - [`step_ops`]: Single-step execution, skipping and the timeout race
//!
//! # Usage Examples
//!
//! ```rust
//! use serde_json::json;
//! use stepwise_core::{Engine, ExecuteOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::builder().with_fallback_mode(true).build()?;
//! let plan = engine.create_plan("cicd", &json!({ "project": "api" }))?;
//!
//! let outcome = engine.execute_plan(plan, &ExecuteOptions::default()).await?;
//! assert!(outcome.success);
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::error;

use crate::{
    config::EngineConfig,
    domains::{DomainPlanner, DomainRegistry},
    error::{EngineError, Result},
    handlers::{HandlerRegistry, StepHandler},
    models::{EngineState, Plan},
    observer::{EngineEvent, Observer, ObserverBus, ObserverId},
};

pub mod builder;
pub mod plan_ops;
pub mod step_ops;


pub use builder::EngineBuilder;

/// Orchestrates the execution of one plan at a time.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) handlers: HandlerRegistry,
    pub(crate) domains: DomainRegistry,
    pub(crate) observers: ObserverBus,
    pub(crate) state: EngineState,
}

impl Engine {
    pub(crate) fn new(
        config: EngineConfig,
        handlers: HandlerRegistry,
        domains: DomainRegistry,
        observers: ObserverBus,
    ) -> Self {
        Self {
            config,
            handlers,
            domains,
            observers,
            state: EngineState::default(),
        }
    }

    /// Starts building an engine with the built-in domains.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Planner registered for `domain`.
    pub fn create_planner(&self, domain: &str) -> Result<Arc<dyn DomainPlanner>> {
        self.domains.planner(domain)
    }

    /// Registers `handler` for `action_type`, returning the one it replaced.
    pub fn register_handler(
        &mut self,
        action_type: impl Into<String>,
        handler: Arc<dyn StepHandler>,
    ) -> Option<Arc<dyn StepHandler>> {
        self.handlers.register(action_type, handler)
    }

    /// Subscribes an observer to lifecycle events.
    pub fn add_observer<O>(&mut self, observer: O) -> ObserverId
    where
        O: Observer + 'static,
    {
        self.observers.subscribe(Arc::new(observer))
    }

    /// Unsubscribes an observer. Returns false if it was not subscribed.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> EngineState {
        self.state.clone()
    }

    /// Currently loaded plan.
    pub fn plan(&self) -> Option<&Plan> {
        self.state.plan.as_ref()
    }

    pub(crate) fn current_plan(&self) -> Result<&Plan> {
        self.state.plan.as_ref().ok_or(EngineError::NoPlanLoaded)
    }

    pub(crate) fn current_plan_mut(&mut self) -> Result<&mut Plan> {
        self.state.plan.as_mut().ok_or(EngineError::NoPlanLoaded)
    }

    /// Delivers an event, returning how many observers failed.
    pub(crate) fn publish(&self, event: EngineEvent) -> usize {
        self.observers.publish(&event)
    }

    /// Records a plan-level error, notifies observers and hands the error
    /// back for propagation.
    pub(crate) fn fail(&mut self, error: EngineError) -> EngineError {
        error!("{error}");
        let plan_id = self.state.plan.as_ref().map(|plan| plan.id.clone());
        self.state.error = Some(error.to_string());
        self.state.is_loading = false;
        self.state.current_step = None;
        self.publish(EngineEvent::PlanExecuteError {
            plan_id,
            error: error.to_string(),
        });
        error
    }
}
