//! Core library for the Stepwise plan execution engine.
//!
//! This crate turns a declarative, dependency-ordered list of steps into a
//! supervised execution run: it tracks per-step status, honours inter-step
//! dependencies, applies per-step timeouts, tolerates partial failure, and
//! renders a run summary.
//!
//! # Architecture
//!
//! - **Plan Model** ([`models`]): plans, steps and their results
//! - **Domain Planners** ([`domains`]): turn parameters into plans
//! - **Step Handlers** ([`handlers`]): perform the work behind an action type
//! - **Engine** ([`engine`]): walks a plan, racing each handler against its
//!   timeout
//! - **Observer Bus** ([`observer`]): best-effort lifecycle notifications
//! - **Summary Generator** ([`display`]): markdown run reports
//!
//! # Quick Start
//!
//! ```rust
//! use stepwise_core::{
//!     handlers::{handler_fn, HandlerOutput},
//!     models::{Plan, Step},
//!     Engine, ExecuteOptions,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::builder().build()?;
//! engine.register_handler(
//!     "shell",
//!     handler_fn(|step, _context| async move {
//!         Ok(HandlerOutput::success(format!("ran {}", step.name)))
//!     }),
//! );
//!
//! let mut plan = Plan::new("Release", "cicd");
//! plan.steps.push(Step::new("lint", "Lint", "shell"));
//! plan.steps.push(Step::new("test", "Test", "shell").depends_on(["lint"]));
//!
//! let outcome = engine.execute_plan(plan, &ExecuteOptions::default()).await?;
//! assert!(outcome.success);
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod domains;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observer;
pub mod params;

// Re-export commonly used types
pub use config::{EngineConfig, PlanningDepth};
pub use display::{LocalDateTime, RunSummary, SummaryGenerator};
pub use domains::{create_planner, Domain, DomainPlanner, DomainRegistry};
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, Result};
pub use handlers::{handler_fn, ExecutionContext, HandlerOutput, HandlerRegistry, StepHandler};
pub use models::{
    EngineState, ExecutionResult, Plan, PlanExecutionResult, PlanStatus, Step, StepStatus,
};
pub use observer::{EngineEvent, Observer, ObserverId};
pub use params::ExecuteOptions;
