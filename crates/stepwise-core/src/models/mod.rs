//! Data models for plans, steps and their execution outcomes.
//!
//! A [`Plan`] is created once by a domain planner and mutated in place by the
//! engine as its steps run: statuses change and results are attached to the
//! steps that produced them. Display implementations live in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use stepwise_core::models::{Plan, Step, StepStatus};
//!
//! let mut plan = Plan::new("Release", "cicd");
//! plan.steps.push(Step::new("lint", "Lint", "lint"));
//! plan.steps.push(Step::new("test", "Test", "test").depends_on(["lint"]));
//! plan.validate().unwrap();
//!
//! let test = plan.step("test").unwrap();
//! assert_eq!(plan.unsatisfied_dependencies(test), vec!["lint".to_string()]);
//! assert_eq!(test.status, StepStatus::Pending);
//! ```

pub mod plan;
pub mod result;
pub mod state;
pub mod status;
pub mod step;

#[cfg(test)]
mod tests;

pub use plan::Plan;
pub use result::{ExecutionResult, PlanExecutionResult};
pub use state::EngineState;
pub use status::{PlanStatus, StepStatus};
pub use step::Step;
