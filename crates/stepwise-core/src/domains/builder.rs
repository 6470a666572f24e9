//! Incremental plan construction shared by the domain planners.

use crate::{
    config::EngineConfig,
    error::{EngineError, PlanCreationExt, Result},
    models::{Plan, Step},
};

/// Collects steps for a plan and checks them on [`PlanBuilder::build`].
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    plan: Plan,
    max_steps: usize,
}

impl PlanBuilder {
    /// Starts a plan for `domain` bounded by `config.max_steps`.
    pub fn new(domain: &str, name: impl Into<String>, config: &EngineConfig) -> Self {
        Self {
            plan: Plan::new(name, domain),
            max_steps: config.max_steps,
        }
    }

    /// Sets the plan description.
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.plan.description = description.into();
        self
    }

    /// Appends a step.
    pub fn step(&mut self, step: Step) -> &mut Self {
        self.plan.steps.push(step);
        self
    }

    /// Appends a step only when `condition` holds.
    pub fn step_if(&mut self, condition: bool, step: impl FnOnce() -> Step) -> &mut Self {
        if condition {
            self.plan.steps.push(step());
        }
        self
    }

    /// Whether a step with `id` was added.
    pub fn contains(&self, id: &str) -> bool {
        self.plan.step(id).is_some()
    }

    /// Keeps only the ids in `candidates` that were added, in order.
    pub fn existing<'a>(&self, candidates: &[&'a str]) -> Vec<&'a str> {
        candidates
            .iter()
            .copied()
            .filter(|id| self.contains(id))
            .collect()
    }

    /// Validates and returns the plan. Failures are reported as plan
    /// creation errors for the plan's domain.
    pub fn build(self) -> Result<Plan> {
        let domain = self.plan.domain.clone();
        self.check().for_domain(&domain)
    }

    fn check(self) -> Result<Plan> {
        if self.plan.steps.is_empty() {
            return Err(EngineError::invalid_input("steps").with_reason("plan has no steps"));
        }
        if self.plan.steps.len() > self.max_steps {
            return Err(EngineError::invalid_input("maxSteps").with_reason(format!(
                "plan needs {} steps but the limit is {}",
                self.plan.steps.len(),
                self.max_steps
            )));
        }
        self.plan.validate()?;
        Ok(self.plan)
    }
}
