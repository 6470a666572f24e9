//! Plan operations for the Engine.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use super::Engine;
use crate::{
    display::SummaryGenerator,
    error::{EngineError, PlanCreationExt, Result},
    models::{EngineState, Plan, PlanExecutionResult, PlanStatus, StepStatus},
    observer::EngineEvent,
    params::ExecuteOptions,
};

impl Engine {
    /// Asks the planner for `domain` to build a plan from `params`, loads
    /// it as the current plan and returns a copy.
    pub fn create_plan(&mut self, domain: &str, params: &Value) -> Result<Plan> {
        self.publish(EngineEvent::PlanStart {
            domain: domain.to_string(),
        });

        let planner = self
            .domains
            .planner(domain)
            .map_err(|e| self.fail(e))?;
        let plan = planner
            .create_plan(params, &self.config)
            .for_domain(domain)
            .map_err(|e| self.fail(e))?;

        info!(
            "Created {} plan '{}' with {} steps",
            plan.domain,
            plan.name,
            plan.steps.len()
        );
        self.load_plan(plan.clone())
            .for_domain(domain)
            .map_err(|e| self.fail(e))?;
        self.publish(EngineEvent::PlanCreated {
            plan_id: plan.id.clone(),
            domain: plan.domain.clone(),
            step_count: plan.steps.len(),
        });
        Ok(plan)
    }

    /// Validates `plan` and makes it the current plan, discarding the
    /// previous one and its run history. Steps still marked in progress are
    /// failed as interrupted.
    pub fn load_plan(&mut self, plan: Plan) -> Result<()> {
        plan.validate()?;

        let results: BTreeMap<_, _> = plan
            .steps
            .iter()
            .filter_map(|step| step.result.clone().map(|result| (step.id.clone(), result)))
            .collect();
        self.state = EngineState {
            is_complete: plan.status.is_terminal(),
            plan: Some(plan),
            results,
            ..Default::default()
        };
        self.recover_interrupted()?;
        Ok(())
    }

    /// Loads `plan` and runs every pending step in order.
    pub async fn execute_plan(
        &mut self,
        plan: Plan,
        options: &ExecuteOptions,
    ) -> Result<PlanExecutionResult> {
        self.load_plan(plan).map_err(|e| self.fail(e))?;
        self.execute_current_plan(options).await
    }

    /// Runs every pending step of the loaded plan in a single forward pass.
    ///
    /// A step whose dependencies have not completed by its turn is skipped
    /// for good. A failing step is recorded and the pass moves on, unless
    /// `options.stop_on_error` is set, in which case the pass halts and the
    /// remaining steps stay pending.
    pub async fn execute_current_plan(
        &mut self,
        options: &ExecuteOptions,
    ) -> Result<PlanExecutionResult> {
        if let Err(e) = options.validate() {
            return Err(self.fail(e));
        }
        let timeout = options.timeout_or(self.config.step_timeout());
        match self.run_pass(options.stop_on_error, timeout).await {
            Ok(executed) => self.finish_pass(executed),
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn run_pass(&mut self, stop_on_error: bool, timeout: Duration) -> Result<Vec<String>> {
        self.recover_interrupted()?;
        let plan = self.current_plan_mut()?;
        plan.status = PlanStatus::InProgress;
        plan.touch();
        let plan_id = plan.id.clone();
        let step_ids: Vec<String> = plan.steps.iter().map(|step| step.id.clone()).collect();

        info!("Executing plan {plan_id} ({} steps)", step_ids.len());
        self.state.is_loading = true;
        self.state.is_complete = false;
        self.state.error = None;
        self.publish(EngineEvent::PlanExecuteStart {
            plan_id: plan_id.clone(),
            step_count: step_ids.len(),
        });

        let mut executed = Vec::new();
        for step_id in step_ids {
            let plan = self.current_plan()?;
            let Some(step) = plan.step(&step_id) else {
                return Err(EngineError::StepNotFound { id: step_id });
            };
            if step.status != StepStatus::Pending {
                continue;
            }
            let missing = plan.unsatisfied_dependencies(step);

            executed.push(step_id.clone());
            self.state.executed_steps.push(step_id.clone());

            if !missing.is_empty() {
                let reason = format!("unsatisfied dependencies: {}", missing.join(", "));
                self.skip_pending_step(&step_id, &reason)?;
                continue;
            }

            let result = self.run_step(&step_id, timeout).await?;
            if !result.success && stop_on_error {
                warn!("Halting plan {plan_id} after failed step '{step_id}'");
                let plan = self.current_plan_mut()?;
                plan.status = PlanStatus::Failed;
                break;
            }
        }
        Ok(executed)
    }

    fn finish_pass(&mut self, executed: Vec<String>) -> Result<PlanExecutionResult> {
        let plan = self.current_plan_mut()?;
        if plan.status != PlanStatus::Failed {
            plan.status = plan.settled_status();
        }
        plan.touch();
        let status = plan.status;
        let success = status == PlanStatus::Completed;
        let (plan_id, domain) = (plan.id.clone(), plan.domain.clone());

        self.state.is_loading = false;
        self.state.current_step = None;
        self.state.is_complete = true;

        let summary = SummaryGenerator::generate(self.current_plan()?, &executed, &self.state.results);
        info!("Plan {plan_id} finished with status {status}");
        self.publish(EngineEvent::PlanExecuteComplete {
            plan_id: plan_id.clone(),
            success,
        });

        Ok(PlanExecutionResult {
            plan_id,
            domain,
            success,
            status,
            executed_steps: executed,
            results: self.state.results.clone(),
            summary,
        })
    }

    /// Summary of the steps processed since the plan was loaded.
    pub fn summary(&self) -> String {
        match self.plan() {
            Some(plan) => {
                SummaryGenerator::generate(plan, &self.state.executed_steps, &self.state.results)
            }
            None => crate::display::NOTHING_EXECUTED.to_string(),
        }
    }

    /// Clears all state and returns the discarded plan, marked cancelled if
    /// it had not finished.
    pub fn reset(&mut self) -> Option<Plan> {
        let mut discarded = std::mem::take(&mut self.state).plan;
        if let Some(plan) = discarded.as_mut() {
            if !plan.status.is_terminal() {
                plan.status = PlanStatus::Cancelled;
                plan.touch();
            }
            info!("Reset engine, discarding plan {}", plan.id);
        }
        self.publish(EngineEvent::Reset);
        discarded
    }
}
