//! Step operations for the Engine.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use log::{debug, warn};

use super::Engine;
use crate::{
    error::{EngineError, Result},
    handlers::{ExecutionContext, HandlerOutput, SimulatedHandler, StepHandler},
    models::{ExecutionResult, PlanStatus, Step, StepStatus},
    observer::EngineEvent,
    params::ExecuteOptions,
};

/// Error recorded for a step whose run ended without an outcome.
pub const INTERRUPTED: &str = "interrupted before the handler finished";

impl Engine {
    /// Runs one step of the loaded plan out of sequence.
    ///
    /// Unlike a plan-wide pass, unsatisfied dependencies are an error here
    /// rather than a silent skip. Handler failures are still returned as a
    /// failed [`ExecutionResult`].
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` for a zero timeout,
    /// `EngineError::NoPlanLoaded`, `EngineError::StepNotFound`,
    /// `EngineError::DependenciesNotSatisfied`, or
    /// `EngineError::InvalidTransition` if the step is no longer pending
    pub async fn execute_step(
        &mut self,
        step_id: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecutionResult> {
        let ready = options
            .validate()
            .and_then(|()| self.recover_interrupted())
            .and_then(|()| self.check_runnable(step_id));
        if let Err(e) = ready {
            return Err(self.fail(e));
        }

        let timeout = options.timeout_or(self.config.step_timeout());
        let plan = self.current_plan_mut()?;
        if plan.status == PlanStatus::Created {
            plan.status = PlanStatus::InProgress;
        }
        self.state.is_loading = true;
        self.state.executed_steps.push(step_id.to_string());

        let result = self.run_step(step_id, timeout).await;
        self.state.is_loading = false;
        let result = result.map_err(|e| self.fail(e))?;
        self.settle_if_finished()?;
        Ok(result)
    }

    /// Marks a pending step skipped without running it.
    ///
    /// Returns `Ok(false)` when the step was skipped but an observer failed
    /// while being notified.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoPlanLoaded`, `EngineError::StepNotFound`, or
    /// `EngineError::InvalidTransition` if the step is no longer pending
    pub fn skip_step(&mut self, step_id: &str) -> Result<bool> {
        let delivered = self.skip_pending_step(step_id, "skipped by request")?;
        self.settle_if_finished()?;
        Ok(delivered)
    }

    fn check_runnable(&self, step_id: &str) -> Result<()> {
        let plan = self.current_plan()?;
        let step = plan.step(step_id).ok_or_else(|| EngineError::StepNotFound {
            id: step_id.to_string(),
        })?;
        let missing = plan.unsatisfied_dependencies(step);
        if !missing.is_empty() {
            return Err(EngineError::DependenciesNotSatisfied {
                step_id: step_id.to_string(),
                missing,
            });
        }
        if !step.status.can_transition_to(StepStatus::InProgress) {
            return Err(EngineError::InvalidTransition {
                step_id: step_id.to_string(),
                from: step.status.as_str().to_string(),
                to: StepStatus::InProgress.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Fails every step left in progress by a run whose future was dropped
    /// before its handler settled, and clears the stale run markers.
    pub(crate) fn recover_interrupted(&mut self) -> Result<()> {
        self.state.is_loading = false;
        self.state.current_step = None;
        let Some(plan) = self.state.plan.as_mut() else {
            return Ok(());
        };
        let plan_id = plan.id.clone();
        let mut interrupted = Vec::new();
        for step in plan
            .steps
            .iter_mut()
            .filter(|step| step.status == StepStatus::InProgress)
        {
            step.transition(StepStatus::Failed)?;
            let result = ExecutionResult::failure(step.id.as_str(), INTERRUPTED);
            step.result = Some(result.clone());
            interrupted.push(result);
        }
        if interrupted.is_empty() {
            return Ok(());
        }
        plan.touch();

        for result in interrupted {
            warn!("Step '{}' was interrupted before its handler settled", result.step_id);
            let step_id = result.step_id.clone();
            self.state.results.insert(step_id.clone(), result);
            self.state.error = Some(INTERRUPTED.to_string());
            self.publish(EngineEvent::StepExecuteError {
                plan_id: plan_id.clone(),
                step_id,
                error: INTERRUPTED.to_string(),
            });
        }
        Ok(())
    }

    /// Moves a pending step to skipped, records a skip result and notifies
    /// observers. Returns whether every observer accepted the event.
    pub(crate) fn skip_pending_step(&mut self, step_id: &str, reason: &str) -> Result<bool> {
        let plan = self.current_plan_mut()?;
        let plan_id = plan.id.clone();
        let step = plan.step_mut(step_id).ok_or_else(|| EngineError::StepNotFound {
            id: step_id.to_string(),
        })?;
        step.transition(StepStatus::Skipped)?;
        let result = ExecutionResult::skipped(step_id, reason);
        step.result = Some(result.clone());
        plan.touch();
        self.state.results.insert(step_id.to_string(), result);

        debug!("Skipped step '{step_id}': {reason}");
        let failures = self.publish(EngineEvent::StepSkipped {
            plan_id,
            step_id: step_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(failures == 0)
    }

    /// Runs a pending step's handler against the timeout and records the
    /// outcome on the step.
    pub(crate) async fn run_step(
        &mut self,
        step_id: &str,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        let context = self.execution_context()?;
        let plan = self.current_plan_mut()?;
        let plan_id = plan.id.clone();
        let domain = plan.domain.clone();
        let step = plan.step_mut(step_id).ok_or_else(|| EngineError::StepNotFound {
            id: step_id.to_string(),
        })?;
        step.transition(StepStatus::InProgress)?;
        let snapshot = step.clone();
        plan.touch();

        self.state.current_step = Some(step_id.to_string());
        debug!("Starting step '{step_id}' ({})", snapshot.action_type);
        self.publish(EngineEvent::StepExecuteStart {
            plan_id: plan_id.clone(),
            step_id: step_id.to_string(),
            action_type: snapshot.action_type.clone(),
        });

        let started = Instant::now();
        let outcome = self.invoke(&domain, &snapshot, &context, timeout).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        self.state.current_step = None;

        let result = match outcome {
            Ok(output) if output.success => output.into_result(step_id),
            Ok(output) => {
                let error = output.error.clone().unwrap_or_else(|| output.summary.clone());
                ExecutionResult {
                    data: output.data,
                    ..ExecutionResult::failure(step_id, error)
                }
            }
            Err(EngineError::HandlerFailed { message, .. }) => {
                ExecutionResult::failure(step_id, message)
            }
            Err(e) => ExecutionResult::failure(step_id, e.to_string()),
        }
        .with_duration_ms(duration_ms);

        let status = if result.success {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        };
        let plan = self.current_plan_mut()?;
        let step = plan.step_mut(step_id).ok_or_else(|| EngineError::StepNotFound {
            id: step_id.to_string(),
        })?;
        step.transition(status)?;
        step.result = Some(result.clone());
        plan.touch();
        self.state.results.insert(step_id.to_string(), result.clone());

        if result.success {
            debug!("Completed step '{step_id}' in {duration_ms}ms");
            self.publish(EngineEvent::StepExecuted {
                plan_id,
                step_id: step_id.to_string(),
                result: result.clone(),
            });
        } else {
            let error = result.error.clone().unwrap_or_default();
            warn!("Step '{step_id}' failed: {error}");
            self.state.error = Some(error.clone());
            self.publish(EngineEvent::StepExecuteError {
                plan_id,
                step_id: step_id.to_string(),
                error,
            });
        }
        Ok(result)
    }

    /// Races the step's handler against `timeout`. A handler that loses the
    /// race is dropped and its eventual outcome ignored.
    async fn invoke(
        &self,
        domain: &str,
        step: &Step,
        context: &ExecutionContext,
        timeout: Duration,
    ) -> Result<HandlerOutput> {
        let handler = self.resolve_handler(domain, &step.action_type).ok_or_else(|| {
            EngineError::MissingHandler {
                action_type: step.action_type.clone(),
            }
        })?;

        let call = AssertUnwindSafe(handler.handle(step, context)).catch_unwind();
        match tokio::time::timeout(timeout, call).await {
            Err(_) => Err(EngineError::StepTimeout {
                step_id: step.id.clone(),
                timeout,
            }),
            Ok(Err(panic)) => Err(EngineError::HandlerFailed {
                step_id: step.id.clone(),
                message: format!("handler panicked: {}", panic_message(panic.as_ref())),
            }),
            Ok(Ok(Err(e))) => Err(EngineError::HandlerFailed {
                step_id: step.id.clone(),
                message: format!("{e:#}"),
            }),
            Ok(Ok(Ok(output))) => Ok(output),
        }
    }

    /// Handler for an action type. In fallback mode this is the domain's
    /// canned handler, or a generic simulated one.
    fn resolve_handler(&self, domain: &str, action_type: &str) -> Option<Arc<dyn StepHandler>> {
        if self.config.fallback_mode {
            let simulated = self
                .domains
                .get(domain)
                .and_then(|entry| entry.simulated_handlers().resolve(action_type))
                .unwrap_or_else(|| Arc::new(SimulatedHandler));
            return Some(simulated);
        }
        self.handlers.resolve(action_type)
    }

    /// Results of the steps completed so far.
    fn execution_context(&self) -> Result<ExecutionContext> {
        let plan = self.current_plan()?;
        let mut context = ExecutionContext::new(plan.id.as_str(), plan.domain.as_str());
        for step in &plan.steps {
            if step.status != StepStatus::Completed {
                continue;
            }
            if let Some(result) = &step.result {
                context.record(result.clone());
            }
        }
        Ok(context)
    }

    /// Gives the plan its final status once every step is final.
    fn settle_if_finished(&mut self) -> Result<()> {
        let plan = self.current_plan_mut()?;
        if plan.is_finished() {
            plan.status = plan.settled_status();
            plan.touch();
            self.state.is_complete = true;
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
