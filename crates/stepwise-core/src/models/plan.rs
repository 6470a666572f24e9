//! Plan model definition and related functionality.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PlanStatus, Step, StepStatus};
use crate::error::{EngineError, Result};

/// Represents an ordered, dependency-annotated list of steps for one domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Unique identifier assigned at creation
    pub id: String,

    /// Display name of the plan
    pub name: String,

    /// What the plan accomplishes
    #[serde(default)]
    pub description: String,

    /// Tag of the domain that produced the plan
    pub domain: String,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Aggregate status of the plan
    #[serde(default)]
    pub status: PlanStatus,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan or one of its steps last changed (UTC)
    pub updated_at: Timestamp,
}

impl Plan {
    /// Creates an empty plan with a fresh id.
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            domain: domain.into(),
            steps: Vec::new(),
            status: PlanStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// Looks up a step by id for mutation.
    pub fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| step.id == id)
    }

    /// Position of a step within the plan.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    /// Dependencies of `step` that have not completed.
    pub fn unsatisfied_dependencies(&self, step: &Step) -> Vec<String> {
        step.depends_on
            .iter()
            .filter(|dep| {
                self.step(dep.as_str())
                    .map_or(true, |dep| dep.status != StepStatus::Completed)
            })
            .cloned()
            .collect()
    }

    /// Number of steps currently in `status`.
    pub fn count_with_status(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|step| step.status == status).count()
    }

    /// Whether every step has reached a final status.
    pub fn is_finished(&self) -> bool {
        self.steps.iter().all(|step| step.status.is_terminal())
    }

    /// Status the plan should hold once its steps are final: completed when
    /// every step completed or was skipped and every recorded result
    /// succeeded, failed otherwise.
    pub fn settled_status(&self) -> PlanStatus {
        let all_passed = self.steps.iter().all(|step| {
            matches!(step.status, StepStatus::Completed | StepStatus::Skipped)
                && step.result.as_ref().map_or(true, |result| result.success)
        });
        if all_passed {
            PlanStatus::Completed
        } else {
            PlanStatus::Failed
        }
    }

    /// Checks structural invariants: step ids are unique and every
    /// dependency names a step of this plan. Cycles are not detected.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(EngineError::invalid_input("steps")
                    .with_reason(format!("step '{}' has an empty id", step.name)));
            }
            if !seen.insert(step.id.as_str()) {
                return Err(EngineError::invalid_input("steps")
                    .with_reason(format!("duplicate step id '{}'", step.id)));
            }
        }
        for step in &self.steps {
            if let Some(missing) = step.depends_on.iter().find(|dep| !seen.contains(dep.as_str())) {
                return Err(EngineError::invalid_input("dependsOn").with_reason(format!(
                    "step '{}' depends on unknown step '{}'",
                    step.id, missing
                )));
            }
        }
        Ok(())
    }

    /// Records a modification.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
