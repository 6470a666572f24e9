//! Step model definition and related functionality.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExecutionResult, StepStatus};
use crate::error::{EngineError, Result};

/// Represents one unit of work within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Identifier, unique within the owning plan
    pub id: String,

    /// Short display name
    pub name: String,

    /// What the step does
    #[serde(default)]
    pub description: String,

    /// Tag selecting the registered handler that executes the step
    pub action_type: String,

    /// Current status of the step
    #[serde(default)]
    pub status: StepStatus,

    /// Step ids that must be completed before this step may run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Domain-specific parameters passed to the handler
    #[serde(default)]
    pub data: Value,

    /// Outcome of the step, absent while pending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExecutionResult>,
}

impl Step {
    /// Creates a pending step with no dependencies or data.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        action_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            action_type: action_type.into(),
            status: StepStatus::Pending,
            depends_on: Vec::new(),
            data: Value::Null,
            result: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds dependencies on other step ids.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets the handler parameters.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Moves the step to `next`, enforcing the step state machine.
    pub fn transition(&mut self, next: StepStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                step_id: self.id.clone(),
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
