//! Error types for the execution engine.

use std::time::Duration;

use thiserror::Error;

/// Comprehensive error type for all engine operations.
///
/// Plan-level variants are returned to the caller. Step-level variants
/// (`MissingHandler`, `StepTimeout`, `HandlerFailed`) are rendered into a
/// failed [`crate::models::ExecutionResult`] during a run instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A domain planner could not produce a plan
    #[error("Failed to create {domain} plan: {message}")]
    PlanCreation { domain: String, message: String },
    /// No planner is registered for the requested domain
    #[error("Unknown domain '{domain}'")]
    UnknownDomain { domain: String },
    /// An operation needed a current plan but none is loaded
    #[error("No plan is loaded")]
    NoPlanLoaded,
    /// Step not found in the current plan
    #[error("Step with ID '{id}' not found")]
    StepNotFound { id: String },
    /// A single-step execution was requested before its dependencies completed
    #[error("Step '{step_id}' has unsatisfied dependencies: {}", missing.join(", "))]
    DependenciesNotSatisfied {
        step_id: String,
        missing: Vec<String>,
    },
    /// A step status change that the step state machine does not allow
    #[error("Step '{step_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        step_id: String,
        from: String,
        to: String,
    },
    /// No handler (and no manual fallback) exists for an action type
    #[error("No handler registered for action type '{action_type}'")]
    MissingHandler { action_type: String },
    /// The handler did not resolve before the step timeout
    #[error("Step '{step_id}' timed out after {}ms", timeout.as_millis())]
    StepTimeout { step_id: String, timeout: Duration },
    /// The handler returned an error, reported failure, or panicked
    #[error("Step '{step_id}' failed: {message}")]
    HandlerFailed { step_id: String, message: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Builder for creating plan creation errors.
pub struct PlanCreationErrorBuilder {
    domain: String,
}

impl PlanCreationErrorBuilder {
    /// Create a new plan creation error builder for a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Build the error with the given message.
    pub fn with_message(self, message: impl Into<String>) -> EngineError {
        EngineError::PlanCreation {
            domain: self.domain,
            message: message.into(),
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> EngineError {
        EngineError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl EngineError {
    /// Creates a builder for plan creation errors.
    pub fn plan_creation(domain: impl Into<String>) -> PlanCreationErrorBuilder {
        PlanCreationErrorBuilder::new(domain)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Whether this error belongs to a single step rather than the plan.
    pub fn is_step_level(&self) -> bool {
        matches!(
            self,
            EngineError::MissingHandler { .. }
                | EngineError::StepTimeout { .. }
                | EngineError::HandlerFailed { .. }
        )
    }
}

/// Extension trait for wrapping planner failures as plan creation errors.
pub trait PlanCreationExt<T> {
    /// Wrap any error into [`EngineError::PlanCreation`] for `domain`.
    fn for_domain(self, domain: &str) -> Result<T>;
}

impl<T> PlanCreationExt<T> for Result<T> {
    fn for_domain(self, domain: &str) -> Result<T> {
        self.map_err(|e| match e {
            EngineError::PlanCreation { .. } => e,
            other => EngineError::plan_creation(domain).with_message(other.to_string()),
        })
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
