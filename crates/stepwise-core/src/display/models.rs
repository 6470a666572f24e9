//! Display implementations for domain models.
//!
//! Plans and steps render as markdown, with status icons on each step and the
//! step result shown once the step has one.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{ExecutionResult, Plan, PlanStatus, Step, StepStatus};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Domain: {}", self.domain)?;
        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this plan.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for (position, step) in self.steps.iter().enumerate() {
                write!(f, "{}. ", position + 1)?;
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} `{}` ({})",
            self.name,
            self.id,
            self.status.with_icon()
        )?;

        if !self.description.is_empty() {
            writeln!(f, "   {}", self.description)?;
        }

        if !self.depends_on.is_empty() {
            writeln!(f, "   Depends on: {}", self.depends_on.join(", "))?;
        }

        if let Some(result) = &self.result {
            writeln!(f, "   Result: {result}")?;
        }

        Ok(())
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) if !self.success => write!(f, "{error}"),
            _ => write!(f, "{}", self.summary),
        }
    }
}
