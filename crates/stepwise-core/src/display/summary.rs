//! Run summary rendering.
//!
//! [`RunSummary`] borrows a plan together with the ids of the steps a run
//! processed and renders a markdown report with an overview, the completed
//! steps, the failed steps with their error text, the skipped steps, and a
//! completion timestamp. [`SummaryGenerator`] is the entry point used by the
//! engine.

use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{ExecutionResult, Plan, StepStatus};

/// Message returned when a summary is requested before anything ran.
pub const NOTHING_EXECUTED: &str = "No steps have been executed yet.";

/// Renders run summaries. Never fails.
pub struct SummaryGenerator;

impl SummaryGenerator {
    /// Renders the summary for `executed_steps` of `plan`, stamped now.
    pub fn generate(
        plan: &Plan,
        executed_steps: &[String],
        results: &BTreeMap<String, ExecutionResult>,
    ) -> String {
        Self::generate_at(plan, executed_steps, results, Timestamp::now())
    }

    /// Renders the summary with an explicit completion time.
    pub fn generate_at(
        plan: &Plan,
        executed_steps: &[String],
        results: &BTreeMap<String, ExecutionResult>,
        completed_at: Timestamp,
    ) -> String {
        if executed_steps.is_empty() {
            return NOTHING_EXECUTED.to_string();
        }
        RunSummary {
            plan,
            executed_steps,
            results,
            completed_at,
        }
        .to_string()
    }
}

/// Wrapper type for displaying the report of one execution run.
pub struct RunSummary<'a> {
    pub plan: &'a Plan,
    pub executed_steps: &'a [String],
    pub results: &'a BTreeMap<String, ExecutionResult>,
    pub completed_at: Timestamp,
}

struct Row<'a> {
    id: &'a str,
    name: &'a str,
    status: StepStatus,
    result: Option<&'a ExecutionResult>,
}

impl<'a> RunSummary<'a> {
    fn rows(&self) -> Vec<Row<'a>> {
        self.executed_steps
            .iter()
            .map(|id| {
                let step = self.plan.step(id);
                Row {
                    id: id.as_str(),
                    name: step.map_or(id.as_str(), |step| step.name.as_str()),
                    status: step.map_or(StepStatus::Pending, |step| step.status),
                    result: self
                        .results
                        .get(id)
                        .or_else(|| step.and_then(|step| step.result.as_ref())),
                }
            })
            .collect()
    }
}

impl fmt::Display for RunSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let count = |status: StepStatus| rows.iter().filter(|row| row.status == status).count();

        writeln!(f, "# Execution Summary: {}", self.plan.name)?;
        writeln!(f)?;
        writeln!(f, "## Overview")?;
        writeln!(f)?;
        writeln!(f, "- Domain: {}", self.plan.domain)?;
        writeln!(f, "- Status: {}", self.plan.status)?;
        writeln!(
            f,
            "- Executed: {} of {} steps",
            rows.len(),
            self.plan.steps.len()
        )?;
        writeln!(f, "- Completed: {}", count(StepStatus::Completed))?;
        writeln!(f, "- Failed: {}", count(StepStatus::Failed))?;
        writeln!(f, "- Skipped: {}", count(StepStatus::Skipped))?;
        let handler_ms: u64 = rows
            .iter()
            .filter_map(|row| row.result.map(|result| result.duration_ms))
            .sum();
        writeln!(f, "- Handler time: {}", Elapsed(handler_ms))?;

        writeln!(f, "\n## Completed Steps")?;
        writeln!(f)?;
        let completed: Vec<_> = rows
            .iter()
            .filter(|row| row.status == StepStatus::Completed)
            .collect();
        if completed.is_empty() {
            writeln!(f, "None.")?;
        }
        for row in completed {
            match row.result {
                Some(result) => writeln!(f, "- {} (`{}`): {}", row.name, row.id, result.summary)?,
                None => writeln!(f, "- {} (`{}`)", row.name, row.id)?,
            }
        }

        writeln!(f, "\n## Failed Steps")?;
        writeln!(f)?;
        let failed: Vec<_> = rows
            .iter()
            .filter(|row| row.status == StepStatus::Failed)
            .collect();
        if failed.is_empty() {
            writeln!(f, "None.")?;
        }
        for row in failed {
            let error = row
                .result
                .and_then(|result| result.error.as_deref())
                .unwrap_or("unknown error");
            writeln!(f, "- {} (`{}`): {}", row.name, row.id, error)?;
        }

        let skipped: Vec<_> = rows
            .iter()
            .filter(|row| row.status == StepStatus::Skipped)
            .collect();
        if !skipped.is_empty() {
            writeln!(f, "\n## Skipped Steps")?;
            writeln!(f)?;
            for row in skipped {
                match row.result {
                    Some(result) => {
                        writeln!(f, "- {} (`{}`): {}", row.name, row.id, result.summary)?
                    }
                    None => writeln!(f, "- {} (`{}`)", row.name, row.id)?,
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Completed at: {}", LocalDateTime(&self.completed_at))
    }
}
