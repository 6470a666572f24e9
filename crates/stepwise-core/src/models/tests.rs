use jiff::Timestamp;
use serde_json::json;

use crate::{
    error::EngineError,
    models::{ExecutionResult, Plan, PlanStatus, Step, StepStatus},
};

fn create_test_plan() -> Plan {
    let mut plan = Plan::new("Test Plan", "cicd");
    plan.description = "Lint, test and build".to_string();
    plan.created_at = Timestamp::from_second(1640995200).unwrap(); // 2022-01-01 00:00:00 UTC
    plan.updated_at = Timestamp::from_second(1641081600).unwrap(); // 2022-01-02 00:00:00 UTC
    plan.steps = vec![
        Step::new("lint", "Lint", "lint").with_description("Run clippy"),
        Step::new("test", "Test", "test").depends_on(["lint"]),
        Step::new("build", "Build", "build").depends_on(["test"]),
    ];
    plan
}

#[test]
fn test_step_transitions() {
    let mut step = Step::new("lint", "Lint", "lint");
    assert!(step.transition(StepStatus::InProgress).is_ok());
    assert!(step.transition(StepStatus::Completed).is_ok());

    let err = step.transition(StepStatus::Pending).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
    assert_eq!(err.to_string(), "Step 'lint' cannot move from completed to pending");
}

#[test]
fn test_skip_bypasses_in_progress() {
    let mut step = Step::new("deploy", "Deploy", "deploy");
    assert!(step.transition(StepStatus::Skipped).is_ok());
    assert!(step.transition(StepStatus::InProgress).is_err());
    assert!(step.status.is_terminal());
}

#[test]
fn test_no_status_leads_back_to_pending() {
    for from in [
        StepStatus::Pending,
        StepStatus::InProgress,
        StepStatus::Completed,
        StepStatus::Failed,
        StepStatus::Skipped,
    ] {
        assert!(!from.can_transition_to(StepStatus::Pending));
    }
}

#[test]
fn test_status_parsing() {
    assert_eq!("in_progress".parse::<StepStatus>(), Ok(StepStatus::InProgress));
    assert_eq!("Skipped".parse::<StepStatus>(), Ok(StepStatus::Skipped));
    assert!("done".parse::<StepStatus>().is_err());
    assert_eq!("canceled".parse::<PlanStatus>(), Ok(PlanStatus::Cancelled));
    assert_eq!(PlanStatus::InProgress.as_str(), "in_progress");
}

#[test]
fn test_validate_rejects_duplicates_and_unknown_dependencies() {
    let mut plan = create_test_plan();
    assert!(plan.validate().is_ok());

    plan.steps.push(Step::new("lint", "Lint again", "lint"));
    let err = plan.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate step id 'lint'"));

    let mut plan = create_test_plan();
    plan.steps[2].depends_on.push("package".to_string());
    let err = plan.validate().unwrap_err();
    assert!(err.to_string().contains("unknown step 'package'"));
}

#[test]
fn test_unsatisfied_dependencies() {
    let mut plan = create_test_plan();
    let test = plan.step("test").unwrap().clone();
    assert_eq!(plan.unsatisfied_dependencies(&test), vec!["lint"]);

    plan.step_mut("lint").unwrap().status = StepStatus::Skipped;
    assert_eq!(plan.unsatisfied_dependencies(&test), vec!["lint"]);

    plan.step_mut("lint").unwrap().status = StepStatus::Completed;
    assert!(plan.unsatisfied_dependencies(&test).is_empty());
}

#[test]
fn test_settled_status() {
    let mut plan = create_test_plan();
    for step in &mut plan.steps {
        step.status = StepStatus::Completed;
        step.result = Some(ExecutionResult::success(&step.id, "ok", json!(null)));
    }
    assert!(plan.is_finished());
    assert_eq!(plan.settled_status(), PlanStatus::Completed);

    plan.steps[2].status = StepStatus::Skipped;
    plan.steps[2].result = Some(ExecutionResult::skipped("build", "not needed"));
    assert_eq!(plan.settled_status(), PlanStatus::Completed);

    plan.steps[1].status = StepStatus::Failed;
    plan.steps[1].result = Some(ExecutionResult::failure("test", "boom"));
    assert_eq!(plan.settled_status(), PlanStatus::Failed);
}

#[test]
fn test_plan_ids_are_unique() {
    let first = Plan::new("A", "data");
    let second = Plan::new("A", "data");
    assert_ne!(first.id, second.id);
    assert_eq!(first.status, PlanStatus::Created);
}

#[test]
fn test_skipped_result_shape() {
    let result = ExecutionResult::skipped("build", "skipped by request");
    assert!(result.success);
    assert!(result.is_skip());
    assert_eq!(result.data["type"], "skipped");
    assert!(result.error.is_none());

    let failure = ExecutionResult::failure("build", "linker error");
    assert!(!failure.is_skip());
    assert_eq!(failure.summary, "Failed: linker error");
}

#[test]
fn test_plan_display() {
    let mut plan = create_test_plan();
    plan.steps[0].status = StepStatus::Completed;
    plan.steps[0].result = Some(ExecutionResult::success("lint", "No warnings", json!(null)));
    let output = format!("{plan}");

    assert!(output.contains("# Test Plan"));
    assert!(output.contains(&format!("- ID: {}", plan.id)));
    assert!(output.contains("- Domain: cicd"));
    assert!(output.contains("- Status: created"));
    assert!(output.contains("Lint, test and build"));
    assert!(output.contains("## Steps"));
    assert!(output.contains("1. Lint `lint` (✓ Completed)"));
    assert!(output.contains("   Run clippy"));
    assert!(output.contains("   Result: No warnings"));
    assert!(output.contains("2. Test `test` (○ Pending)"));
    assert!(output.contains("   Depends on: test"));
}

#[test]
fn test_empty_plan_display() {
    let plan = Plan::new("Empty", "data");
    assert!(format!("{plan}").contains("No steps in this plan."));
}

#[test]
fn test_failed_result_displays_error() {
    let result = ExecutionResult::failure("build", "linker error");
    assert_eq!(result.to_string(), "linker error");
}

#[test]
fn test_serialization_uses_camel_case() {
    let plan = create_test_plan();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["steps"][1]["actionType"], "test");
    assert_eq!(value["steps"][1]["dependsOn"][0], "lint");
    assert_eq!(value["steps"][0]["status"], "pending");
    assert!(value["steps"][0].get("result").is_none());

    let back: Plan = serde_json::from_value(value).unwrap();
    assert_eq!(back, plan);
}
