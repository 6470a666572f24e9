mod common;

use std::sync::Arc;

use serde_json::{json, Value};
use stepwise_core::{
    domains::PlanBuilder, Domain, DomainPlanner, Engine, EngineConfig, EngineError,
    ExecuteOptions, HandlerRegistry, Plan, PlanStatus, PlanningDepth, Result, Step, StepStatus,
};

fn fallback_engine(depth: PlanningDepth) -> Engine {
    common::init_logging();
    Engine::builder()
        .with_fallback_mode(true)
        .with_planning_depth(depth)
        .build()
        .expect("Failed to create engine")
}

fn step_ids(plan: &Plan) -> Vec<&str> {
    plan.steps.iter().map(|step| step.id.as_str()).collect()
}

#[tokio::test]
async fn test_builtin_domains_run_in_fallback_mode() {
    let cases = [
        ("cicd", json!({ "project": "api", "pipelineType": "complete" })),
        ("documentation", json!({ "sourcePath": "src" })),
        ("data", json!({ "source": "orders.csv", "transformations": ["dedupe"] })),
    ];

    for (domain, params) in cases {
        let mut engine = fallback_engine(PlanningDepth::Deep);
        let plan = engine
            .create_plan(domain, &params)
            .expect("Failed to create plan");
        assert_eq!(plan.domain, domain);
        assert_eq!(plan.status, PlanStatus::Created);

        let outcome = engine
            .execute_plan(plan.clone(), &ExecuteOptions::default())
            .await
            .expect("Failed to execute plan");

        assert!(outcome.success, "{domain} plan failed:\n{}", outcome.summary);
        assert_eq!(outcome.executed_steps.len(), plan.steps.len());
        for step in &plan.steps {
            assert_eq!(outcome.results[&step.id].data["simulated"], true);
        }
        let loaded = engine.plan().expect("plan should be loaded");
        assert!(loaded
            .steps
            .iter()
            .all(|step| step.status == StepStatus::Completed));
    }
}

#[test]
fn test_cicd_pipeline_shapes() {
    let engine = fallback_engine(PlanningDepth::Medium);
    let planner = engine.create_planner("cicd").expect("cicd planner");
    let config = engine.config();

    let basic = planner
        .create_plan(&json!({ "project": "api" }), config)
        .expect("basic plan");
    assert_eq!(step_ids(&basic), ["lint", "test", "build"]);

    let complete = planner
        .create_plan(
            &json!({
                "project": "api",
                "pipelineType": "complete",
                "notifications": { "channel": "#releases" }
            }),
            config,
        )
        .expect("complete plan");
    assert_eq!(
        step_ids(&complete),
        [
            "lint",
            "test",
            "integration_tests",
            "security_scan",
            "build",
            "deploy",
            "verify",
            "notify"
        ]
    );
    let build = complete.step("build").expect("build step");
    assert_eq!(build.depends_on, ["test", "integration_tests", "security_scan"]);
    assert_eq!(complete.step("notify").expect("notify").depends_on, ["verify"]);
}

#[test]
fn test_planning_depth_shapes_documentation_plans() {
    let params = json!({ "sourcePath": "src", "title": "API Guide" });

    let shallow = fallback_engine(PlanningDepth::Shallow)
        .create_plan("documentation", &params)
        .expect("shallow plan");
    assert_eq!(shallow.name, "API Guide");
    assert_eq!(
        step_ids(&shallow),
        ["analyze_structure", "extract_api", "generate_docs", "review"]
    );

    let deep = fallback_engine(PlanningDepth::Deep)
        .create_plan("documentation", &params)
        .expect("deep plan");
    assert_eq!(
        step_ids(&deep),
        [
            "analyze_structure",
            "extract_api",
            "generate_docs",
            "generate_examples",
            "cross_reference",
            "review"
        ]
    );
}

#[test]
fn test_max_steps_limits_plans() {
    let mut engine = Engine::builder()
        .with_max_steps(3)
        .build()
        .expect("Failed to create engine");

    let err = engine
        .create_plan("cicd", &json!({ "pipelineType": "deployment" }))
        .expect_err("deployment pipeline exceeds the limit");
    match err {
        EngineError::PlanCreation { domain, message } => {
            assert_eq!(domain, "cicd");
            assert!(message.contains("limit is 3"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.plan().is_none());
    assert!(engine.state().error.is_some());
}

#[test]
fn test_invalid_params_are_plan_creation_errors() {
    let mut engine = fallback_engine(PlanningDepth::Medium);

    let err = engine
        .create_plan("data", &json!({ "destination": "lake" }))
        .expect_err("source is required");
    assert!(matches!(err, EngineError::PlanCreation { .. }));

    let err = engine
        .create_plan("cicd", &json!({ "pipelineType": "nightly" }))
        .expect_err("unknown pipeline type");
    assert!(matches!(err, EngineError::PlanCreation { .. }));

    let err = engine
        .create_plan("astrology", &Value::Null)
        .expect_err("unknown domain");
    assert_eq!(err.to_string(), "Unknown domain 'astrology'");
}

struct ReleaseNotesPlanner;

impl DomainPlanner for ReleaseNotesPlanner {
    fn domain(&self) -> &str {
        "release_notes"
    }

    fn create_plan(&self, params: &Value, config: &EngineConfig) -> Result<Plan> {
        let version = params["version"].as_str().unwrap_or("unreleased");
        let mut plan = PlanBuilder::new(self.domain(), format!("Release notes {version}"), config);
        plan.step(Step::new("collect", "Collect changes", "collect"))
            .step(Step::new("write", "Write notes", "write").depends_on(["collect"]));
        plan.build()
    }
}

#[tokio::test]
async fn test_custom_domain_joins_registry() {
    common::init_logging();
    let mut engine = Engine::builder()
        .with_fallback_mode(true)
        .with_domain(Domain::new(
            Arc::new(ReleaseNotesPlanner),
            HandlerRegistry::new(),
        ))
        .build()
        .expect("Failed to create engine");

    let plan = engine
        .create_plan("release_notes", &json!({ "version": "1.2.0" }))
        .expect("Failed to create plan");
    assert_eq!(plan.name, "Release notes 1.2.0");

    let outcome = engine
        .execute_current_plan(&ExecuteOptions::default())
        .await
        .expect("Failed to execute plan");
    assert!(outcome.success);
    assert_eq!(
        outcome.results["write"].summary,
        "Simulated write for 'Write notes'"
    );
}

struct DuplicateIdPlanner;

impl DomainPlanner for DuplicateIdPlanner {
    fn domain(&self) -> &str {
        "duplicates"
    }

    fn create_plan(&self, _params: &Value, _config: &EngineConfig) -> Result<Plan> {
        let mut plan = Plan::new("Duplicated", self.domain());
        plan.steps = vec![
            Step::new("a", "First", "manual"),
            Step::new("a", "Second", "manual"),
        ];
        Ok(plan)
    }
}

#[test]
fn test_invalid_custom_plan_is_plan_creation_error() {
    common::init_logging();
    let mut engine = Engine::builder()
        .with_domain(Domain::new(
            Arc::new(DuplicateIdPlanner),
            HandlerRegistry::new(),
        ))
        .build()
        .expect("Failed to create engine");
    let events = common::record_events(&mut engine);

    let err = engine
        .create_plan("duplicates", &Value::Null)
        .expect_err("duplicate step ids must be rejected");
    match &err {
        EngineError::PlanCreation { domain, message } => {
            assert_eq!(domain, "duplicates");
            assert!(message.contains("duplicate step id 'a'"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        *events.lock().expect("event log poisoned"),
        vec!["planStart", "planExecuteError"]
    );
    assert_eq!(engine.state().error, Some(err.to_string()));
    assert!(engine.plan().is_none());
}
