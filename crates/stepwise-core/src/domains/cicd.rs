//! CI/CD pipeline domain.
//!
//! Every pipeline lints, tests and builds. The `deployment` and `complete`
//! variants add `deploy` and `verify`; `testing` and `complete` add
//! integration tests; `complete` (or a deep planning depth) adds a security
//! scan. A `notify` step is appended only when notifications are configured
//! and waits on the last stage that exists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_params, Domain, DomainPlanner, PlanBuilder};
use crate::{
    config::{EngineConfig, PlanningDepth},
    error::{EngineError, PlanCreationExt, Result},
    handlers::{CannedHandler, HandlerRegistry},
    models::{Plan, Step},
};

/// Tag of the CI/CD domain.
pub const DOMAIN: &str = "cicd";

/// Pipeline variant requested by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    #[default]
    Basic,
    Testing,
    Deployment,
    Complete,
}

impl PipelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineType::Basic => "basic",
            PipelineType::Testing => "testing",
            PipelineType::Deployment => "deployment",
            PipelineType::Complete => "complete",
        }
    }

    fn deploys(&self) -> bool {
        matches!(self, PipelineType::Deployment | PipelineType::Complete)
    }

    fn runs_integration_tests(&self) -> bool {
        matches!(self, PipelineType::Testing | PipelineType::Complete)
    }
}

/// Where pipeline notifications go.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    pub channel: String,
    #[serde(default)]
    pub on_failure_only: bool,
}

/// Parameters accepted by [`CicdPlanner`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineParams {
    pub project: String,
    pub pipeline_type: PipelineType,
    pub environment: String,
    pub notifications: Option<NotificationConfig>,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            project: "project".to_string(),
            pipeline_type: PipelineType::Basic,
            environment: "staging".to_string(),
            notifications: None,
        }
    }
}

/// Planner for build, test and deployment pipelines.
pub struct CicdPlanner;

impl CicdPlanner {
    fn build_plan(&self, params: &PipelineParams, config: &EngineConfig) -> Result<Plan> {
        if params.project.trim().is_empty() {
            return Err(EngineError::invalid_input("project").with_reason("must not be empty"));
        }
        let pipeline = params.pipeline_type;
        let scan = pipeline == PipelineType::Complete
            || config.planning_depth == PlanningDepth::Deep;
        let target = json!({ "project": params.project });

        let mut plan = PlanBuilder::new(
            DOMAIN,
            format!("{} {} pipeline", params.project, pipeline.as_str()),
            config,
        );
        plan.description(format!(
            "{} pipeline for {} targeting {}",
            pipeline.as_str(),
            params.project,
            params.environment
        ));

        plan.step(
            Step::new("lint", "Lint", "lint")
                .with_description("Check formatting and static analysis")
                .with_data(target.clone()),
        )
        .step(
            Step::new("test", "Unit tests", "test")
                .with_description("Run the unit test suite")
                .depends_on(["lint"])
                .with_data(target.clone()),
        )
        .step_if(pipeline.runs_integration_tests(), || {
            Step::new("integration_tests", "Integration tests", "integration_test")
                .with_description("Run the integration test suite")
                .depends_on(["test"])
                .with_data(target.clone())
        })
        .step_if(scan, || {
            Step::new("security_scan", "Security scan", "security_scan")
                .with_description("Audit dependencies for known vulnerabilities")
                .depends_on(["lint"])
                .with_data(target.clone())
        });

        let build_deps = plan.existing(&["test", "integration_tests", "security_scan"]);
        plan.step(
            Step::new("build", "Build", "build")
                .with_description("Produce release artifacts")
                .depends_on(build_deps)
                .with_data(target.clone()),
        );

        if pipeline.deploys() {
            let environment = json!({ "project": params.project, "environment": params.environment });
            plan.step(
                Step::new("deploy", "Deploy", "deploy")
                    .with_description(format!("Deploy artifacts to {}", params.environment))
                    .depends_on(["build"])
                    .with_data(environment.clone()),
            )
            .step(
                Step::new("verify", "Verify deployment", "verify")
                    .with_description("Run smoke checks against the deployment")
                    .depends_on(["deploy"])
                    .with_data(environment),
            );
        }

        if let Some(notifications) = &params.notifications {
            let after = if plan.contains("verify") { "verify" } else { "build" };
            plan.step(
                Step::new("notify", "Notify", "notify")
                    .with_description(format!("Report pipeline status to {}", notifications.channel))
                    .depends_on([after])
                    .with_data(json!({
                        "channel": notifications.channel,
                        "onFailureOnly": notifications.on_failure_only,
                    })),
            );
        }

        plan.build()
    }
}

impl DomainPlanner for CicdPlanner {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn create_plan(&self, params: &Value, config: &EngineConfig) -> Result<Plan> {
        let params: PipelineParams = parse_params(params).for_domain(DOMAIN)?;
        self.build_plan(&params, config).for_domain(DOMAIN)
    }
}

/// Canned handlers for fallback mode.
pub fn simulated_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    let canned = [
        ("lint", "{name}: no issues found", json!({ "warnings": 0, "errors": 0 })),
        ("test", "{name}: all tests passed", json!({ "passed": 42, "failed": 0 })),
        (
            "integration_test",
            "{name}: all scenarios passed",
            json!({ "passed": 12, "failed": 0 }),
        ),
        (
            "security_scan",
            "{name}: no known vulnerabilities",
            json!({ "vulnerabilities": 0 }),
        ),
        ("build", "{name}: artifacts produced", json!({ "artifacts": ["dist/app"] })),
        ("deploy", "{name}: rollout finished", json!({ "deployed": true })),
        ("verify", "{name}: deployment healthy", json!({ "healthy": true })),
        ("notify", "{name}: notification sent", json!({ "sent": true })),
    ];
    for (action, summary, data) in canned {
        registry.register(action, Arc::new(CannedHandler::new(summary, data)));
    }
    registry
}

/// The CI/CD domain strategy.
pub fn domain() -> Domain {
    Domain::new(Arc::new(CicdPlanner), simulated_handlers())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(plan: &Plan) -> Vec<&str> {
        plan.steps.iter().map(|step| step.id.as_str()).collect()
    }

    fn plan_for(params: Value) -> Plan {
        CicdPlanner
            .create_plan(&params, &EngineConfig::default())
            .expect("plan")
    }

    #[test]
    fn test_basic_pipeline() {
        let plan = plan_for(json!({ "project": "api" }));
        assert_eq!(ids(&plan), vec!["lint", "test", "build"]);
        assert_eq!(plan.domain, DOMAIN);
        assert_eq!(plan.step("build").unwrap().depends_on, vec!["test"]);
        assert_eq!(plan.name, "api basic pipeline");
    }

    #[test]
    fn test_complete_pipeline() {
        let plan = plan_for(json!({ "project": "api", "pipelineType": "complete" }));
        assert_eq!(
            ids(&plan),
            vec![
                "lint",
                "test",
                "integration_tests",
                "security_scan",
                "build",
                "deploy",
                "verify"
            ]
        );
        assert_eq!(
            plan.step("build").unwrap().depends_on,
            vec!["test", "integration_tests", "security_scan"]
        );
    }

    #[test]
    fn test_notify_depends_on_last_stage() {
        let plan = plan_for(json!({
            "project": "api",
            "notifications": { "channel": "#builds" }
        }));
        assert_eq!(plan.step("notify").unwrap().depends_on, vec!["build"]);

        let plan = plan_for(json!({
            "project": "api",
            "pipelineType": "deployment",
            "notifications": { "channel": "#builds", "onFailureOnly": true }
        }));
        let notify = plan.step("notify").unwrap();
        assert_eq!(notify.depends_on, vec!["verify"]);
        assert_eq!(notify.data["onFailureOnly"], true);
    }

    #[test]
    fn test_no_notify_without_configuration() {
        let plan = plan_for(json!({ "project": "api", "pipelineType": "deployment" }));
        assert!(plan.step("notify").is_none());
    }

    #[test]
    fn test_deep_depth_adds_security_scan() {
        let config = EngineConfig {
            planning_depth: PlanningDepth::Deep,
            ..Default::default()
        };
        let plan = CicdPlanner
            .create_plan(&json!({ "project": "api" }), &config)
            .unwrap();
        assert!(plan.step("security_scan").is_some());
    }

    #[test]
    fn test_invalid_params() {
        let err = CicdPlanner
            .create_plan(&json!({ "pipelineType": "nightly" }), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::PlanCreation { .. }));

        let err = CicdPlanner
            .create_plan(&json!({ "project": "  " }), &EngineConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("project"));
    }

    #[test]
    fn test_planner_is_deterministic() {
        let params = json!({ "project": "api", "pipelineType": "testing" });
        let first = plan_for(params.clone());
        let second = plan_for(params);
        assert_ne!(first.id, second.id);
        assert_eq!(first.steps, second.steps);
    }
}
