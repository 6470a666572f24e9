//! Data ETL domain.

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

/// Tag of the data domain.
pub const DOMAIN: &str = "data";

/// Parameters accepted by [`DataPlanner`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EtlParams {
    pub source: String,
    pub destination: String,
    pub transformations: Vec<String>,
}

/// Planner for extract, validate, transform and load runs.
pub struct DataPlanner;

impl DataPlanner {
    fn build_plan(&self, params: &EtlParams, config: &EngineConfig) -> Result<Plan> {
        if params.source.trim().is_empty() {
            return Err(EngineError::invalid_input("source").with_reason("must not be empty"));
        }
        let destination = if params.destination.trim().is_empty() {
            "warehouse"
        } else {
            params.destination.as_str()
        };

        let mut plan = PlanBuilder::new(
            DOMAIN,
            format!("ETL {} to {}", params.source, destination),
            config,
        );
        plan.description(format!(
            "Move data from {} to {} with {} transformation(s)",
            params.source,
            destination,
            params.transformations.len()
        ));

        plan.step(
            Step::new("extract", "Extract", "extract")
                .with_description(format!("Read records from {}", params.source))
                .with_data(json!({ "source": params.source })),
        )
        .step(
            Step::new("validate", "Validate", "validate")
                .with_description("Check schema and reject malformed records")
                .depends_on(["extract"]),
        )
        .step_if(!params.transformations.is_empty(), || {
            Step::new("transform", "Transform", "transform")
                .with_description(params.transformations.join(", "))
                .depends_on(["validate"])
                .with_data(json!({ "operations": params.transformations }))
        });

        let load_after = if plan.contains("transform") {
            "transform"
        } else {
            "validate"
        };
        plan.step(
            Step::new("load", "Load", "load")
                .with_description(format!("Write records to {destination}"))
                .depends_on([load_after])
                .with_data(json!({ "destination": destination })),
        )
        .step_if(config.planning_depth == PlanningDepth::Deep, || {
            Step::new("profile", "Profile", "profile")
                .with_description("Compute column statistics of the extracted data")
                .depends_on(["extract"])
        });

        let report_deps = plan.existing(&["load", "profile"]);
        plan.step(
            Step::new("report", "Report", "report")
                .with_description("Summarise row counts and rejects")
                .depends_on(report_deps),
        );

        plan.build()
    }
}

impl DomainPlanner for DataPlanner {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn create_plan(&self, params: &Value, config: &EngineConfig) -> Result<Plan> {
        let params: EtlParams = parse_params(params).for_domain(DOMAIN)?;
        self.build_plan(&params, config).for_domain(DOMAIN)
    }
}

/// Canned handlers for fallback mode.
pub fn simulated_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    let canned = [
        ("extract", "{name}: 1000 records read", json!({ "records": 1000 })),
        ("validate", "{name}: 0 records rejected", json!({ "rejected": 0 })),
        ("transform", "{name}: records transformed", json!({ "records": 1000 })),
        ("load", "{name}: 1000 records written", json!({ "written": 1000 })),
        ("profile", "{name}: statistics computed", json!({ "columns": 12 })),
        ("report", "{name}: report ready", json!({ "reported": true })),
    ];
    for (action, summary, data) in canned {
        registry.register(action, Arc::new(CannedHandler::new(summary, data)));
    }
    registry
}

/// The data domain strategy.
pub fn domain() -> Domain {
    Domain::new(Arc::new(DataPlanner), simulated_handlers())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(plan: &Plan) -> Vec<&str> {
        plan.steps.iter().map(|step| step.id.as_str()).collect()
    }

    #[test]
    fn test_without_transformations() {
        let plan = DataPlanner
            .create_plan(&json!({ "source": "orders.csv" }), &EngineConfig::default())
            .unwrap();
        assert_eq!(ids(&plan), vec!["extract", "validate", "load", "report"]);
        assert_eq!(plan.step("load").unwrap().depends_on, vec!["validate"]);
        assert_eq!(plan.name, "ETL orders.csv to warehouse");
    }

    #[test]
    fn test_with_transformations_and_profile() {
        let config = EngineConfig {
            planning_depth: PlanningDepth::Deep,
            ..Default::default()
        };
        let plan = DataPlanner
            .create_plan(
                &json!({
                    "source": "orders.csv",
                    "destination": "postgres",
                    "transformations": ["dedupe", "normalize_currency"]
                }),
                &config,
            )
            .unwrap();
        assert_eq!(
            ids(&plan),
            vec!["extract", "validate", "transform", "load", "profile", "report"]
        );
        assert_eq!(plan.step("load").unwrap().depends_on, vec!["transform"]);
        assert_eq!(plan.step("report").unwrap().depends_on, vec!["load", "profile"]);
        assert_eq!(
            plan.step("transform").unwrap().data["operations"][1],
            "normalize_currency"
        );
    }

    #[test]
    fn test_source_is_required() {
        let err = DataPlanner
            .create_plan(&Value::Null, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::PlanCreation { ref domain, .. } if domain == "data"));
    }
}
