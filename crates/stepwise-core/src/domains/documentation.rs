//! Documentation generation domain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_params, Domain, DomainPlanner, PlanBuilder};
use crate::{
    config::{EngineConfig, PlanningDepth},
    error::{PlanCreationExt, Result},
    handlers::{CannedHandler, HandlerRegistry},
    models::{Plan, Step},
};

/// Tag of the documentation domain.
pub const DOMAIN: &str = "documentation";

/// Parameters accepted by [`DocumentationPlanner`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentationParams {
    pub source_path: String,
    pub output_format: String,
    pub include_examples: bool,
    pub title: Option<String>,
}

impl Default for DocumentationParams {
    fn default() -> Self {
        Self {
            source_path: ".".to_string(),
            output_format: "markdown".to_string(),
            include_examples: true,
            title: None,
        }
    }
}

/// Planner producing analyse → extract → generate → review graphs.
pub struct DocumentationPlanner;

impl DocumentationPlanner {
    fn build_plan(&self, params: &DocumentationParams, config: &EngineConfig) -> Result<Plan> {
        let depth = config.planning_depth;
        let source = json!({ "sourcePath": params.source_path });
        let title = params
            .title
            .clone()
            .unwrap_or_else(|| format!("Documentation for {}", params.source_path));

        let mut plan = PlanBuilder::new(DOMAIN, title, config);
        plan.description(format!(
            "Generate {} documentation from {}",
            params.output_format, params.source_path
        ));

        plan.step(
            Step::new("analyze_structure", "Analyze structure", "analyze")
                .with_description("Map modules, public items and existing docs")
                .with_data(source.clone()),
        )
        .step(
            Step::new("extract_api", "Extract API", "extract_api")
                .with_description("Collect signatures and doc comments")
                .depends_on(["analyze_structure"])
                .with_data(source),
        )
        .step(
            Step::new("generate_docs", "Generate documentation", "generate")
                .with_description(format!("Render {} pages", params.output_format))
                .depends_on(["extract_api"])
                .with_data(json!({ "format": params.output_format })),
        )
        .step_if(
            params.include_examples && depth != PlanningDepth::Shallow,
            || {
                Step::new("generate_examples", "Generate examples", "generate_examples")
                    .with_description("Write usage examples for public items")
                    .depends_on(["generate_docs"])
            },
        )
        .step_if(depth == PlanningDepth::Deep, || {
            Step::new("cross_reference", "Cross-reference", "cross_reference")
                .with_description("Link related items across pages")
                .depends_on(["generate_docs"])
        });

        let review_deps = plan.existing(&["generate_docs", "generate_examples", "cross_reference"]);
        plan.step(
            Step::new("review", "Review", "review")
                .with_description("Check generated pages for gaps")
                .depends_on(review_deps),
        );
        plan.build()
    }
}

impl DomainPlanner for DocumentationPlanner {
    fn domain(&self) -> &str {
        DOMAIN
    }

    fn create_plan(&self, params: &Value, config: &EngineConfig) -> Result<Plan> {
        let params: DocumentationParams = parse_params(params).for_domain(DOMAIN)?;
        self.build_plan(&params, config)
    }
}

/// Canned handlers for fallback mode.
pub fn simulated_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    let canned = [
        ("analyze", "{name}: 14 modules mapped", json!({ "modules": 14 })),
        ("extract_api", "{name}: 87 public items found", json!({ "items": 87 })),
        ("generate", "{name}: pages rendered", json!({ "pages": 14 })),
        ("generate_examples", "{name}: examples written", json!({ "examples": 9 })),
        ("cross_reference", "{name}: links resolved", json!({ "links": 120 })),
        ("review", "{name}: no gaps found", json!({ "gaps": 0 })),
    ];
    for (action, summary, data) in canned {
        registry.register(action, Arc::new(CannedHandler::new(summary, data)));
    }
    registry
}

/// The documentation domain strategy.
pub fn domain() -> Domain {
    Domain::new(Arc::new(DocumentationPlanner), simulated_handlers())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(plan: &Plan) -> Vec<&str> {
        plan.steps.iter().map(|step| step.id.as_str()).collect()
    }

    fn config(depth: PlanningDepth) -> EngineConfig {
        EngineConfig {
            planning_depth: depth,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_graph() {
        let plan = DocumentationPlanner
            .create_plan(&json!({ "sourcePath": "src" }), &EngineConfig::default())
            .unwrap();
        assert_eq!(
            ids(&plan),
            vec![
                "analyze_structure",
                "extract_api",
                "generate_docs",
                "generate_examples",
                "review"
            ]
        );
        assert_eq!(plan.name, "Documentation for src");
        assert_eq!(
            plan.step("review").unwrap().depends_on,
            vec!["generate_docs", "generate_examples"]
        );
    }

    #[test]
    fn test_depth_changes_graph() {
        let shallow = DocumentationPlanner
            .create_plan(&Value::Null, &config(PlanningDepth::Shallow))
            .unwrap();
        assert!(shallow.step("generate_examples").is_none());
        assert!(shallow.step("cross_reference").is_none());

        let deep = DocumentationPlanner
            .create_plan(&Value::Null, &config(PlanningDepth::Deep))
            .unwrap();
        assert!(deep.step("cross_reference").is_some());
        assert_eq!(deep.steps.last().unwrap().id, "review");
    }

    #[test]
    fn test_examples_can_be_disabled() {
        let plan = DocumentationPlanner
            .create_plan(
                &json!({ "includeExamples": false, "title": "API reference" }),
                &EngineConfig::default(),
            )
            .unwrap();
        assert!(plan.step("generate_examples").is_none());
        assert_eq!(plan.name, "API reference");
    }
}
