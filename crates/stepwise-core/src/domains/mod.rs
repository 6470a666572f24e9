//! Domain strategies: planners paired with their simulated handler sets.
//!
//! Each domain owns a [`DomainPlanner`] that turns loosely typed parameters
//! into a concrete [`Plan`], and a [`HandlerRegistry`] of canned handlers used
//! when the engine runs in fallback mode. Domains are looked up by tag in a
//! [`DomainRegistry`], which new domains join without touching the engine.
//!
//! ```rust
//! use serde_json::json;
//! use stepwise_core::{domains::create_planner, EngineConfig};
//!
//! let planner = create_planner("cicd").unwrap();
//! let plan = planner
//!     .create_plan(&json!({ "project": "api", "pipelineType": "deployment" }), &EngineConfig::default())
//!     .unwrap();
//! let ids: Vec<_> = plan.steps.iter().map(|step| step.id.as_str()).collect();
//! assert_eq!(ids, ["lint", "test", "build", "deploy", "verify"]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    handlers::HandlerRegistry,
    models::Plan,
};

pub mod builder;
pub mod cicd;
pub mod data;
pub mod documentation;

pub use builder::PlanBuilder;

/// Produces plans for one domain.
///
/// Planners hold no state beyond their tag and are deterministic for equal
/// parameters, apart from plan ids and timestamps.
pub trait DomainPlanner: Send + Sync {
    /// Tag stamped on every plan this planner creates.
    fn domain(&self) -> &str;

    /// Builds a plan from domain parameters, honouring `config.max_steps`
    /// and `config.planning_depth`.
    fn create_plan(&self, params: &Value, config: &EngineConfig) -> Result<Plan>;
}

/// A planner together with the canned handlers used in fallback mode.
#[derive(Clone)]
pub struct Domain {
    planner: Arc<dyn DomainPlanner>,
    simulated: HandlerRegistry,
}

impl Domain {
    pub fn new(planner: Arc<dyn DomainPlanner>, simulated: HandlerRegistry) -> Self {
        Self { planner, simulated }
    }

    pub fn tag(&self) -> &str {
        self.planner.domain()
    }

    pub fn planner(&self) -> Arc<dyn DomainPlanner> {
        Arc::clone(&self.planner)
    }

    pub fn simulated_handlers(&self) -> &HandlerRegistry {
        &self.simulated
    }
}

/// Domains keyed by tag.
#[derive(Clone, Default)]
pub struct DomainRegistry {
    domains: HashMap<String, Domain>,
}

impl DomainRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the documentation, CI/CD and data domains.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(documentation::domain());
        registry.register(cicd::domain());
        registry.register(data::domain());
        registry
    }

    /// Adds a domain, replacing any domain with the same tag.
    pub fn register(&mut self, domain: Domain) -> Option<Domain> {
        self.domains.insert(domain.tag().to_string(), domain)
    }

    pub fn get(&self, tag: &str) -> Option<&Domain> {
        self.domains.get(tag)
    }

    /// Planner for `tag`.
    pub fn planner(&self, tag: &str) -> Result<Arc<dyn DomainPlanner>> {
        self.get(tag)
            .map(Domain::planner)
            .ok_or_else(|| EngineError::UnknownDomain {
                domain: tag.to_string(),
            })
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

/// Creates the planner for one of the built-in domains.
pub fn create_planner(domain: &str) -> Result<Arc<dyn DomainPlanner>> {
    DomainRegistry::with_builtin().planner(domain)
}

/// Deserialises planner parameters, treating `null` as all defaults.
pub(crate) fn parse_params<T>(params: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(params.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags() {
        let registry = DomainRegistry::with_builtin();
        assert_eq!(registry.tags(), vec!["cicd", "data", "documentation"]);
        assert!(registry.get("cicd").unwrap().simulated_handlers().contains("lint"));
    }

    #[test]
    fn test_unknown_domain() {
        let err = create_planner("astrology").err().unwrap();
        assert!(matches!(err, EngineError::UnknownDomain { ref domain } if domain == "astrology"));
    }

    #[test]
    fn test_parse_params_null_is_default() {
        let params: cicd::PipelineParams = parse_params(&Value::Null).unwrap();
        assert_eq!(params.pipeline_type, cicd::PipelineType::Basic);
    }
}
