//! Builder for creating and configuring Engine instances.

use std::sync::Arc;
use std::time::Duration;

use super::Engine;
use crate::{
    config::{EngineConfig, PlanningDepth},
    domains::{Domain, DomainRegistry},
    error::Result,
    handlers::{HandlerRegistry, StepHandler, MANUAL_ACTION},
    observer::{Observer, ObserverBus},
};

/// Builder for creating and configuring Engine instances.
pub struct EngineBuilder {
    config: EngineConfig,
    handlers: HandlerRegistry,
    domains: DomainRegistry,
    observers: ObserverBus,
}

impl EngineBuilder {
    /// Creates a builder with default configuration, the built-in domains
    /// and the manual fallback handler.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            handlers: HandlerRegistry::with_manual_fallback(),
            domains: DomainRegistry::with_builtin(),
            observers: ObserverBus::new(),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves every step to a simulated handler.
    pub fn with_fallback_mode(mut self, enabled: bool) -> Self {
        self.config.fallback_mode = enabled;
        self
    }

    /// Sets the default per-step timeout.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.config.step_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the upper bound on generated plan length.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    pub fn with_planning_depth(mut self, depth: PlanningDepth) -> Self {
        self.config.planning_depth = depth;
        self
    }

    /// Adds or replaces a domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domains.register(domain);
        self
    }

    /// Registers a handler for an action type.
    pub fn with_handler(mut self, action_type: impl Into<String>, handler: Arc<dyn StepHandler>) -> Self {
        self.handlers.register(action_type, handler);
        self
    }

    /// Removes the manual fallback so unknown action types fail.
    pub fn without_manual_fallback(mut self) -> Self {
        self.handlers.unregister(MANUAL_ACTION);
        self
    }

    /// Subscribes an observer before the engine exists, so it sees every
    /// event.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer + 'static,
    {
        self.observers.subscribe(Arc::new(observer));
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the configuration is invalid
    pub fn build(self) -> Result<Engine> {
        self.config.validate()?;
        Ok(Engine::new(
            self.config,
            self.handlers,
            self.domains,
            self.observers,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
