//! Mapping from action types to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::{builtin::MANUAL_ACTION, StepHandler};

/// Maps a step's `action_type` to the handler that executes it.
///
/// Resolution falls back to the handler registered under
/// [`MANUAL_ACTION`] when the action type itself has none.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn StepHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose unknown action types resolve to
    /// [`super::ManualHandler`].
    pub fn with_manual_fallback() -> Self {
        let mut registry = Self::new();
        registry.register(MANUAL_ACTION, Arc::new(super::ManualHandler));
        registry
    }

    /// Registers `handler` for `action_type`, returning the handler it
    /// replaced.
    pub fn register(
        &mut self,
        action_type: impl Into<String>,
        handler: Arc<dyn StepHandler>,
    ) -> Option<Arc<dyn StepHandler>> {
        let action_type = action_type.into();
        debug!("Registering handler for action type '{action_type}'");
        self.handlers.insert(action_type, handler)
    }

    /// Removes the handler for `action_type`.
    pub fn unregister(&mut self, action_type: &str) -> Option<Arc<dyn StepHandler>> {
        self.handlers.remove(action_type)
    }

    /// Handler for `action_type`, else the manual fallback, else `None`.
    pub fn resolve(&self, action_type: &str) -> Option<Arc<dyn StepHandler>> {
        self.handlers
            .get(action_type)
            .or_else(|| self.handlers.get(MANUAL_ACTION))
            .cloned()
    }

    /// Whether a handler is registered for exactly `action_type`.
    pub fn contains(&self, action_type: &str) -> bool {
        self.handlers.contains_key(action_type)
    }

    /// Registered action types, sorted.
    pub fn action_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{ExecutionContext, SimulatedHandler};
    use crate::models::Step;

    #[tokio::test]
    async fn test_resolve_falls_back_to_manual() {
        let mut registry = HandlerRegistry::with_manual_fallback();
        registry.register("lint", Arc::new(SimulatedHandler));

        let step = Step::new("review", "Review output", "review");
        let handler = registry.resolve("review").expect("manual fallback");
        let output = handler
            .handle(&step, &ExecutionContext::default())
            .await
            .unwrap();
        assert!(output.summary.contains("manual"));
        assert!(registry.contains("lint"));
        assert!(!registry.contains("review"));
    }

    #[test]
    fn test_resolve_without_fallback() {
        let mut registry = HandlerRegistry::with_manual_fallback();
        assert!(registry.unregister(MANUAL_ACTION).is_some());
        assert!(registry.resolve("deploy").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register("build", Arc::new(SimulatedHandler)).is_none());
        assert!(registry.register("build", Arc::new(SimulatedHandler)).is_some());
        registry.register("audit", Arc::new(SimulatedHandler));
        assert_eq!(registry.action_types(), vec!["audit", "build"]);
        assert_eq!(registry.len(), 2);
    }
}
