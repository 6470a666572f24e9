#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stepwise_core::{
    handler_fn, Engine, EngineEvent, HandlerOutput, Plan, Step, StepHandler,
};

/// Routes engine logs through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Helper function to create a lint, test, build pipeline
pub fn pipeline_plan() -> Plan {
    let mut plan = Plan::new("Pipeline", "cicd");
    plan.steps = vec![
        Step::new("lint", "Lint", "lint"),
        Step::new("test", "Test", "test").depends_on(["lint"]),
        Step::new("build", "Build", "build").depends_on(["test"]),
    ];
    plan
}

/// Counts invocations per handler.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Handler that always succeeds.
    pub fn succeeding(&self) -> Arc<dyn StepHandler> {
        let calls = Arc::clone(&self.0);
        handler_fn(move |step, _context| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(HandlerOutput::success(format!("{} done", step.name))) }
        })
    }

    /// Handler that always returns an error.
    pub fn failing(&self, message: &'static str) -> Arc<dyn StepHandler> {
        let calls = Arc::clone(&self.0);
        handler_fn(move |_step, _context| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(anyhow::anyhow!(message)) }
        })
    }
}

/// Helper function to create an engine with the pipeline handlers
pub fn pipeline_engine(lint: Arc<dyn StepHandler>, rest: &CallCounter) -> Engine {
    init_logging();
    Engine::builder()
        .with_handler("lint", lint)
        .with_handler("test", rest.succeeding())
        .with_handler("build", rest.succeeding())
        .build()
        .expect("Failed to create engine")
}

/// Records the names of every event the engine publishes.
pub fn record_events(engine: &mut Engine) -> Arc<Mutex<Vec<&'static str>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    engine.add_observer(move |event: &EngineEvent| -> anyhow::Result<()> {
        sink.lock().expect("event log poisoned").push(event.name());
        Ok(())
    });
    events
}
