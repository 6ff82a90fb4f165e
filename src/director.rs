//! Per-frame driver tying the catalog, the resolver and the engine together

use crate::catalog::EventCatalog;
use crate::config::EngineConfig;
use crate::error::StartError;
use crate::runtime::engine::{ExecutionEngine, FinishedEvent};
use crate::runtime::hooks::Presentation;
use crate::runtime::instance::EndReason;
use crate::trigger::{TriggerRequest, TriggerResolver};
use crate::types::context::TriggerContext;
use crate::types::state::GameState;

/// What happened during one [`EventDirector::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub started: Vec<TriggerRequest>,
    pub rejected: Vec<(TriggerRequest, StartError)>,
    pub finished: Vec<FinishedEvent>,
}

impl FrameReport {
    pub fn is_quiet(&self) -> bool {
        self.started.is_empty() && self.rejected.is_empty() && self.finished.is_empty()
    }
}

/// Owns one map's catalog and everything running on it
#[derive(Debug, Clone)]
pub struct EventDirector {
    catalog: EventCatalog,
    resolver: TriggerResolver,
    engine: ExecutionEngine,
    config: EngineConfig,
    needs_refresh: bool,
}

impl EventDirector {
    pub fn new(catalog: EventCatalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            resolver: TriggerResolver::new(config.default_proximity_radius),
            engine: ExecutionEngine::new(config.rng_seed),
            config,
            needs_refresh: true,
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &TriggerResolver {
        &self.resolver
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one frame: refresh handlers, resolve triggers, start the
    /// requested instances, then advance every instance once.
    pub fn update(
        &mut self,
        ctx: &TriggerContext,
        state: &mut dyn GameState,
        hooks: &mut dyn Presentation,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        if self.config.refresh_handlers_each_frame || self.needs_refresh {
            self.resolver.update_event_handlers(&self.catalog, &*state);
            self.needs_refresh = false;
        }

        let requests = self
            .resolver
            .resolve(ctx, &*state, self.engine.has_blocking_event());
        for request in requests {
            match self.start(request) {
                Ok(()) => report.started.push(request),
                Err(err) => {
                    log::warn!(target: "mapevent::trigger", "[Trigger] start rejected: {err}");
                    self.resolver.reject(request.event_id);
                    report.rejected.push((request, err));
                }
            }
        }

        report.finished = self.engine.update(ctx.delta, state, hooks);
        for finished in &report.finished {
            if finished.reason == EndReason::Erased {
                self.resolver.erase(finished.event_id);
            } else {
                self.resolver.on_event_finished(finished.event_id);
            }
        }
        if !report.finished.is_empty() {
            // finished scripts usually changed the state pages depend on
            self.needs_refresh = true;
        }

        report
    }

    fn start(&mut self, request: TriggerRequest) -> Result<(), StartError> {
        let TriggerRequest {
            event_id,
            page_index,
            trigger,
        } = request;
        if self.catalog.get(event_id).is_none() {
            return Err(StartError::UnknownEvent { event_id });
        }
        let program = self
            .catalog
            .program(event_id, page_index)
            .ok_or(StartError::UnknownPage {
                event_id,
                page_index,
            })?;
        self.engine
            .start(self.catalog.map_id(), event_id, page_index, trigger, program)
    }

    pub fn resume_message(&mut self, event_id: u32) -> bool {
        self.engine.resume_message(event_id)
    }

    pub fn resume_choice(&mut self, event_id: u32, index: usize, state: &mut dyn GameState) -> bool {
        self.engine.resume_choice(event_id, index, state)
    }

    pub fn resume_number(&mut self, event_id: u32, value: i64, state: &mut dyn GameState) -> bool {
        self.engine.resume_number(event_id, value, state)
    }

    /// Cancel the event's instance and retire it until the next map load
    pub fn erase_event(&mut self, event_id: u32) {
        self.engine.cancel(event_id);
        self.resolver.erase(event_id);
    }

    /// Replace the catalog, cancelling every instance and resetting handlers
    pub fn load_map(&mut self, catalog: EventCatalog) {
        let cancelled = self.engine.cancel_all();
        log::info!(
            target: "mapevent::engine",
            "[Engine] loading map {} ({} events, {} instances cancelled)",
            catalog.map_id(),
            catalog.len(),
            cancelled
        );
        self.resolver.reset();
        self.catalog = catalog;
        self.needs_refresh = true;
    }

    /// Re-read active pages at the start of the next frame
    pub fn refresh(&mut self) {
        self.needs_refresh = true;
    }
}
