//! Trigger resolution.
//!
//! The resolver keeps one [`EventHandler`] per event with an active page
//! and decides, every frame, which of them should start running.
//!
//! ## Per-frame order
//!
//! 1. [`TriggerResolver::update_event_handlers`] re-reads active pages.
//!    It is never automatic; callers invoke it whenever game state may
//!    have changed (the director does so each frame by default).
//! 2. [`TriggerResolver::resolve`] checks every handler in ascending
//!    event id order and returns the ones that fired.
//! 3. The caller starts an instance per request, and reports each
//!    finished instance back through [`TriggerResolver::on_event_finished`].
//!
//! A blocking trigger that fires makes every later blocking trigger in
//! the same frame report [`TriggerResult::Blocked`].

mod condition;
mod handler;

#[cfg(test)]
mod tests;

pub use condition::ConditionContext;
pub use handler::{EventHandler, TriggerResult};

use crate::catalog::EventCatalog;
use crate::types::context::TriggerContext;
use crate::types::page::TriggerKind;
use crate::types::state::GameState;
use std::collections::{BTreeMap, BTreeSet};

/// An event whose trigger fired this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRequest {
    pub event_id: u32,
    pub page_index: usize,
    pub trigger: TriggerKind,
}

#[derive(Debug, Clone)]
pub struct TriggerResolver {
    handlers: BTreeMap<u32, EventHandler>,
    erased: BTreeSet<u32>,
    default_radius: i32,
}

impl Default for TriggerResolver {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TriggerResolver {
    pub fn new(default_radius: i32) -> Self {
        Self {
            handlers: BTreeMap::new(),
            erased: BTreeSet::new(),
            default_radius,
        }
    }

    pub fn handler(&self, event_id: u32) -> Option<&EventHandler> {
        self.handlers.get(&event_id)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &EventHandler> {
        self.handlers.values()
    }

    pub fn is_erased(&self, event_id: u32) -> bool {
        self.erased.contains(&event_id)
    }

    /// Recompute every event's active page and create, replace or retire
    /// its handler. An event whose instance is still running keeps its
    /// active flag across a page change so it cannot start twice.
    pub fn update_event_handlers(&mut self, catalog: &EventCatalog, state: &dyn GameState) {
        let mut handlers = BTreeMap::new();

        for event in catalog.events() {
            if self.erased.contains(&event.id) {
                continue;
            }
            let previous = self.handlers.remove(&event.id);
            let running = previous.as_ref().is_some_and(EventHandler::is_active);

            match catalog.active_page(event.id, state) {
                Some((page_index, page)) => {
                    let mut handler = EventHandler::new(event.id, page_index, page, event.position());
                    handler.set_active(running);
                    if previous.as_ref().is_none_or(|p| p.page_index != page_index) {
                        log::debug!(
                            target: "mapevent::trigger",
                            "[Trigger] event {} active page -> {} ({:?})",
                            event.id,
                            page_index,
                            page.trigger
                        );
                    }
                    handlers.insert(event.id, handler);
                }
                None => {
                    if let Some(mut handler) = previous.filter(EventHandler::is_active) {
                        handler.retire();
                        handlers.insert(event.id, handler);
                    }
                }
            }
        }

        // events removed from the catalog keep a handler only while running
        for (event_id, mut handler) in std::mem::take(&mut self.handlers) {
            if handler.is_active() {
                handler.retire();
                handlers.insert(event_id, handler);
            }
        }

        self.handlers = handlers;
    }

    /// Check every handler in ascending event id order.
    /// `blocking` is whether a foreground instance is already running.
    pub fn resolve(
        &mut self,
        ctx: &TriggerContext,
        state: &dyn GameState,
        blocking: bool,
    ) -> Vec<TriggerRequest> {
        let mut blocking = blocking;
        let mut requests = Vec::new();

        for handler in self.handlers.values_mut() {
            let condition_ctx = ConditionContext {
                frame: ctx,
                state,
                event_pos: ctx.event_pos(handler.event_id, handler.position),
                default_radius: self.default_radius,
            };
            match handler.check(&condition_ctx, blocking) {
                TriggerResult::Triggered => {
                    log::debug!(
                        target: "mapevent::trigger",
                        "[Trigger] event {} page {} triggered ({:?})",
                        handler.event_id,
                        handler.page_index,
                        handler.trigger
                    );
                    blocking |= handler.trigger.is_blocking();
                    requests.push(TriggerRequest {
                        event_id: handler.event_id,
                        page_index: handler.page_index,
                        trigger: handler.trigger,
                    });
                }
                TriggerResult::Blocked => log::trace!(
                    target: "mapevent::trigger",
                    "[Trigger] event {} blocked by a foreground event",
                    handler.event_id
                ),
                TriggerResult::Running | TriggerResult::NotTriggered => {}
            }
        }
        requests
    }

    /// An instance of the event ended; its handler may fire again
    pub fn on_event_finished(&mut self, event_id: u32) {
        let Some(handler) = self.handlers.get_mut(&event_id) else {
            return;
        };
        if handler.is_retired() {
            self.handlers.remove(&event_id);
        } else {
            handler.set_active(false);
        }
    }

    /// The engine refused a request; let the handler fire again later
    pub fn reject(&mut self, event_id: u32) {
        self.on_event_finished(event_id);
    }

    /// Retire an event until the next map load
    pub fn erase(&mut self, event_id: u32) {
        log::debug!(target: "mapevent::trigger", "[Trigger] event {event_id} erased");
        self.erased.insert(event_id);
        self.handlers.remove(&event_id);
    }

    /// Forget every handler and erased mark, e.g. on map change
    pub fn reset(&mut self) {
        self.handlers.clear();
        self.erased.clear();
    }
}
