//! Execution scheduler: one foreground slot plus any number of parallel instances

use crate::error::StartError;
use crate::runtime::hooks::Presentation;
use crate::runtime::instance::{EndReason, Env, Instance, StepOutcome, WaitState};
use crate::runtime::program::Program;
use crate::types::page::TriggerKind;
use crate::types::state::GameState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An instance that stopped during [`ExecutionEngine::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedEvent {
    pub event_id: u32,
    pub page_index: usize,
    pub trigger: TriggerKind,
    pub reason: EndReason,
}

/// Owns every running instance and steps each once per frame
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    foreground: Option<Instance>,
    parallel: BTreeMap<u32, Instance>,
    rng: ChaCha8Rng,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ExecutionEngine {
    /// A fixed seed makes random variable operands reproducible
    pub fn new(rng_seed: Option<u64>) -> Self {
        let seed = rng_seed.unwrap_or_else(rand::random);
        Self {
            foreground: None,
            parallel: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// True while the foreground slot is occupied
    pub fn has_blocking_event(&self) -> bool {
        self.foreground.is_some()
    }

    pub fn foreground_event(&self) -> Option<u32> {
        self.foreground.as_ref().map(Instance::event_id)
    }

    pub fn is_running(&self, event_id: u32) -> bool {
        self.foreground_event() == Some(event_id) || self.parallel.contains_key(&event_id)
    }

    pub fn running_count(&self) -> usize {
        usize::from(self.foreground.is_some()) + self.parallel.len()
    }

    pub fn is_idle(&self) -> bool {
        self.running_count() == 0
    }

    /// The instance running for an event, foreground first
    pub fn instance(&self, event_id: u32) -> Option<&Instance> {
        self.foreground
            .as_ref()
            .filter(|i| i.event_id() == event_id)
            .or_else(|| self.parallel.get(&event_id))
    }

    /// Any instance suspended on a text box, choice or number prompt
    pub fn awaiting_input(&self) -> bool {
        self.foreground
            .iter()
            .chain(self.parallel.values())
            .any(Instance::awaits_input)
    }

    /// Instantiate a page program. Blocking triggers need the foreground slot.
    pub fn start(
        &mut self,
        map_id: u32,
        event_id: u32,
        page_index: usize,
        trigger: TriggerKind,
        program: Arc<Program>,
    ) -> Result<(), StartError> {
        if trigger.is_blocking() {
            if let Some(running) = self.foreground_event() {
                let err = if running == event_id {
                    StartError::AlreadyRunning { event_id }
                } else {
                    StartError::ConcurrencyViolation {
                        running,
                        rejected: event_id,
                    }
                };
                log::warn!(target: "mapevent::engine", "[Engine] {err}");
                return Err(err);
            }
            self.foreground = Some(Instance::new(
                map_id, event_id, page_index, trigger, program,
            ));
        } else {
            if self.parallel.contains_key(&event_id) {
                return Err(StartError::AlreadyRunning { event_id });
            }
            self.parallel.insert(
                event_id,
                Instance::new(map_id, event_id, page_index, trigger, program),
            );
        }

        log::debug!(
            target: "mapevent::engine",
            "[Engine] started event {} page {} ({:?})",
            event_id,
            page_index,
            trigger
        );
        Ok(())
    }

    /// Advance every instance by one step in ascending event id order
    /// (foreground before parallel for the same id), reaping finished ones
    pub fn update(
        &mut self,
        dt: f32,
        state: &mut dyn GameState,
        hooks: &mut dyn Presentation,
    ) -> Vec<FinishedEvent> {
        let mut order: Vec<(u32, bool)> = self.parallel.keys().map(|&id| (id, false)).collect();
        if let Some(id) = self.foreground_event() {
            order.push((id, true));
        }
        order.sort_by_key(|&(id, foreground)| (id, !foreground));

        let mut finished = Vec::new();
        for (event_id, foreground) in order {
            let slot = if foreground {
                self.foreground.as_mut()
            } else {
                self.parallel.get_mut(&event_id)
            };
            let Some(instance) = slot else { continue };

            let mut env = Env {
                state: &mut *state,
                hooks: &mut *hooks,
                rng: &mut self.rng,
            };
            let StepOutcome::Finished(reason) = instance.advance(dt, &mut env) else {
                continue;
            };

            let released = if foreground {
                self.foreground.take()
            } else {
                self.parallel.remove(&event_id)
            };
            if let Some(instance) = released {
                log::debug!(
                    target: "mapevent::engine",
                    "[Engine] event {} ended: {:?}",
                    event_id,
                    reason
                );
                hooks.on_event_ended(instance.map_id(), event_id);
                finished.push(FinishedEvent {
                    event_id,
                    page_index: instance.page_index(),
                    trigger: instance.trigger(),
                    reason,
                });
            }
        }
        finished
    }

    fn waiting_mut(&mut self, event_id: u32, wait: WaitState) -> Option<&mut Instance> {
        let matches = |i: &&mut Instance| i.event_id() == event_id && i.wait_state() == wait;
        self.foreground
            .as_mut()
            .filter(matches)
            .or_else(|| self.parallel.get_mut(&event_id).filter(matches))
    }

    /// Acknowledge the text box shown by an event. Repeated calls are no-ops.
    pub fn resume_message(&mut self, event_id: u32) -> bool {
        self.waiting_mut(event_id, WaitState::Message)
            .is_some_and(Instance::resume_message)
    }

    pub fn resume_choice(&mut self, event_id: u32, index: usize, state: &mut dyn GameState) -> bool {
        self.waiting_mut(event_id, WaitState::Choice)
            .is_some_and(|i| i.resume_choice(index, state))
    }

    pub fn resume_number(&mut self, event_id: u32, value: i64, state: &mut dyn GameState) -> bool {
        self.waiting_mut(event_id, WaitState::Number)
            .is_some_and(|i| i.resume_number(value, state))
    }

    /// Drop an event's instances without further dispatch. Game state
    /// writes already applied stay applied.
    pub fn cancel(&mut self, event_id: u32) -> bool {
        let mut cancelled = self.parallel.remove(&event_id).is_some();
        if self.foreground_event() == Some(event_id) {
            self.foreground = None;
            cancelled = true;
        }
        if cancelled {
            log::debug!(target: "mapevent::engine", "[Engine] cancelled event {event_id}");
        }
        cancelled
    }

    /// Drop every instance, e.g. on map change
    pub fn cancel_all(&mut self) -> usize {
        let count = self.running_count();
        self.foreground = None;
        self.parallel.clear();
        count
    }
}
