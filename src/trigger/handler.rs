//! Per-event trigger handler

use crate::trigger::condition::ConditionContext;
use crate::types::page::{EventPage, TriggerCondition, TriggerKind};

/// Outcome of checking one handler in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    NotTriggered,
    /// Fired this frame; the handler is now active
    Triggered,
    /// An instance started by this handler has not finished yet
    Running,
    /// Would have fired, but a foreground instance holds the slot
    Blocked,
}

/// Watches the active page of one event and decides when it fires
#[derive(Debug, Clone, PartialEq)]
pub struct EventHandler {
    pub event_id: u32,
    pub page_index: usize,
    pub trigger: TriggerKind,
    pub conditions: Vec<TriggerCondition>,
    /// Authored tile, used when the frame carries no position override
    pub position: (i32, i32),
    active: bool,
    retired: bool,
}

impl EventHandler {
    pub fn new(event_id: u32, page_index: usize, page: &EventPage, position: (i32, i32)) -> Self {
        Self {
            event_id,
            page_index,
            trigger: page.trigger,
            conditions: page.trigger_conditions.clone(),
            position,
            active: false,
            retired: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The page this handler watched is no longer active, but its
    /// instance is still running
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }

    /// Whether the trigger kind's own rule fires this frame
    fn fires(&self, ctx: &ConditionContext<'_>) -> bool {
        let player = ctx.frame.player_pos();
        let event = ctx.event_pos;
        match self.trigger {
            TriggerKind::ActionButton => ctx.frame.action_pressed && ctx.frame.facing_tile() == event,
            TriggerKind::PlayerTouch => player == event,
            TriggerKind::EventTouch => {
                (player.0 - event.0).abs().max((player.1 - event.1).abs()) <= 1
            }
            TriggerKind::Autorun | TriggerKind::Parallel => true,
        }
    }

    /// Check the handler, flipping it active when it fires.
    /// `blocking` is true while a foreground instance is running or one
    /// was already triggered this frame.
    pub fn check(&mut self, ctx: &ConditionContext<'_>, blocking: bool) -> TriggerResult {
        if self.active {
            return TriggerResult::Running;
        }
        if self.retired || !self.fires(ctx) || !ctx.all(&self.conditions) {
            return TriggerResult::NotTriggered;
        }
        if blocking && self.trigger.is_blocking() {
            return TriggerResult::Blocked;
        }
        self.active = true;
        TriggerResult::Triggered
    }
}
