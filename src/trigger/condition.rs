//! Trigger condition evaluation.
//!
//! Page trigger conditions narrow when a trigger kind may fire. They are
//! checked against the per-frame [`TriggerContext`] and the shared game
//! state; every listed condition must hold.

use crate::types::context::TriggerContext;
use crate::types::page::TriggerCondition;
use crate::types::state::GameState;

/// Everything a trigger condition can look at for one event in one frame
pub struct ConditionContext<'a> {
    pub frame: &'a TriggerContext,
    pub state: &'a dyn GameState,
    /// Current tile of the event being checked
    pub event_pos: (i32, i32),
    /// Radius used by proximity conditions that omit one
    pub default_radius: i32,
}

impl ConditionContext<'_> {
    pub fn holds(&self, condition: &TriggerCondition) -> bool {
        match *condition {
            TriggerCondition::Proximity { radius } => {
                let radius = radius.unwrap_or(self.default_radius);
                let (px, py) = self.frame.player_pos();
                let (ex, ey) = self.event_pos;
                (px - ex).abs() <= radius && (py - ey).abs() <= radius
            }
            TriggerCondition::Facing { direction } => self.frame.direction == direction,
            TriggerCondition::Switch { switch_id, value } => self.state.switch(switch_id) == value,
            TriggerCondition::Variable {
                variable_id,
                operator,
                value,
            } => operator.compare(self.state.variable(variable_id), value),
            // reserved
            TriggerCondition::Timer => true,
        }
    }

    /// Conjunction of every condition; an empty list holds
    pub fn all(&self, conditions: &[TriggerCondition]) -> bool {
        conditions.iter().all(|c| self.holds(c))
    }
}
