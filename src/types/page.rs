//! Event pages: conditional variants of an event's behavior

use crate::types::command::EventCommand;
use crate::types::context::Direction;
use crate::types::state::{GameState, SelfSwitch, SelfSwitchKey};
use serde::{Deserialize, Serialize};

/// How a page's script gets started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    #[default]
    ActionButton,
    PlayerTouch,
    EventTouch,
    Autorun,
    Parallel,
}

impl TriggerKind {
    /// Every trigger except `parallel` runs in the single foreground slot
    pub fn is_blocking(self) -> bool {
        !matches!(self, TriggerKind::Parallel)
    }
}

/// Comparison operators shared by trigger conditions and branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl Comparison {
    pub fn compare(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
            Comparison::GreaterThan => lhs > rhs,
            Comparison::GreaterThanOrEqual => lhs >= rhs,
            Comparison::LessThan => lhs < rhs,
            Comparison::LessThanOrEqual => lhs <= rhs,
        }
    }
}

/// Extra per-frame requirement attached to a page's trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Player within a square box around the event
    Proximity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<i32>,
    },
    Facing {
        direction: Direction,
    },
    Switch {
        switch_id: u32,
        #[serde(default = "default_true")]
        value: bool,
    },
    Variable {
        variable_id: u32,
        operator: Comparison,
        value: i64,
    },
    /// Reserved; always satisfied
    Timer,
}

fn default_true() -> bool {
    true
}

/// Conjunction of optional requirements for a page to be active.
///
/// Fields holding a value of the wrong JSON type load as absent, and an
/// absent requirement always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConditions {
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub switch1_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub switch2_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub variable_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient::int", skip_serializing_if = "Option::is_none")]
    pub variable_value: Option<i64>,
    #[serde(
        default,
        deserialize_with = "lenient::self_switch",
        skip_serializing_if = "Option::is_none"
    )]
    pub self_switch: Option<SelfSwitch>,
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<u32>,
}

impl PageConditions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Evaluate every present requirement against the game state
    pub fn holds(&self, state: &dyn GameState, map_id: u32, event_id: u32) -> bool {
        if let Some(id) = self.switch1_id
            && !state.switch(id)
        {
            return false;
        }
        if let Some(id) = self.switch2_id
            && !state.switch(id)
        {
            return false;
        }
        if let Some(id) = self.variable_id
            && state.variable(id) < self.variable_value.unwrap_or(0)
        {
            return false;
        }
        if let Some(switch) = self.self_switch
            && !state.self_switch(SelfSwitchKey::new(map_id, event_id, switch))
        {
            return false;
        }
        if let Some(id) = self.item_id
            && !state.has_item(id)
        {
            return false;
        }
        if let Some(id) = self.actor_id
            && !state.has_actor(id)
        {
            return false;
        }
        true
    }
}

/// One conditional variant of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub conditions: PageConditions,
    #[serde(default)]
    pub trigger: TriggerKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger_conditions: Vec<TriggerCondition>,
    #[serde(default)]
    pub commands: Vec<EventCommand>,
}

impl EventPage {
    pub fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            ..Default::default()
        }
    }

    pub fn with_conditions(mut self, conditions: PageConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_trigger_condition(mut self, condition: TriggerCondition) -> Self {
        self.trigger_conditions.push(condition);
        self
    }

    pub fn with_commands(mut self, commands: Vec<EventCommand>) -> Self {
        self.commands = commands;
        self
    }
}

mod lenient {
    use crate::types::state::SelfSwitch;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok()))
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.and_then(|v| v.as_i64()))
    }

    pub fn self_switch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SelfSwitch>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.and_then(|v| v.as_str().and_then(SelfSwitch::parse)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::state::GameData;
    use serde_json::json;

    #[test]
    fn empty_conditions_always_hold() {
        let state = GameData::new();
        assert!(PageConditions::default().holds(&state, 1, 1));
    }

    #[test]
    fn conditions_are_a_conjunction() {
        let mut state = GameData::new();
        let conditions = PageConditions {
            switch1_id: Some(1),
            variable_id: Some(2),
            variable_value: Some(3),
            ..Default::default()
        };
        state.set_switch(1, true);
        state.set_variable(2, 2);
        assert!(!conditions.holds(&state, 1, 1));
        state.set_variable(2, 3);
        assert!(conditions.holds(&state, 1, 1));
        state.set_switch(1, false);
        assert!(!conditions.holds(&state, 1, 1));
    }

    #[test]
    fn self_switch_condition_uses_the_owning_event() {
        let mut state = GameData::new();
        let conditions = PageConditions {
            self_switch: Some(SelfSwitch::A),
            ..Default::default()
        };
        state.set_self_switch(SelfSwitchKey::new(4, 10, SelfSwitch::A), true);
        assert!(conditions.holds(&state, 4, 10));
        assert!(!conditions.holds(&state, 4, 11));
    }

    #[test]
    fn invalid_condition_values_load_as_absent() {
        let conditions: PageConditions = serde_json::from_value(json!({
            "switch1_id": "not a number",
            "self_switch": "Z",
            "item_id": -4,
            "actor_id": 2
        }))
        .unwrap();
        assert_eq!(conditions.switch1_id, None);
        assert_eq!(conditions.self_switch, None);
        assert_eq!(conditions.item_id, None);
        assert_eq!(conditions.actor_id, Some(2));
    }

    #[test]
    fn trigger_conditions_are_tagged_by_type() {
        let condition: TriggerCondition = serde_json::from_value(json!({
            "type": "variable",
            "variable_id": 1,
            "operator": ">=",
            "value": 5
        }))
        .unwrap();
        assert_eq!(
            condition,
            TriggerCondition::Variable {
                variable_id: 1,
                operator: Comparison::GreaterThanOrEqual,
                value: 5
            }
        );
        assert!(serde_json::from_value::<TriggerCondition>(json!({"type": "weather"})).is_err());
    }

    #[test]
    fn comparison_operators() {
        assert!(Comparison::Equal.compare(2, 2));
        assert!(Comparison::NotEqual.compare(2, 3));
        assert!(Comparison::GreaterThan.compare(3, 2));
        assert!(Comparison::GreaterThanOrEqual.compare(2, 2));
        assert!(Comparison::LessThan.compare(1, 2));
        assert!(!Comparison::LessThanOrEqual.compare(3, 2));
    }
}
