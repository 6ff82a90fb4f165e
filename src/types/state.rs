//! Shared game state read and written by event scripts

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One of the four per-event local switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SelfSwitch {
    A,
    B,
    C,
    D,
}

impl SelfSwitch {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

/// Address of a self switch: it belongs to one event on one map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelfSwitchKey {
    pub map_id: u32,
    pub event_id: u32,
    pub switch: SelfSwitch,
}

impl SelfSwitchKey {
    pub fn new(map_id: u32, event_id: u32, switch: SelfSwitch) -> Self {
        Self {
            map_id,
            event_id,
            switch,
        }
    }
}

/// Game state collaborator.
///
/// Reads of unknown ids return `false`/`0`; writes never fail.
pub trait GameState {
    fn switch(&self, id: u32) -> bool;
    fn set_switch(&mut self, id: u32, value: bool);

    fn variable(&self, id: u32) -> i64;
    fn set_variable(&mut self, id: u32, value: i64);

    fn self_switch(&self, key: SelfSwitchKey) -> bool;
    fn set_self_switch(&mut self, key: SelfSwitchKey, value: bool);

    fn item_count(&self, id: u32) -> i64;
    fn gain_item(&mut self, id: u32, amount: i64);
    fn has_item(&self, id: u32) -> bool {
        self.item_count(id) > 0
    }

    fn has_actor(&self, id: u32) -> bool;
    fn set_party_member(&mut self, id: u32, present: bool);

    fn gold(&self) -> i64;
    fn gain_gold(&mut self, amount: i64);
}

/// In-memory game state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub switches: BTreeMap<u32, bool>,
    pub variables: BTreeMap<u32, i64>,
    /// Self switches that are currently ON
    pub self_switches: BTreeSet<SelfSwitchKey>,
    pub items: BTreeMap<u32, i64>,
    pub party: BTreeSet<u32>,
    pub gold: i64,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameState for GameData {
    fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    fn set_switch(&mut self, id: u32, value: bool) {
        self.switches.insert(id, value);
    }

    fn variable(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    fn set_variable(&mut self, id: u32, value: i64) {
        self.variables.insert(id, value);
    }

    fn self_switch(&self, key: SelfSwitchKey) -> bool {
        self.self_switches.contains(&key)
    }

    fn set_self_switch(&mut self, key: SelfSwitchKey, value: bool) {
        if value {
            self.self_switches.insert(key);
        } else {
            self.self_switches.remove(&key);
        }
    }

    fn item_count(&self, id: u32) -> i64 {
        self.items.get(&id).copied().unwrap_or(0)
    }

    fn gain_item(&mut self, id: u32, amount: i64) {
        let count = self.item_count(id).saturating_add(amount).max(0);
        if count == 0 {
            self.items.remove(&id);
        } else {
            self.items.insert(id, count);
        }
    }

    fn has_actor(&self, id: u32) -> bool {
        self.party.contains(&id)
    }

    fn set_party_member(&mut self, id: u32, present: bool) {
        if present {
            self.party.insert(id);
        } else {
            self.party.remove(&id);
        }
    }

    fn gold(&self) -> i64 {
        self.gold
    }

    fn gain_gold(&mut self, amount: i64) {
        self.gold = self.gold.saturating_add(amount).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_read_as_defaults() {
        let data = GameData::new();
        assert!(!data.switch(42));
        assert_eq!(data.variable(42), 0);
        assert!(!data.has_item(1));
        assert!(!data.has_actor(1));
        assert!(!data.self_switch(SelfSwitchKey::new(1, 1, SelfSwitch::A)));
    }

    #[test]
    fn items_and_gold_never_go_negative() {
        let mut data = GameData::new();
        data.gain_item(3, 2);
        data.gain_item(3, -5);
        assert_eq!(data.item_count(3), 0);
        assert!(!data.has_item(3));

        data.gain_gold(100);
        data.gain_gold(-250);
        assert_eq!(data.gold(), 0);
    }

    #[test]
    fn self_switches_are_scoped_per_event() {
        let mut data = GameData::new();
        let key = SelfSwitchKey::new(1, 7, SelfSwitch::B);
        data.set_self_switch(key, true);
        assert!(data.self_switch(key));
        assert!(!data.self_switch(SelfSwitchKey::new(1, 8, SelfSwitch::B)));
        assert!(!data.self_switch(SelfSwitchKey::new(2, 7, SelfSwitch::B)));
        data.set_self_switch(key, false);
        assert!(!data.self_switch(key));
    }

    #[test]
    fn self_switch_letters_parse() {
        assert_eq!(SelfSwitch::parse("D"), Some(SelfSwitch::D));
        assert_eq!(SelfSwitch::parse("E"), None);
    }
}
