//! Storage module for saving and loading game state and catalogs
//!
//! Game state is saved as JSON bytes; catalogs go through a
//! [`repository::CatalogRepository`].

pub mod repository;

use crate::types::state::GameData;

/// Save game state to bytes using JSON serialization
pub fn save(state: &GameData) -> anyhow::Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(state)?;
    Ok(json.into_bytes())
}

/// Load game state from bytes using JSON deserialization
pub fn load(bytes: &[u8]) -> anyhow::Result<GameData> {
    let json = String::from_utf8(bytes.to_vec())?;
    let state = serde_json::from_str(&json)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::state::{GameState, SelfSwitch, SelfSwitchKey};

    #[test]
    fn save_then_load_restores_state() {
        let mut original = GameData::new();
        original.set_switch(3, true);
        original.set_variable(1, -42);
        original.set_self_switch(SelfSwitchKey::new(2, 7, SelfSwitch::B), true);
        original.gain_item(5, 3);
        original.set_party_member(1, true);
        original.gain_gold(250);

        let bytes = save(&original).unwrap();
        let restored = load(&bytes).unwrap();

        assert_eq!(original, restored);
        assert!(restored.switch(3));
        assert_eq!(restored.variable(1), -42);
        assert!(restored.self_switch(SelfSwitchKey::new(2, 7, SelfSwitch::B)));
        assert_eq!(restored.item_count(5), 3);
        assert_eq!(restored.gold(), 250);
    }

    #[test]
    fn save_empty_state() {
        let state = GameData::new();
        let bytes = save(&state).unwrap();
        let restored = load(&bytes).unwrap();
        assert_eq!(state, restored);
    }

    #[test]
    fn load_invalid_data_returns_error() {
        let invalid_bytes = b"invalid json data";
        let result = load(invalid_bytes);
        assert!(result.is_err());
    }
}
