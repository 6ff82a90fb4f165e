//! Per-frame input handed to the trigger resolver

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facing direction on the tile grid. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset of the tile in front of someone facing this way
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Everything the resolver needs to know about the current frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerContext {
    pub player_x: i32,
    pub player_y: i32,
    pub direction: Direction,
    /// True only on the frame the action button went down
    pub action_pressed: bool,
    pub map_id: u32,
    /// Current positions of events that moved away from their authored tile
    #[serde(default)]
    pub event_positions: BTreeMap<u32, (i32, i32)>,
    /// Seconds elapsed since the previous frame
    #[serde(default)]
    pub delta: f32,
}

impl TriggerContext {
    pub fn new(map_id: u32, player_x: i32, player_y: i32, direction: Direction) -> Self {
        Self {
            player_x,
            player_y,
            direction,
            action_pressed: false,
            map_id,
            event_positions: BTreeMap::new(),
            delta: 0.0,
        }
    }

    pub fn with_action(mut self) -> Self {
        self.action_pressed = true;
        self
    }

    pub fn with_delta(mut self, delta: f32) -> Self {
        self.delta = delta;
        self
    }

    pub fn player_pos(&self) -> (i32, i32) {
        (self.player_x, self.player_y)
    }

    /// The single tile directly in front of the player
    pub fn facing_tile(&self) -> (i32, i32) {
        let (dx, dy) = self.direction.offset();
        (self.player_x + dx, self.player_y + dy)
    }

    /// Cached position of an event, falling back to its authored tile
    pub fn event_pos(&self, event_id: u32, authored: (i32, i32)) -> (i32, i32) {
        self.event_positions
            .get(&event_id)
            .copied()
            .unwrap_or(authored)
    }
}
