//! Map events: a position plus a priority stack of pages

use crate::types::page::EventPage;
use crate::types::state::GameState;
use serde::{Deserialize, Serialize};

/// An authored, triggerable script attached to a map tile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub pages: Vec<EventPage>,
}

impl GameEvent {
    pub fn new(id: u32, name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            pages: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: EventPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Index of the active page: the last page whose conditions hold.
    /// Earlier matching pages are shadowed.
    pub fn active_page_index(&self, state: &dyn GameState, map_id: u32) -> Option<usize> {
        self.pages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, page)| page.conditions.holds(state, map_id, self.id))
            .map(|(index, _)| index)
    }

    pub fn active_page(&self, state: &dyn GameState, map_id: u32) -> Option<&EventPage> {
        self.active_page_index(state, map_id)
            .and_then(|index| self.pages.get(index))
    }
}
