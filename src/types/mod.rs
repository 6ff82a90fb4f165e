//! Core types for the mapevent library
//!
//! This module contains the data model shared by the catalog, the trigger
//! resolver and the execution engine:
//! - Command: a single authored operation with an indent hint
//! - Page: conditions, trigger kind and a command list
//! - Event: map position plus a priority stack of pages
//! - State: the shared switch/variable store
//! - Context: per-frame trigger input

pub mod command;
pub mod context;
pub mod event;
pub mod page;
pub mod state;

pub use command::{CommandFamily, CommandKind, EventCommand, Parameters};
pub use context::{Direction, TriggerContext};
pub use event::GameEvent;
pub use page::{Comparison, EventPage, PageConditions, TriggerCondition, TriggerKind};
pub use state::{GameData, GameState, SelfSwitch, SelfSwitchKey};
