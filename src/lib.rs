//! # mapevent
//!
//! An event scripting engine for tile-map games. Authored events carry a
//! stack of conditional pages; each page has a trigger kind and a flat,
//! indent-structured command list.
//!
//! The library is split into three cooperating parts:
//! - [`catalog`]: loads and owns a map's events and compiles their pages
//! - [`trigger`]: decides each frame which events start running
//! - [`runtime`]: steps running pages one command per frame
//!
//! [`EventDirector`] wires the three together for a single map.
//!
//! ## Quick Start
//!
//! ```rust
//! use mapevent::{Direction, EngineConfig, EventCatalog, EventDirector, GameData, GameState};
//! use mapevent::runtime::HeadlessPresentation;
//! use mapevent::types::TriggerContext;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = r#"{
//!     "map_id": 1,
//!     "events": [{
//!         "id": 1, "name": "sign", "x": 2, "y": 0,
//!         "pages": [{
//!             "trigger": "action_button",
//!             "commands": [
//!                 {"command_type": "show_text", "parameters": {"text": "Welcome!"}},
//!                 {"command_type": "control_switches", "parameters": {"switch_id": 1, "value": true}}
//!             ]
//!         }]
//!     }]
//! }"#;
//! let catalog = EventCatalog::from_json_str(json)?.catalog;
//! let mut director = EventDirector::new(catalog, EngineConfig::default());
//! let mut state = GameData::new();
//! let mut hooks = HeadlessPresentation;
//!
//! // Player at (1, 0) facing the sign presses the action button
//! let ctx = TriggerContext::new(1, 1, 0, Direction::Right).with_action();
//! let report = director.update(&ctx, &mut state, &mut hooks);
//! assert_eq!(report.started.len(), 1);
//!
//! let idle = TriggerContext::new(1, 1, 0, Direction::Right);
//! for _ in 0..3 {
//!     director.update(&idle, &mut state, &mut hooks);
//! }
//! assert!(state.switch(1));
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod debug;
pub mod director;
pub mod error;
pub mod lint;
pub mod runtime;
pub mod storage;
pub mod trigger;
pub mod types;

pub use catalog::{EventCatalog, LoadReport};
pub use config::EngineConfig;
pub use director::{EventDirector, FrameReport};
pub use error::{CatalogError, HookError, LogicError, StartError};
pub use runtime::{ExecutionEngine, Presentation};
pub use trigger::{TriggerRequest, TriggerResolver};
pub use types::{Direction, GameData, GameState};
