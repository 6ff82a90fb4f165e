//! Event catalog: every event of one loaded map
//!
//! Loading is lenient. A malformed object is skipped with a
//! [`ValidationError`] and the rest of the catalog still loads:
//! - a bad command or trigger condition is dropped from its page
//! - a page with an unknown trigger or non-object conditions is dropped from its event
//! - an event without a usable `id` is dropped from the catalog

use crate::error::{CatalogError, ValidationError};
use crate::runtime::program::Program;
use crate::types::command::EventCommand;
use crate::types::event::GameEvent;
use crate::types::page::{EventPage, PageConditions, TriggerCondition, TriggerKind};
use crate::types::state::GameState;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;


/// All events of a map, keyed by id, with each page compiled once
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    map_id: u32,
    events: BTreeMap<u32, GameEvent>,
    programs: BTreeMap<(u32, usize), Arc<Program>>,
}

/// Result of a lenient load
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub catalog: EventCatalog,
    pub warnings: Vec<ValidationError>,
}

impl PartialEq for EventCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.map_id == other.map_id && self.events == other.events
    }
}

impl EventCatalog {
    pub fn new(map_id: u32) -> Self {
        Self {
            map_id,
            ..Default::default()
        }
    }

    pub fn with_event(mut self, event: GameEvent) -> Self {
        self.insert(event);
        self
    }

    /// Add or replace an event, compiling its pages
    pub fn insert(&mut self, event: GameEvent) -> Option<GameEvent> {
        self.programs.retain(|(id, _), _| *id != event.id);
        for (index, page) in event.pages.iter().enumerate() {
            self.programs.insert(
                (event.id, index),
                Arc::new(Program::compile(page.commands.clone())),
            );
        }
        self.events.insert(event.id, event)
    }

    pub fn remove(&mut self, event_id: u32) -> Option<GameEvent> {
        self.programs.retain(|(id, _), _| *id != event_id);
        self.events.remove(&event_id)
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn get(&self, event_id: u32) -> Option<&GameEvent> {
        self.events.get(&event_id)
    }

    /// Events in ascending id order
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Active page of an event under the priority-stack rule
    pub fn active_page(
        &self,
        event_id: u32,
        state: &dyn GameState,
    ) -> Option<(usize, &EventPage)> {
        let event = self.events.get(&event_id)?;
        let index = event.active_page_index(state, self.map_id)?;
        event.pages.get(index).map(|page| (index, page))
    }

    /// Compiled program of one page
    pub fn program(&self, event_id: u32, page_index: usize) -> Option<Arc<Program>> {
        self.programs.get(&(event_id, page_index)).cloned()
    }

    pub fn from_json_str(json: &str) -> Result<LoadReport, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Load from either a bare array of events or `{map_id, events: [...]}`
    pub fn from_value(value: &Value) -> Result<LoadReport, CatalogError> {
        let (map_id, events) = match value {
            Value::Array(events) => (0, events),
            Value::Object(obj) => {
                let map_id = obj
                    .get("map_id")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0);
                let events = obj
                    .get("events")
                    .and_then(Value::as_array)
                    .ok_or_else(|| CatalogError::format("missing 'events' array"))?;
                (map_id, events)
            }
            _ => {
                return Err(CatalogError::format(
                    "catalog must be an array or an object with 'events'",
                ));
            }
        };

        let mut catalog = EventCatalog::new(map_id);
        let mut warnings = Vec::new();

        for (idx, raw) in events.iter().enumerate() {
            let location = format!("events[{idx}]");
            match load_event(raw, &location, &mut warnings) {
                Ok(event) => {
                    let id = event.id;
                    if catalog.insert(event).is_some() {
                        warnings.push(ValidationError::new(
                            &location,
                            format!("duplicate event id {id}, later definition kept"),
                        ));
                    }
                }
                Err(err) => warnings.push(err),
            }
        }

        for warning in &warnings {
            log::warn!(target: "mapevent::catalog", "{warning}");
        }
        log::debug!(
            target: "mapevent::catalog",
            "loaded map {} with {} events ({} skipped objects)",
            map_id,
            catalog.len(),
            warnings.len()
        );

        Ok(LoadReport { catalog, warnings })
    }

    pub fn to_value(&self) -> Result<Value, CatalogError> {
        let events = self
            .events
            .values()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let mut obj = Map::new();
        obj.insert("map_id".to_string(), Value::from(self.map_id));
        obj.insert("events".to_string(), Value::Array(events));
        Ok(Value::Object(obj))
    }

    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

fn load_event(
    raw: &Value,
    location: &str,
    warnings: &mut Vec<ValidationError>,
) -> Result<GameEvent, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::new(location, "event is not an object"))?;

    let id = obj
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ValidationError::new(location, "missing or invalid 'id'"))?;
    let name = match obj.get("name") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::new(location, "'name' is not a string")),
    };
    let x = coordinate(obj, "x", location)?;
    let y = coordinate(obj, "y", location)?;

    let mut pages = Vec::new();
    match obj.get("pages") {
        None | Some(Value::Null) => {}
        Some(Value::Array(raw_pages)) => {
            for (idx, raw_page) in raw_pages.iter().enumerate() {
                let page_location = format!("{location}.pages[{idx}]");
                match load_page(raw_page, &page_location, warnings) {
                    Ok(page) => pages.push(page),
                    Err(err) => warnings.push(err),
                }
            }
        }
        Some(_) => return Err(ValidationError::new(location, "'pages' is not an array")),
    }

    Ok(GameEvent {
        id,
        name,
        x,
        y,
        pages,
    })
}

fn coordinate(obj: &Map<String, Value>, key: &str, location: &str) -> Result<i32, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| ValidationError::new(location, format!("'{key}' is not an integer"))),
    }
}

fn load_page(
    raw: &Value,
    location: &str,
    warnings: &mut Vec<ValidationError>,
) -> Result<EventPage, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::new(location, "page is not an object"))?;

    let conditions = match obj.get("conditions") {
        None | Some(Value::Null) => PageConditions::default(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| ValidationError::new(location, format!("bad conditions: {e}")))?,
    };

    let trigger = match obj.get("trigger") {
        None | Some(Value::Null) => TriggerKind::default(),
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| ValidationError::new(location, format!("unknown trigger: {e}")))?,
    };

    let trigger_conditions = load_list::<TriggerCondition>(
        obj.get("trigger_conditions"),
        &format!("{location}.trigger_conditions"),
        warnings,
    );
    let commands = load_list::<EventCommand>(
        obj.get("commands"),
        &format!("{location}.commands"),
        warnings,
    );

    Ok(EventPage {
        conditions,
        trigger,
        trigger_conditions,
        commands,
    })
}

/// Deserialize each element on its own, dropping the ones that fail
fn load_list<T: serde::de::DeserializeOwned>(
    raw: Option<&Value>,
    location: &str,
    warnings: &mut Vec<ValidationError>,
) -> Vec<T> {
    let items = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            warnings.push(ValidationError::new(location, "expected an array"));
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warnings.push(ValidationError::new(format!("{location}[{idx}]"), e.to_string()));
                None
            }
        })
        .collect()
}
