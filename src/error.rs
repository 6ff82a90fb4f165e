//! Error types for the event scripting engine
//!
//! None of these halt a frame: validation errors skip a catalog object,
//! logic errors turn a command into a no-op, concurrency violations reject
//! a trigger and hook errors abort a single instance.

use crate::types::command::CommandKind;
use thiserror::Error;

/// A malformed catalog object that was skipped during loading
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid catalog object at {location}: {message}")]
pub struct ValidationError {
    /// Path of the skipped object, e.g. `events[2].pages[0].commands[5]`
    pub location: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Script-level mistakes found while executing a command
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LogicError {
    #[error("label '{label}' not found on the active page")]
    MissingLabel { label: String },

    #[error("break_loop at command {index} is not inside a loop")]
    BreakOutsideLoop { index: usize },

    #[error("malformed parameters for {command:?}: {message}")]
    MalformedParameters { command: CommandKind, message: String },

    #[error("unknown condition: {reason}")]
    UnknownCondition { reason: String },

    #[error("arithmetic fault on variable {variable_id}: {reason}")]
    ArithmeticFault { variable_id: u32, reason: String },
}

impl LogicError {
    pub fn missing_label(label: impl Into<String>) -> Self {
        Self::MissingLabel {
            label: label.into(),
        }
    }

    pub fn malformed(command: CommandKind, message: impl Into<String>) -> Self {
        Self::MalformedParameters {
            command,
            message: message.into(),
        }
    }

    pub fn unknown_condition(reason: impl Into<String>) -> Self {
        Self::UnknownCondition {
            reason: reason.into(),
        }
    }
}

/// Why an instance could not be started
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StartError {
    #[error("event {rejected} rejected: foreground event {running} is still running")]
    ConcurrencyViolation { running: u32, rejected: u32 },

    #[error("event {event_id} already has a running instance")]
    AlreadyRunning { event_id: u32 },

    #[error("event {event_id} is not in the catalog")]
    UnknownEvent { event_id: u32 },

    #[error("event {event_id} has no page {page_index}")]
    UnknownPage { event_id: u32, page_index: usize },
}

/// A presentation or game-state collaborator failed
#[derive(Debug, Error, Clone, PartialEq)]
#[error("collaborator error: {message}")]
pub struct HookError {
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type returned by presentation hooks
pub type HookResult<T> = Result<T, HookError>;

/// Fatal catalog failures: nothing could be loaded at all
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog format error: {reason}")]
    Format { reason: String },
}

impl CatalogError {
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }
}
