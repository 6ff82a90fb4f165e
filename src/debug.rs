//! Debug logging for event execution
//!
//! Library code logs through the `log` facade with one target per concern
//! (`mapevent::engine`, `mapevent::flow`, ...). [`DebugLogger`] is a small
//! `log::Log` backend that filters those records by level and category and
//! writes them to stderr or a file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

/// Environment variable that turns debug output on by default
pub const DEBUG_ENV: &str = "MAPEVENT_DEBUG";

/// Debug log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Every dispatched command
    Trace,
    /// Branches, jumps, variable writes, triggers
    Debug,
    Info,
    /// Skipped commands and rejected triggers
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// Debug log category, one per log target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugCategory {
    /// Instance scheduling and dispatch
    Engine,
    /// Control flow (branches, loops, jumps, choices)
    Flow,
    /// Switch and variable writes
    Variables,
    /// Trigger resolution
    Trigger,
    /// Catalog loading
    Catalog,
}

impl DebugCategory {
    /// Category of a `mapevent::<category>` record target
    pub fn from_target(target: &str) -> Option<Self> {
        match target.strip_prefix("mapevent::")? {
            "engine" => Some(DebugCategory::Engine),
            "flow" => Some(DebugCategory::Flow),
            "variables" => Some(DebugCategory::Variables),
            "trigger" => Some(DebugCategory::Trigger),
            "catalog" => Some(DebugCategory::Catalog),
            _ => None,
        }
    }
}

/// Debug output destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugOutput {
    Stderr,
    /// Append to a file
    File(String),
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Minimum log level
    pub level: LogLevel,
    pub output: DebugOutput,
    pub categories: HashSet<DebugCategory>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        let mut categories = HashSet::new();
        categories.insert(DebugCategory::Engine);
        categories.insert(DebugCategory::Flow);
        categories.insert(DebugCategory::Trigger);
        categories.insert(DebugCategory::Catalog);

        Self {
            enabled: std::env::var(DEBUG_ENV).is_ok(),
            level: LogLevel::Debug,
            output: DebugOutput::Stderr,
            categories,
        }
    }
}

impl DebugConfig {
    /// Enabled with every category at the given level
    pub fn verbose(level: LogLevel) -> Self {
        Self {
            enabled: true,
            level,
            output: DebugOutput::Stderr,
            categories: [
                DebugCategory::Engine,
                DebugCategory::Flow,
                DebugCategory::Variables,
                DebugCategory::Trigger,
                DebugCategory::Catalog,
            ]
            .into_iter()
            .collect(),
        }
    }
}

enum Sink {
    Stderr,
    File(Mutex<File>),
}

/// `log::Log` backend filtered by [`DebugConfig`]
pub struct DebugLogger {
    config: DebugConfig,
    sink: Sink,
}

impl DebugLogger {
    pub fn new(config: DebugConfig) -> std::io::Result<Self> {
        let sink = match &config.output {
            DebugOutput::Stderr => Sink::Stderr,
            DebugOutput::File(path) => Sink::File(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
        };
        Ok(Self { config, sink })
    }

    /// Whether a record with this target and level would be written
    pub fn accepts(&self, target: &str, level: log::Level) -> bool {
        if !self.config.enabled || level > self.config.level.to_filter() {
            return false;
        }
        match DebugCategory::from_target(target) {
            Some(category) => self.config.categories.contains(&category),
            // records from other crates are only shown when they are warnings or worse
            None => level <= log::Level::Warn,
        }
    }
}

impl log::Log for DebugLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.accepts(metadata.target(), metadata.level())
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let category = DebugCategory::from_target(record.target())
            .map(|c| format!("{c:?}"))
            .unwrap_or_else(|| record.target().to_string());
        let line = format!("[{}] {:10} {}", record.level(), category, record.args());

        match &self.sink {
            Sink::Stderr => eprintln!("{line}"),
            Sink::File(file) => {
                if let Ok(mut file) = file.lock() {
                    let _ = writeln!(file, "{line}");
                }
            }
        }
    }

    fn flush(&self) {
        if let Sink::File(file) = &self.sink
            && let Ok(mut file) = file.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Install a [`DebugLogger`] as the global logger. Does nothing when the
/// config is disabled or another logger is already installed.
pub fn init(config: DebugConfig) -> std::io::Result<()> {
    if !config.enabled {
        return Ok(());
    }
    let max_level = config.level.to_filter();
    let logger = Box::leak(Box::new(DebugLogger::new(config)?));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(max_level);
    }
    Ok(())
}
