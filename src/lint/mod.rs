//! Lint module for event catalog checking
//!
//! Finds authoring mistakes the engine would otherwise only tolerate at
//! run time:
//! - Block structure (indent jumps, `break_loop` outside a loop)
//! - Reference integrity (jump targets, duplicate labels)
//! - Quality issues (empty choice lists, empty loops, events without pages)
//! - Flow analysis (loops without an exit, unreachable commands)

use crate::catalog::EventCatalog;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod checks;
pub mod config;

/// Lint severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LintLevel {
    /// Error: must be fixed
    Error,
    /// Warning: should be reviewed
    Warning,
    /// Info: for your information
    Info,
}

/// A lint issue found in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintIssue {
    pub level: LintLevel,
    pub message: String,
    pub event_id: u32,
    pub page_index: Option<usize>,
    pub command_index: Option<usize>,
    /// Name of the check that raised the issue
    pub category: String,
}

impl LintIssue {
    pub fn new(
        level: LintLevel,
        category: &str,
        event_id: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            event_id,
            page_index: None,
            command_index: None,
            category: category.to_string(),
        }
    }

    pub fn at(mut self, page_index: usize, command_index: Option<usize>) -> Self {
        self.page_index = Some(page_index);
        self.command_index = command_index;
        self
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [{}] event {}", self.level, self.category, self.event_id)?;
        if let Some(page) = self.page_index {
            write!(f, " page {page}")?;
        }
        if let Some(command) = self.command_index {
            write!(f, " command {command}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Result of linting a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            error_count: 0,
            warning_count: 0,
            info_count: 0,
        }
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.level {
            LintLevel::Error => self.error_count += 1,
            LintLevel::Warning => self.warning_count += 1,
            LintLevel::Info => self.info_count += 1,
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Default for LintResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Lint a catalog with default configuration
pub fn check(catalog: &EventCatalog) -> LintResult {
    let config = config::LintConfig::default();
    check_with_config(catalog, &config)
}

/// Lint a catalog with custom configuration
pub fn check_with_config(catalog: &EventCatalog, config: &config::LintConfig) -> LintResult {
    let mut result = LintResult::new();

    if config.structure.enabled {
        checks::structure::check(catalog, &mut result, config);
    }

    if config.references.enabled {
        checks::references::check(catalog, &mut result, config);
    }

    if config.quality.enabled {
        checks::quality::check(catalog, &mut result, config);
    }

    if config.flow.enabled {
        checks::flow::check(catalog, &mut result, config);
    }

    result
}
