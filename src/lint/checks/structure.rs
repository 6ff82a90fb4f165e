//! Block structure checking implementation

use super::pages;
use crate::catalog::EventCatalog;
use crate::lint::config::LintConfig;
use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::types::command::{CommandKind, EventCommand};

/// Check indent nesting and loop structure
pub fn check(catalog: &EventCatalog, result: &mut LintResult, config: &LintConfig) {
    for (event_id, page_index, page) in pages(catalog) {
        if config.structure.check_indent {
            check_indent(&page.commands, event_id, page_index, result);
        }
        check_break_placement(&page.commands, event_id, page_index, result);
    }
}

fn check_indent(commands: &[EventCommand], event_id: u32, page_index: usize, result: &mut LintResult) {
    let mut previous = 0u32;
    for (index, cmd) in commands.iter().enumerate() {
        if cmd.indent.saturating_sub(previous) > 1 {
            result.add_issue(
                LintIssue::new(
                    LintLevel::Warning,
                    "structure",
                    event_id,
                    format!(
                        "indent jumps from {} to {}; the block structure may not be what was intended",
                        previous, cmd.indent
                    ),
                )
                .at(page_index, Some(index)),
            );
        }
        previous = cmd.indent;
    }
}

fn check_break_placement(
    commands: &[EventCommand],
    event_id: u32,
    page_index: usize,
    result: &mut LintResult,
) {
    // indents of the loops enclosing the current command
    let mut loops: Vec<u32> = Vec::new();
    for (index, cmd) in commands.iter().enumerate() {
        while loops.last().is_some_and(|&indent| cmd.indent <= indent) {
            loops.pop();
        }
        match cmd.kind() {
            CommandKind::Loop => loops.push(cmd.indent),
            CommandKind::BreakLoop if loops.is_empty() => result.add_issue(
                LintIssue::new(
                    LintLevel::Warning,
                    "structure",
                    event_id,
                    "break_loop outside of any loop does nothing",
                )
                .at(page_index, Some(index)),
            ),
            _ => {}
        }
    }
}
