//! Quality checking implementation

use super::pages;
use crate::catalog::EventCatalog;
use crate::lint::config::LintConfig;
use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::types::command::{CommandKind, EventCommand};

/// Check quality issues (empty choices, empty loops, long waits, pageless events)
pub fn check(catalog: &EventCatalog, result: &mut LintResult, config: &LintConfig) {
    for event in catalog.events() {
        if event.pages.is_empty() {
            result.add_issue(LintIssue::new(
                LintLevel::Info,
                "quality",
                event.id,
                format!("event '{}' has no pages and never runs", event.name),
            ));
        }
    }

    for (event_id, page_index, page) in pages(catalog) {
        for (index, cmd) in page.commands.iter().enumerate() {
            let message = match cmd.kind() {
                CommandKind::ShowChoices => check_choices(cmd),
                CommandKind::Loop => check_loop_body(&page.commands, index),
                CommandKind::Wait => check_wait(cmd, config),
                _ => None,
            };
            if let Some((level, message)) = message {
                result.add_issue(
                    LintIssue::new(level, "quality", event_id, message).at(page_index, Some(index)),
                );
            }
        }
    }
}

fn check_choices(cmd: &EventCommand) -> Option<(LintLevel, String)> {
    let empty = cmd
        .parameters
        .get("choices")
        .and_then(|v| v.as_array())
        .is_none_or(|choices| choices.is_empty());
    empty.then(|| {
        (
            LintLevel::Warning,
            "show_choices offers no choices".to_string(),
        )
    })
}

fn check_loop_body(commands: &[EventCommand], index: usize) -> Option<(LintLevel, String)> {
    let indent = commands[index].indent;
    let has_body = commands
        .get(index + 1)
        .is_some_and(|next| next.indent > indent);
    (!has_body).then(|| {
        (
            LintLevel::Warning,
            "loop has an empty body and is skipped".to_string(),
        )
    })
}

fn check_wait(cmd: &EventCommand, config: &LintConfig) -> Option<(LintLevel, String)> {
    let frames = cmd.param_i64("frames")?;
    (frames > i64::from(config.quality.max_wait_frames)).then(|| {
        (
            LintLevel::Info,
            format!(
                "wait of {} frames (threshold: {})",
                frames, config.quality.max_wait_frames
            ),
        )
    })
}
