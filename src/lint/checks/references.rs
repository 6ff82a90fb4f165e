//! Reference integrity checking implementation

use super::pages;
use crate::catalog::EventCatalog;
use crate::lint::config::LintConfig;
use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::types::command::{CommandKind, EventCommand};
use std::collections::HashSet;

/// Check jump targets and label definitions
pub fn check(catalog: &EventCatalog, result: &mut LintResult, config: &LintConfig) {
    for (event_id, page_index, page) in pages(catalog) {
        let labels = check_labels(&page.commands, event_id, page_index, result, config);

        for (index, cmd) in page.commands.iter().enumerate() {
            if cmd.kind() != CommandKind::JumpToLabel {
                continue;
            }
            let issue = match cmd.param_str("name") {
                Some(name) if labels.contains(name) => continue,
                Some(name) => format!("jump target '{}' is not defined on this page", name),
                None => "jump_to_label has no 'name'".to_string(),
            };
            result.add_issue(
                LintIssue::new(LintLevel::Error, "references", event_id, issue)
                    .at(page_index, Some(index)),
            );
        }
    }
}

/// Collect the page's label names, reporting duplicates
fn check_labels<'a>(
    commands: &'a [EventCommand],
    event_id: u32,
    page_index: usize,
    result: &mut LintResult,
    config: &LintConfig,
) -> HashSet<&'a str> {
    let mut labels = HashSet::new();
    for (index, cmd) in commands.iter().enumerate() {
        if cmd.kind() != CommandKind::Label {
            continue;
        }
        let Some(name) = cmd.param_str("name") else {
            result.add_issue(
                LintIssue::new(LintLevel::Warning, "references", event_id, "label has no 'name'")
                    .at(page_index, Some(index)),
            );
            continue;
        };
        if !labels.insert(name) && config.references.check_duplicate_labels {
            result.add_issue(
                LintIssue::new(
                    LintLevel::Warning,
                    "references",
                    event_id,
                    format!("label '{}' is defined more than once; jumps go to the first", name),
                )
                .at(page_index, Some(index)),
            );
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::GameEvent;
    use crate::types::page::{EventPage, TriggerKind};
    use serde_json::json;

    fn catalog(commands: Vec<EventCommand>) -> EventCatalog {
        let page = EventPage::new(TriggerKind::ActionButton).with_commands(commands);
        EventCatalog::new(1).with_event(GameEvent::new(4, "e", 0, 0).with_page(page))
    }

    fn jump(name: &str) -> EventCommand {
        EventCommand::with_params(CommandKind::JumpToLabel, 0, json!({ "name": name }))
    }

    fn label(name: &str) -> EventCommand {
        EventCommand::with_params(CommandKind::Label, 0, json!({ "name": name }))
    }

    #[test]
    fn references_check_missing_jump_target() {
        let catalog = catalog(vec![jump("nowhere"), label("somewhere")]);
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());

        assert_eq!(result.error_count, 1);
        assert_eq!(result.issues[0].event_id, 4);
        assert!(result.issues[0].message.contains("nowhere"));
    }

    #[test]
    fn references_check_backward_jump_is_ok() {
        let catalog = catalog(vec![label("top"), jump("top")]);
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());
        assert!(result.is_clean());
    }

    #[test]
    fn references_check_duplicate_label() {
        let catalog = catalog(vec![label("a"), label("a"), jump("a")]);
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());

        assert_eq!(result.warning_count, 1);
        assert!(result.issues[0].message.contains("more than once"));

        let mut config = LintConfig::default();
        config.references.check_duplicate_labels = false;
        let mut result = LintResult::new();
        check(&catalog, &mut result, &config);
        assert!(result.is_clean());
    }
}
