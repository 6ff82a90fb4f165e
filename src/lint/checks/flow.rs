//! Flow analysis implementation

use super::pages;
use crate::catalog::EventCatalog;
use crate::lint::config::LintConfig;
use crate::lint::{LintIssue, LintLevel, LintResult};
use crate::runtime::program::Program;
use crate::types::command::{CommandKind, EventCommand};

/// Check flow issues (unreachable commands, loops without exit)
pub fn check(catalog: &EventCatalog, result: &mut LintResult, config: &LintConfig) {
    for (event_id, page_index, page) in pages(catalog) {
        if config.flow.check_unreachable {
            check_unreachable_code(&page.commands, event_id, page_index, result);
        }
        if config.flow.check_infinite_loops
            && let Some(program) = catalog.program(event_id, page_index)
        {
            check_potential_infinite_loops(&program, event_id, page_index, result);
        }
    }
}

/// Commands following an unconditional exit at the same level are dead
/// until a label or the end of the enclosing block
fn check_unreachable_code(
    commands: &[EventCommand],
    event_id: u32,
    page_index: usize,
    result: &mut LintResult,
) {
    for (index, cmd) in commands.iter().enumerate() {
        if !matches!(
            cmd.kind(),
            CommandKind::ExitEvent | CommandKind::EraseEvent | CommandKind::JumpToLabel
        ) {
            continue;
        }
        let Some(next) = commands.get(index + 1) else {
            continue;
        };
        if next.indent < cmd.indent || next.kind() == CommandKind::Label {
            continue;
        }
        result.add_issue(
            LintIssue::new(
                LintLevel::Warning,
                "flow",
                event_id,
                format!(
                    "unreachable {} after {}",
                    next.kind().tag(),
                    cmd.kind().tag()
                ),
            )
            .at(page_index, Some(index + 1)),
        );
    }
}

/// A loop whose body has no break, exit, erase or jump never ends
fn check_potential_infinite_loops(
    program: &Program,
    event_id: u32,
    page_index: usize,
    result: &mut LintResult,
) {
    let commands = program.commands();
    for (index, cmd) in commands.iter().enumerate() {
        if cmd.kind() != CommandKind::Loop {
            continue;
        }
        let body = &commands[index + 1..program.block_end(index)];
        if body.is_empty() {
            continue;
        }
        let has_exit = body.iter().any(|c| {
            matches!(
                c.kind(),
                CommandKind::BreakLoop
                    | CommandKind::ExitEvent
                    | CommandKind::EraseEvent
                    | CommandKind::JumpToLabel
            )
        });
        if !has_exit {
            result.add_issue(
                LintIssue::new(
                    LintLevel::Warning,
                    "flow",
                    event_id,
                    "potential infinite loop: the body never breaks or exits",
                )
                .at(page_index, Some(index)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::GameEvent;
    use crate::types::page::{EventPage, TriggerKind};
    use serde_json::json;

    fn catalog(trigger: TriggerKind, commands: Vec<EventCommand>) -> EventCatalog {
        let page = EventPage::new(trigger).with_commands(commands);
        EventCatalog::new(1).with_event(GameEvent::new(1, "e", 0, 0).with_page(page))
    }

    #[test]
    fn flow_check_no_issues_in_simple_page() {
        let catalog = catalog(
            TriggerKind::ActionButton,
            vec![EventCommand::with_params(
                CommandKind::ShowText,
                0,
                json!({"text": "Hello!"}),
            )],
        );
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());
        assert!(result.is_clean());
    }

    #[test]
    fn flow_check_unreachable_code_after_exit() {
        let catalog = catalog(
            TriggerKind::ActionButton,
            vec![
                EventCommand::new(CommandKind::ConditionalBranch, 0),
                EventCommand::new(CommandKind::ExitEvent, 1),
                EventCommand::new(CommandKind::PlaySe, 0),
                EventCommand::new(CommandKind::ExitEvent, 0),
                EventCommand::new(CommandKind::PlayBgm, 0),
            ],
        );
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());

        assert_eq!(result.warning_count, 1);
        assert_eq!(result.issues[0].command_index, Some(4));
        assert!(result.issues[0].message.contains("unreachable play_bgm"));
    }

    #[test]
    fn flow_check_infinite_loop_detection() {
        let catalog = catalog(
            TriggerKind::Parallel,
            vec![
                EventCommand::new(CommandKind::Loop, 0),
                EventCommand::with_params(CommandKind::Wait, 1, json!({"frames": 60})),
                EventCommand::new(CommandKind::PlaySe, 1),
            ],
        );
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());

        assert_eq!(result.warning_count, 1);
        assert!(result.issues[0].message.contains("infinite loop"));
    }

    #[test]
    fn flow_check_loop_body_matches_compiled_block() {
        let catalog = catalog(
            TriggerKind::Parallel,
            vec![
                EventCommand::new(CommandKind::Loop, 0),
                EventCommand::new(CommandKind::PlaySe, 1),
                EventCommand::new(CommandKind::BreakLoop, 0),
            ],
        );
        assert_eq!(catalog.program(1, 0).unwrap().block_end(0), 2);

        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());

        assert_eq!(result.warning_count, 1);
        assert_eq!(result.issues[0].command_index, Some(0));
        assert!(result.issues[0].message.contains("infinite loop"));
    }

    #[test]
    fn flow_check_conditional_break_is_ok() {
        let catalog = catalog(
            TriggerKind::Autorun,
            vec![
                EventCommand::new(CommandKind::Loop, 0),
                EventCommand::new(CommandKind::ConditionalBranch, 1),
                EventCommand::new(CommandKind::BreakLoop, 2),
                EventCommand::new(CommandKind::PlaySe, 1),
                EventCommand::new(CommandKind::PlayBgm, 0),
            ],
        );
        let mut result = LintResult::new();
        check(&catalog, &mut result, &LintConfig::default());
        assert!(result.is_clean());
    }
}
