//! Compiled page programs
//!
//! Indentation is only a hint in the authored data. Each page is compiled
//! once into a command list plus a jump table so dispatch never rescans
//! indent levels.

use crate::types::command::{CommandKind, EventCommand};
use std::collections::BTreeMap;

/// A page's command list with precomputed block boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    commands: Vec<EventCommand>,
    /// For branch and loop commands: index of the first command after the
    /// body. Other entries hold `index + 1`.
    block_ends: Vec<usize>,
    /// First occurrence of each label name
    labels: BTreeMap<String, usize>,
}

impl Program {
    pub fn compile(commands: Vec<EventCommand>) -> Self {
        let block_ends = Self::build_block_ends(&commands);
        let labels = Self::build_label_map(&commands);
        Self {
            commands,
            block_ends,
            labels,
        }
    }

    fn build_block_ends(commands: &[EventCommand]) -> Vec<usize> {
        let mut ends: Vec<usize> = (1..=commands.len()).collect();
        let mut open: Vec<(usize, u32)> = Vec::new();

        for (idx, cmd) in commands.iter().enumerate() {
            while let Some(&(opener, indent)) = open.last() {
                if cmd.indent > indent {
                    break;
                }
                ends[opener] = idx;
                open.pop();
            }
            if cmd.kind().opens_block() {
                open.push((idx, cmd.indent));
            }
        }
        for (opener, _) in open {
            ends[opener] = commands.len();
        }
        ends
    }

    fn build_label_map(commands: &[EventCommand]) -> BTreeMap<String, usize> {
        let mut labels = BTreeMap::new();
        for (idx, cmd) in commands.iter().enumerate() {
            if cmd.kind() == CommandKind::Label
                && let Some(name) = cmd.param_str("name")
            {
                labels.entry(name.to_string()).or_insert(idx);
            }
        }
        labels
    }

    pub fn commands(&self) -> &[EventCommand] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&EventCommand> {
        self.commands.get(index)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// First index past the body of the block opened at `index`
    pub fn block_end(&self, index: usize) -> usize {
        self.block_ends
            .get(index)
            .copied()
            .unwrap_or(self.commands.len())
    }

    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmd(kind: CommandKind, indent: u32) -> EventCommand {
        EventCommand::new(kind, indent)
    }

    #[test]
    fn branch_body_ends_at_first_shallower_command() {
        let program = Program::compile(vec![
            cmd(CommandKind::ConditionalBranch, 0),
            cmd(CommandKind::ShowText, 1),
            cmd(CommandKind::ControlSwitches, 1),
            cmd(CommandKind::PlaySe, 0),
        ]);
        assert_eq!(program.block_end(0), 3);
    }

    #[test]
    fn nested_blocks_close_together() {
        let program = Program::compile(vec![
            cmd(CommandKind::Loop, 0),
            cmd(CommandKind::ConditionalBranch, 1),
            cmd(CommandKind::BreakLoop, 2),
            cmd(CommandKind::ControlVariables, 1),
        ]);
        assert_eq!(program.block_end(0), 4);
        assert_eq!(program.block_end(1), 3);
    }

    #[test]
    fn block_at_end_of_page_runs_to_the_end() {
        let program = Program::compile(vec![
            cmd(CommandKind::ShowText, 0),
            cmd(CommandKind::ConditionalBranch, 0),
            cmd(CommandKind::ShowText, 1),
        ]);
        assert_eq!(program.block_end(1), 3);
    }

    #[test]
    fn empty_body_ends_immediately() {
        let program = Program::compile(vec![
            cmd(CommandKind::ConditionalBranch, 0),
            cmd(CommandKind::ConditionalBranch, 0),
        ]);
        assert_eq!(program.block_end(0), 1);
        assert_eq!(program.block_end(1), 2);
    }

    #[test]
    fn first_label_with_a_name_wins() {
        let program = Program::compile(vec![
            EventCommand::with_params(CommandKind::Label, 0, json!({"name": "top"})),
            EventCommand::with_params(CommandKind::Label, 0, json!({"name": "top"})),
            EventCommand::with_params(CommandKind::Label, 0, json!({"name": "end"})),
        ]);
        assert_eq!(program.label_index("top"), Some(0));
        assert_eq!(program.label_index("end"), Some(2));
        assert_eq!(program.label_index("missing"), None);
    }
}
