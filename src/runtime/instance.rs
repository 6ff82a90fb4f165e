//! One in-progress run of a page's program

use crate::error::{HookError, LogicError};
use crate::runtime::hooks::{Acknowledgement, HookCall, Presentation};
use crate::runtime::params::{self, AnswerTarget, BranchCondition};
use crate::runtime::program::Program;
use crate::types::command::{CommandFamily, CommandKind, EventCommand};
use crate::types::page::TriggerKind;
use crate::types::state::{GameState, SelfSwitchKey};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Collaborators an instance touches while dispatching a command
pub struct Env<'a> {
    pub state: &'a mut dyn GameState,
    pub hooks: &'a mut dyn Presentation,
    pub rng: &'a mut ChaCha8Rng,
}

/// Suspension state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Running,
    Timer,
    Message,
    Choice,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Timer {
    Frames(u32),
    Seconds(f32),
}

/// Why an instance stopped
#[derive(Debug, Clone, PartialEq)]
pub enum EndReason {
    /// Ran past its last command or hit `exit_event`
    Completed,
    /// `erase_event`: the event stays gone until the map is reloaded
    Erased,
    /// `jump_to_label` named a label that does not exist
    JumpFailed(LogicError),
    /// A collaborator hook failed
    Aborted(HookError),
}

/// What one call to [`Instance::advance`] did
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The wait timer consumed this frame
    Idle,
    /// Suspended on a message, choice or number prompt
    Waiting(WaitState),
    /// Exactly one command was dispatched
    Dispatched(CommandKind),
    Finished(EndReason),
}

/// An event page being executed
#[derive(Debug, Clone)]
pub struct Instance {
    map_id: u32,
    event_id: u32,
    page_index: usize,
    trigger: TriggerKind,
    program: Arc<Program>,
    pc: usize,
    timer: Option<Timer>,
    /// Indices of the loop commands whose bodies enclose `pc`
    loop_stack: Vec<usize>,
    wait: WaitState,
    ended: Option<EndReason>,
}

impl Instance {
    pub fn new(
        map_id: u32,
        event_id: u32,
        page_index: usize,
        trigger: TriggerKind,
        program: Arc<Program>,
    ) -> Self {
        Self {
            map_id,
            event_id,
            page_index,
            trigger,
            program,
            pc: 0,
            timer: None,
            loop_stack: Vec::new(),
            wait: WaitState::Running,
            ended: None,
        }
    }

    pub fn map_id(&self) -> u32 {
        self.map_id
    }

    pub fn event_id(&self) -> u32 {
        self.event_id
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_stack.len()
    }

    pub fn wait_state(&self) -> WaitState {
        if self.timer.is_some() {
            WaitState::Timer
        } else {
            self.wait
        }
    }

    /// Waiting for the presentation layer rather than for time to pass
    pub fn awaits_input(&self) -> bool {
        matches!(
            self.wait,
            WaitState::Message | WaitState::Choice | WaitState::Number
        )
    }

    /// Step the instance by one frame, dispatching at most one command
    pub fn advance(&mut self, dt: f32, env: &mut Env<'_>) -> StepOutcome {
        if let Some(timer) = self.timer {
            self.timer = match timer {
                Timer::Frames(n) if n > 1 => Some(Timer::Frames(n - 1)),
                Timer::Seconds(s) if s - dt > 0.0 => Some(Timer::Seconds(s - dt)),
                _ => None,
            };
            return StepOutcome::Idle;
        }

        if self.wait != WaitState::Running {
            return StepOutcome::Waiting(self.wait);
        }

        self.reenter_loop();
        if let Some(reason) = self.finish_reason() {
            return StepOutcome::Finished(reason);
        }

        let program = Arc::clone(&self.program);
        let index = self.pc;
        let Some(cmd) = program.get(index) else {
            return StepOutcome::Finished(EndReason::Completed);
        };

        log::trace!(
            target: "mapevent::engine",
            "[Engine] event {} executing pc={} {:?}",
            self.event_id,
            index,
            cmd.kind()
        );

        if let Err(err) = self.dispatch(index, cmd, env) {
            log::warn!(
                target: "mapevent::engine",
                "[Engine] event {} aborted at pc={}: {}",
                self.event_id,
                index,
                err
            );
            return StepOutcome::Finished(EndReason::Aborted(err));
        }

        match self.finish_reason() {
            Some(reason) => StepOutcome::Finished(reason),
            None => StepOutcome::Dispatched(cmd.kind()),
        }
    }

    /// Acknowledge a pending text box. No-op unless waiting on one.
    pub fn resume_message(&mut self) -> bool {
        if self.wait != WaitState::Message {
            return false;
        }
        self.wait = WaitState::Running;
        self.pc += 1;
        true
    }

    /// Deliver the selected choice index. No-op unless waiting on a choice
    /// or when the index is outside the offered choices.
    pub fn resume_choice(&mut self, index: usize, state: &mut dyn GameState) -> bool {
        if self.wait != WaitState::Choice {
            return false;
        }
        let target = self.answer_target();
        if !target.choices.is_empty() && index >= target.choices.len() {
            log::warn!(
                target: "mapevent::flow",
                "[Choice] event {} got index {} for {} choices",
                self.event_id,
                index,
                target.choices.len()
            );
            return false;
        }
        self.store_answer(&target, index as i64, state);
        self.wait = WaitState::Running;
        self.pc += 1;
        true
    }

    /// Deliver the number entered for `input_number`. No-op unless waiting on one.
    pub fn resume_number(&mut self, value: i64, state: &mut dyn GameState) -> bool {
        if self.wait != WaitState::Number {
            return false;
        }
        let target = self.answer_target();
        self.store_answer(&target, value, state);
        self.wait = WaitState::Running;
        self.pc += 1;
        true
    }

    fn answer_target(&self) -> AnswerTarget {
        self.program
            .get(self.pc)
            .and_then(|cmd| params::parse::<AnswerTarget>(cmd).ok())
            .unwrap_or_default()
    }

    fn store_answer(&self, target: &AnswerTarget, value: i64, state: &mut dyn GameState) {
        if let Some(variable_id) = target.variable_id {
            log::debug!(
                target: "mapevent::variables",
                "[Answer] event {} stores {} in variable {}",
                self.event_id,
                value,
                variable_id
            );
            state.set_variable(variable_id, value);
        }
    }

    fn finish_reason(&mut self) -> Option<EndReason> {
        if let Some(reason) = self.ended.take() {
            self.pc = self.program.len();
            self.loop_stack.clear();
            return Some(reason);
        }
        if self.pc >= self.program.len() && self.loop_stack.is_empty() {
            return Some(EndReason::Completed);
        }
        None
    }

    /// At the end of the innermost loop body, go back to its first command
    fn reenter_loop(&mut self) {
        if let Some(&start) = self.loop_stack.last()
            && self.pc >= self.program.block_end(start)
        {
            log::trace!(
                target: "mapevent::flow",
                "[Loop] event {} re-enters loop at pc={}",
                self.event_id,
                start
            );
            self.pc = start + 1;
        }
    }

    fn call<'c>(&self, index: usize, cmd: &'c EventCommand) -> HookCall<'c> {
        HookCall {
            map_id: self.map_id,
            event_id: self.event_id,
            index,
            kind: cmd.kind(),
            params: &cmd.parameters,
        }
    }

    fn logic_error(&self, index: usize, err: &LogicError) {
        log::warn!(
            target: "mapevent::engine",
            "[Engine] event {} pc={}: {} (skipped)",
            self.event_id,
            index,
            err
        );
    }

    fn dispatch(
        &mut self,
        index: usize,
        cmd: &EventCommand,
        env: &mut Env<'_>,
    ) -> Result<(), HookError> {
        match cmd.kind() {
            CommandKind::ShowText | CommandKind::ShowScrollingText => {
                match env.hooks.on_show_text(self.call(index, cmd))? {
                    Acknowledgement::Immediate => self.pc += 1,
                    Acknowledgement::Deferred => self.wait = WaitState::Message,
                }
            }
            CommandKind::ShowChoices => match env.hooks.on_show_choices(self.call(index, cmd))? {
                Some(choice) => {
                    self.wait = WaitState::Choice;
                    if !self.resume_choice(choice, env.state) {
                        log::debug!(
                            target: "mapevent::flow",
                            "[Choice] event {} waits for a valid answer",
                            self.event_id
                        );
                    }
                }
                None => self.wait = WaitState::Choice,
            },
            CommandKind::InputNumber => match env.hooks.on_input_number(self.call(index, cmd))? {
                Some(value) => {
                    self.wait = WaitState::Number;
                    self.resume_number(value, env.state);
                }
                None => self.wait = WaitState::Number,
            },
            CommandKind::Wait => {
                match params::parse::<params::Wait>(cmd) {
                    Ok(params::Wait {
                        frames: Some(frames),
                        ..
                    }) => {
                        self.timer = (frames > 0).then_some(Timer::Frames(frames));
                    }
                    Ok(params::Wait {
                        seconds: Some(seconds),
                        ..
                    }) => {
                        self.timer = (seconds > 0.0).then_some(Timer::Seconds(seconds));
                    }
                    Ok(_) => self.logic_error(
                        index,
                        &LogicError::malformed(cmd.kind(), "missing 'frames' or 'seconds'"),
                    ),
                    Err(err) => self.logic_error(index, &err),
                }
                self.pc += 1;
            }
            CommandKind::ConditionalBranch => self.branch(index, cmd, env.state),
            CommandKind::Loop => {
                if self.program.block_end(index) == index + 1 {
                    // an empty body would spin forever without dispatching anything
                    log::warn!(
                        target: "mapevent::flow",
                        "[Loop] event {} has an empty loop at pc={} (skipped)",
                        self.event_id,
                        index
                    );
                } else {
                    self.loop_stack.push(index);
                }
                self.pc += 1;
            }
            CommandKind::BreakLoop => match self.loop_stack.pop() {
                Some(start) => {
                    self.pc = self.program.block_end(start);
                    log::debug!(
                        target: "mapevent::flow",
                        "[Loop] event {} breaks loop at pc={} -> pc={}",
                        self.event_id,
                        start,
                        self.pc
                    );
                }
                None => {
                    self.logic_error(index, &LogicError::BreakOutsideLoop { index });
                    self.pc += 1;
                }
            },
            CommandKind::Label | CommandKind::Comment => self.pc += 1,
            CommandKind::JumpToLabel => self.jump(index, cmd),
            CommandKind::ExitEvent => self.ended = Some(EndReason::Completed),
            CommandKind::EraseEvent => self.ended = Some(EndReason::Erased),
            CommandKind::ControlSwitches => {
                self.control_switches(index, cmd, env.state);
                self.pc += 1;
            }
            CommandKind::ControlVariables => {
                self.control_variables(index, cmd, env);
                self.pc += 1;
            }
            CommandKind::ControlSelfSwitch => {
                match params::parse::<params::ControlSelfSwitch>(cmd) {
                    Ok(p) => env.state.set_self_switch(
                        SelfSwitchKey::new(self.map_id, self.event_id, p.self_switch),
                        p.value,
                    ),
                    Err(err) => self.logic_error(index, &err),
                }
                self.pc += 1;
            }
            CommandKind::ChangeGold => {
                match params::parse::<params::ChangeGold>(cmd) {
                    Ok(p) => env.state.gain_gold(p.amount),
                    Err(err) => self.logic_error(index, &err),
                }
                self.pc += 1;
            }
            CommandKind::ChangeItems => {
                match params::parse::<params::ChangeItems>(cmd) {
                    Ok(p) => env.state.gain_item(p.item_id, p.amount),
                    Err(err) => self.logic_error(index, &err),
                }
                self.pc += 1;
            }
            CommandKind::ChangePartyMember => {
                match params::parse::<params::ChangePartyMember>(cmd) {
                    Ok(p) => env.state.set_party_member(p.actor_id, p.join),
                    Err(err) => self.logic_error(index, &err),
                }
                self.pc += 1;
            }
            kind => {
                let call = self.call(index, cmd);
                match kind.family() {
                    CommandFamily::Movement => env.hooks.on_movement(call)?,
                    CommandFamily::Screen => env.hooks.on_screen_effect(call)?,
                    CommandFamily::Audio => env.hooks.on_audio(call)?,
                    CommandFamily::Party => env.hooks.on_party(call)?,
                    CommandFamily::Script => env.hooks.on_script(call)?,
                    CommandFamily::Message | CommandFamily::Flow | CommandFamily::State => {}
                }
                self.pc += 1;
            }
        }
        Ok(())
    }

    /// True: fall into the body. False (or unreadable): skip past it.
    fn branch(&mut self, index: usize, cmd: &EventCommand, state: &dyn GameState) {
        let result = BranchCondition::parse(cmd)
            .and_then(|condition| condition.evaluate(state, self.map_id, self.event_id));
        let taken = match result {
            Ok(taken) => taken,
            Err(err) => {
                self.logic_error(index, &err);
                false
            }
        };
        self.pc = if taken {
            index + 1
        } else {
            self.program.block_end(index)
        };
        log::debug!(
            target: "mapevent::flow",
            "[Branch] event {} pc={} condition {} -> pc={}",
            self.event_id,
            index,
            if taken { "TRUE" } else { "FALSE" },
            self.pc
        );
    }

    fn jump(&mut self, index: usize, cmd: &EventCommand) {
        let name = match params::parse::<params::LabelName>(cmd) {
            Ok(p) => p.name,
            Err(err) => {
                self.logic_error(index, &err);
                self.pc += 1;
                return;
            }
        };

        match self.program.label_index(&name) {
            Some(target) => {
                log::debug!(
                    target: "mapevent::flow",
                    "[Jump] event {} jumping from pc={} to pc={} (label={})",
                    self.event_id,
                    index,
                    target,
                    name
                );
                let program = &self.program;
                self.loop_stack
                    .retain(|&start| target > start && target < program.block_end(start));
                self.pc = target;
            }
            None => {
                let err = LogicError::missing_label(name);
                self.logic_error(index, &err);
                self.ended = Some(EndReason::JumpFailed(err));
            }
        }
    }

    fn control_switches(&self, index: usize, cmd: &EventCommand, state: &mut dyn GameState) {
        let parsed = params::parse::<params::ControlSwitches>(cmd)
            .and_then(|p| p.targets().map(|range| (range, p.value)));
        match parsed {
            Ok((range, value)) => {
                log::debug!(
                    target: "mapevent::variables",
                    "[Switch] event {} sets switches {:?} = {}",
                    self.event_id,
                    range,
                    value
                );
                for id in range {
                    state.set_switch(id, value);
                }
            }
            Err(err) => self.logic_error(index, &err),
        }
    }

    fn control_variables(&self, index: usize, cmd: &EventCommand, env: &mut Env<'_>) {
        let p = match params::parse::<params::ControlVariables>(cmd) {
            Ok(p) => p,
            Err(err) => return self.logic_error(index, &err),
        };
        let range = match p.targets() {
            Ok(range) => range,
            Err(err) => return self.logic_error(index, &err),
        };

        for id in range {
            let operand = p.operand.evaluate(&*env.state, &mut *env.rng);
            let current = env.state.variable(id);
            match p.operation.apply(id, current, operand) {
                Ok(value) => {
                    log::debug!(
                        target: "mapevent::variables",
                        "[Variable] event {} {:?} v{} {} : {} -> {}",
                        self.event_id,
                        p.operation,
                        id,
                        operand,
                        current,
                        value
                    );
                    env.state.set_variable(id, value);
                }
                Err(err) => self.logic_error(index, &err),
            }
        }
    }
}
