//! Terminal player for event catalogs
//!
//! Walks a player around a loaded map, feeding each input into the
//! [`EventDirector`] and printing text boxes, choices and effects.

use crate::catalog::EventCatalog;
use crate::cli::view_state::{RenderDelta, ViewState, clear_screen, render_delta};
use crate::config::EngineConfig;
use crate::debug::{self, DebugConfig, LogLevel};
use crate::director::{EventDirector, FrameReport};
use crate::error::HookResult;
use crate::runtime::hooks::{Acknowledgement, HookCall, Presentation};
use crate::types::command::{CommandKind, Parameters};
use crate::types::context::{Direction, TriggerContext};
use crate::types::state::GameData;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{self, Write};

/// Frames run for one input while a foreground event is busy
const MAX_FRAMES_PER_INPUT: usize = 600;
const FRAME_DELTA: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    pub debug: bool,
    /// Starting tile of the player
    pub start: (i32, i32),
    pub config: EngineConfig,
}

/// A prompt the player has to answer before play continues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Message,
    Choice { count: usize },
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub event_id: u32,
    pub prompt: Prompt,
}

/// Presentation that prints to the terminal and defers every prompt
#[derive(Debug, Default)]
pub struct TerminalPresentation {
    view: ViewState,
    pending: VecDeque<Pending>,
    transfer: Option<(i32, i32)>,
    debug: bool,
}

impl TerminalPresentation {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Default::default()
        }
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending.front().copied()
    }

    fn answered(&mut self) {
        self.pending.pop_front();
    }

    fn effect(&mut self, call: HookCall<'_>) -> HookResult<()> {
        let delta: RenderDelta = self.view.apply(&call);
        render_delta(&delta);
        Ok(())
    }
}

/// `speaker: text`, where text is a string or a list of lines
pub fn format_text(params: &Parameters) -> String {
    let text = match params.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(lines)) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    };
    match params.get("speaker").and_then(Value::as_str) {
        Some(speaker) => format!("{}:\n{}", speaker, text),
        None => text,
    }
}

/// Labels of a `show_choices` command
pub fn choice_labels(params: &Parameters) -> Vec<String> {
    params
        .get("choices")
        .and_then(Value::as_array)
        .map(|choices| {
            choices
                .iter()
                .map(|c| match c {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Presentation for TerminalPresentation {
    fn on_show_text(&mut self, call: HookCall<'_>) -> HookResult<Acknowledgement> {
        println!();
        println!("{}", format_text(call.params));
        self.pending.push_back(Pending {
            event_id: call.event_id,
            prompt: Prompt::Message,
        });
        Ok(Acknowledgement::Deferred)
    }

    fn on_show_choices(&mut self, call: HookCall<'_>) -> HookResult<Option<usize>> {
        let labels = choice_labels(call.params);
        println!("--- Choice ---");
        for (i, label) in labels.iter().enumerate() {
            println!("{}. {}", i + 1, label);
        }
        if labels.is_empty() {
            // nothing to pick from
            return Ok(Some(0));
        }
        self.pending.push_back(Pending {
            event_id: call.event_id,
            prompt: Prompt::Choice {
                count: labels.len(),
            },
        });
        Ok(None)
    }

    fn on_input_number(&mut self, call: HookCall<'_>) -> HookResult<Option<i64>> {
        if let Some(digits) = call.params.get("digits").and_then(Value::as_u64) {
            println!("(enter up to {} digits)", digits);
        }
        self.pending.push_back(Pending {
            event_id: call.event_id,
            prompt: Prompt::Number,
        });
        Ok(None)
    }

    fn on_movement(&mut self, call: HookCall<'_>) -> HookResult<()> {
        if call.kind == CommandKind::TransferPlayer {
            let x = call.params.get("x").and_then(Value::as_i64);
            let y = call.params.get("y").and_then(Value::as_i64);
            let map_id = call.params.get("map_id").and_then(Value::as_u64);
            if map_id.is_some_and(|id| id != u64::from(call.map_id)) {
                println!("  [transfer to another map is not supported here]");
            } else if let (Some(x), Some(y)) = (x, y) {
                self.transfer = Some((x as i32, y as i32));
                println!("  [Transfer: ({}, {})]", x, y);
            }
            return Ok(());
        }
        self.effect(call)
    }

    fn on_screen_effect(&mut self, call: HookCall<'_>) -> HookResult<()> {
        self.effect(call)
    }

    fn on_audio(&mut self, call: HookCall<'_>) -> HookResult<()> {
        self.effect(call)
    }

    fn on_party(&mut self, call: HookCall<'_>) -> HookResult<()> {
        self.effect(call)
    }

    fn on_script(&mut self, call: HookCall<'_>) -> HookResult<()> {
        self.effect(call)
    }

    fn on_event_ended(&mut self, _map_id: u32, event_id: u32) {
        // prompts of a finished event can no longer be answered
        self.pending.retain(|p| p.event_id != event_id);
        if self.debug {
            println!("[debug] event {} ended", event_id);
        }
    }
}

/// One line of player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    Action,
    /// Empty line: advance a frame or acknowledge text
    Frame,
    Answer(i64),
    Quit,
    Unknown,
}

pub fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Frame,
        "w" => Input::Move(Direction::Up),
        "a" => Input::Move(Direction::Left),
        "s" => Input::Move(Direction::Down),
        "d" => Input::Move(Direction::Right),
        "e" => Input::Action,
        "q" => Input::Quit,
        other => other.parse().map_or(Input::Unknown, Input::Answer),
    }
}

#[derive(Debug, Clone, Copy)]
struct Player {
    x: i32,
    y: i32,
    direction: Direction,
}

impl Player {
    fn context(&self, map_id: u32, action: bool) -> TriggerContext {
        let ctx = TriggerContext::new(map_id, self.x, self.y, self.direction).with_delta(FRAME_DELTA);
        if action { ctx.with_action() } else { ctx }
    }
}

/// Run the player mode
pub fn run_play(catalog_json: &str, options: PlayOptions) -> anyhow::Result<()> {
    if options.debug {
        debug::init(DebugConfig::verbose(LogLevel::Debug))?;
    } else if options.config.debug.enabled {
        debug::init(options.config.debug.clone())?;
    }

    let report = EventCatalog::from_json_str(catalog_json)?;
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    let map_id = report.catalog.map_id();

    let mut director = EventDirector::new(report.catalog, options.config);
    let mut state = GameData::new();
    let mut hooks = TerminalPresentation::new(options.debug);
    let mut player = Player {
        x: options.start.0,
        y: options.start.1,
        direction: Direction::Down,
    };

    clear_screen();
    println!("=== mapevent player: map {} ===", map_id);
    println!();
    println!("Controls:");
    println!("  w/a/s/d: move");
    println!("  e:       action button");
    println!("  Enter:   next frame / close text");
    println!("  1-9:     select choice");
    println!("  q:       quit");
    println!();

    run_frames(&mut director, &mut player, map_id, false, &mut state, &mut hooks);

    loop {
        if options.debug {
            display_debug_info(&state);
        }

        let pending = hooks.pending();
        let prompt = match pending.map(|p| p.prompt) {
            Some(Prompt::Message) => String::new(),
            Some(Prompt::Choice { count }) => format!("Select (1-{}):", count),
            Some(Prompt::Number) => "Number:".to_string(),
            None => format!("({}, {}) {:?} >", player.x, player.y, player.direction),
        };

        let mut action = false;
        match (pending, parse_input(&get_input(&prompt)?)) {
            (_, Input::Quit) => {
                println!("Goodbye!");
                return Ok(());
            }
            (
                Some(Pending {
                    event_id,
                    prompt: Prompt::Message,
                }),
                Input::Frame,
            ) => {
                director.resume_message(event_id);
                hooks.answered();
            }
            (
                Some(Pending {
                    event_id,
                    prompt: Prompt::Choice { count },
                }),
                Input::Answer(n),
            ) if n >= 1 && n as usize <= count => {
                director.resume_choice(event_id, n as usize - 1, &mut state);
                hooks.answered();
            }
            (
                Some(Pending {
                    event_id,
                    prompt: Prompt::Number,
                }),
                Input::Answer(n),
            ) => {
                director.resume_number(event_id, n, &mut state);
                hooks.answered();
            }
            (Some(_), _) => {
                println!("Answer the prompt first.");
                continue;
            }
            (None, Input::Move(direction)) => {
                player.direction = direction;
                if !director.engine().has_blocking_event() {
                    let (dx, dy) = direction.offset();
                    player.x += dx;
                    player.y += dy;
                }
            }
            (None, Input::Action) => action = true,
            (None, Input::Frame) => {}
            (None, Input::Answer(_) | Input::Unknown) => {
                println!("Use w/a/s/d, e, Enter or q.");
                continue;
            }
        }

        run_frames(&mut director, &mut player, map_id, action, &mut state, &mut hooks);
    }
}

/// Run frames until a prompt is pending or no foreground event is busy
fn run_frames(
    director: &mut EventDirector,
    player: &mut Player,
    map_id: u32,
    action: bool,
    state: &mut GameData,
    hooks: &mut TerminalPresentation,
) {
    for frame in 0..MAX_FRAMES_PER_INPUT {
        let ctx = player.context(map_id, action && frame == 0);
        let report = director.update(&ctx, state, hooks);
        if hooks.debug {
            display_frame_report(&report);
        }
        if let Some((x, y)) = hooks.transfer.take() {
            player.x = x;
            player.y = y;
        }
        if hooks.pending().is_some() || !director.engine().has_blocking_event() {
            break;
        }
    }
}

fn display_frame_report(report: &FrameReport) {
    for started in &report.started {
        println!(
            "[debug] started event {} page {} ({:?})",
            started.event_id, started.page_index, started.trigger
        );
    }
    for (request, err) in &report.rejected {
        println!("[debug] event {} rejected: {}", request.event_id, err);
    }
}

/// Display debug information (only when --debug is set)
fn display_debug_info(state: &GameData) {
    let switches = serde_json::to_string(&state.switches).unwrap_or_else(|_| "{}".to_string());
    let variables = serde_json::to_string(&state.variables).unwrap_or_else(|_| "{}".to_string());
    println!("[debug] switches={} variables={} gold={}", switches, variables, state.gold);
}

/// Get user input with an optional prompt
fn get_input(prompt: &str) -> io::Result<String> {
    if !prompt.is_empty() {
        print!("{} ", prompt);
        io::stdout().flush()?;
    }

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
