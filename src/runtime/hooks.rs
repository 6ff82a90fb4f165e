//! Presentation collaborator hooks
//!
//! The engine never interprets the payload of presentation commands; it
//! hands the raw parameters to one hook per command occurrence.

use crate::error::HookResult;
use crate::types::command::{CommandKind, Parameters};

/// The command occurrence a hook is invoked for
#[derive(Debug, Clone, Copy)]
pub struct HookCall<'a> {
    pub map_id: u32,
    pub event_id: u32,
    pub index: usize,
    pub kind: CommandKind,
    pub params: &'a Parameters,
}

/// How a text box is acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// The instance waits until `resume_message` is called
    Deferred,
    /// Already acknowledged; the instance continues next frame
    Immediate,
}

/// Presentation collaborator.
///
/// Text and choice hooks must be implemented; the per-family hooks default
/// to doing nothing.
pub trait Presentation {
    fn on_show_text(&mut self, call: HookCall<'_>) -> HookResult<Acknowledgement>;

    /// `Some(index)` answers synchronously; `None` waits for `resume_choice`
    fn on_show_choices(&mut self, call: HookCall<'_>) -> HookResult<Option<usize>>;

    /// `Some(value)` answers synchronously; `None` waits for `resume_number`
    fn on_input_number(&mut self, _call: HookCall<'_>) -> HookResult<Option<i64>> {
        Ok(None)
    }

    fn on_movement(&mut self, _call: HookCall<'_>) -> HookResult<()> {
        Ok(())
    }

    fn on_screen_effect(&mut self, _call: HookCall<'_>) -> HookResult<()> {
        Ok(())
    }

    fn on_audio(&mut self, _call: HookCall<'_>) -> HookResult<()> {
        Ok(())
    }

    fn on_party(&mut self, _call: HookCall<'_>) -> HookResult<()> {
        Ok(())
    }

    fn on_script(&mut self, _call: HookCall<'_>) -> HookResult<()> {
        Ok(())
    }

    fn on_event_ended(&mut self, _map_id: u32, _event_id: u32) {}
}

/// Headless presentation: acknowledges text at once and picks the first choice
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPresentation;

impl Presentation for HeadlessPresentation {
    fn on_show_text(&mut self, _call: HookCall<'_>) -> HookResult<Acknowledgement> {
        Ok(Acknowledgement::Immediate)
    }

    fn on_show_choices(&mut self, _call: HookCall<'_>) -> HookResult<Option<usize>> {
        Ok(Some(0))
    }

    fn on_input_number(&mut self, _call: HookCall<'_>) -> HookResult<Option<i64>> {
        Ok(Some(0))
    }
}
