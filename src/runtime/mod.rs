//! Runtime execution engine for event pages
//!
//! Each running page is an [`Instance`] stepped once per frame. The
//! [`ExecutionEngine`] owns the single foreground instance and every
//! parallel one, and reports instances that ran to completion.
//!
//! Suspension points are exactly the wait timer and the message/choice
//! prompts; only `resume_message`/`resume_choice`/`resume_number` lift the
//! latter.

pub mod engine;
pub mod hooks;
pub mod instance;
pub mod params;
pub mod program;


pub use engine::{ExecutionEngine, FinishedEvent};
pub use hooks::{Acknowledgement, HeadlessPresentation, HookCall, Presentation};
pub use instance::{EndReason, Env, Instance, StepOutcome, WaitState};
pub use program::Program;
