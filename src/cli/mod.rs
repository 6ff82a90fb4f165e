//! Command line front ends

pub mod check;
pub mod play;
pub mod view_state;
