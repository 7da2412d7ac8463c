//! Terminal rendering module
//!
//! Draws `RenderSnapshot`s with crossterm. The simulation never calls into
//! this module.

pub mod frame;
pub mod terminal;

pub use frame::{Cell, Frame, compose};
pub use terminal::{TerminalGuard, TerminalRenderer};
