//! Platform layer
//!
//! Keyboard reading runs on its own thread and hands key presses to the
//! simulation loop through a message mailbox.

pub mod input;

pub use input::{HostInput, InputMailbox, InputSender, KeyAction, mailbox, spawn_keyboard_reader};
