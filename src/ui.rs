//! Pause menu
//!
//! Navigation is a pure function of the current selection and one command,
//! so the menu can be driven and tested without a terminal.

use serde::{Deserialize, Serialize};

use crate::sim::Dir;

/// Entries of the pause menu, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MenuItem {
    #[default]
    Resume,
    Restart,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Resume, MenuItem::Restart, MenuItem::Exit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Resume => "RESUME",
            MenuItem::Restart => "RESTART",
            MenuItem::Exit => "EXIT",
        }
    }

    fn index(self) -> usize {
        match self {
            MenuItem::Resume => 0,
            MenuItem::Restart => 1,
            MenuItem::Exit => 2,
        }
    }

    /// Item below, wrapping to the top
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Item above, wrapping to the bottom
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Up,
    Down,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Still open with this selection
    Stay(MenuItem),
    /// Closed by choosing this item
    Chosen(MenuItem),
}

pub fn navigate(selected: MenuItem, command: MenuCommand) -> MenuOutcome {
    match command {
        MenuCommand::Up => MenuOutcome::Stay(selected.prev()),
        MenuCommand::Down => MenuOutcome::Stay(selected.next()),
        MenuCommand::Confirm => MenuOutcome::Chosen(selected),
        // Backing out resumes play
        MenuCommand::Cancel => MenuOutcome::Chosen(MenuItem::Resume),
    }
}

/// Commands from one poll's presses, in order; confirm and cancel last
pub fn commands(presses: &[Dir], confirm: bool, cancel: bool) -> Vec<MenuCommand> {
    let mut out: Vec<MenuCommand> = presses
        .iter()
        .filter_map(|dir| match dir {
            Dir::Up => Some(MenuCommand::Up),
            Dir::Down => Some(MenuCommand::Down),
            _ => None,
        })
        .collect();
    if confirm {
        out.push(MenuCommand::Confirm);
    }
    if cancel {
        out.push(MenuCommand::Cancel);
    }
    out
}

/// Run `commands` from `selected`, stopping at the first choice
pub fn run_commands(selected: MenuItem, commands: &[MenuCommand]) -> MenuOutcome {
    let mut current = selected;
    for &command in commands {
        match navigate(current, command) {
            MenuOutcome::Stay(item) => current = item,
            chosen @ MenuOutcome::Chosen(_) => return chosen,
        }
    }
    MenuOutcome::Stay(current)
}
