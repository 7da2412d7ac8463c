//! Maze Chase - a tile-maze arcade chase game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, motion, pursuer AI, scoring, game state)
//! - `renderer`: Terminal rendering of simulation snapshots
//! - `platform`: Input mailbox and keyboard reader
//! - `persistence`: High-score storage
//! - `highscores`: When to write the high score
//! - `settings`: Host configuration file
//! - `tuning`: Data-driven game balance
//! - `ui`: Pause menu navigation

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use highscores::HighScoreKeeper;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Default simulation rate (ticks per second)
    pub const DEFAULT_TICK_HZ: u32 = 50;
    /// Fixed timestep at the default rate (seconds)
    pub const SIM_DT: f32 = 1.0 / DEFAULT_TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real-time gap fed into the accumulator in one frame (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Pixel width of one maze tile
    pub const CELL_W: i32 = 4;
    /// Pixel height of one maze tile
    pub const CELL_H: i32 = 2;
    /// Pixel offset of the maze's top-left corner
    pub const ORIGIN_X: i32 = 0;
    pub const ORIGIN_Y: i32 = 1;

    /// Number of pursuers in the maze
    pub const PURSUER_COUNT: usize = 4;
}
