//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pursuer index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod maze;
pub mod motion;
pub mod state;
pub mod tick;

pub use ai::{PursuerSteer, choose_direction, legal_directions};
pub use collision::{Outcome, touching};
pub use maze::{CLASSIC_LAYOUT, EntityClass, MazeError, MazeModel, PelletLayout, Tile, TileKind};
pub use motion::{Dir, Latch, Mover, Steer, advance};
pub use state::{
    EntityView, GameEvent, GamePhase, GameState, Hud, Player, Pursuer, RenderSnapshot, Transition,
};
pub use tick::{TickInput, tick};
