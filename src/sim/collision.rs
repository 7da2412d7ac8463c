//! Collision and scoring
//!
//! Runs once per playing tick after every entity has moved: fright timers,
//! pellets along the player's path, then player/pursuer contacts.

use glam::IVec2;

use super::maze::Tile;
use super::state::{GameEvent, GameState, Pursuer};

/// What the rest of the tick has to do after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Both pellet sets are empty
    LevelCleared,
    /// A chasing pursuer touched the player
    PlayerCaught { index: usize },
}

/// Chebyshev overlap test on pixel positions
pub fn touching(a: IVec2, b: IVec2, radius: i32) -> bool {
    (a - b).abs().max_element() <= radius
}

/// Count fright timers down, clamping at zero
pub fn tick_frightened(pursuers: &mut [Pursuer], dt: f32) {
    for pursuer in pursuers {
        if pursuer.frightened > 0.0 {
            pursuer.frightened = (pursuer.frightened - dt).max(0.0);
        }
    }
}

/// Frighten every pursuer for `secs`, restarting timers already running
pub fn frighten_all(pursuers: &mut [Pursuer], secs: f32) {
    for pursuer in pursuers {
        pursuer.frightened = secs;
    }
}

/// Eat whatever lies on the tile centers the player passed this tick
pub fn consume_pellets(state: &mut GameState, visited: &[Tile]) {
    for &tile in visited {
        if state.pellets.remove(&tile) {
            state.score += state.tuning.pellet_reward;
            state.events.push(GameEvent::PelletEaten { tile });
        }
        if state.power.remove(&tile) {
            state.score += state.tuning.power_reward;
            state.chain = 0;
            frighten_all(&mut state.pursuers, state.tuning.frighten_secs);
            state.events.push(GameEvent::PowerPelletEaten { tile });
            log::debug!("Power pellet at ({}, {})", tile.col, tile.row);
        }
    }
}

/// Resolve contacts in pursuer index order. Frightened pursuers are
/// captured; the first chasing one ends the scan.
pub fn resolve_contacts(state: &mut GameState) -> Outcome {
    let player = state.player.mover.pos;
    let radius = state.tuning.collision_radius;

    for (index, pursuer) in state.pursuers.iter_mut().enumerate() {
        if !touching(player, pursuer.mover.pos, radius) {
            continue;
        }
        if pursuer.is_frightened() {
            state.chain += 1;
            let points = state.tuning.capture_reward(state.chain);
            state.score += points;
            pursuer.send_home(&state.maze);
            state.events.push(GameEvent::PursuerCaptured { index, points });
            log::debug!("Captured pursuer {} for {} (chain {})", index, points, state.chain);
        } else {
            state.events.push(GameEvent::PlayerCaught { index });
            return Outcome::PlayerCaught { index };
        }
    }
    Outcome::Continue
}

/// Full resolution pass for one tick. Clearing the last pellet wins over a
/// contact in the same tick.
pub fn resolve(state: &mut GameState, visited: &[Tile], dt: f32) -> Outcome {
    tick_frightened(&mut state.pursuers, dt);
    consume_pellets(state, visited);
    if state.pellets.is_empty() && state.power.is_empty() {
        return Outcome::LevelCleared;
    }
    resolve_contacts(state)
}
