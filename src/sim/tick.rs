//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use std::sync::Arc;

use super::ai::PursuerSteer;
use super::collision::{self, Outcome};
use super::maze::{EntityClass, MazeModel};
use super::motion::{self, Dir, Latch};
use super::state::{GameEvent, GamePhase, GameState, Transition};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Menu select (enter)
    pub confirm: bool,
    /// Menu back (escape while paused)
    pub cancel: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Held direction, if any. Down beats up beats right beats left.
    pub fn direction(&self) -> Option<Dir> {
        if self.down {
            Some(Dir::Down)
        } else if self.up {
            Some(Dir::Up)
        } else if self.right {
            Some(Dir::Right)
        } else if self.left {
            Some(Dir::Left)
        } else {
            None
        }
    }

    /// Fold a newer snapshot into this one: held directions follow the newer
    /// snapshot, one-shot presses accumulate until consumed
    pub fn merge(&mut self, newer: &TickInput) {
        self.up = newer.up;
        self.down = newer.down;
        self.left = newer.left;
        self.right = newer.right;
        self.confirm |= newer.confirm;
        self.cancel |= newer.cancel;
        self.pause |= newer.pause;
    }

    /// Clear one-shot presses after a tick consumed them
    pub fn clear_edges(&mut self) {
        self.confirm = false;
        self.cancel = false;
        self.pause = false;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.set_paused(!state.paused);
    }
    // Paused: nothing moves, no timer runs
    if state.paused {
        return;
    }

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Waiting => {
            // Only a direction that is open at the start tile begins play
            let Some(dir) = input.direction().filter(|&dir| {
                state
                    .maze
                    .step(EntityClass::Player, state.player.mover.pos, dir)
                    .is_some()
            }) else {
                return;
            };
            state.player.desired = dir;
            state.player.mover.dir = dir;
            state.phase = state.phase.next(Transition::Start);
            log::debug!("Start moving {:?}", dir);
        }
        GamePhase::Dying => {
            state.dying_timer += dt;
            if state.dying_timer >= state.tuning.dying_secs {
                finish_dying(state);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    step_playing(state, input, dt);
}

fn step_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some(dir) = input.direction() {
        state.player.desired = dir;
    }
    state.play_time += dt;
    animate(state, dt);

    let maze: Arc<MazeModel> = Arc::clone(&state.maze);

    // Player first, so pursuers target where the player is now
    let mut latch = Latch {
        class: EntityClass::Player,
        desired: state.player.desired,
    };
    let visited = motion::advance(
        &mut state.player.mover,
        &maze,
        EntityClass::Player,
        state.tuning.player_speed,
        dt,
        &mut latch,
    );

    let target = state.player.mover.pos;
    let speed = state.tuning.pursuer_speed(state.level);
    for pursuer in &mut state.pursuers {
        let frightened = pursuer.is_frightened();
        let mut steer = PursuerSteer {
            target,
            frightened,
            jitter: state.tuning.jitter(frightened),
            rng: &mut state.rng,
        };
        motion::advance(
            &mut pursuer.mover,
            &maze,
            EntityClass::Pursuer,
            speed,
            dt,
            &mut steer,
        );
        pursuer.in_house = maze.is_house(maze.pixel_to_tile(pursuer.mover.pos));
    }

    let outcome = collision::resolve(state, &visited, dt);
    state.track_high_score();

    match outcome {
        Outcome::Continue => {}
        Outcome::LevelCleared => advance_level(state),
        Outcome::PlayerCaught { index } => {
            log::info!("Caught by pursuer {} on level {}", index, state.level);
            state.phase = state.phase.next(Transition::Caught);
            state.dying_timer = 0.0;
        }
    }
}

/// Cosmetic timers; they only run during unpaused play
fn animate(state: &mut GameState, dt: f32) {
    state.mouth_timer += dt;
    if state.mouth_timer >= state.tuning.mouth_period_secs {
        state.mouth_timer -= state.tuning.mouth_period_secs;
        state.player.mouth_open = !state.player.mouth_open;
    }
    state.blink_timer += dt;
    if state.blink_timer >= state.tuning.power_blink_secs {
        state.blink_timer -= state.tuning.power_blink_secs;
        state.power_visible = !state.power_visible;
    }
}

/// Next level: refill pellets, reset positions and lives
pub fn advance_level(state: &mut GameState) {
    state.level += 1;
    // Lives go back to the starting count on every level clear
    state.lives = state.tuning.starting_lives;
    state.reset_level();
    state.phase = state.phase.next(Transition::LevelCleared);
    state.events.push(GameEvent::LevelCleared { level: state.level });
    log::info!("Level {} (score {})", state.level, state.score);
}

/// End of the death animation: respawn or start over
fn finish_dying(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    if state.lives > 0 {
        state.reset_positions();
        state.phase = state.phase.next(Transition::Respawn);
        return;
    }

    log::info!("Game over: score {} on level {}", state.score, state.level);
    state.events.push(GameEvent::GameOver {
        score: state.score,
        level: state.level,
    });
    state.phase = state.phase.next(Transition::GameOver);
    state.start_new_game();
}
