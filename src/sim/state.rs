//! Game state and core simulation types
//!
//! One `GameState` owns everything that changes while playing. The maze is
//! shared read-only behind an `Arc`.

use std::collections::BTreeSet;
use std::sync::Arc;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::maze::{MazeModel, Tile};
use super::motion::{Dir, Mover};
use crate::consts::PURSUER_COUNT;
use crate::tuning::Tuning;

/// Top-level mode of play. Pausing is a separate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player parked on the start tile until a direction is pressed
    Waiting,
    /// Active gameplay
    Playing,
    /// Death animation; only the dying timer runs
    Dying,
}

/// Inputs to the phase table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First directional input
    Start,
    /// Touched a pursuer that was not frightened
    Caught,
    /// Every pellet and power pellet eaten
    LevelCleared,
    /// Dying finished with lives left
    Respawn,
    /// Dying finished with no lives left; a new game follows
    GameOver,
}

impl GamePhase {
    /// Phase after `transition`; transitions that do not apply leave it unchanged
    pub fn next(self, transition: Transition) -> Self {
        use GamePhase::*;
        match (self, transition) {
            (Waiting, Transition::Start) => Playing,
            (Playing, Transition::Caught) => Dying,
            (Playing, Transition::LevelCleared) => Playing,
            (Dying, Transition::Respawn) | (Dying, Transition::GameOver) => Waiting,
            (phase, _) => phase,
        }
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PelletEaten { tile: Tile },
    PowerPelletEaten { tile: Tile },
    PursuerCaptured { index: usize, points: u64 },
    PlayerCaught { index: usize },
    LifeLost { lives_left: u8 },
    LevelCleared { level: u32 },
    GameOver { score: u64, level: u32 },
    NewHighScore { score: u64 },
}

/// The player entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub mover: Mover,
    /// Buffered heading, latched at the next tile center where it is open
    pub desired: Dir,
    /// Cosmetic mouth phase
    pub mouth_open: bool,
}

/// A pursuer entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pursuer {
    pub mover: Mover,
    pub home: Tile,
    /// Seconds of fright left (0 = chasing)
    pub frightened: f32,
    /// Whether the pursuer currently stands inside the pen
    pub in_house: bool,
}

impl Pursuer {
    pub fn is_frightened(&self) -> bool {
        self.frightened > 0.0
    }

    /// Teleport back to the home tile, chasing again
    pub fn send_home(&mut self, maze: &MazeModel) {
        self.mover.place(maze.tile_center(self.home), Dir::Up);
        self.frightened = 0.0;
        self.in_house = true;
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub maze: Arc<MazeModel>,
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Drives pursuer tie-breaks
    pub rng: Pcg32,

    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    /// 1-based level number
    pub level: u32,
    /// Frightened captures since the last power pellet
    pub chain: u32,

    pub phase: GamePhase,
    /// Menu overlay; freezes every timer
    pub paused: bool,
    pub dying_timer: f32,
    /// Seconds spent in `Playing` this game
    pub play_time: f32,
    /// Simulation tick counter (unpaused ticks)
    pub time_ticks: u64,

    pub mouth_timer: f32,
    pub blink_timer: f32,
    pub power_visible: bool,

    pub player: Player,
    pub pursuers: [Pursuer; PURSUER_COUNT],
    pub pellets: BTreeSet<Tile>,
    pub power: BTreeSet<Tile>,

    /// Pending events for the host
    pub events: Vec<GameEvent>,
    /// Set once this game's score has passed the previous best
    record_announced: bool,
}

impl GameState {
    /// Create a new game on `maze`
    pub fn new(maze: Arc<MazeModel>, tuning: Tuning, seed: u64, high_score: u64) -> Self {
        let start = maze.tile_center(maze.player_start());
        let pursuers = std::array::from_fn(|i| {
            let home = maze.home(i);
            Pursuer {
                mover: Mover::new(maze.tile_center(home), Dir::Up),
                home,
                frightened: 0.0,
                in_house: true,
            }
        });
        let mut state = Self {
            maze,
            lives: tuning.starting_lives,
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            high_score,
            level: 1,
            chain: 0,
            phase: GamePhase::Waiting,
            paused: false,
            dying_timer: 0.0,
            play_time: 0.0,
            time_ticks: 0,
            mouth_timer: 0.0,
            blink_timer: 0.0,
            power_visible: true,
            player: Player {
                mover: Mover::new(start, Dir::Left),
                desired: Dir::Left,
                mouth_open: true,
            },
            pursuers,
            pellets: BTreeSet::new(),
            power: BTreeSet::new(),
            events: Vec::new(),
            record_announced: false,
        };
        state.reset_level();
        state
    }

    /// Fresh pellets and entity positions for the current level
    pub fn reset_level(&mut self) {
        let layout = self.maze.pellet_layout();
        self.pellets = layout.pellets;
        self.power = layout.power;
        self.reset_positions();
    }

    /// Player to the start tile, pursuers home, fright and chain cleared
    pub fn reset_positions(&mut self) {
        let start = self.maze.tile_center(self.maze.player_start());
        self.player.mover.place(start, Dir::Left);
        self.player.desired = Dir::Left;
        for pursuer in &mut self.pursuers {
            pursuer.send_home(&self.maze);
        }
        self.chain = 0;
        self.dying_timer = 0.0;
    }

    /// Start over at level 1, keeping the high score and the RNG stream
    pub fn start_new_game(&mut self) {
        self.high_score = self.high_score.max(self.score);
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.level = 1;
        self.play_time = 0.0;
        self.phase = GamePhase::Waiting;
        self.record_announced = false;
        self.reset_level();
    }

    /// Menu restart: same as a new game, but also leaves the pause overlay
    pub fn restart(&mut self) {
        self.start_new_game();
        self.paused = false;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::debug!("Paused: {}", paused);
        }
        self.paused = paused;
    }

    /// Record a score increase against the live high score
    pub fn track_high_score(&mut self) {
        if self.score > self.high_score {
            if !self.record_announced {
                self.record_announced = true;
                self.events.push(GameEvent::NewHighScore { score: self.score });
            }
            self.high_score = self.score;
        }
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn maze(&self) -> &MazeModel {
        &self.maze
    }

    /// Owned view of everything a renderer needs
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            pellets: self.pellets.iter().copied().collect(),
            power: self.power.iter().copied().collect(),
            power_visible: self.power_visible,
            player: EntityView {
                pos: self.player.mover.pos,
                tile: self.maze.pixel_to_tile(self.player.mover.pos),
                facing: self.player.mover.dir,
                frightened: false,
                in_house: false,
                mouth_open: self.player.mouth_open,
            },
            pursuers: self
                .pursuers
                .iter()
                .map(|p| EntityView {
                    pos: p.mover.pos,
                    tile: self.maze.pixel_to_tile(p.mover.pos),
                    facing: p.mover.dir,
                    frightened: p.is_frightened(),
                    in_house: p.in_house,
                    mouth_open: false,
                })
                .collect(),
            hud: Hud {
                score: self.score,
                high_score: self.high_score,
                lives: self.lives,
                level: self.level,
                play_secs: self.play_time as u32,
            },
            phase: self.phase,
            paused: self.paused,
        }
    }
}

/// Drawable state of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub pos: IVec2,
    pub tile: Tile,
    pub facing: Dir,
    pub frightened: bool,
    /// Still inside the pursuer house
    pub in_house: bool,
    pub mouth_open: bool,
}

/// HUD scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    pub level: u32,
    pub play_secs: u32,
}

/// What the core hands to a renderer each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub pellets: Vec<Tile>,
    pub power: Vec<Tile>,
    pub power_visible: bool,
    pub player: EntityView,
    pub pursuers: Vec<EntityView>,
    pub hud: Hud,
    pub phase: GamePhase,
    pub paused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        let maze = Arc::new(MazeModel::classic().expect("classic layout parses"));
        GameState::new(maze, Tuning::default(), 12345, 0)
    }

    #[test]
    fn test_new_state_layout() {
        let state = new_state();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.power.len(), 4);
        assert!(!state.pellets.is_empty());
        assert_eq!(
            state.player.mover.pos,
            state.maze.tile_center(state.maze.player_start())
        );
        for (i, p) in state.pursuers.iter().enumerate() {
            assert_eq!(p.mover.pos, state.maze.tile_center(state.maze.home(i)));
            assert!(!p.is_frightened());
        }
    }

    #[test]
    fn test_phase_table() {
        use GamePhase::*;
        assert_eq!(Waiting.next(Transition::Start), Playing);
        assert_eq!(Playing.next(Transition::Caught), Dying);
        assert_eq!(Playing.next(Transition::LevelCleared), Playing);
        assert_eq!(Dying.next(Transition::Respawn), Waiting);
        assert_eq!(Dying.next(Transition::GameOver), Waiting);
        // Not applicable: unchanged
        assert_eq!(Waiting.next(Transition::Caught), Waiting);
        assert_eq!(Dying.next(Transition::Start), Dying);
    }

    #[test]
    fn test_high_score_announced_once() {
        let mut state = new_state();
        state.high_score = 100;
        state.score = 150;
        state.track_high_score();
        state.score = 170;
        state.track_high_score();
        assert_eq!(state.high_score, 170);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::NewHighScore { score: 150 }]
        );
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut state = new_state();
        state.score = 900;
        state.level = 4;
        state.lives = 1;
        state.paused = true;
        state.restart();
        assert_eq!(state.high_score, 900);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert!(!state.paused);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = new_state();
        state.pursuers[2].frightened = 3.0;
        let snap = state.snapshot();
        assert_eq!(snap.pursuers.len(), PURSUER_COUNT);
        assert!(snap.pursuers[2].frightened);
        assert!(!snap.pursuers[0].frightened);
        assert_eq!(snap.player.tile, state.maze.player_start());
        assert_eq!(snap.pellets.len(), state.pellets.len());
        let json = serde_json::to_string(&snap).expect("snapshot serializes");
        assert!(json.contains("\"high_score\":0"));
    }
}
