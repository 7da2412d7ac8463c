//! Data-driven game balance
//!
//! Every gameplay number the simulation uses lives here so a settings file
//! can rebalance the game without touching code.

use serde::{Deserialize, Serialize};

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Player speed (pixels per second)
    pub player_speed: f32,
    /// Pursuer speed gain per level, as a fraction of player speed
    pub pursuer_speed_step: f32,
    /// Pursuer speed ceiling, as a multiple of player speed
    pub pursuer_speed_cap: f32,

    pub pellet_reward: u64,
    pub power_reward: u64,
    /// First capture after a power pellet; each further capture doubles it
    pub capture_base_reward: u64,

    /// Seconds pursuers stay frightened after a power pellet
    pub frighten_secs: f32,
    /// Length of the death animation (seconds)
    pub dying_secs: f32,
    pub starting_lives: u8,
    /// Chebyshev distance (pixels) at which player and pursuer touch
    pub collision_radius: i32,

    /// Chance of picking the second-best direction while chasing
    pub chase_jitter: f64,
    /// Chance of picking the second-best direction while fleeing
    pub flee_jitter: f64,

    pub mouth_period_secs: f32,
    pub power_blink_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 24.0,
            pursuer_speed_step: 0.1,
            pursuer_speed_cap: 2.0,

            pellet_reward: 10,
            power_reward: 50,
            capture_base_reward: 200,

            frighten_secs: 10.5,
            dying_secs: 1.0,
            starting_lives: 3,
            collision_radius: 1,

            chase_jitter: 0.25,
            flee_jitter: 0.10,

            mouth_period_secs: 0.8,
            power_blink_secs: 1.3,
        }
    }
}

impl Tuning {
    /// Pursuer speed for a 1-based level
    pub fn pursuer_speed(&self, level: u32) -> f32 {
        let factor = 1.0 + self.pursuer_speed_step * level.saturating_sub(1) as f32;
        self.player_speed * factor.min(self.pursuer_speed_cap)
    }

    /// Points for the `chain`-th consecutive frightened capture (1-based)
    pub fn capture_reward(&self, chain: u32) -> u64 {
        let doublings = chain.saturating_sub(1).min(32);
        self.capture_base_reward.saturating_mul(1u64 << doublings)
    }

    /// Tie-break probability for the given pursuit mode
    pub fn jitter(&self, frightened: bool) -> f64 {
        if frightened {
            self.flee_jitter
        } else {
            self.chase_jitter
        }
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.player_speed.is_finite() && self.player_speed > 0.0) {
            log::warn!("Invalid player_speed {}, using default", self.player_speed);
            self.player_speed = defaults.player_speed;
        }
        if !(self.pursuer_speed_cap.is_finite() && self.pursuer_speed_cap >= 1.0) {
            self.pursuer_speed_cap = defaults.pursuer_speed_cap;
        }
        self.pursuer_speed_step = self.pursuer_speed_step.max(0.0);
        self.frighten_secs = self.frighten_secs.max(0.0);
        self.dying_secs = self.dying_secs.max(0.0);
        self.starting_lives = self.starting_lives.max(1);
        self.collision_radius = self.collision_radius.max(0);
        self.chase_jitter = self.chase_jitter.clamp(0.0, 1.0);
        self.flee_jitter = self.flee_jitter.clamp(0.0, 1.0);
        self.mouth_period_secs = self.mouth_period_secs.max(0.01);
        self.power_blink_secs = self.power_blink_secs.max(0.01);
        self
    }
}
