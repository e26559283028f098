//! Data-driven game balance
//!
//! [`Tuning`] mirrors every default in [`crate::consts`]. A JSON document can
//! override any subset of fields; missing keys keep their defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::sim::PowerUpKind;

/// Balance values for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_bottom_offset: f32,
    pub paddle_speed: f32,

    // === Ball ===
    pub ball_size: f32,
    /// Pixels per tick, before the difficulty multiplier
    pub ball_start_velocity: Vec2,

    // === Bricks ===
    pub normal_points: u32,
    pub strong_points: u32,

    // === Collision ===
    pub paddle_margin: f32,
    pub brick_margin: f32,

    // === Power-ups ===
    pub powerup_size: f32,
    pub powerup_fall_speed: f32,
    /// Chance a broken brick drops something
    pub drop_rate: f64,
    pub bigger_paddle_duration: f32,
    pub faster_ball_duration: f32,
    pub breaker_ball_duration: f32,
    /// Zero: extra balls are instant and can be picked up back to back
    pub triple_ball_duration: f32,
    pub bigger_paddle_multiplier: f32,
    pub fast_ball_multiplier: f32,

    // === Session ===
    pub starting_lives: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_bottom_offset: PADDLE_BOTTOM_OFFSET,
            paddle_speed: PADDLE_SPEED,

            ball_size: BALL_SIZE,
            ball_start_velocity: Vec2::new(BALL_START_DX, BALL_START_DY),

            normal_points: NORMAL_BRICK_POINTS,
            strong_points: STRONG_BRICK_POINTS,

            paddle_margin: PADDLE_MARGIN,
            brick_margin: BRICK_MARGIN,

            powerup_size: POWERUP_SIZE,
            powerup_fall_speed: POWERUP_FALL_SPEED,
            drop_rate: POWERUP_DROP_RATE,
            bigger_paddle_duration: POWERUP_DURATION,
            faster_ball_duration: POWERUP_DURATION,
            breaker_ball_duration: BREAKER_DURATION,
            triple_ball_duration: 0.0,
            bigger_paddle_multiplier: BIGGER_PADDLE_MULTIPLIER,
            fast_ball_multiplier: FAST_BALL_MULTIPLIER,

            starting_lives: STARTING_LIVES,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Json {
            what: "tuning",
            source,
        })
    }

    /// Read a tuning file, falling back to defaults (with a warning) on any error
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(|source| Error::Io {
                path: path.display().to_string(),
                source,
            })
            .and_then(|json| Self::from_json(&json));

        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("{}; using default tuning", e);
                Self::default()
            }
        }
    }

    /// Effect duration in seconds for a power-up kind
    pub fn duration_for(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::BiggerPaddle => self.bigger_paddle_duration,
            PowerUpKind::FasterBall => self.faster_ball_duration,
            PowerUpKind::BreakerBall => self.breaker_ball_duration,
            PowerUpKind::TripleBall => self.triple_ball_duration,
        }
    }
}
