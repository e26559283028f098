//! Brickfall - a classic brick-breaker simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collisions, power-ups, game state)
//! - `game`: Controller that owns a session and feeds the outside services
//! - `levels`: Brick layouts (text grids, seeded random generation, JSON packs)
//! - `audio` / `render`: Sinks the controller talks to; the sim never does
//! - `tuning` / `settings`: Data-driven game balance and player preferences
//! - `score`: High score table

pub mod audio;
pub mod error;
pub mod game;
pub mod levels;
pub mod render;
pub mod score;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::Error;
pub use game::Game;
pub use score::HighScores;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Gap between paddle bottom and field bottom
    pub const PADDLE_BOTTOM_OFFSET: f32 = 40.0;
    /// Horizontal displacement per tick
    pub const PADDLE_SPEED: f32 = 6.0;

    /// Ball defaults (velocity in pixels per tick)
    pub const BALL_SIZE: f32 = 10.0;
    pub const BALL_START_DX: f32 = 1.5;
    pub const BALL_START_DY: f32 = 1.5;

    /// Brick defaults
    pub const BRICK_WIDTH: f32 = 70.0;
    pub const BRICK_HEIGHT: f32 = 25.0;
    pub const BRICK_SPACING: f32 = 5.0;
    pub const BRICK_ORIGIN_X: f32 = 35.0;
    pub const BRICK_ORIGIN_Y: f32 = 50.0;
    pub const NORMAL_BRICK_POINTS: u32 = 100;
    pub const STRONG_BRICK_POINTS: u32 = 300;

    /// Pixels left between a repositioned ball and the body it hit
    pub const PADDLE_MARGIN: f32 = 5.0;
    pub const BRICK_MARGIN: f32 = 1.0;

    /// Power-up defaults
    pub const POWERUP_SIZE: f32 = 18.0;
    pub const POWERUP_FALL_SPEED: f32 = 1.0;
    pub const POWERUP_DROP_RATE: f64 = 0.4;
    pub const POWERUP_DURATION: f32 = 8.0;
    pub const BREAKER_DURATION: f32 = 6.0;
    pub const BIGGER_PADDLE_MULTIPLIER: f32 = 1.5;
    pub const FAST_BALL_MULTIPLIER: f32 = 1.8;

    /// Spare lives at session start
    pub const STARTING_LIVES: u8 = 3;
}

/// Unit vector for a heading in radians (screen space, y grows downward)
#[inline]
pub fn heading(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
