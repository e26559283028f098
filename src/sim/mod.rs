//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod geom;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{BrickContact, Face, ball_brick_collision, ball_paddle_collision, ball_wall_collision};
pub use geom::{Rect, overlaps};
pub use state::{
    ActiveEffects, Ball, Brick, BrickKind, BrickTint, GameEvent, GamePhase, GameState, Paddle,
    PowerUp, PowerUpKind,
};
pub use tick::{TickInput, tick};
