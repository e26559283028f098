//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::settings::Difficulty;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused (tick is skipped entirely)
    Paused,
    /// Level cleared, waiting for input to load the next one
    LevelTransition,
    /// Out of lives
    GameOver,
    /// Final level cleared
    GameWon,
}

impl GamePhase {
    /// Run has ended; only a restart leaves this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::GameWon)
    }
}

/// A ball entity (square body, velocity in pixels per tick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub rect: Rect,
    pub vel: Vec2,
    /// Speed at creation; restored when a speed power-up expires
    pub base_speed: f32,
    /// Breaker mode (destroys breakable bricks without bouncing)
    pub breaker: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, size: f32, vel: Vec2) -> Self {
        Self {
            id,
            rect: Rect::square(pos, size),
            vel,
            base_speed: vel.length(),
            breaker: false,
        }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.rect.size.x
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Move by one tick of velocity
    pub fn advance(&mut self) {
        self.rect.pos += self.vel;
    }

    pub fn reverse_x(&mut self) {
        self.vel.x = -self.vel.x;
    }

    pub fn reverse_y(&mut self) {
        self.vel.y = -self.vel.y;
    }

    /// Scale current velocity (direction unchanged, base speed untouched)
    pub fn scale_speed(&mut self, mult: f32) {
        self.vel *= mult;
    }

    /// Restore `base_speed` along the current direction.
    ///
    /// A stationary ball has no direction to keep, so it is left alone.
    pub fn reset_speed(&mut self) {
        let current = self.speed();
        if current <= f32::EPSILON {
            return;
        }
        if (current - self.base_speed).abs() > 0.001 {
            self.vel = self.vel / current * self.base_speed;
        }
    }

    /// Replace velocity and adopt its magnitude as the new base speed
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
        self.base_speed = vel.length();
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
    /// Horizontal displacement per tick
    pub speed: f32,
    /// Width before any power-up (difficulty already applied)
    pub base_width: f32,
}

impl Paddle {
    pub fn new(rect: Rect, speed: f32) -> Self {
        Self {
            rect,
            speed,
            base_width: rect.size.x,
        }
    }

    /// Move from input and keep the paddle inside `[0, field_width - width]`
    pub fn update(&mut self, left: bool, right: bool, field_width: f32) {
        if left {
            self.rect.pos.x -= self.speed;
        }
        if right {
            self.rect.pos.x += self.speed;
        }
        self.clamp(field_width);
    }

    pub fn scale_width(&mut self, mult: f32, field_width: f32) {
        self.rect.size.x *= mult;
        self.clamp(field_width);
    }

    pub fn reset_width(&mut self, field_width: f32) {
        self.rect.size.x = self.base_width;
        self.clamp(field_width);
    }

    fn clamp(&mut self, field_width: f32) {
        let max_x = (field_width - self.rect.size.x).max(0.0);
        self.rect.pos.x = self.rect.pos.x.clamp(0.0, max_x);
    }
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickKind {
    /// Breaks on the first hit
    Normal,
    /// Takes 2 or 3 hits, re-tints as it weakens
    Strong,
    /// Never breaks, doesn't count for level clear
    Unbreakable,
}

/// Colour tier a renderer should use for a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickTint {
    Gray,
    Yellow,
    Orange,
    Red,
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub kind: BrickKind,
    pub rect: Rect,
    pub hits_required: u32,
    pub hits_taken: u32,
    pub points: u32,
    pub tint: BrickTint,
    pub destroyed: bool,
}

impl Brick {
    pub fn normal(rect: Rect, points: u32) -> Self {
        Self {
            kind: BrickKind::Normal,
            rect,
            hits_required: 1,
            hits_taken: 0,
            points,
            tint: BrickTint::Yellow,
            destroyed: false,
        }
    }

    /// Strong brick needing `hits_required` hits (clamped to 2..=3)
    pub fn strong(rect: Rect, hits_required: u32, points: u32) -> Self {
        let hits_required = hits_required.clamp(2, 3);
        Self {
            kind: BrickKind::Strong,
            rect,
            hits_required,
            hits_taken: 0,
            points,
            tint: Self::strong_tint(hits_required),
            destroyed: false,
        }
    }

    /// Strong brick with a coin flip between 2 and 3 hits
    pub fn strong_random(rect: Rect, points: u32, rng: &mut impl Rng) -> Self {
        let hits = if rng.random_bool(0.5) { 2 } else { 3 };
        Self::strong(rect, hits, points)
    }

    pub fn unbreakable(rect: Rect) -> Self {
        Self {
            kind: BrickKind::Unbreakable,
            rect,
            hits_required: u32::MAX,
            hits_taken: 0,
            points: 0,
            tint: BrickTint::Gray,
            destroyed: false,
        }
    }

    /// Tint of a strong brick with `remaining` hits left
    fn strong_tint(remaining: u32) -> BrickTint {
        match remaining {
            0 | 1 => BrickTint::Yellow,
            2 => BrickTint::Orange,
            _ => BrickTint::Red,
        }
    }

    /// Register one hit. Returns true only on the hit that destroys the brick.
    pub fn hit(&mut self) -> bool {
        if self.destroyed || self.kind == BrickKind::Unbreakable {
            return false;
        }
        self.hits_taken = (self.hits_taken + 1).min(self.hits_required);
        if self.kind == BrickKind::Strong {
            self.tint = Self::strong_tint(self.remaining_hits());
        }
        if self.hits_taken >= self.hits_required {
            self.destroyed = true;
            return true;
        }
        false
    }

    /// Destroy outright (breaker ball). Returns true if this call destroyed it.
    pub fn shatter(&mut self) -> bool {
        if self.destroyed || self.kind == BrickKind::Unbreakable {
            return false;
        }
        self.hits_taken = self.hits_required;
        self.destroyed = true;
        true
    }

    pub fn remaining_hits(&self) -> u32 {
        self.hits_required - self.hits_taken
    }

    /// Returns true if this brick must be destroyed to clear the level
    pub fn counts_for_clear(&self) -> bool {
        self.kind != BrickKind::Unbreakable
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    BiggerPaddle,
    FasterBall,
    BreakerBall,
    TripleBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::FasterBall,
        PowerUpKind::TripleBall,
        PowerUpKind::BiggerPaddle,
        PowerUpKind::BreakerBall,
    ];
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub rect: Rect,
    pub collected: bool,
    /// Pixels per tick
    pub fall_speed: f32,
    /// Seconds the effect lasts once collected
    pub duration: f32,
}

impl PowerUp {
    pub fn fall(&mut self) {
        self.rect.pos.y += self.fall_speed;
    }
}

/// Remaining seconds per timed effect (0 = inactive)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub bigger_paddle: f32,
    pub faster_ball: f32,
    pub breaker_ball: f32,
    pub triple_ball: f32,
}

impl ActiveEffects {
    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::BiggerPaddle => self.bigger_paddle,
            PowerUpKind::FasterBall => self.faster_ball,
            PowerUpKind::BreakerBall => self.breaker_ball,
            PowerUpKind::TripleBall => self.triple_ball,
        }
    }

    pub fn remaining_mut(&mut self, kind: PowerUpKind) -> &mut f32 {
        match kind {
            PowerUpKind::BiggerPaddle => &mut self.bigger_paddle,
            PowerUpKind::FasterBall => &mut self.faster_ball,
            PowerUpKind::BreakerBall => &mut self.breaker_ball,
            PowerUpKind::TripleBall => &mut self.triple_ball,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining(kind) > 0.0
    }
}

/// Something that happened during a tick, drained by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A brick took damage but survived
    BrickHit { index: usize },
    /// A brick was destroyed and its points awarded
    BrickDestroyed { index: usize, points: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    /// `applied` is false when the effect was already running and only its timer was refreshed
    PowerUpCollected { kind: PowerUpKind, applied: bool },
    EffectExpired { kind: PowerUpKind },
    /// Last ball fell and a spare life was used
    LifeLost { lives_left: u8 },
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG (drops, strong bricks, triple-ball angles)
    pub rng: Pcg32,
    /// Balance values this session was created with
    pub tuning: Tuning,
    pub difficulty: Difficulty,
    /// Current level (0-based)
    pub level_index: u32,
    /// Number of levels in the run
    pub level_count: u32,
    /// Spare lives
    pub lives: u8,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub paddle: Paddle,
    /// Active balls (insertion order is iteration order)
    pub balls: Vec<Ball>,
    /// Current layout; destroyed bricks stay in place with `destroyed` set
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with one ball at the field center and no bricks.
    ///
    /// Call [`GameState::begin_level`] with a layout before ticking.
    pub fn new(seed: u64, tuning: Tuning, difficulty: Difficulty, level_count: u32) -> Self {
        let paddle_width = tuning.paddle_width * difficulty.paddle_width_multiplier();
        let paddle = Paddle::new(
            Rect::new(
                tuning.field_width / 2.0 - paddle_width / 2.0,
                tuning.field_height - tuning.paddle_bottom_offset,
                paddle_width,
                tuning.paddle_height,
            ),
            tuning.paddle_speed,
        );

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            lives: tuning.starting_lives,
            tuning,
            difficulty,
            level_index: 0,
            level_count: level_count.max(1),
            score: 0,
            time_ticks: 0,
            phase: GamePhase::Playing,
            paddle,
            balls: Vec::new(),
            bricks: Vec::new(),
            power_ups: Vec::new(),
            effects: ActiveEffects::default(),
            events: Vec::new(),
            next_id: 1,
        };

        state.spawn_ball();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a fresh ball at the field center with the difficulty-scaled base velocity
    pub fn spawn_ball(&mut self) {
        let id = self.next_entity_id();
        let vel = self.tuning.ball_start_velocity * self.difficulty.ball_speed_multiplier();
        let pos = Vec2::new(self.tuning.field_width / 2.0, self.tuning.field_height / 2.0);
        self.balls.push(Ball::new(id, pos, self.tuning.ball_size, vel));
    }

    /// Install a level layout: one fresh ball, base paddle width, no pickups or effects
    pub fn begin_level(&mut self, level_index: u32, bricks: Vec<Brick>) {
        let breakable = bricks.iter().filter(|b| b.counts_for_clear()).count();
        if breakable == 0 {
            log::warn!(
                "Level {} has no breakable bricks; it cannot be cleared",
                level_index + 1
            );
        }
        log::info!(
            "Level {}/{}: {} bricks ({} breakable)",
            level_index + 1,
            self.level_count,
            bricks.len(),
            breakable
        );

        self.level_index = level_index;
        self.bricks = bricks;
        self.balls.clear();
        self.power_ups.clear();
        self.effects = ActiveEffects::default();
        self.paddle.reset_width(self.tuning.field_width);
        self.spawn_ball();
        self.set_phase(GamePhase::Playing);
    }

    /// Number of bricks still standing between the player and a level clear
    pub fn breakable_remaining(&self) -> usize {
        self.bricks
            .iter()
            .filter(|b| b.counts_for_clear() && !b.destroyed)
            .count()
    }

    /// True once every breakable brick is gone.
    ///
    /// A layout with nothing breakable never counts as cleared.
    pub fn level_cleared(&self) -> bool {
        let mut any_breakable = false;
        for brick in self.bricks.iter().filter(|b| b.counts_for_clear()) {
            any_breakable = true;
            if !brick.destroyed {
                return false;
            }
        }
        any_breakable
    }

    pub fn is_final_level(&self) -> bool {
        self.level_index + 1 >= self.level_count
    }

    /// Change phase, recording the transition
    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.events.push(GameEvent::PhaseChanged {
                from: self.phase,
                to: phase,
            });
            self.phase = phase;
        }
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
