//! Power-up drops, pickup effects and their timers
//!
//! Each kind has one timer in [`ActiveEffects`]. Picking up a kind whose timer
//! is still running only refreshes the timer; the effect is never stacked.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use super::geom::Rect;
use super::state::{Ball, GameEvent, GameState, PowerUp, PowerUpKind};

/// Split angles are drawn from these two bands (degrees) so a new ball never
/// heads off nearly horizontal.
const SPLIT_BANDS: [(f32, f32); 2] = [(15.0, 165.0), (195.0, 345.0)];

/// Roll for a drop at `center` (usually a just-destroyed brick).
///
/// Returns the kind that was spawned, if any.
pub fn maybe_spawn(state: &mut GameState, center: Vec2) -> Option<PowerUpKind> {
    if !state.rng.random_bool(state.tuning.drop_rate.clamp(0.0, 1.0)) {
        return None;
    }
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    spawn(state, kind, center);
    Some(kind)
}

/// Drop a power-up of `kind` centred on `center`
pub fn spawn(state: &mut GameState, kind: PowerUpKind, center: Vec2) {
    let size = state.tuning.powerup_size;
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        rect: Rect::square(center - Vec2::splat(size / 2.0), size),
        collected: false,
        fall_speed: state.tuning.powerup_fall_speed,
        duration: state.tuning.duration_for(kind),
    });
    state.events.push(GameEvent::PowerUpSpawned { kind });
}

/// Collect the first uncollected power-up touching the paddle.
///
/// At most one pickup is handled per tick, so when several overlap the paddle
/// together the earliest spawned wins and the rest wait for the next tick.
pub fn collect_one(state: &mut GameState) -> Option<PowerUpKind> {
    let paddle = state.paddle.rect;
    let index = state
        .power_ups
        .iter()
        .position(|p| !p.collected && p.rect.overlaps(&paddle))?;

    let (kind, duration) = {
        let pickup = &mut state.power_ups[index];
        pickup.collected = true;
        (pickup.kind, pickup.duration)
    };

    let applied = state.effects.remaining(kind) <= 0.0;
    if applied {
        apply(state, kind);
    }
    *state.effects.remaining_mut(kind) = duration;

    log::debug!("Collected {:?} (applied: {}, {:.1}s)", kind, applied, duration);
    state
        .events
        .push(GameEvent::PowerUpCollected { kind, applied });
    Some(kind)
}

/// Apply the effect of `kind` once
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::BiggerPaddle => {
            let mult = state.tuning.bigger_paddle_multiplier;
            let field_width = state.tuning.field_width;
            state.paddle.scale_width(mult, field_width);
        }
        PowerUpKind::FasterBall => {
            let mult = state.tuning.fast_ball_multiplier;
            for ball in state.balls.iter_mut() {
                ball.scale_speed(mult);
            }
        }
        PowerUpKind::BreakerBall => {
            for ball in state.balls.iter_mut() {
                ball.breaker = true;
            }
        }
        PowerUpKind::TripleBall => triple_ball(state),
    }
}

/// Undo the effect of `kind`
pub fn revert(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::BiggerPaddle => {
            let field_width = state.tuning.field_width;
            state.paddle.reset_width(field_width);
        }
        PowerUpKind::FasterBall => {
            for ball in state.balls.iter_mut() {
                ball.reset_speed();
            }
        }
        PowerUpKind::BreakerBall => {
            for ball in state.balls.iter_mut() {
                ball.breaker = false;
            }
        }
        // Extra balls stay in play
        PowerUpKind::TripleBall => {}
    }
}

/// Spawn two balls from the first active ball, same origin and speed, at
/// random headings.
pub fn triple_ball(state: &mut GameState) {
    let Some(parent) = state.balls.first().cloned() else {
        return;
    };
    let speed = parent.speed();
    for _ in 0..2 {
        let angle = split_angle(&mut state.rng);
        let id = state.next_entity_id();
        let mut ball = Ball::new(id, parent.rect.pos, parent.size(), crate::heading(angle) * speed);
        // Keep the parent's base so a running speed boost reverts these too
        ball.base_speed = parent.base_speed;
        ball.breaker = parent.breaker;
        state.balls.push(ball);
    }
}

/// Random heading in radians from one of the two [`SPLIT_BANDS`]
pub fn split_angle(rng: &mut impl Rng) -> f32 {
    let (lo, hi) = SPLIT_BANDS[rng.random_range(0..SPLIT_BANDS.len())];
    rng.random_range(lo..=hi) * PI / 180.0
}

/// Count timers down by `dt` seconds and revert any effect that runs out
pub fn advance_timers(state: &mut GameState, dt: f32) {
    for kind in PowerUpKind::ALL {
        let remaining = state.effects.remaining_mut(kind);
        if *remaining <= 0.0 {
            continue;
        }
        *remaining -= dt;
        if *remaining <= 0.0 {
            *remaining = 0.0;
            revert(state, kind);
            log::debug!("{:?} expired", kind);
            state.events.push(GameEvent::EffectExpired { kind });
        }
    }
}
