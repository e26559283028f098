//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. The update
//! order inside a tick is part of the game's behaviour and must not be
//! rearranged:
//!
//! 1. paddle moves from input
//! 2. every ball advances, every power-up falls
//! 3. walls and paddle, ball by ball
//! 4. bricks, ball by ball (a ball stops scanning once it breaks a brick)
//! 5. drops rolled at each broken brick
//! 6. at most one pickup collected
//! 7. collected pickups and lost balls/pickups pruned
//! 8. level clear / life loss evaluated
//! 9. effect timers count down and expire

use glam::Vec2;

use super::collision::{
    BrickContact, ball_brick_collision, ball_fell_out, ball_paddle_collision, ball_wall_collision,
};
use super::powerup;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held: move paddle left
    pub move_left: bool,
    /// Held: move paddle right
    pub move_right: bool,
    /// One-shot: pause toggle
    pub pause: bool,
    /// One-shot: load the next level from `LevelTransition` (handled by the controller)
    pub advance_level: bool,
    /// One-shot: start a new run after `GameOver`/`GameWon` (handled by the controller)
    pub restart: bool,
}

/// Advance the game state by one fixed timestep.
///
/// `dt` only drives effect timers; motion is in pixels per tick.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Paused => state.set_phase(GamePhase::Playing),
            _ => {}
        }
    }

    // Only an active game simulates
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let field_width = state.tuning.field_width;
    let field_height = state.tuning.field_height;

    // Update paddle position
    state
        .paddle
        .update(input.move_left, input.move_right, field_width);

    // Move everything
    for ball in state.balls.iter_mut() {
        ball.advance();
    }
    for pickup in state.power_ups.iter_mut() {
        pickup.fall();
    }

    // Walls, then paddle
    let paddle_rect = state.paddle.rect;
    let paddle_margin = state.tuning.paddle_margin;
    for ball in state.balls.iter_mut() {
        ball_wall_collision(ball, field_width);
        ball_paddle_collision(ball, &paddle_rect, paddle_margin);
    }

    // Bricks
    let brick_margin = state.tuning.brick_margin;
    let mut broken: Vec<usize> = Vec::new();
    for ball in state.balls.iter_mut() {
        for (index, brick) in state.bricks.iter_mut().enumerate() {
            let contact = ball_brick_collision(ball, brick, brick_margin);
            if contact.destroyed() {
                broken.push(index);
                break;
            }
            if let BrickContact::Hit { .. } = contact {
                state.events.push(GameEvent::BrickHit { index });
            }
        }
    }

    // Score broken bricks (deferred to avoid borrow issues) and roll drops
    for index in broken {
        let (points, center): (u32, Vec2) = {
            let brick = &state.bricks[index];
            (brick.points, brick.rect.center())
        };
        state.score += u64::from(points);
        state
            .events
            .push(GameEvent::BrickDestroyed { index, points });
        powerup::maybe_spawn(state, center);
    }

    // Pickups
    powerup::collect_one(state);

    // Prune collected pickups, and anything that left the field
    state
        .power_ups
        .retain(|p| !p.collected && p.rect.top() <= field_height);
    state.balls.retain(|b| !ball_fell_out(b, field_height));

    // Level clear wins over a simultaneous ball loss
    if state.level_cleared() {
        let next = if state.is_final_level() {
            GamePhase::GameWon
        } else {
            GamePhase::LevelTransition
        };
        state.set_phase(next);
    } else if state.balls.is_empty() {
        if state.lives > 0 {
            state.lives -= 1;
            state.spawn_ball();
            log::info!("Ball lost, {} lives left", state.lives);
            state.events.push(GameEvent::LifeLost {
                lives_left: state.lives,
            });
        } else {
            state.set_phase(GamePhase::GameOver);
        }
    }

    // Timed effects
    powerup::advance_timers(state, dt);
}
