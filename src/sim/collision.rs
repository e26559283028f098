//! Collision detection and response for axis-aligned bodies
//!
//! The heart of the game: deciding which face of a paddle or brick the ball
//! struck and pushing the ball back out of it.
//!
//! Face selection is the shallowest-penetration heuristic, not a swept test.
//! A ball fast enough to sink deeper than half a brick in one tick can be
//! classified against the wrong face; a swept-AABB time-of-impact solver would
//! fix that at the cost of reproducing different bounces.

use super::geom::{Rect, overlaps};
use super::state::{Ball, Brick, BrickKind};

/// Face of the target the ball is judged to have struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

impl Face {
    /// Order faces are compared in when depths tie
    pub const ORDER: [Face; 4] = [Face::Top, Face::Bottom, Face::Left, Face::Right];
}

/// Penetration depth of `ball` into `target` through each face
#[derive(Debug, Clone, Copy)]
pub struct Penetration {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Penetration {
    pub fn between(ball: &Rect, target: &Rect) -> Self {
        Self {
            left: ball.right() - target.left(),
            right: target.right() - ball.left(),
            top: ball.bottom() - target.top(),
            bottom: target.bottom() - ball.top(),
        }
    }

    pub fn depth(&self, face: Face) -> f32 {
        match face {
            Face::Top => self.top,
            Face::Bottom => self.bottom,
            Face::Left => self.left,
            Face::Right => self.right,
        }
    }

    pub fn min(&self) -> f32 {
        self.top.min(self.bottom).min(self.left).min(self.right)
    }

    /// Faces tied at the smallest penetration, in comparison order
    pub fn shallowest_faces(&self) -> impl Iterator<Item = Face> + '_ {
        let min = self.min();
        Face::ORDER.into_iter().filter(move |f| self.depth(*f) == min)
    }

    /// Face with the smallest penetration.
    ///
    /// Exact ties resolve to whichever is compared first: top, bottom, left, right.
    pub fn shallowest(&self) -> Face {
        self.shallowest_faces().next().unwrap_or(Face::Top)
    }
}

/// Outcome of resolving a ball against one brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickContact {
    /// No overlap (or brick already gone)
    None,
    /// Ball bounced, brick survived
    Hit { face: Face },
    /// Ball bounced and the brick broke
    Destroyed { face: Face },
    /// Breaker ball went straight through and broke the brick
    Shattered,
}

impl BrickContact {
    pub fn destroyed(&self) -> bool {
        matches!(self, BrickContact::Destroyed { .. } | BrickContact::Shattered)
    }
}

/// Put the ball just outside `target` on `face`, `margin` pixels clear
fn push_out(ball: &mut Ball, target: &Rect, face: Face, margin: f32) {
    let size = ball.size();
    match face {
        Face::Top => ball.rect.pos.y = target.top() - size - margin,
        Face::Bottom => ball.rect.pos.y = target.bottom() + margin,
        Face::Left => ball.rect.pos.x = target.left() - size - margin,
        Face::Right => ball.rect.pos.x = target.right() + margin,
    }
}

/// Flip the velocity component perpendicular to `face`
fn reflect(ball: &mut Ball, face: Face) {
    match face {
        Face::Top | Face::Bottom => ball.reverse_y(),
        Face::Left | Face::Right => ball.reverse_x(),
    }
}

/// True if the ball is travelling into `face` (not away from it)
fn moving_into(ball: &Ball, face: Face) -> bool {
    match face {
        Face::Top => ball.vel.y > 0.0,
        Face::Bottom => ball.vel.y < 0.0,
        Face::Left => ball.vel.x > 0.0,
        Face::Right => ball.vel.x < 0.0,
    }
}

/// Resolve a ball against the paddle.
///
/// Bounces off the first face, among those tied at the smallest penetration,
/// that the ball is moving into. If none qualifies the ball is only lifted out
/// of the shallowest face so it never rests inside the paddle. Returns the
/// face when the ball actually bounced.
pub fn ball_paddle_collision(ball: &mut Ball, paddle: &Rect, margin: f32) -> Option<Face> {
    if !overlaps(&ball.rect, paddle) {
        return None;
    }

    let pen = Penetration::between(&ball.rect, paddle);
    match pen.shallowest_faces().find(|f| moving_into(ball, *f)) {
        Some(face) => {
            reflect(ball, face);
            push_out(ball, paddle, face, margin);
            Some(face)
        }
        None => {
            push_out(ball, paddle, pen.shallowest(), margin);
            None
        }
    }
}

/// Resolve a ball against a brick, applying damage.
///
/// Breaker balls destroy any breakable brick they touch and keep their
/// velocity. Unbreakable bricks always bounce.
pub fn ball_brick_collision(ball: &mut Ball, brick: &mut Brick, margin: f32) -> BrickContact {
    if brick.destroyed || !overlaps(&ball.rect, &brick.rect) {
        return BrickContact::None;
    }

    if ball.breaker && brick.kind != BrickKind::Unbreakable {
        brick.shatter();
        return BrickContact::Shattered;
    }

    let face = Penetration::between(&ball.rect, &brick.rect).shallowest();
    reflect(ball, face);
    push_out(ball, &brick.rect, face, margin);

    if brick.hit() {
        BrickContact::Destroyed { face }
    } else {
        BrickContact::Hit { face }
    }
}

/// Bounce off the left, right and top walls. The bottom is open.
///
/// Unlike a plain reverse-on-contact wall, the bounce is gated on direction:
/// a ball at or past a wall but already heading back into the field keeps its
/// velocity, so one that overshot by more than a tick's travel can't get
/// stuck flipping. Returns true if the ball bounced.
pub fn ball_wall_collision(ball: &mut Ball, field_width: f32) -> bool {
    let mut hit = false;
    if (ball.rect.left() <= 0.0 && ball.vel.x < 0.0)
        || (ball.rect.right() >= field_width && ball.vel.x > 0.0)
    {
        ball.reverse_x();
        hit = true;
    }
    if ball.rect.top() <= 0.0 && ball.vel.y < 0.0 {
        ball.reverse_y();
        hit = true;
    }
    hit
}

/// Ball has dropped below the bottom of the field
#[inline]
pub fn ball_fell_out(ball: &Ball, field_height: f32) -> bool {
    ball.rect.top() > field_height
}
