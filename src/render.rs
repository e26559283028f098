//! Render snapshot and sinks
//!
//! [`sprites`] flattens a [`GameState`] into a draw list; a [`RenderSink`]
//! consumes it. [`TextRaster`] is the character-grid sink used by the
//! headless driver.

use std::fmt;

use crate::score::format_score;
use crate::sim::{BrickKind, BrickTint, GamePhase, GameState, PowerUpKind, Rect};

/// Colors for game elements
pub mod colors {
    pub const PADDLE: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BALL_BREAKER: [f32; 4] = [1.0, 0.3, 0.2, 1.0];
    pub const BRICK_GRAY: [f32; 4] = [0.5, 0.5, 0.55, 1.0];
    pub const BRICK_YELLOW: [f32; 4] = [0.95, 0.85, 0.3, 1.0];
    pub const BRICK_ORANGE: [f32; 4] = [1.0, 0.55, 0.15, 1.0];
    pub const BRICK_RED: [f32; 4] = [0.9, 0.2, 0.2, 1.0];
    pub const POWERUP_PADDLE: [f32; 4] = [0.3, 0.9, 0.5, 1.0];
    pub const POWERUP_FAST: [f32; 4] = [0.4, 0.7, 1.0, 1.0];
    pub const POWERUP_BREAKER: [f32; 4] = [1.0, 0.4, 0.2, 1.0];
    pub const POWERUP_TRIPLE: [f32; 4] = [0.8, 0.4, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}

/// What a sprite depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Brick { kind: BrickKind, tint: BrickTint },
    Paddle,
    Ball { breaker: bool },
    PowerUp(PowerUpKind),
}

impl SpriteKind {
    pub fn color(&self) -> [f32; 4] {
        match self {
            SpriteKind::Brick { tint, .. } => match tint {
                BrickTint::Gray => colors::BRICK_GRAY,
                BrickTint::Yellow => colors::BRICK_YELLOW,
                BrickTint::Orange => colors::BRICK_ORANGE,
                BrickTint::Red => colors::BRICK_RED,
            },
            SpriteKind::Paddle => colors::PADDLE,
            SpriteKind::Ball { breaker: false } => colors::BALL,
            SpriteKind::Ball { breaker: true } => colors::BALL_BREAKER,
            SpriteKind::PowerUp(kind) => match kind {
                PowerUpKind::BiggerPaddle => colors::POWERUP_PADDLE,
                PowerUpKind::FasterBall => colors::POWERUP_FAST,
                PowerUpKind::BreakerBall => colors::POWERUP_BREAKER,
                PowerUpKind::TripleBall => colors::POWERUP_TRIPLE,
            },
        }
    }

    /// Character used by [`TextRaster`]
    pub fn glyph(&self) -> char {
        match self {
            SpriteKind::Brick { tint, .. } => match tint {
                BrickTint::Gray => 'X',
                BrickTint::Yellow => '=',
                BrickTint::Orange => '+',
                BrickTint::Red => '#',
            },
            SpriteKind::Paddle => '-',
            SpriteKind::Ball { breaker: false } => 'o',
            SpriteKind::Ball { breaker: true } => '@',
            SpriteKind::PowerUp(kind) => match kind {
                PowerUpKind::BiggerPaddle => 'P',
                PowerUpKind::FasterBall => 'F',
                PowerUpKind::BreakerBall => 'B',
                PowerUpKind::TripleBall => 'T',
            },
        }
    }
}

/// One thing to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub rect: Rect,
    pub color: [f32; 4],
}

impl Sprite {
    fn new(kind: SpriteKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            color: kind.color(),
        }
    }
}

/// Numbers shown above the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub lives: u8,
    /// 1-based
    pub level: u32,
    pub level_count: u32,
    pub phase: GamePhase,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            lives: state.lives,
            level: state.level_index + 1,
            level_count: state.level_count,
            phase: state.phase,
        }
    }
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCORE {}  LIVES {}  LEVEL {}/{}",
            format_score(self.score),
            self.lives,
            self.level,
            self.level_count
        )?;
        match self.phase {
            GamePhase::Playing => Ok(()),
            GamePhase::Paused => write!(f, "  PAUSED"),
            GamePhase::LevelTransition => write!(f, "  LEVEL CLEAR"),
            GamePhase::GameOver => write!(f, "  GAME OVER"),
            GamePhase::GameWon => write!(f, "  YOU WIN"),
        }
    }
}

/// Draw list for the current state, back to front: bricks, paddle, power-ups, balls
pub fn sprites(state: &GameState) -> Vec<Sprite> {
    let mut out = Vec::with_capacity(state.bricks.len() + state.balls.len() + 1);

    for brick in state.bricks.iter().filter(|b| !b.destroyed) {
        out.push(Sprite::new(
            SpriteKind::Brick {
                kind: brick.kind,
                tint: brick.tint,
            },
            brick.rect,
        ));
    }

    out.push(Sprite::new(SpriteKind::Paddle, state.paddle.rect));

    for pickup in state.power_ups.iter().filter(|p| !p.collected) {
        out.push(Sprite::new(SpriteKind::PowerUp(pickup.kind), pickup.rect));
    }

    for ball in &state.balls {
        out.push(Sprite::new(
            SpriteKind::Ball {
                breaker: ball.breaker,
            },
            ball.rect,
        ));
    }

    out
}

/// Where the controller sends frames
pub trait RenderSink {
    fn draw(&mut self, sprites: &[Sprite], hud: &Hud);
}

/// Rasterises sprites onto a character grid
#[derive(Debug, Clone)]
pub struct TextRaster {
    cols: usize,
    rows: usize,
    cell: (f32, f32),
    cells: Vec<char>,
    hud: String,
}

impl TextRaster {
    /// Grid of `cols` x `rows` covering a `field_width` x `field_height` field
    pub fn new(cols: usize, rows: usize, field_width: f32, field_height: f32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell: (field_width / cols as f32, field_height / rows as f32),
            cells: vec![' '; cols * rows],
            hud: String::new(),
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    pub fn count(&self, glyph: char) -> usize {
        self.cells.iter().filter(|c| **c == glyph).count()
    }

    /// Cell span covered by `[lo, hi)` on an axis, at least one cell wide
    fn span(lo: f32, hi: f32, cell: f32, len: usize) -> Option<(usize, usize)> {
        if hi < 0.0 || cell <= 0.0 {
            return None;
        }
        let first = (lo.max(0.0) / cell).floor() as usize;
        if first >= len {
            return None;
        }
        let last = ((hi / cell).ceil() as usize).saturating_sub(1).clamp(first, len - 1);
        Some((first, last))
    }

    fn paint(&mut self, rect: &Rect, glyph: char) {
        let Some((c0, c1)) = Self::span(rect.left(), rect.right(), self.cell.0, self.cols) else {
            return;
        };
        let Some((r0, r1)) = Self::span(rect.top(), rect.bottom(), self.cell.1, self.rows) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.cells[row * self.cols + col] = glyph;
            }
        }
    }
}

impl RenderSink for TextRaster {
    fn draw(&mut self, sprites: &[Sprite], hud: &Hud) {
        self.cells.fill(' ');
        for sprite in sprites {
            self.paint(&sprite.rect, sprite.kind.glyph());
        }
        self.hud = hud.to_string();
    }
}

impl fmt::Display for TextRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.hud)?;
        let border: String = std::iter::repeat_n('-', self.cols + 2).collect();
        writeln!(f, "{}", border)?;
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().collect();
            writeln!(f, "|{}|", line)?;
        }
        write!(f, "{}", border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use crate::sim::Brick;
    use crate::sim::powerup;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn new_state() -> GameState {
        let mut state = GameState::new(9, Tuning::default(), Difficulty::Medium, 2);
        let mut strong = Brick::strong(Rect::new(110.0, 50.0, 70.0, 25.0), 3, 300);
        strong.hit();
        let mut gone = Brick::normal(Rect::new(185.0, 50.0, 70.0, 25.0), 100);
        gone.hit();
        state.begin_level(
            0,
            vec![
                Brick::normal(Rect::new(35.0, 50.0, 70.0, 25.0), 100),
                strong,
                gone,
                Brick::unbreakable(Rect::new(260.0, 50.0, 70.0, 25.0)),
            ],
        );
        state
    }

    #[test]
    fn test_sprite_list_order_and_filtering() {
        let mut state = new_state();
        powerup::spawn(&mut state, PowerUpKind::TripleBall, Vec2::new(400.0, 200.0));
        state.balls[0].breaker = true;

        let list = sprites(&state);
        // 3 standing bricks + paddle + pickup + ball
        assert_eq!(list.len(), 6);
        assert_eq!(
            list[1].kind,
            SpriteKind::Brick {
                kind: BrickKind::Strong,
                tint: BrickTint::Orange
            }
        );
        assert_eq!(list[3].kind, SpriteKind::Paddle);
        assert_eq!(list[4].kind, SpriteKind::PowerUp(PowerUpKind::TripleBall));
        assert_eq!(list[5].kind, SpriteKind::Ball { breaker: true });
        assert_eq!(list[5].color, colors::BALL_BREAKER);
    }

    #[test]
    fn test_text_raster() {
        let state = new_state();
        let mut raster = TextRaster::new(80, 60, 800.0, 600.0);
        raster.draw(&sprites(&state), &Hud::from_state(&state));

        // 10px cells: first brick covers columns 3..=10, rows 5..=7
        assert_eq!(raster.get(3, 5), Some('='));
        assert_eq!(raster.get(10, 7), Some('='));
        assert_eq!(raster.get(2, 5), Some(' '));
        assert_eq!(raster.get(12, 6), Some('+'));
        assert_eq!(raster.get(27, 6), Some('X'));
        // Ball at (400, 300) size 10
        assert_eq!(raster.get(40, 30), Some('o'));
        assert_eq!(raster.count('-'), 12 * 2);
        assert_eq!(raster.get(80, 0), None);

        let text = raster.to_string();
        assert!(text.starts_with("SCORE 000000  LIVES 3  LEVEL 1/2"));
        assert_eq!(text.lines().count(), 1 + 60 + 2);
    }

    #[test]
    fn test_offscreen_sprites_are_skipped() {
        let mut raster = TextRaster::new(10, 10, 100.0, 100.0);
        let sprite = Sprite::new(SpriteKind::Paddle, Rect::new(20.0, 150.0, 10.0, 10.0));
        let hud = Hud {
            score: 0,
            lives: 0,
            level: 1,
            level_count: 1,
            phase: GamePhase::GameOver,
        };
        raster.draw(&[sprite], &hud);
        assert_eq!(raster.count('-'), 0);
        assert!(raster.to_string().starts_with("SCORE 000000  LIVES 0  LEVEL 1/1  GAME OVER"));
    }
}
