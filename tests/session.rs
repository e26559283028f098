//! End-to-end scenarios through the public API

use brickfall::audio::NullAudio;
use brickfall::levels::{DefaultLevels, LevelGrid};
use brickfall::sim::{Ball, Brick, Face, GamePhase, Rect, TickInput, ball_paddle_collision};
use brickfall::{Difficulty, Game, Settings, Tuning};
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn new_game(levels: u32) -> Game {
    let mut tuning = Tuning::default();
    tuning.drop_rate = 0.0;
    Game::new(
        2024,
        tuning,
        Settings::with_difficulty(Difficulty::Medium),
        Box::new(DefaultLevels::new(levels)),
        Box::new(NullAudio),
    )
}

#[test]
fn ball_bounces_off_paddle_top() {
    let mut ball = Ball::new(1, Vec2::new(100.0, 100.0), 10.0, Vec2::new(0.0, 5.0));
    let paddle = Rect::new(50.0, 110.0, 150.0, 15.0);

    assert_eq!(ball_paddle_collision(&mut ball, &paddle, 5.0), Some(Face::Top));
    assert!(ball.vel.y < 0.0);
    assert!(ball.rect.pos.y <= 100.0);
}

#[test]
fn ball_bounces_off_paddle_in_play() {
    let mut game = new_game(1);
    let paddle = game.state().paddle.rect;
    {
        let ball = &mut game.state_mut().balls[0];
        ball.rect.pos = Vec2::new(paddle.center().x, paddle.top() - 12.0);
        ball.set_velocity(Vec2::new(0.0, 5.0));
    }

    game.step(&TickInput::default());

    let ball = &game.state().balls[0];
    assert!(ball.vel.y < 0.0);
    assert!(ball.rect.bottom() < paddle.top());
}

#[test]
fn last_ball_lost_uses_a_life_then_ends_the_game() {
    let mut game = new_game(1);
    game.state_mut().lives = 1;
    let field_height = game.state().tuning.field_height;
    let center = Vec2::new(
        game.state().tuning.field_width / 2.0,
        field_height / 2.0,
    );

    game.state_mut().balls[0].rect.pos.y = field_height + 1.0;
    game.step(&TickInput::default());

    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.state().lives, 0);
    assert_eq!(game.state().balls.len(), 1);
    assert_eq!(game.state().balls[0].rect.pos, center);

    game.state_mut().balls[0].rect.pos.y = field_height + 1.0;
    game.step(&TickInput::default());
    assert_eq!(game.phase(), GamePhase::GameOver);
}

#[test]
fn level_clears_with_only_unbreakable_left() {
    let mut game = new_game(2);
    let mut rng = Pcg32::seed_from_u64(1);
    let bricks = LevelGrid::parse("113").map(|g| g.bricks(&game.state().tuning, &mut rng));
    let mut bricks: Vec<Brick> = bricks.expect("valid grid");
    for brick in bricks.iter_mut() {
        brick.hit();
    }
    game.state_mut().bricks = bricks;

    game.step(&TickInput::default());
    assert_eq!(game.phase(), GamePhase::LevelTransition);

    // Next level comes in fresh
    game.step(&TickInput {
        advance_level: true,
        ..Default::default()
    });
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(game.state().level_index, 1);
    assert_eq!(game.state().balls.len(), 1);
    assert!(game.state().breakable_remaining() > 0);

    // Clearing the final level wins
    for brick in game.state_mut().bricks.iter_mut() {
        brick.shatter();
    }
    game.step(&TickInput::default());
    assert_eq!(game.phase(), GamePhase::GameWon);
}

#[test]
fn autopilot_style_run_is_reproducible() {
    let run = || {
        let mut game = new_game(3);
        for i in 0..3000u32 {
            let input = TickInput {
                move_left: i % 120 < 60,
                move_right: i % 120 >= 60,
                ..Default::default()
            };
            game.step(&input);
        }
        let state = game.state();
        (state.score, state.lives, state.time_ticks, state.phase)
    };
    assert_eq!(run(), run());
}
