//! Brickfall headless driver
//!
//! Plays a run with an autopilot paddle and prints the outcome.
//!
//! ```text
//! brickfall [--seed N] [--difficulty easy|medium|hard] [--ticks N]
//!           [--levels pack.json] [--tuning tuning.json] [--settings settings.json]
//!           [--show]
//! ```

use std::path::PathBuf;

use brickfall::audio::LogAudio;
use brickfall::levels::{DefaultLevels, LevelLoader, LevelPack};
use brickfall::render::TextRaster;
use brickfall::score::format_score;
use brickfall::sim::{GamePhase, GameState, TickInput};
use brickfall::{Difficulty, Game, Settings, Tuning};

/// Command line options
struct Options {
    seed: u64,
    difficulty: Option<Difficulty>,
    ticks: u64,
    levels: Option<PathBuf>,
    tuning: Option<PathBuf>,
    settings: Option<PathBuf>,
    show: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 12345,
            difficulty: None,
            ticks: 60 * 60 * 5,
            levels: None,
            tuning: None,
            settings: None,
            show: false,
        }
    }
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or(format!("{} needs a value", name));
        match arg.as_str() {
            "--seed" => {
                options.seed = value("--seed")?
                    .parse()
                    .map_err(|e| format!("bad --seed: {}", e))?
            }
            "--ticks" => {
                options.ticks = value("--ticks")?
                    .parse()
                    .map_err(|e| format!("bad --ticks: {}", e))?
            }
            "--difficulty" => {
                let name = value("--difficulty")?;
                options.difficulty = Some(
                    Difficulty::from_str(&name).ok_or(format!("unknown difficulty '{}'", name))?,
                );
            }
            "--levels" => options.levels = Some(value("--levels")?.into()),
            "--tuning" => options.tuning = Some(value("--tuning")?.into()),
            "--settings" => options.settings = Some(value("--settings")?.into()),
            "--show" => options.show = true,
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    Ok(options)
}

/// Paddle input that chases the lowest ball heading down
fn autopilot(state: &GameState) -> TickInput {
    let target = state
        .balls
        .iter()
        .filter(|b| b.vel.y > 0.0)
        .max_by(|a, b| a.rect.pos.y.total_cmp(&b.rect.pos.y))
        .or_else(|| state.balls.first())
        .map(|b| b.rect.center().x);

    let mut input = TickInput::default();
    if let Some(x) = target {
        let paddle = state.paddle.rect.center().x;
        let dead_zone = state.paddle.rect.size.x / 4.0;
        input.move_left = x < paddle - dead_zone;
        input.move_right = x > paddle + dead_zone;
    }
    input
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("brickfall: {}", e);
            std::process::exit(2);
        }
    };

    let tuning = options
        .tuning
        .as_deref()
        .map(Tuning::load_or_default)
        .unwrap_or_default();
    let mut settings = options
        .settings
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();
    if let Some(difficulty) = options.difficulty {
        settings.difficulty = difficulty;
    }

    let levels: Box<dyn LevelLoader> = match options.levels.as_deref().map(LevelPack::from_file) {
        Some(Ok(pack)) => Box::new(pack),
        Some(Err(e)) => {
            log::warn!("{}; using built-in levels", e);
            Box::new(DefaultLevels::default())
        }
        None => Box::new(DefaultLevels::default()),
    };

    log::info!("Brickfall (headless) starting...");
    let audio = Box::new(LogAudio::new(&settings));
    let mut game = Game::new(options.seed, tuning, settings, levels, audio);

    let mut ticks = 0;
    while ticks < options.ticks && !game.phase().is_terminal() {
        let mut input = autopilot(game.state());
        if game.phase() == GamePhase::LevelTransition {
            input.advance_level = true;
        }
        game.step(&input);
        ticks += 1;
    }

    let state = game.state();
    if options.show {
        let mut raster = TextRaster::new(80, 30, state.tuning.field_width, state.tuning.field_height);
        game.render(&mut raster);
        println!("{}", raster);
    }

    println!(
        "{:?} after {} ticks: score {}, level {}/{}, lives {}",
        state.phase,
        ticks,
        format_score(state.score),
        state.level_index + 1,
        state.level_count,
        state.lives
    );
    if let Some(best) = game.high_scores().top_score() {
        println!("High score: {}", format_score(best));
    }
}
