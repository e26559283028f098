//! Session controller
//!
//! Owns the [`GameState`] plus the services injected at construction (audio
//! sink, level loader). Runs ticks, handles the one-shot commands the pure
//! tick can't (next level, restart), and routes the tick's events to audio
//! and the score board.

use crate::audio::{AudioSink, Music, SoundEffect};
use crate::consts::SIM_DT;
use crate::levels::LevelLoader;
use crate::render::{Hud, RenderSink, sprites};
use crate::score::{HighScores, ScoreEntry};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Most ticks run for a single [`Game::update`] call
pub const MAX_SUBSTEPS: u32 = 8;

/// Seed step between consecutive runs of one game
const RUN_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// A playable game: session state plus its services
pub struct Game {
    state: GameState,
    audio: Box<dyn AudioSink>,
    levels: Box<dyn LevelLoader>,
    tuning: Tuning,
    settings: Settings,
    high_scores: HighScores,
    accumulator: f32,
    /// Input carried between frames until a tick consumes its one-shots
    input: TickInput,
}

impl Game {
    /// Start a run at level 1
    pub fn new(
        seed: u64,
        tuning: Tuning,
        settings: Settings,
        levels: Box<dyn LevelLoader>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        let state = Self::new_session(seed, &tuning, &settings, levels.as_ref());
        let mut game = Self {
            state,
            audio,
            levels,
            tuning,
            settings,
            high_scores: HighScores::new(),
            accumulator: 0.0,
            input: TickInput::default(),
        };
        game.audio.start_music(Music::MainTheme);
        game
    }

    fn new_session(
        seed: u64,
        tuning: &Tuning,
        settings: &Settings,
        levels: &dyn LevelLoader,
    ) -> GameState {
        let difficulty = settings.difficulty;
        let level_count = levels.level_count(difficulty);
        log::info!(
            "New run: seed {}, {} difficulty, {} levels",
            seed,
            difficulty.as_str(),
            level_count
        );

        let mut state = GameState::new(seed, tuning.clone(), difficulty, level_count);
        let bricks = levels.load(difficulty, 0, seed, tuning);
        state.begin_level(0, bricks);
        state.drain_events();
        state
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Advance one fixed tick
    pub fn step(&mut self, input: &TickInput) {
        // Restart after a finished run
        if input.restart && self.state.phase.is_terminal() {
            self.restart();
            return;
        }

        // Load the next level
        if input.advance_level && self.state.phase == GamePhase::LevelTransition {
            self.advance_level();
            return;
        }

        tick(&mut self.state, input, SIM_DT);
        self.dispatch_events();
    }

    /// Run as many fixed ticks as `frame_dt` seconds cover.
    ///
    /// Held movement follows the latest frame. One-shot commands are kept
    /// until a tick runs, so a frame too short to tick doesn't drop them, and
    /// then apply to that first tick only. Returns the number of ticks run.
    pub fn update(&mut self, frame_dt: f32, input: &TickInput) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        self.input.move_left = input.move_left;
        self.input.move_right = input.move_right;
        self.input.pause |= input.pause;
        self.input.advance_level |= input.advance_level;
        self.input.restart |= input.restart;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let current = self.input.clone();
            self.step(&current);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.pause = false;
            self.input.advance_level = false;
            self.input.restart = false;
        }
        substeps
    }

    /// Draw the current state
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.draw(&sprites(&self.state), &Hud::from_state(&self.state));
    }

    /// Load the level after the current one and resume play
    fn advance_level(&mut self) {
        let next = self.state.level_index + 1;
        let bricks = self.levels.load(
            self.state.difficulty,
            next,
            self.state.seed,
            &self.tuning,
        );
        self.state.begin_level(next, bricks);
        self.dispatch_events();
    }

    /// Throw the finished run away and start a fresh one
    fn restart(&mut self) {
        let seed = self.state.seed.wrapping_add(RUN_SEED_STEP);
        self.state = Self::new_session(seed, &self.tuning, &self.settings, self.levels.as_ref());
        self.accumulator = 0.0;
        self.audio.stop_all();
        self.audio.start_music(Music::MainTheme);
    }

    /// Route this tick's events to audio and the score board
    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if let GameEvent::PhaseChanged { from, to } = event {
                match to {
                    GamePhase::Paused | GamePhase::LevelTransition => self.audio.pause_music(),
                    GamePhase::Playing => {
                        if from == GamePhase::Paused || from == GamePhase::LevelTransition {
                            self.audio.resume_music();
                        }
                    }
                    GamePhase::GameOver => {
                        self.audio.stop_all();
                        self.record_score(false);
                    }
                    GamePhase::GameWon => {
                        self.audio.pause_music();
                        self.record_score(true);
                    }
                }
            }

            if let Some(effect) = SoundEffect::for_event(&event) {
                self.audio.play(effect);
            }
        }
    }

    fn record_score(&mut self, won: bool) {
        let entry = ScoreEntry {
            score: self.state.score,
            level: self.state.level_index + 1,
            difficulty: self.state.difficulty,
            won,
        };
        if self.high_scores.record(entry).is_none() {
            log::info!("Run ended with {} points", self.state.score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelDef, LevelPack};
    use crate::render::TextRaster;
    use crate::settings::Difficulty;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Cue {
        Sfx(SoundEffect),
        Start,
        Pause,
        Resume,
        Stop,
    }

    /// Audio sink whose history outlives the boxed sink
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Cue>>>);

    impl Recorder {
        fn take(&self) -> Vec<Cue> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().push(Cue::Sfx(effect));
        }
        fn start_music(&mut self, _music: Music) {
            self.0.borrow_mut().push(Cue::Start);
        }
        fn pause_music(&mut self) {
            self.0.borrow_mut().push(Cue::Pause);
        }
        fn resume_music(&mut self) {
            self.0.borrow_mut().push(Cue::Resume);
        }
        fn stop_all(&mut self) {
            self.0.borrow_mut().push(Cue::Stop);
        }
    }

    /// Two one-row levels at medium difficulty
    fn pack() -> LevelPack {
        let level = |rows: &[&str]| LevelDef {
            name: None,
            rows: rows.iter().map(|r| r.to_string()).collect(),
        };
        LevelPack {
            levels: HashMap::from([(
                Difficulty::Medium,
                vec![level(&["1111"]), level(&["0110", "3003"])],
            )]),
        }
    }

    fn new_game() -> (Game, Recorder) {
        let recorder = Recorder::default();
        let mut tuning = Tuning::default();
        tuning.drop_rate = 0.0;
        let game = Game::new(
            7,
            tuning,
            Settings::default(),
            Box::new(pack()),
            Box::new(recorder.clone()),
        );
        (game, recorder)
    }

    fn clear_level(game: &mut Game) {
        for brick in game.state_mut().bricks.iter_mut() {
            brick.hit();
        }
        game.step(&TickInput::default());
    }

    fn command(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_new_game() {
        let (game, recorder) = new_game();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().bricks.len(), 4);
        assert_eq!(game.state().level_count, 2);
        assert_eq!(game.state().balls.len(), 1);
        assert_eq!(recorder.take(), vec![Cue::Start]);
    }

    #[test]
    fn test_pause_routes_music() {
        let (mut game, recorder) = new_game();
        recorder.take();
        let pause = command(|i| i.pause = true);

        game.step(&pause);
        assert_eq!(game.phase(), GamePhase::Paused);
        game.step(&pause);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(recorder.take(), vec![Cue::Pause, Cue::Resume]);
    }

    #[test]
    fn test_level_flow_to_victory() {
        let (mut game, recorder) = new_game();
        recorder.take();

        // Commands are ignored while playing
        game.step(&command(|i| i.advance_level = true));
        assert_eq!(game.state().level_index, 0);

        clear_level(&mut game);
        assert_eq!(game.phase(), GamePhase::LevelTransition);
        assert_eq!(
            recorder.take(),
            vec![Cue::Pause, Cue::Sfx(SoundEffect::Victory)]
        );

        // Waiting ticks change nothing
        let ticks = game.state().time_ticks;
        game.step(&TickInput::default());
        assert_eq!(game.state().time_ticks, ticks);

        game.step(&command(|i| i.advance_level = true));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().level_index, 1);
        assert_eq!(game.state().bricks.len(), 4);
        assert_eq!(game.state().balls.len(), 1);
        assert_eq!(recorder.take(), vec![Cue::Resume]);

        game.state_mut().score = 500;
        clear_level(&mut game);
        assert_eq!(game.phase(), GamePhase::GameWon);
        let best = &game.high_scores().entries()[0];
        assert!(best.won);
        assert_eq!(best.level, 2);
        assert_eq!(best.score, 500);
    }

    #[test]
    fn test_game_over_and_restart() {
        let (mut game, recorder) = new_game();
        game.state_mut().score = 1200;
        game.state_mut().lives = 0;
        let fall = game.state().tuning.field_height + 1.0;
        game.state_mut().balls[0].rect.pos.y = fall;
        recorder.take();

        game.step(&TickInput::default());
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(
            recorder.take(),
            vec![Cue::Stop, Cue::Sfx(SoundEffect::GameOver)]
        );
        assert_eq!(game.high_scores().top_score(), Some(1200));

        let old_seed = game.state().seed;
        game.step(&command(|i| i.restart = true));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().lives, 3);
        assert_eq!(game.state().level_index, 0);
        assert_ne!(game.state().seed, old_seed);
        assert_eq!(game.high_scores().top_score(), Some(1200));
        assert_eq!(recorder.take(), vec![Cue::Stop, Cue::Start]);
    }

    #[test]
    fn test_update_substeps() {
        let (mut game, _) = new_game();
        assert_eq!(game.update(0.095, &TickInput::default()), 5);
        assert_eq!(game.state().time_ticks, 5);
        // Leftover time carries into the next frame
        assert_eq!(game.update(0.01, &TickInput::default()), 1);

        // Pause only applies once even across several substeps
        game.update(0.05, &command(|i| i.pause = true));
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_pause_survives_frame_too_short_to_tick() {
        let (mut game, _) = new_game();
        assert_eq!(game.update(0.005, &command(|i| i.pause = true)), 0);
        assert_eq!(game.phase(), GamePhase::Playing);

        // The next frame that ticks still sees the pause
        assert_eq!(game.update(0.015, &TickInput::default()), 1);
        assert_eq!(game.phase(), GamePhase::Paused);

        // and only once
        assert_eq!(game.update(0.02, &TickInput::default()), 1);
        assert_eq!(game.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_render_frame() {
        let (game, _) = new_game();
        let mut raster = TextRaster::new(80, 60, 800.0, 600.0);
        game.render(&mut raster);
        assert_eq!(raster.get(40, 30), Some('o'));
        assert!(raster.to_string().contains("LEVEL 1/2"));
    }
}
