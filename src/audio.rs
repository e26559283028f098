//! Audio cues and sinks
//!
//! The simulation never plays sounds. The controller turns [`GameEvent`]s
//! into [`SoundEffect`]s and music commands on an injected [`AudioSink`].

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, PowerUpKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Brick destroyed
    BrickBreak,
    /// Last ball lost, spare life used
    LifeLost,
    GameOver,
    /// Level cleared
    Victory,
    FastBall,
    TripleBall,
    BiggerPaddle,
    PowerupBreaker,
}

impl SoundEffect {
    /// Asset id for this cue
    pub fn id(&self) -> &'static str {
        match self {
            SoundEffect::BrickBreak => "brick_break",
            SoundEffect::LifeLost => "life_lost",
            SoundEffect::GameOver => "game_over",
            SoundEffect::Victory => "victory",
            SoundEffect::FastBall => "fast_ball",
            SoundEffect::TripleBall => "triple_ball",
            SoundEffect::BiggerPaddle => "bigger_paddle",
            SoundEffect::PowerupBreaker => "powerup_breaker",
        }
    }

    /// Cue played when a power-up effect is applied
    pub fn for_power_up(kind: PowerUpKind) -> Self {
        match kind {
            PowerUpKind::BiggerPaddle => SoundEffect::BiggerPaddle,
            PowerUpKind::FasterBall => SoundEffect::FastBall,
            PowerUpKind::BreakerBall => SoundEffect::PowerupBreaker,
            PowerUpKind::TripleBall => SoundEffect::TripleBall,
        }
    }

    /// Cue for a simulation event, if it has one.
    ///
    /// Refreshing a running effect is silent.
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::BrickDestroyed { .. } => Some(SoundEffect::BrickBreak),
            GameEvent::PowerUpCollected {
                kind,
                applied: true,
            } => Some(Self::for_power_up(*kind)),
            GameEvent::LifeLost { .. } => Some(SoundEffect::LifeLost),
            GameEvent::PhaseChanged { to, .. } => match to {
                GamePhase::GameOver => Some(SoundEffect::GameOver),
                GamePhase::LevelTransition | GamePhase::GameWon => Some(SoundEffect::Victory),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Music {
    MainTheme,
}

impl Music {
    pub fn id(&self) -> &'static str {
        match self {
            Music::MainTheme => "main_theme",
        }
    }
}

/// Where the controller sends audio
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    /// Start a track from the beginning, replacing any current track
    fn start_music(&mut self, music: Music);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    /// Stop the current track and any playing effects
    fn stop_all(&mut self);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
    fn start_music(&mut self, _music: Music) {}
    fn pause_music(&mut self) {}
    fn resume_music(&mut self) {}
    fn stop_all(&mut self) {}
}

/// State of the music channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicState {
    Stopped,
    Playing(Music),
    Paused(Music),
}

/// Sink that logs each cue and keeps a history (headless driver, tests)
#[derive(Debug)]
pub struct LogAudio {
    effects_enabled: bool,
    music_enabled: bool,
    volume: f32,
    /// Effects actually played, in order
    pub played: Vec<SoundEffect>,
    pub music: MusicState,
}

impl LogAudio {
    pub fn new(settings: &Settings) -> Self {
        Self {
            effects_enabled: settings.sound_effects,
            music_enabled: settings.music,
            volume: settings.effective_sfx_volume(),
            played: Vec::new(),
            music: MusicState::Stopped,
        }
    }

    /// Number of times `effect` was played
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.iter().filter(|e| **e == effect).count()
    }
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        if !self.effects_enabled || self.volume <= 0.0 {
            return;
        }
        log::debug!("sfx {} (vol {:.2})", effect.id(), self.volume);
        self.played.push(effect);
    }

    fn start_music(&mut self, music: Music) {
        if !self.music_enabled {
            return;
        }
        log::debug!("music start {}", music.id());
        self.music = MusicState::Playing(music);
    }

    fn pause_music(&mut self) {
        if let MusicState::Playing(music) = self.music {
            log::debug!("music pause {}", music.id());
            self.music = MusicState::Paused(music);
        }
    }

    fn resume_music(&mut self) {
        if !self.music_enabled {
            return;
        }
        if let MusicState::Paused(music) = self.music {
            log::debug!("music resume {}", music.id());
            self.music = MusicState::Playing(music);
        }
    }

    fn stop_all(&mut self) {
        log::debug!("audio stop all");
        self.music = MusicState::Stopped;
    }
}
