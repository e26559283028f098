//! Game settings and preferences
//!
//! Difficulty shapes a session when it is created; the audio preferences are
//! read by audio sinks.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Paddle base width multiplier
    pub fn paddle_width_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    /// Spawn velocity multiplier for fresh balls
    pub fn ball_speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Audio ===
    /// Sound effects on/off
    pub sound_effects: bool,
    /// Background music on/off
    pub music: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,

            // Audio
            sound_effects: true,
            music: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Default settings at a given difficulty
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Effective effect volume (0 when effects are off)
    pub fn effective_sfx_volume(&self) -> f32 {
        if !self.sound_effects {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Parse a (possibly partial) settings document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::Json {
            what: "settings",
            source,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            what: "settings",
            source,
        })
    }

    /// Read a settings file, falling back to defaults on any error
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(|source| Error::Io {
                path: path.display().to_string(),
                source,
            })
            .and_then(|json| Self::from_json(&json));

        match loaded {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(Difficulty::Easy.paddle_width_multiplier(), 1.2);
        assert_eq!(Difficulty::Hard.paddle_width_multiplier(), 0.8);
        assert_eq!(Difficulty::Easy.ball_speed_multiplier(), 0.8);
        assert_eq!(Difficulty::Hard.ball_speed_multiplier(), 1.2);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_partial_document() {
        let settings = Settings::from_json(r#"{ "difficulty": "Hard", "music": false }"#).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(!settings.music);
        assert!(settings.sound_effects);
        assert_eq!(settings.master_volume, 0.8);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::with_difficulty(Difficulty::Easy);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_sfx_volume() - 0.8).abs() < 1e-6);
        settings.sound_effects = false;
        assert_eq!(settings.effective_sfx_volume(), 0.0);
    }
}
