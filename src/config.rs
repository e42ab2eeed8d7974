//! Session configuration and the difficulty table.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::GameError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Per-difficulty tuning consumed by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySettings {
    pub enemy_speed_factor: f32,
    pub enemy_count_factor: f32,
    pub player_lives: u32,
    pub score_multiplier: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                enemy_speed_factor: 0.6,
                enemy_count_factor: 0.7,
                player_lives: 5,
                score_multiplier: 1.0,
            },
            Difficulty::Normal => DifficultySettings {
                enemy_speed_factor: 0.9,
                enemy_count_factor: 1.0,
                player_lives: 3,
                score_multiplier: 1.5,
            },
            Difficulty::Hard => DifficultySettings {
                enemy_speed_factor: 1.2,
                enemy_count_factor: 1.3,
                player_lives: 1,
                score_multiplier: 2.0,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    /// Next entry in menu order, wrapping.
    pub fn next(self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl DifficultySettings {
    /// Apply the score multiplier to a base award, rounding half away from zero.
    pub fn award(&self, base: u32) -> u32 {
        (base as f32 * self.score_multiplier).round() as u32
    }
}

/// Immutable for the whole session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            difficulty: Difficulty::Normal,
            sound_enabled: true,
            music_enabled: true,
            player_name: String::new(),
        }
    }
}

// ── Settings file ─────────────────────────────────────────────────────────────

/// What the menu remembers between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(flatten)]
    pub game: GameConfig,
    pub level_id: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { game: GameConfig::default(), level_id: 1 }
    }
}

pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".haunted_run.json")
}

impl Settings {
    pub fn read(path: &Path) -> Result<Settings, GameError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Missing or unreadable settings fall back to defaults.
    pub fn load_or_default(path: &Path) -> Settings {
        match Settings::read(path) {
            Ok(settings) => settings,
            Err(GameError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }
}
