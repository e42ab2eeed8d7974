//! Named sound cues. How a cue sounds is up to the backend.

use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Jump,
    Collect,
    Damage,
    PowerUp,
    EnemyDefeat,
    GameOver,
    LevelComplete,
}

pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

/// Gate in front of the backend: honours the sound setting and tolerates a
/// missing backend by staying silent.
pub struct SoundBoard {
    enabled: bool,
    backend: Option<Box<dyn CuePlayer>>,
}

impl SoundBoard {
    pub fn new(enabled: bool, backend: Option<Box<dyn CuePlayer>>) -> Self {
        if enabled && backend.is_none() {
            warn!("no audio backend, cues will be skipped");
        }
        SoundBoard { enabled, backend }
    }

    pub fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.play(cue);
        }
    }
}
