//! Physical keys the engine reacts to and the set currently held.

use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    Space,
    /// Throws a fireball while that power-up is active.
    KeyX,
    /// Pause toggle.
    Escape,
}

/// Level-sampled key state.
#[derive(Debug, Default)]
pub struct KeyState {
    held: HashSet<Key>,
}

impl KeyState {
    /// Record a press. Returns true only on the up→down edge.
    pub fn press(&mut self, key: Key) -> bool {
        self.held.insert(key)
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn left(&self) -> bool {
        self.is_held(Key::ArrowLeft)
    }

    pub fn right(&self) -> bool {
        self.is_held(Key::ArrowRight)
    }

    /// Either jump alias.
    pub fn jump(&self) -> bool {
        self.is_held(Key::Space) || self.is_held(Key::ArrowUp)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
