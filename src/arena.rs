//! Index-stable entity storage.
//!
//! Entities are never removed from a level: dead enemies, collected items and
//! broken platforms stay in place and are filtered through [`Live`]. A
//! [`Handle`] therefore stays valid for the lifetime of the arena.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Whether an entity still takes part in update, collision and render passes.
pub trait Live {
    fn is_live(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

impl Handle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) -> Handle {
        self.items.push(item);
        Handle(self.items.len() - 1)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.items.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.items.get_mut(handle.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every handle in insertion order. Does not borrow the arena, so the
    /// caller may mutate entries (and anything else) while walking it.
    pub fn handles(&self) -> Handles {
        Handles { range: 0..self.items.len() }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }
}

impl<T: Live> Arena<T> {
    pub fn live(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_live())
            .map(|(i, item)| (Handle(i), item))
    }

    pub fn live_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_live()).count()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T> FromIterator<T> for Arena<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Arena { items: iter.into_iter().collect() }
    }
}

impl<T> From<Vec<T>> for Arena<T> {
    fn from(items: Vec<T>) -> Self {
        Arena { items }
    }
}

pub struct Handles {
    range: Range<usize>,
}

impl Iterator for Handles {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        self.range.next().map(Handle)
    }
}
