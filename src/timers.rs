//! Real-time deferred actions.
//!
//! Unlike everything else in the simulation these fire on wall-clock time,
//! not frame count. The engine owns the queue, so dropping or stopping the
//! engine cancels whatever is still pending.

use std::time::{Duration, Instant};

use crate::arena::Handle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Flip a breakable platform to broken.
    BreakPlatform(Handle),
    /// End the current lightning flash.
    ClearFlash,
}

#[derive(Debug)]
struct Pending {
    /// Insertion order, breaks ties between equal deadlines.
    seq: u64,
    due: Instant,
    action: Deferred,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_seq: u64,
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, action: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { seq, due: now + delay, action });
    }

    pub fn is_scheduled(&self, action: Deferred) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        let mut due: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.action).collect()
    }
}
