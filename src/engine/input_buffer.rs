//! Short-lived memory of action presses
//!
//! A press that lands between two fixed ticks (or while an action is not yet
//! allowed) is kept for `window` seconds of simulation time and can be
//! consumed by any tick inside that window.

use std::hash::Hash;

use rustc_hash::FxHashMap;

pub struct InputBuffer<A> {
    window: f32,
    pressed_at: FxHashMap<A, f32>,
}

impl<A: Copy + Eq + Hash> InputBuffer<A> {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            pressed_at: FxHashMap::default(),
        }
    }

    /// Remember `action` as pressed at time `now`. A repeat press refreshes it.
    pub fn buffer(&mut self, action: A, now: f32) {
        self.pressed_at.insert(action, now);
    }

    /// True once per press while it is still fresh.
    pub fn consume(&mut self, action: A, now: f32) -> bool {
        match self.pressed_at.remove(&action) {
            Some(at) => now - at <= self.window,
            None => false,
        }
    }

    pub fn is_buffered(&self, action: A, now: f32) -> bool {
        self.pressed_at
            .get(&action)
            .is_some_and(|&at| now - at <= self.window)
    }

    /// Drop stale presses.
    pub fn expire(&mut self, now: f32) {
        let window = self.window;
        self.pressed_at.retain(|_, at| now - *at <= window);
    }

    pub fn clear(&mut self) {
        self.pressed_at.clear();
    }
}
