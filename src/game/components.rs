//! Shared Components
//!
//! Small data types used by the player and the dinosaurs alike.
//! Behaviour lives in the systems that own them.

use serde::{Deserialize, Serialize};

// =============================================================================
// Combat
// =============================================================================

/// Health for anything that can be hurt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, clamped at zero. Returns true if this hit was lethal.
    pub fn damage(&mut self, amount: i32) -> bool {
        let was_alive = !self.is_dead();
        self.current = (self.current - amount.max(0)).max(0);
        was_alive && self.is_dead()
    }

    /// Heal up to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount.max(0)).min(self.max);
        self.current - before
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// 0.0 ..= 1.0, for health bars
    pub fn fraction(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Horizontal facing, used to flip sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing after moving by `dx`; unchanged for vertical moves.
    pub fn from_dx(self, dx: f32) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else if dx > 0.0 {
            Facing::Right
        } else {
            self
        }
    }

    pub fn flip_x(self) -> bool {
        self == Facing::Left
    }
}

/// Frame counter for two-frame walk cycles
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Animation {
    pub timer: f32,
    pub frame: usize,
}

impl Animation {
    /// Advance while moving; flips frames every `interval` seconds.
    pub fn tick(&mut self, dt: f32, moving: bool, interval: f32, frames: usize) {
        if !moving || frames == 0 {
            self.timer = 0.0;
            self.frame = 0;
            return;
        }
        self.timer += dt;
        if interval > 0.0 && self.timer >= interval {
            self.timer -= interval;
            self.frame = (self.frame + 1) % frames;
        }
    }
}
