//! The player character

use std::collections::BTreeMap;

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ItemConfig, PlayerConfig};
use crate::engine::spatial_grid::Positioned;

use super::components::{Animation, Facing, Health};
use super::item::ItemKind;
use super::map::{TileMap, MUD};

/// Walk cycle speed in seconds per frame
pub const ANIMATION_INTERVAL: f32 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Tile coordinates
    pub x: f32,
    pub y: f32,
    pub health: Health,
    pub inventory: BTreeMap<ItemKind, u32>,
    /// Seconds of repellent left, 0 when inactive
    pub repellent_remaining: f32,
    pub score: u32,
    pub facing: Facing,
    pub moving: bool,
    /// Last applied movement in tiles per second, for camera look-ahead
    #[serde(skip)]
    pub velocity: Vec2,
    #[serde(skip)]
    pub animation: Animation,
}

impl Player {
    pub fn new(x: f32, y: f32, config: &PlayerConfig) -> Self {
        Self {
            x,
            y,
            health: Health::new(config.max_health),
            inventory: ItemKind::ALL.iter().map(|&k| (k, 0)).collect(),
            repellent_remaining: 0.0,
            score: 0,
            facing: Facing::Right,
            moving: false,
            velocity: Vec2::ZERO,
            animation: Animation::default(),
        }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.inventory.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, kind: ItemKind) {
        *self.inventory.entry(kind).or_insert(0) += 1;
    }

    fn take_item(&mut self, kind: ItemKind) -> bool {
        match self.inventory.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn repellent_active(&self) -> bool {
        self.repellent_remaining > 0.0
    }

    /// Move by `axis * speed * dt`. The step is dropped if the target tile is
    /// impassable; a mud target halves it. Returns true if the player moved.
    pub fn step(&mut self, axis: Vec2, dt: f32, map: &TileMap, config: &PlayerConfig) -> bool {
        let axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let delta = axis * config.speed * dt;
        self.facing = self.facing.from_dx(delta.x);
        self.moving = delta != Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        if !self.moving {
            return false;
        }

        let (nx, ny) = (self.x + delta.x, self.y + delta.y);
        let (tx, ty) = (nx.floor() as i32, ny.floor() as i32);
        if !map.is_passable(tx, ty) {
            return false;
        }
        let factor = if map.get(tx, ty) == Some(MUD) {
            config.mud_factor
        } else {
            1.0
        };
        self.x += delta.x * factor;
        self.y += delta.y * factor;
        if dt > 0.0 {
            self.velocity = delta * factor / dt;
        }
        true
    }

    /// Tick timers and animation.
    pub fn update(&mut self, dt: f32) -> PlayerTick {
        let mut tick = PlayerTick::default();
        if self.repellent_active() {
            self.repellent_remaining = (self.repellent_remaining - dt).max(0.0);
            if !self.repellent_active() {
                tracing::info!("repellent wore off");
                tick.repellent_expired = true;
            }
        }
        self.animation.tick(dt, self.moving, ANIMATION_INTERVAL, 2);
        tick
    }

    /// Drink a potion if one is carried and health is not full.
    pub fn use_potion(&mut self, items: &ItemConfig) -> bool {
        if self.health.is_full() || !self.take_item(ItemKind::Potion) {
            return false;
        }
        let healed = self.health.heal(items.potion_heal);
        tracing::info!(healed, hp = self.health.current, "potion used");
        true
    }

    /// Spray repellent if one is carried. Restarts the timer.
    pub fn trigger_repellent(&mut self, items: &ItemConfig) -> bool {
        if !self.take_item(ItemKind::Repellent) {
            return false;
        }
        self.repellent_remaining = items.repellent_duration;
        tracing::info!(duration = items.repellent_duration, "repellent activated");
        true
    }
}

/// What changed during `Player::update`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerTick {
    pub repellent_expired: bool,
}

impl Positioned for Player {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
