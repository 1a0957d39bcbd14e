//! Collectible items

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::engine::spatial_grid::Positioned;
use crate::platform::surface::SpriteKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    Potion,
    Repellent,
}

impl ItemKind {
    pub const ALL: [ItemKind; 2] = [ItemKind::Potion, ItemKind::Repellent];

    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Potion => "potion",
            ItemKind::Repellent => "repellent",
        }
    }

    pub fn sprite(&self) -> SpriteKey {
        match self {
            ItemKind::Potion => SpriteKey::Potion,
            ItemKind::Repellent => SpriteKey::Repellent,
        }
    }
}

/// An item lying on the island, in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
}

impl Item {
    pub fn new(kind: ItemKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    pub fn tile(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Positioned for Item {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
