//! In-game HUD
//!
//! Health bar, score, inventory counts, repellent timer, screen flash and a
//! minimap of the island. Positions are relative to the surface size so the
//! HUD follows window resizes.

use crate::game::item::ItemKind;
use crate::game::map::{biome, TileMap};
use crate::game::world::World;
use crate::platform::surface::{Rgba, SpriteRef, Surface};

use super::theme::{FONT_SIZE_HUD, FONT_SIZE_SMALL, HUD_BACKDROP, TEXT_COLOR};

const HEALTH_BAR: (f32, f32, f32, f32) = (20.0, 40.0, 200.0, 25.0);
const MINIMAP_SIZE: (usize, usize) = (200, 150);
/// Minimap pixels per drawn block
const MINIMAP_BLOCK: usize = 4;
const MINIMAP_BG: Rgba = Rgba::rgb(50, 50, 50);

/// Full-screen colour flash, held for its duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub color: Rgba,
    pub alpha: u8,
    pub remaining: f32,
}

pub struct Hud {
    flash: Option<Flash>,
    /// Terrain colours per minimap block, row-major
    minimap: Vec<Rgba>,
    minimap_seed: Option<u64>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            flash: None,
            minimap: Vec::new(),
            minimap_seed: None,
        }
    }

    /// Start a flash. A new flash replaces the running one.
    pub fn trigger_flash(&mut self, color: Rgba, alpha: u8, duration: f32) {
        self.flash = Some(Flash {
            color,
            alpha,
            remaining: duration,
        });
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(flash) = &mut self.flash {
            flash.remaining -= dt;
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }
    }

    fn blocks() -> (usize, usize) {
        (MINIMAP_SIZE.0 / MINIMAP_BLOCK, MINIMAP_SIZE.1 / MINIMAP_BLOCK)
    }

    /// Sample the terrain for the minimap. Cheap when the island is unchanged.
    pub fn refresh_minimap(&mut self, map: &TileMap) {
        if self.minimap_seed == Some(map.seed()) && !self.minimap.is_empty() {
            return;
        }
        let (bw, bh) = Self::blocks();
        self.minimap.clear();
        for by in 0..bh {
            let y = (by * map.height() / bh) as i32;
            for bx in 0..bw {
                let x = (bx * map.width() / bw) as i32;
                let color = map.get(x, y).map_or(MINIMAP_BG, |t| biome(t).color);
                self.minimap.push(color);
            }
        }
        self.minimap_seed = Some(map.seed());
    }

    pub fn draw(&self, surface: &mut dyn Surface, world: &World) {
        let (sw, sh) = surface.size();
        let player = &world.player;

        let (x, y, w, h) = HEALTH_BAR;
        surface.draw_rect(x, y, w, h, Rgba::RED);
        surface.draw_rect(x, y, w * player.health.fraction(), h, Rgba::GREEN);
        let hp = format!("HP: {}/{}", player.health.current, player.health.max);
        surface.draw_text(&hp, x, y - 8.0, FONT_SIZE_HUD, TEXT_COLOR);

        let score = format!("Score: {}", player.score);
        surface.draw_text(&score, 20.0, sh - 40.0, FONT_SIZE_HUD, TEXT_COLOR);

        let (ix, mut iy) = (sw - 150.0, sh - 100.0);
        for kind in ItemKind::ALL {
            if !surface.blit(SpriteRef::new(kind.sprite()), ix, iy, 32.0, 32.0) {
                surface.draw_rect_lines(ix, iy, 32.0, 32.0, 2.0, TEXT_COLOR);
            }
            let count = format!("x{}", player.count(kind));
            surface.draw_text(&count, ix + 40.0, iy + 24.0, FONT_SIZE_HUD, TEXT_COLOR);
            iy += 50.0;
        }

        if player.repellent_active() {
            let text = format!("Repellent {:.1}s", player.repellent_remaining);
            surface.draw_text(&text, x, y + h + 24.0, FONT_SIZE_SMALL, Rgba::rgb(120, 160, 255));
        }

        self.draw_minimap(surface, world);

        if let Some(flash) = self.flash {
            surface.draw_rect(0.0, 0.0, sw, sh, flash.color.with_alpha(flash.alpha));
        }
    }

    fn draw_minimap(&self, surface: &mut dyn Surface, world: &World) {
        let (sw, _) = surface.size();
        let (mw, mh) = (MINIMAP_SIZE.0 as f32, MINIMAP_SIZE.1 as f32);
        let (ox, oy) = (sw - mw - 10.0, 10.0);
        let block = MINIMAP_BLOCK as f32;
        let (bw, _) = Self::blocks();

        surface.draw_rect(ox - 2.0, oy - 2.0, mw + 4.0, mh + 4.0, HUD_BACKDROP);
        for (i, &color) in self.minimap.iter().enumerate() {
            let (bx, by) = ((i % bw) as f32, (i / bw) as f32);
            surface.draw_rect(ox + bx * block, oy + by * block, block, block, color);
        }

        let (map_w, map_h) = (world.map.width().max(1) as f32, world.map.height().max(1) as f32);
        let to_mini = |x: f32, y: f32| (ox + x / map_w * mw, oy + y / map_h * mh);
        for (lx, ly) in world.lava.sorted() {
            let (x, y) = to_mini(lx as f32, ly as f32);
            surface.draw_rect(x, y, 2.0, 2.0, Rgba::RED);
        }
        if let Some((bx, by)) = world.boat.tile {
            let (x, y) = to_mini(bx as f32, by as f32);
            surface.draw_rect(x - 2.0, y - 2.0, 5.0, 5.0, Rgba::YELLOW);
        }
        let (x, y) = to_mini(world.player.x, world.player.y);
        surface.draw_circle(x, y, 3.0, Rgba::WHITE);
    }
}
