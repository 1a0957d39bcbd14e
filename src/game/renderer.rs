//! World rendering
//!
//! Draws the visible part of the island through the camera: tiles, lava,
//! items, dinosaurs, the boat and the player, in that order. Entities are
//! culled with the spatial grid. A sprite that failed to load falls back to
//! a coloured shape so the game stays playable without assets.

use crate::config::GameConfig;
use crate::engine::camera::Camera;
use crate::platform::surface::{Rgba, SpriteKey, SpriteRef, Surface};

use super::item::ItemKind;
use super::map::biome;
use super::world::World;

const LAVA: Rgba = Rgba::rgb(255, 69, 0);
const PLAYER: Rgba = Rgba::rgb(255, 255, 255);
const DINO: Rgba = Rgba::rgb(60, 160, 60);
const DINO_AGGRESSIVE: Rgba = Rgba::rgb(200, 40, 40);
const POTION: Rgba = Rgba::rgb(220, 40, 160);
const REPELLENT: Rgba = Rgba::rgb(40, 120, 255);

/// Draw the world. Returns the number of entities drawn.
pub fn draw_world(surface: &mut dyn Surface, world: &World, camera: &Camera, config: &GameConfig) -> usize {
    let tile = camera.tile_size() * camera.zoom();
    let visible = camera.visible_tiles();

    for (x, y) in visible.tiles() {
        let (tx, ty) = (x as i32, y as i32);
        let Some(id) = world.map.get(tx, ty) else {
            continue;
        };
        let color = if world.lava.contains(tx, ty) {
            LAVA
        } else {
            biome(id).color
        };
        let p = camera.world_to_screen(x as f32, y as f32);
        // +1 hides seams between tiles at fractional zoom
        surface.draw_rect(p.x, p.y, tile + 1.0, tile + 1.0, color);
    }

    let mut drawn = 0;
    let mut visible_entities = world.grid.query_range(
        visible.x0 as f32,
        visible.y0 as f32,
        visible.x1 as f32,
        visible.y1 as f32,
    );
    visible_entities.sort_unstable();

    for &entity in &visible_entities {
        if let Some(item) = world.items.get(entity) {
            let p = camera.world_to_screen(item.x - 0.5, item.y - 0.5);
            if !surface.blit(SpriteRef::new(item.kind.sprite()), p.x, p.y, tile, tile) {
                let color = match item.kind {
                    ItemKind::Potion => POTION,
                    ItemKind::Repellent => REPELLENT,
                };
                surface.draw_circle(p.x + tile * 0.5, p.y + tile * 0.5, tile * 0.3, color);
            }
            drawn += 1;
        }
    }

    for &entity in &visible_entities {
        if let Some(dino) = world.dinosaurs.get(entity) {
            let key = if dino.aggressive {
                SpriteKey::AggressiveDinosaur
            } else {
                SpriteKey::Dinosaur
            };
            let sprite = SpriteRef::new(key)
                .frame(dino.animation.frame)
                .flipped(dino.facing.flip_x());
            let p = camera.world_to_screen(dino.x - 0.5, dino.y - 0.5);
            if !surface.blit(sprite, p.x, p.y, tile, tile) {
                let color = if dino.aggressive { DINO_AGGRESSIVE } else { DINO };
                surface.draw_rect(p.x + tile * 0.1, p.y + tile * 0.1, tile * 0.8, tile * 0.8, color);
            }
            drawn += 1;
        }
    }

    if let Some((bx, by)) = world.boat.tile {
        let size = tile * config.boat.size_factor;
        let p = camera.world_to_screen(bx as f32, by as f32);
        let (x, y) = (p.x + (tile - size) * 0.5, p.y + (tile - size) * 0.5);
        let sprite = SpriteRef::new(SpriteKey::Boat).frame(world.boat.frame);
        if !surface.blit(sprite, x, y, size, size) {
            let [r, g, b] = config.boat.color;
            surface.draw_rect(x, y, size, size, Rgba::rgb(r, g, b));
        }
        drawn += 1;
    }

    let player = &world.player;
    let sprite = SpriteRef::new(SpriteKey::Player)
        .frame(player.animation.frame)
        .flipped(player.facing.flip_x());
    let p = camera.world_to_screen(player.x - 0.5, player.y - 0.5);
    if !surface.blit(sprite, p.x, p.y, tile, tile) {
        surface.draw_circle(p.x + tile * 0.5, p.y + tile * 0.5, tile * 0.4, PLAYER);
    }
    if player.repellent_active() {
        surface.draw_circle_lines(
            p.x + tile * 0.5,
            p.y + tile * 0.5,
            tile * 0.9,
            2.0,
            REPELLENT.with_alpha(160),
        );
    }
    drawn + 1
}
