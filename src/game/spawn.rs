//! Populating a fresh island

use rand::Rng;

use crate::config::GameConfig;

use super::dinosaur::Dinosaur;
use super::item::{Item, ItemKind};
use super::map::TileMap;
use super::world::World;

/// Map for a new run: the configured seed, or one drawn from `rng`.
pub fn generate_map(config: &GameConfig, rng: &mut impl Rng) -> TileMap {
    let seed = config.map.seed.unwrap_or_else(|| rng.gen());
    let spikes = config
        .hazards
        .spikes_enabled
        .then_some(config.map.spike_fraction);
    TileMap::generate(
        seed,
        config.map.width,
        config.map.height,
        config.map.mud_fraction,
        spikes,
    )
}

/// A ready-to-play world: island, player, dinosaurs and items.
pub fn new_world(config: &GameConfig, rng: &mut impl Rng) -> World {
    let map = generate_map(config, rng);
    let mut world = World::new(map, config);
    let dinos = spawn_dinosaurs(&mut world, config, rng);
    let items = spawn_items(&mut world, config, rng);
    tracing::info!(seed = world.map.seed(), dinos, items, "world ready");
    world
}

pub fn spawn_dinosaurs(world: &mut World, config: &GameConfig, rng: &mut impl Rng) -> usize {
    let plan = std::iter::repeat(false)
        .take(config.dinosaur.count_normal)
        .chain(std::iter::repeat(true).take(config.dinosaur.count_aggressive));
    let mut spawned = 0;
    for aggressive in plan {
        let Some((x, y)) = world.map.random_passable(rng, true) else {
            tracing::warn!("no room left for dinosaurs");
            break;
        };
        let dino = Dinosaur::new(x as f32 + 0.5, y as f32 + 0.5, aggressive, &config.dinosaur);
        world.spawn_dinosaur(dino);
        spawned += 1;
    }
    tracing::info!(
        normal = config.dinosaur.count_normal,
        aggressive = config.dinosaur.count_aggressive,
        spawned,
        "dinosaurs spawned"
    );
    spawned
}

/// Scatter items over the middle half of the map, keeping them apart.
pub fn spawn_items(world: &mut World, config: &GameConfig, rng: &mut impl Rng) -> usize {
    let count = config.items.spawn_count;
    let (w, h) = (world.map.width() as i32, world.map.height() as i32);
    if w == 0 || h == 0 {
        return 0;
    }
    let spacing = config.items.min_spacing;
    let mut placed: Vec<(i32, i32)> = Vec::with_capacity(count);

    for _ in 0..count * 10 {
        if placed.len() >= count {
            break;
        }
        let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
        let x = rng.gen_range(w / 4..=3 * w / 4);
        let y = rng.gen_range(h / 4..=3 * h / 4);
        if !world.map.is_passable(x, y) {
            continue;
        }
        let too_close = placed
            .iter()
            .any(|&(ix, iy)| ((ix - x).abs() as f32) < spacing && ((iy - y).abs() as f32) < spacing);
        if too_close {
            continue;
        }
        placed.push((x, y));
        world.spawn_item(Item::new(kind, x as f32 + 0.5, y as f32 + 0.5));
    }

    if placed.len() < count {
        tracing::warn!(requested = count, spawned = placed.len(), "could not place every item");
    }
    placed.len()
}
