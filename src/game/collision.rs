//! Collision and interaction resolution
//!
//! Movement is tile based, so "collision" means sharing the player's tile.
//! Checked once per tick, in this order, each check independent:
//! 1. lava under the player
//! 2. spikes under the player (when enabled)
//! 3. aggressive dinosaurs on the player's tile, unless repelled
//! 4. items on the player's tile
//!
//! Dinosaur and item candidates come from the spatial grid, so only the
//! cells around the player are inspected.

use crate::config::GameConfig;
use crate::engine::entity::Entity;

use super::events::{DamageSource, GameEvent};
use super::item::ItemKind;
use super::map::SPIKES;
use super::world::World;

/// Grid cells searched around the player for candidates
const CANDIDATE_RADIUS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub source: DamageSource,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pickup {
    pub kind: ItemKind,
    pub x: i32,
    pub y: i32,
}

/// What the player ran into this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub hits: Vec<Hit>,
    pub pickups: Vec<Pickup>,
    /// Dinosaurs that bit the player
    pub attackers: Vec<Entity>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty() && self.pickups.is_empty()
    }

    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|h| h.damage).sum()
    }

    pub fn was_hit_by(&self, source: DamageSource) -> bool {
        self.hits.iter().any(|h| h.source == source)
    }
}

pub struct CollisionResolver;

impl CollisionResolver {
    /// Apply every player interaction for this tick. Expects the grid to be
    /// current; picked-up items are queued for despawn.
    pub fn resolve(world: &mut World, config: &GameConfig) -> CollisionReport {
        let mut report = CollisionReport::default();
        let (px, py) = world.player.tile();

        if world.lava.contains(px, py) {
            Self::hurt(world, &mut report, DamageSource::Lava, config.hazards.lava_damage);
        }

        if config.hazards.spikes_enabled && world.map.get(px, py) == Some(SPIKES) {
            Self::hurt(world, &mut report, DamageSource::Spikes, config.hazards.spike_damage);
        }

        let mut candidates = world
            .grid
            .query_nearby(world.player.x, world.player.y, CANDIDATE_RADIUS);
        candidates.sort_unstable();

        let repelled = world.player.repellent_active();
        for &entity in &candidates {
            let Some(dino) = world.dinosaurs.get_mut(entity) else {
                continue;
            };
            if dino.tile() != (px, py) || !dino.aggressive || repelled {
                continue;
            }
            dino.just_attacked = true;
            report.attackers.push(entity);
            Self::hurt(world, &mut report, DamageSource::Dinosaur, config.dinosaur.attack_damage);
        }

        for &entity in &candidates {
            let Some(item) = world.items.get(entity).copied() else {
                continue;
            };
            if item.tile() != (px, py) || world.pending_despawns().contains(&entity) {
                continue;
            }
            world.player.add_item(item.kind);
            world.player.score += config.items.pickup_score;
            world.despawn(entity);
            tracing::info!(kind = item.kind.name(), x = px, y = py, "item picked up");
            report.pickups.push(Pickup { kind: item.kind, x: px, y: py });
            world.events.send(GameEvent::ItemPickedUp { kind: item.kind, x: px, y: py });
        }

        report
    }

    fn hurt(world: &mut World, report: &mut CollisionReport, source: DamageSource, damage: i32) {
        world.player.health.damage(damage);
        tracing::info!(?source, damage, hp = world.player.health.current, "player hurt");
        report.hits.push(Hit { source, damage });
        world.events.send(GameEvent::PlayerDamaged { damage, source });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dinosaur::{DinoState, Dinosaur};
    use crate::game::item::Item;
    use crate::game::map::TileMap;
    use crate::game::world::tests::{meadow_world, test_config};
    use macroquad::math::Vec2;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_lava_damages_every_tick() {
        let mut config = test_config();
        config.hazards.lava_damage = 10;
        let mut world = meadow_world(&config);
        let tile = world.player.tile();
        world.lava.tiles.insert(tile);

        for _ in 0..3 {
            let report = world.tick(DT, Vec2::ZERO, &config);
            assert!(report.collisions.was_hit_by(DamageSource::Lava));
        }
        assert_eq!(world.player.health.current, 70);
        let damaged = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerDamaged { source: DamageSource::Lava, damage: 10 }))
            .count();
        assert_eq!(damaged, 3);
    }

    #[test]
    fn test_potion_pickup() {
        let config = test_config();
        let mut world = meadow_world(&config);
        let (px, py) = world.player.tile();
        let item = world.spawn_item(Item::new(ItemKind::Potion, px as f32 + 0.2, py as f32 + 0.7));

        let report = world.tick(DT, Vec2::ZERO, &config);
        assert_eq!(report.collisions.pickups, vec![Pickup { kind: ItemKind::Potion, x: px, y: py }]);
        assert_eq!(world.player.count(ItemKind::Potion), 1);
        assert_eq!(world.player.score, config.items.pickup_score);
        assert!(!world.items.contains(item));
        assert!(world.events.iter().any(|e| matches!(e, GameEvent::ItemPickedUp { kind: ItemKind::Potion, .. })));

        // nothing left to pick up
        let report = world.tick(DT, Vec2::ZERO, &config);
        assert!(report.collisions.pickups.is_empty());
        assert_eq!(world.player.score, 10);
    }

    #[test]
    fn test_aggressive_dino_bites_every_overlapping_tick() {
        let config = test_config();
        let mut world = meadow_world(&config);
        let (px, py) = world.player.tile();
        let dino = Dinosaur::new(px as f32 + 0.5, py as f32 + 0.5, true, &config.dinosaur);
        let e = world.spawn_dinosaur(dino);

        let mut bites = 0;
        let mut states = Vec::new();
        for _ in 0..3 {
            let report = world.tick(DT, Vec2::ZERO, &config);
            assert_eq!(report.collisions.attackers, vec![e]);
            bites += report.collisions.attackers.len();
            states.push(world.dinosaur_state(e));
            assert!(world.dinosaurs.get(e).is_some_and(|d| d.just_attacked));
        }

        assert_eq!(bites, 3);
        assert_eq!(
            world.player.health.current,
            config.player.max_health - 3 * config.dinosaur.attack_damage
        );
        // the flag still drives the brain: chase, attack, then flee
        assert_eq!(
            states,
            vec![Some(DinoState::Chase), Some(DinoState::Attack), Some(DinoState::Flee)]
        );
    }

    #[test]
    fn test_cornered_fleeing_dino_keeps_biting() {
        let config = test_config();
        let mut world = meadow_world(&config);
        let (px, py) = world.player.tile();
        let mut dino = Dinosaur::new(px as f32 + 0.5, py as f32 + 0.5, true, &config.dinosaur);
        dino.just_attacked = true;
        let e = world.spawn_dinosaur_in(dino, DinoState::Flee);
        // pinned in place, it never gets out of runaway distance
        if let Some(d) = world.dinosaurs.get_mut(e) {
            d.speed = 0.0;
        }

        for _ in 0..4 {
            let report = world.tick(DT, Vec2::ZERO, &config);
            assert_eq!(report.collisions.attackers, vec![e]);
        }
        assert_eq!(
            world.player.health.current,
            config.player.max_health - 4 * config.dinosaur.attack_damage
        );
    }

    #[test]
    fn test_repellent_and_passive_dinos_are_harmless() {
        let config = test_config();
        let mut world = meadow_world(&config);
        let (px, py) = world.player.tile();
        world.spawn_dinosaur(Dinosaur::new(px as f32 + 0.5, py as f32 + 0.5, false, &config.dinosaur));
        let report = world.tick(DT, Vec2::ZERO, &config);
        assert!(report.collisions.hits.is_empty());

        world.player.repellent_remaining = 5.0;
        world.spawn_dinosaur(Dinosaur::new(px as f32 + 0.5, py as f32 + 0.5, true, &config.dinosaur));
        let report = world.tick(DT, Vec2::ZERO, &config);
        assert!(report.collisions.hits.is_empty());
    }

    #[test]
    fn test_spikes_only_when_enabled() {
        let mut config = test_config();
        config.hazards.spike_damage = 7;
        let mut world = World::new(TileMap::filled(40, 40, SPIKES), &config);

        let report = world.tick(DT, Vec2::ZERO, &config);
        assert!(report.collisions.hits.is_empty());

        config.hazards.spikes_enabled = true;
        let report = world.tick(DT, Vec2::ZERO, &config);
        assert_eq!(report.collisions.hits, vec![Hit { source: DamageSource::Spikes, damage: 7 }]);
    }

    #[test]
    fn test_all_hazards_stack() {
        let mut config = test_config();
        config.hazards.spikes_enabled = true;
        config.hazards.spike_damage = 1;
        config.hazards.lava_damage = 2;
        let mut world = World::new(TileMap::filled(40, 40, SPIKES), &config);
        let (px, py) = world.player.tile();
        world.lava.tiles.insert((px, py));
        world.spawn_dinosaur(Dinosaur::new(px as f32 + 0.5, py as f32 + 0.5, true, &config.dinosaur));
        world.spawn_item(Item::new(ItemKind::Repellent, px as f32 + 0.5, py as f32 + 0.5));

        let report = world.tick(DT, Vec2::ZERO, &config);
        let sources: Vec<_> = report.collisions.hits.iter().map(|h| h.source).collect();
        assert_eq!(sources, vec![DamageSource::Lava, DamageSource::Spikes, DamageSource::Dinosaur]);
        assert_eq!(report.collisions.pickups.len(), 1);
    }
}
