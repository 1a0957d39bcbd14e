//! Game World
//!
//! The World owns everything that exists on the island during a run:
//! - the tile map and the player
//! - dinosaurs and items behind generational entity handles
//! - lava, the day/night clock and the boat
//! - a spatial grid rebuilt from the live set every tick
//! - deferred despawns, flushed at the end of the tick
//!
//! `tick` is one fixed simulation step. It never touches audio or the screen;
//! what happened comes back as a `TickReport` plus `GameEvent`s in `events`.

use macroquad::math::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::engine::component::ComponentStorage;
use crate::engine::entity::{Entity, EntityAllocator};
use crate::engine::event::EventQueue;
use crate::engine::spatial_grid::SpatialGrid;
use crate::engine::state_machine::StateMachine;

use super::collision::{CollisionReport, CollisionResolver};
use super::dinosaur::{AiContext, DinoBrain, DinoState, Dinosaur};
use super::events::GameEvent;
use super::hazards::{Boat, DayNight, LavaField};
use super::item::{Item, ItemKind};
use super::map::TileMap;
use super::player::Player;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Everything noteworthy from one `World::tick`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub moved: bool,
    pub collisions: CollisionReport,
    /// New phase if day/night flipped
    pub day_night: Option<bool>,
    /// Tile count if lava erupted
    pub lava_spawned: Option<usize>,
    pub boat_arrived: Option<(i32, i32)>,
    pub repellent_expired: bool,
    pub outcome: Option<Outcome>,
}

pub struct World {
    pub map: TileMap,
    pub player: Player,

    /// Entity allocator shared by dinosaurs and items
    pub(crate) entities: EntityAllocator,
    pub dinosaurs: ComponentStorage<Dinosaur>,
    /// One state machine per dinosaur, same handle
    pub brains: ComponentStorage<StateMachine<DinoState>>,
    pub items: ComponentStorage<Item>,

    pub lava: LavaField,
    pub clock: DayNight,
    pub boat: Boat,

    /// Dinosaurs and items by cell, rebuilt every tick
    pub grid: SpatialGrid,
    /// Events produced this tick, drained by the owner
    pub events: EventQueue<GameEvent>,

    despawn_queue: Vec<Entity>,
    brain: DinoBrain,
    pub(crate) rng: StdRng,
    outcome: Option<Outcome>,
}

impl World {
    /// Empty world on `map`, player at the map centre.
    pub fn new(map: TileMap, config: &GameConfig) -> Self {
        let seed = map.seed();
        let (cx, cy) = (map.width() / 2, map.height() / 2);
        let player = Player::new(cx as f32 + 0.5, cy as f32 + 0.5, &config.player);
        Self {
            map,
            player,
            entities: EntityAllocator::new(),
            dinosaurs: ComponentStorage::new(),
            brains: ComponentStorage::new(),
            items: ComponentStorage::new(),
            lava: LavaField::default(),
            clock: DayNight::default(),
            boat: Boat::default(),
            grid: SpatialGrid::new(config.map.grid_cell_size),
            events: EventQueue::new(),
            despawn_queue: Vec::new(),
            brain: DinoBrain::new(seed.wrapping_add(1)),
            rng: StdRng::seed_from_u64(seed.wrapping_add(2)),
            outcome: None,
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    pub fn spawn_dinosaur(&mut self, dino: Dinosaur) -> Entity {
        self.spawn_dinosaur_in(dino, DinoState::Idle)
    }

    pub(crate) fn spawn_dinosaur_in(&mut self, dino: Dinosaur, state: DinoState) -> Entity {
        let entity = self.entities.allocate();
        self.dinosaurs.insert(entity, dino);
        self.brains.insert(entity, StateMachine::new(state));
        entity
    }

    pub fn spawn_item(&mut self, item: Item) -> Entity {
        let entity = self.entities.allocate();
        self.items.insert(entity, item);
        entity
    }

    /// Queue an entity for removal at the end of the tick.
    pub fn despawn(&mut self, entity: Entity) {
        if self.entities.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    pub fn pending_despawns(&self) -> &[Entity] {
        &self.despawn_queue
    }

    /// Remove queued entities and dinosaurs without health.
    pub fn flush_despawns(&mut self) -> usize {
        let dead: Vec<Entity> = self
            .dinosaurs
            .iter()
            .filter(|(_, d)| d.health.is_dead())
            .map(|(e, _)| e)
            .collect();
        for entity in dead {
            self.despawn(entity);
        }

        let mut removed = 0;
        for entity in self.despawn_queue.drain(..) {
            self.dinosaurs.remove(entity);
            self.brains.remove(entity);
            self.items.remove(entity);
            if self.entities.free(entity) {
                removed += 1;
            }
        }
        removed
    }

    /// Drop every entity and the hazards, keeping map and player.
    pub(crate) fn clear_entities(&mut self) {
        self.dinosaurs.clear();
        self.brains.clear();
        self.items.clear();
        self.entities.clear();
        self.despawn_queue.clear();
        self.grid.clear();
    }

    pub fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (entity, dino) in self.dinosaurs.iter() {
            self.grid.insert(entity, dino);
        }
        for (entity, item) in self.items.iter() {
            self.grid.insert(entity, item);
        }
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Use one carried item. Returns false if nothing happened.
    pub fn use_item(&mut self, kind: ItemKind, config: &GameConfig) -> bool {
        let used = match kind {
            ItemKind::Potion => self.player.use_potion(&config.items),
            ItemKind::Repellent => self.player.trigger_repellent(&config.items),
        };
        if used {
            self.events.send(GameEvent::ItemUsed { kind });
        }
        used
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// One fixed step: player, clock, lava, AI, collisions, boat, win/lose.
    pub fn tick(&mut self, dt: f32, axis: Vec2, config: &GameConfig) -> TickReport {
        let mut report = TickReport::default();
        if self.outcome.is_some() {
            return report;
        }

        report.moved = self.player.step(axis, dt, &self.map, &config.player);
        report.repellent_expired = self.player.update(dt).repellent_expired;

        report.day_night = self.clock.update(dt, &config.cycle);
        if let Some(night) = report.day_night {
            self.events.send(GameEvent::DayNightChanged { night });
        }

        report.lava_spawned = self.lava.update(dt, &self.map, &config.hazards, &mut self.rng);
        if let Some(fields) = report.lava_spawned {
            self.events.send(GameEvent::LavaSpawned { fields });
        }

        self.rebuild_grid();
        self.update_dinosaurs(dt, config);

        report.collisions = CollisionResolver::resolve(self, config);

        if self.boat.due(self.clock.cycles_completed(&config.cycle), &config.boat) {
            report.boat_arrived = self.boat.arrive(&self.map, &mut self.rng);
            if let Some((x, y)) = report.boat_arrived {
                self.events.send(GameEvent::BoatArrived { x, y });
            }
        }
        self.boat.animate(dt, &config.boat);

        let (px, py) = self.player.tile();
        if self.boat.is_at(px, py) {
            self.finish(Outcome::Won);
        } else if self.player.health.is_dead() {
            self.finish(Outcome::Lost);
        }
        report.outcome = self.outcome;

        self.flush_despawns();
        report
    }

    fn finish(&mut self, outcome: Outcome) {
        let score = self.player.score;
        self.outcome = Some(outcome);
        match outcome {
            Outcome::Won => {
                tracing::info!(score, "player reached the boat");
                self.events.send(GameEvent::GameWon { score });
            }
            Outcome::Lost => {
                tracing::info!(score, "player died");
                self.events.send(GameEvent::GameLost { score });
            }
        }
    }

    fn update_dinosaurs(&mut self, dt: f32, config: &GameConfig) {
        let ctx = AiContext {
            player: Vec2::new(self.player.x, self.player.y),
            repellent_active: self.player.repellent_active(),
            night: self.clock.night,
            map: &self.map,
            config: &config.dinosaur,
        };
        for (entity, dino) in self.dinosaurs.iter_mut() {
            let Some(fsm) = self.brains.get_mut(entity) else {
                tracing::warn!(?entity, "dinosaur without a brain");
                continue;
            };
            if let Err(err) = fsm.update(&mut self.brain, dino, &ctx, dt) {
                tracing::warn!(?entity, state = ?fsm.state(), "dinosaur AI failed: {err}");
            }
        }
    }

    pub fn dinosaur_state(&self, entity: Entity) -> Option<DinoState> {
        self.brains.get(entity).map(|fsm| fsm.state())
    }
}
