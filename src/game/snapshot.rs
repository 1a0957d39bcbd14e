//! Quick save / quick load
//!
//! A `WorldSnapshot` is everything needed to put a run back the way it was.
//! The map itself is not stored: it is regenerated from its seed, so a
//! snapshot only restores into a world built from the same seed and size.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::SaveError;
use crate::platform::storage::SaveStore;

use super::dinosaur::{DinoState, Dinosaur};
use super::hazards::{Boat, DayNight, LavaField};
use super::item::Item;
use super::map::TileMap;
use super::player::Player;
use super::world::World;

/// Slot used by F5 / F9
pub const QUICK_SLOT: &str = "quicksave";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DinoRecord {
    pub dino: Dinosaur,
    pub state: DinoState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub player: Player,
    pub dinosaurs: Vec<DinoRecord>,
    pub items: Vec<Item>,
    pub lava: LavaField,
    pub clock: DayNight,
    pub boat: Boat,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            seed: world.map.seed(),
            width: world.map.width(),
            height: world.map.height(),
            player: world.player.clone(),
            dinosaurs: world
                .dinosaurs
                .iter()
                .map(|(entity, dino)| DinoRecord {
                    dino: dino.clone(),
                    state: world.dinosaur_state(entity).unwrap_or(DinoState::Idle),
                })
                .collect(),
            items: world.items.iter().map(|(_, item)| *item).collect(),
            lava: world.lava.clone(),
            clock: world.clock,
            boat: world.boat,
        }
    }

    pub fn encode(&self) -> Result<String, SaveError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, SaveError> {
        Ok(ron::de::from_bytes(data)?)
    }

    /// Put the saved state into `world`. Fails without touching the world if
    /// the snapshot was taken on a different island.
    pub fn restore_into(&self, world: &mut World) -> Result<(), SaveError> {
        if self.seed != world.map.seed()
            || self.width != world.map.width()
            || self.height != world.map.height()
        {
            return Err(SaveError::SeedMismatch {
                expected: world.map.seed(),
                found: self.seed,
            });
        }

        world.clear_entities();
        world.player = self.player.clone();
        for record in &self.dinosaurs {
            world.spawn_dinosaur_in(record.dino.clone(), record.state);
        }
        for item in &self.items {
            world.spawn_item(*item);
        }
        world.lava = self.lava.clone();
        world.clock = self.clock;
        world.boat = self.boat;
        world.rebuild_grid();
        tracing::info!(
            seed = self.seed,
            dinos = self.dinosaurs.len(),
            items = self.items.len(),
            "world restored"
        );
        Ok(())
    }

    /// Build a fresh world on the snapshot's island.
    pub fn into_world(&self, config: &GameConfig) -> Result<World, SaveError> {
        let spikes = config
            .hazards
            .spikes_enabled
            .then_some(config.map.spike_fraction);
        let map = TileMap::generate(self.seed, self.width, self.height, config.map.mud_fraction, spikes);
        let mut world = World::new(map, config);
        self.restore_into(&mut world)?;
        Ok(world)
    }
}

pub fn save_world(world: &World, store: &dyn SaveStore, slot: &str) -> Result<(), SaveError> {
    let text = WorldSnapshot::capture(world).encode()?;
    if store.save(slot, text.as_bytes()) {
        Ok(())
    } else {
        Err(SaveError::Unavailable)
    }
}

pub fn load_snapshot(store: &dyn SaveStore, slot: &str) -> Result<WorldSnapshot, SaveError> {
    let data = store
        .load(slot)
        .ok_or_else(|| SaveError::EmptySlot(slot.to_string()))?;
    WorldSnapshot::decode(&data)
}
