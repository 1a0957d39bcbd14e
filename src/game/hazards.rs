//! Timed world hazards: the day/night cycle, lava eruptions and the boat
//!
//! All timers run on simulation time handed in by the fixed-step update, so
//! pausing the game pauses them too.

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{BoatConfig, CycleConfig, HazardConfig};

use super::map::TileMap;

// =============================================================================
// Day / night
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DayNight {
    /// Simulation seconds since the run started
    pub elapsed: f32,
    pub night: bool,
}

impl DayNight {
    pub fn is_night_at(t: f32, cycle: &CycleConfig) -> bool {
        let length = cycle.cycle_length();
        if length <= 0.0 {
            return false;
        }
        t.rem_euclid(length) > cycle.day_length
    }

    /// Advance the clock. Returns the new phase when it flipped this tick.
    pub fn update(&mut self, dt: f32, cycle: &CycleConfig) -> Option<bool> {
        self.elapsed += dt;
        let night = Self::is_night_at(self.elapsed, cycle);
        if night == self.night {
            return None;
        }
        self.night = night;
        tracing::debug!(night, elapsed = self.elapsed, "day/night changed");
        Some(night)
    }

    pub fn cycles_completed(&self, cycle: &CycleConfig) -> u32 {
        let length = cycle.cycle_length();
        if length <= 0.0 {
            return 0;
        }
        (self.elapsed / length).floor() as u32
    }

    /// 0.0 at dawn, 1.0 at the end of the night
    pub fn cycle_progress(&self, cycle: &CycleConfig) -> f32 {
        let length = cycle.cycle_length();
        if length <= 0.0 {
            return 0.0;
        }
        self.elapsed.rem_euclid(length) / length
    }
}

// =============================================================================
// Lava
// =============================================================================

/// The current set of lava tiles, replaced on every eruption
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LavaField {
    pub tiles: FxHashSet<(i32, i32)>,
    /// Seconds since the last eruption
    pub since_eruption: f32,
    /// Seconds the current tiles have existed
    pub age: f32,
}

impl LavaField {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.tiles.contains(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in a stable order, for particles and drawing
    pub fn sorted(&self) -> Vec<(i32, i32)> {
        let mut tiles: Vec<_> = self.tiles.iter().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    /// Pick up to `count` passable tiles within `radius` of the map centre.
    /// Duplicates collapse.
    pub fn erupt(&mut self, map: &TileMap, hazards: &HazardConfig, rng: &mut impl Rng) -> usize {
        let (cx, cy) = ((map.width() / 2) as i32, (map.height() / 2) as i32);
        let r = hazards.lava_radius.max(0);
        self.tiles.clear();
        for _ in 0..hazards.lava_count {
            let x = cx + rng.gen_range(-r..=r);
            let y = cy + rng.gen_range(-r..=r);
            if map.is_passable(x, y) {
                self.tiles.insert((x, y));
            }
        }
        self.since_eruption = 0.0;
        self.age = 0.0;
        tracing::info!(fields = self.tiles.len(), "lava erupted");
        self.tiles.len()
    }

    /// Advance timers. Erupts every `lava_interval`; tiles cool after
    /// `lava_duration`. Returns the number of new tiles on an eruption.
    pub fn update(
        &mut self,
        dt: f32,
        map: &TileMap,
        hazards: &HazardConfig,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        self.since_eruption += dt;
        self.age += dt;
        if self.since_eruption > hazards.lava_interval {
            return Some(self.erupt(map, hazards, rng));
        }
        if !self.tiles.is_empty() && hazards.lava_duration > 0.0 && self.age >= hazards.lava_duration {
            tracing::debug!("lava cooled");
            self.tiles.clear();
        }
        None
    }
}

// =============================================================================
// Boat
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boat {
    /// Tile the boat is moored at, once it has arrived
    pub tile: Option<(i32, i32)>,
    #[serde(skip)]
    pub frame: usize,
    #[serde(skip)]
    pub animation_timer: f32,
}

impl Boat {
    pub fn arrived(&self) -> bool {
        self.tile.is_some()
    }

    pub fn due(&self, cycles_completed: u32, boat: &BoatConfig) -> bool {
        !self.arrived() && cycles_completed >= boat.arrival_cycles
    }

    /// Moor on a random coastal tile, or any land tile if the island has no
    /// coast.
    pub fn arrive(&mut self, map: &TileMap, rng: &mut impl Rng) -> Option<(i32, i32)> {
        let coast = map.coastal_tiles();
        let tile = if coast.is_empty() {
            tracing::warn!("no coastal tile found, placing boat on land");
            map.random_passable(rng, false)
        } else {
            Some(coast[rng.gen_range(0..coast.len())])
        };
        match tile {
            Some((x, y)) => tracing::info!(x, y, "boat arrived"),
            None => tracing::error!("nowhere to place the boat"),
        }
        self.tile = tile;
        tile
    }

    pub fn is_at(&self, x: i32, y: i32) -> bool {
        self.tile == Some((x, y))
    }

    pub fn animate(&mut self, dt: f32, boat: &BoatConfig) {
        if !self.arrived() {
            return;
        }
        self.animation_timer += dt;
        if boat.animation_interval > 0.0 && self.animation_timer >= boat.animation_interval {
            self.animation_timer = 0.0;
            self.frame = (self.frame + 1) % 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::{FOREST, WATER};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cycle() -> CycleConfig {
        CycleConfig {
            day_length: 2.0,
            night_length: 1.0,
            ..CycleConfig::default()
        }
    }

    #[test]
    fn test_day_night_flips() {
        let mut clock = DayNight::default();
        assert_eq!(clock.update(1.9, &cycle()), None);
        assert_eq!(clock.update(0.2, &cycle()), Some(true));
        assert_eq!(clock.update(0.5, &cycle()), None);
        assert_eq!(clock.update(0.5, &cycle()), Some(false));
        assert_eq!(clock.cycles_completed(&cycle()), 1);
    }

    #[test]
    fn test_lava_set_replaced_and_bounded() {
        let map = TileMap::filled(100, 100, FOREST);
        let hazards = HazardConfig {
            lava_count: 8,
            lava_radius: 3,
            ..HazardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut lava = LavaField::default();
        lava.erupt(&map, &hazards, &mut rng);
        assert!(!lava.is_empty() && lava.len() <= 8);
        for &(x, y) in &lava.tiles {
            assert!((x - 50).abs() <= 3 && (y - 50).abs() <= 3);
        }
        let before = lava.clone();
        lava.erupt(&map, &hazards, &mut rng);
        assert!(lava.len() <= 8);
        assert_ne!(before.tiles, lava.tiles);
    }

    #[test]
    fn test_lava_skips_water() {
        let map = TileMap::filled(20, 20, WATER);
        let mut rng = StdRng::seed_from_u64(4);
        let mut lava = LavaField::default();
        assert_eq!(lava.erupt(&map, &HazardConfig::default(), &mut rng), 0);
    }

    #[test]
    fn test_lava_interval_and_cooling() {
        let map = TileMap::filled(100, 100, FOREST);
        let hazards = HazardConfig {
            lava_interval: 1.0,
            lava_duration: 0.5,
            ..HazardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut lava = LavaField::default();
        assert_eq!(lava.update(0.9, &map, &hazards, &mut rng), None);
        assert!(lava.update(0.2, &map, &hazards, &mut rng).is_some());
        assert!(!lava.is_empty());
        lava.update(0.6, &map, &hazards, &mut rng);
        assert!(lava.is_empty());
    }

    #[test]
    fn test_boat_lands_on_coast() {
        let map = TileMap::from_rows(&[
            &[WATER, WATER, WATER, WATER, WATER],
            &[WATER, FOREST, FOREST, FOREST, WATER],
            &[WATER, FOREST, FOREST, FOREST, WATER],
            &[WATER, FOREST, FOREST, FOREST, WATER],
            &[WATER, WATER, WATER, WATER, WATER],
        ]);
        let boat_cfg = BoatConfig::default();
        let mut boat = Boat::default();
        assert!(!boat.due(boat_cfg.arrival_cycles - 1, &boat_cfg));
        assert!(boat.due(boat_cfg.arrival_cycles, &boat_cfg));

        let mut rng = StdRng::seed_from_u64(2);
        let (x, y) = boat.arrive(&map, &mut rng).unwrap();
        assert!(map.is_coastal(x, y));
        assert_ne!((x, y), (2, 2));
        assert!(boat.is_at(x, y));
        assert!(!boat.due(10, &boat_cfg));
    }

    #[test]
    fn test_boat_falls_back_to_land() {
        let map = TileMap::filled(4, 4, FOREST);
        let mut rng = StdRng::seed_from_u64(2);
        let mut boat = Boat::default();
        assert!(boat.arrive(&map, &mut rng).is_some());
    }
}
