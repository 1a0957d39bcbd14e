//! Island tile map
//!
//! The island is a grid of biome ids. `generate_island` builds one from a
//! seed: a fractal value-noise heightmap, faded toward the edges so the
//! border is always sea, thresholded into water / beach / forest / volcano,
//! then sprinkled with mud and (optionally) spikes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::platform::surface::Rgba;

pub type TileId = u8;

pub const VOLCANO: TileId = 0;
pub const FOREST: TileId = 1;
pub const BEACH: TileId = 2;
pub const WATER: TileId = 3;
pub const MUD: TileId = 4;
pub const SPIKES: TileId = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biome {
    pub name: &'static str,
    pub color: Rgba,
    pub passable: bool,
}

pub const BIOMES: [Biome; 6] = [
    Biome { name: "Volcano", color: Rgba::rgb(139, 69, 19), passable: true },
    Biome { name: "Forest", color: Rgba::rgb(34, 139, 34), passable: true },
    Biome { name: "Beach", color: Rgba::rgb(238, 214, 175), passable: true },
    Biome { name: "Water", color: Rgba::rgb(0, 0, 255), passable: false },
    Biome { name: "Mud", color: Rgba::rgb(102, 51, 0), passable: true },
    Biome { name: "Spikes", color: Rgba::rgb(128, 128, 128), passable: true },
];

pub fn biome(id: TileId) -> &'static Biome {
    BIOMES.get(id as usize).unwrap_or(&BIOMES[WATER as usize])
}

/// Heightmap thresholds, from the sea up.
const WATER_BELOW: f32 = 0.20;
const BEACH_BELOW: f32 = 0.30;
const FOREST_BELOW: f32 = 0.80;

const NOISE_OCTAVES: u32 = 5;
/// Lattice cells across the map for the lowest octave
const BASE_CELLS: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<TileId>,
    seed: u64,
}

impl TileMap {
    /// A map filled with one tile.
    pub fn filled(width: usize, height: usize, tile: TileId) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
            seed: 0,
        }
    }

    /// Build from rows of tile ids, mainly for tests.
    pub fn from_rows(rows: &[&[TileId]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut tiles = Vec::with_capacity(width * height);
        for row in rows {
            tiles.extend(row.iter().copied().chain(std::iter::repeat(WATER)).take(width));
        }
        Self { width, height, tiles, seed: 0 }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.tiles[y as usize * self.width + x as usize])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: TileId) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize * self.width + x as usize] = tile;
        }
    }

    /// Tile under a floating tile-space position.
    pub fn tile_at(&self, x: f32, y: f32) -> Option<TileId> {
        self.get(x.floor() as i32, y.floor() as i32)
    }

    /// Off-map is never passable; water blocks everyone.
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|t| biome(t).passable)
    }

    /// Dinosaurs additionally refuse water even if a biome table says otherwise.
    pub fn is_passable_for_dino(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|t| t != WATER && biome(t).passable)
    }

    /// Land tile with water somewhere in its 8-neighbourhood.
    pub fn is_coastal(&self, x: i32, y: i32) -> bool {
        match self.get(x, y) {
            Some(WATER) | None => false,
            Some(_) => (-1..=1).any(|dy| (-1..=1).any(|dx| self.get(x + dx, y + dy) == Some(WATER))),
        }
    }

    pub fn coastal_tiles(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_coastal(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    pub fn land_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != WATER).count()
    }

    /// Random passable tile, `None` after 1000 misses.
    pub fn random_passable(&self, rng: &mut impl Rng, for_dino: bool) -> Option<(i32, i32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        for _ in 0..1000 {
            let x = rng.gen_range(0..self.width as i32);
            let y = rng.gen_range(0..self.height as i32);
            let ok = if for_dino {
                self.is_passable_for_dino(x, y)
            } else {
                self.is_passable(x, y)
            };
            if ok {
                return Some((x, y));
            }
        }
        None
    }

    /// Seeded island with the default mud share and no spikes.
    pub fn generate_island(seed: u64, width: usize, height: usize) -> Self {
        Self::generate(seed, width, height, 0.03, None)
    }

    /// Seeded island. `spikes` is the share of land turned into spikes.
    pub fn generate(
        seed: u64,
        width: usize,
        height: usize,
        mud_fraction: f32,
        spikes: Option<f32>,
    ) -> Self {
        let mut map = Self::filled(width, height, WATER);
        map.seed = seed;
        if width == 0 || height == 0 {
            return map;
        }

        let heights = island_heightmap(seed, width, height);
        for (tile, &h) in map.tiles.iter_mut().zip(&heights) {
            *tile = if h < WATER_BELOW {
                WATER
            } else if h < BEACH_BELOW {
                BEACH
            } else if h < FOREST_BELOW {
                FOREST
            } else {
                VOLCANO
            };
        }

        // the crash site in the middle is always solid ground
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if map.get(cx + dx, cy + dy) == Some(WATER) {
                    map.set(cx + dx, cy + dy, VOLCANO);
                }
            }
        }

        let mut rng = StdRng::seed_from_u64(seed ^ 0x6D75_64);
        let mut land: Vec<usize> = (0..map.tiles.len())
            .filter(|&i| map.tiles[i] != WATER)
            .collect();
        land.shuffle(&mut rng);
        let mud = (land.len() as f32 * mud_fraction.max(0.0)) as usize;
        let spikes = spikes.map_or(0, |f| (land.len() as f32 * f.max(0.0)) as usize);
        for &i in land.iter().take(mud) {
            map.tiles[i] = MUD;
        }
        for &i in land.iter().skip(mud).take(spikes) {
            map.tiles[i] = SPIKES;
        }

        tracing::info!(seed, width, height, land = land.len(), mud, spikes, "island generated");
        map
    }
}

/// Fractal value noise in [0, 1] with a radial fade to zero at the edge.
fn island_heightmap(seed: u64, width: usize, height: usize) -> Vec<f32> {
    let size = width.max(height) as f32;
    let mut heights = vec![0.0f32; width * height];
    let mut min = f32::MAX;
    let mut max = f32::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0;
            let mut frequency = BASE_CELLS / size;
            let mut value = 0.0;
            for octave in 0..NOISE_OCTAVES {
                value += amplitude * value_noise(seed, octave, x as f32 * frequency, y as f32 * frequency);
                amplitude *= 0.5;
                frequency *= 2.0;
            }
            min = min.min(value);
            max = max.max(value);
            heights[y * width + x] = value;
        }
    }

    let range = max - min;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let max_r = width.min(height) as f32 / 2.0;
    for y in 0..height {
        for x in 0..width {
            let h = &mut heights[y * width + x];
            *h = if range < 1e-7 { 0.5 } else { (*h - min) / range };
            let dist = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt() / max_r;
            *h *= (1.0 - dist * dist).max(0.0);
        }
    }
    heights
}

/// Smoothly interpolated lattice noise in [0, 1].
fn value_noise(seed: u64, octave: u32, x: f32, y: f32) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (tx, ty) = (smoothstep(x - x0), smoothstep(y - y0));
    let (ix, iy) = (x0 as i64, y0 as i64);
    let corner = |dx: i64, dy: i64| lattice(seed, octave, ix + dx, iy + dy);
    let top = lerp(corner(0, 0), corner(1, 0), tx);
    let bottom = lerp(corner(0, 1), corner(1, 1), tx);
    lerp(top, bottom, ty)
}

fn lattice(seed: u64, octave: u32, x: i64, y: i64) -> f32 {
    let mut h = seed
        ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ u64::from(octave).wrapping_mul(0x1656_67B1_9E37_79F9);
    // splitmix64 finaliser
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 40) as f32 / (1u64 << 24) as f32
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
