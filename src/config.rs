//! Game configuration
//!
//! Loaded once at startup from `assets/config.ron`. Every section has
//! defaults that match the shipped game, so a missing or partial file still
//! produces a playable configuration.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::ConfigError;

/// Default location of the configuration file
pub const CONFIG_PATH: &str = "assets/config.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub map: MapConfig,
    pub player: PlayerConfig,
    pub dinosaur: DinosaurConfig,
    pub cycle: CycleConfig,
    pub hazards: HazardConfig,
    pub items: ItemConfig,
    pub boat: BoatConfig,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub post_processing: PostProcessingConfig,
    pub assets: AssetConfig,
    /// Scene shown after startup (by name, e.g. "menu" or "playing")
    pub start_scene: String,
    pub debug: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            timing: TimingConfig::default(),
            map: MapConfig::default(),
            player: PlayerConfig::default(),
            dinosaur: DinosaurConfig::default(),
            cycle: CycleConfig::default(),
            hazards: HazardConfig::default(),
            items: ItemConfig::default(),
            boat: BoatConfig::default(),
            camera: CameraConfig::default(),
            particles: ParticleConfig::default(),
            post_processing: PostProcessingConfig::default(),
            assets: AssetConfig::default(),
            start_scene: "menu".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flucht von der Dinosaurier Insel".to_string(),
            width: 1500,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed simulation step in seconds
    pub fixed_step: f32,
    /// Frames averaged by the delta smoother
    pub smoothing_samples: usize,
    /// Lower clamp for a raw frame time (seconds)
    pub min_frame_time: f32,
    /// Upper clamp for a raw frame time (seconds)
    pub max_frame_time: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            smoothing_samples: 10,
            min_frame_time: 0.001,
            max_frame_time: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    /// Fixed seed; `None` picks one at random and logs it
    pub seed: Option<u64>,
    /// Spatial grid cell size in tiles
    pub grid_cell_size: f32,
    pub mud_fraction: f32,
    pub spike_fraction: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            tile_size: 32.0,
            seed: Some(12341),
            grid_cell_size: 10.0,
            mud_fraction: 0.03,
            spike_fraction: 0.02,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Movement speed in tiles per second
    pub speed: f32,
    pub max_health: i32,
    /// Multiplier applied to movement on mud tiles
    pub mud_factor: f32,
    /// How long a buffered action press stays valid (seconds)
    pub input_buffer_time: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            max_health: 120,
            mud_factor: 0.5,
            input_buffer_time: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DinosaurConfig {
    pub count_normal: usize,
    pub count_aggressive: usize,
    pub max_health: i32,
    /// Wander step speed in tiles per second
    pub speed_normal: f32,
    /// Chase / flee speed in tiles per second
    pub speed_aggressive: f32,
    pub sight_day: f32,
    pub sight_night: f32,
    pub attack_damage: i32,
    /// Chance per tick that an idle dinosaur starts a wander step
    pub random_move_chance: f32,
    /// Distance at which a fleeing dinosaur calms down
    pub runaway_distance: f32,
    /// Duration of a single wander step (seconds)
    pub wander_time: f32,
}

impl Default for DinosaurConfig {
    fn default() -> Self {
        Self {
            count_normal: 100,
            count_aggressive: 60,
            max_health: 50,
            speed_normal: 2.0,
            speed_aggressive: 3.0,
            sight_day: 5.0,
            sight_night: 8.0,
            attack_damage: 5,
            random_move_chance: 0.05,
            runaway_distance: 3.0,
            wander_time: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub day_length: f32,
    pub night_length: f32,
    /// Night overlay RGBA
    pub night_overlay: [u8; 4],
}

impl CycleConfig {
    pub fn cycle_length(&self) -> f32 {
        self.day_length + self.night_length
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            day_length: 8.0,
            night_length: 8.0,
            night_overlay: [0, 0, 50, 100],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Seconds between lava spawns
    pub lava_interval: f32,
    /// Seconds a lava field stays before it cools down
    pub lava_duration: f32,
    pub lava_damage: i32,
    /// Lava tiles attempted per spawn
    pub lava_count: usize,
    /// Spawn radius around the map centre (tiles)
    pub lava_radius: i32,
    pub spikes_enabled: bool,
    pub spike_damage: i32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            lava_interval: 10.0,
            lava_duration: 5.0,
            lava_damage: 20,
            lava_count: 8,
            lava_radius: 30,
            spikes_enabled: false,
            spike_damage: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub spawn_count: usize,
    pub potion_heal: i32,
    pub repellent_duration: f32,
    pub pickup_score: u32,
    /// Minimum spacing between spawned items (tiles)
    pub min_spacing: f32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            spawn_count: 6,
            potion_heal: 25,
            repellent_duration: 10.0,
            pickup_score: 10,
            min_spacing: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatConfig {
    /// Full day/night cycles before the boat shows up
    pub arrival_cycles: u32,
    pub size_factor: f32,
    pub animation_interval: f32,
    pub color: [u8; 3],
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            arrival_cycles: 3,
            size_factor: 2.0,
            animation_interval: 0.3,
            color: [255, 255, 0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Exponential smoothing factor in (0, 1)
    pub smoothness: f32,
    /// Zoom easing rate per second
    pub zoom_speed: f32,
    /// Dead zone size in screen pixels, `None` disables it
    pub dead_zone: Option<(f32, f32)>,
    /// Seconds of velocity the camera leads by
    pub look_ahead: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smoothness: 0.15,
            zoom_speed: 5.0,
            dead_zone: Some((96.0, 64.0)),
            look_ahead: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Upper bound on particles spawned by a single burst
    pub max_burst: usize,
    /// Lava fields that get ember bursts per spawn
    pub max_lava_emitters: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_burst: 25,
            max_lava_emitters: 10,
        }
    }
}

/// Full-screen effects. Only the vignette has a key (F4); the others are
/// switched on here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessingConfig {
    pub vignette: bool,
    pub scanlines: bool,
    pub noise: bool,
    /// Edge darkness of the vignette in [0, 1]
    pub vignette_strength: f32,
    /// Alpha of each scanline
    pub scanline_intensity: u8,
    /// Brightest noise pixel
    pub noise_intensity: u8,
    /// Seconds between noise redraws
    pub noise_interval: f32,
}

impl Default for PostProcessingConfig {
    fn default() -> Self {
        Self {
            vignette: false,
            scanlines: false,
            noise: false,
            vignette_strength: 0.5,
            scanline_intensity: 50,
            noise_intensity: 10,
            noise_interval: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub sprite_dir: String,
    pub sound_dir: String,
    pub music: Vec<String>,
    pub enable_joystick: bool,
    pub joystick_threshold: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sprite_dir: "assets/sprites".to_string(),
            sound_dir: "assets/sounds".to_string(),
            music: vec!["music1.ogg".to_string(), "music2.ogg".to_string()],
            enable_joystick: false,
            joystick_threshold: 0.5,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from RON text and validate it
    pub fn from_ron(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_ron(&text, path)
    }

    /// Load the configuration, falling back to defaults on any problem
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path);
                config
            }
            Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                error!("{}", e);
                error!("Using default GameConfig");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timing.fixed_step > 0.0 && self.timing.fixed_step.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "timing.fixed_step",
                reason: format!("must be positive, got {}", self.timing.fixed_step),
            });
        }
        if self.timing.smoothing_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.smoothing_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.camera.smoothness > 0.0 && self.camera.smoothness < 1.0) {
            return Err(ConfigError::Invalid {
                field: "camera.smoothness",
                reason: format!("must be in (0, 1), got {}", self.camera.smoothness),
            });
        }
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::Invalid {
                field: "map",
                reason: "map must not be empty".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.post_processing.vignette_strength) {
            return Err(ConfigError::Invalid {
                field: "post_processing.vignette_strength",
                reason: format!("must be in [0, 1], got {}", self.post_processing.vignette_strength),
            });
        }
        if self.map.grid_cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "map.grid_cell_size",
                reason: format!("must be positive, got {}", self.map.grid_cell_size),
            });
        }
        Ok(())
    }
}
