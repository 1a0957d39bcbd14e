//! Shared game context
//!
//! Everything a scene may need beyond its own state: configuration, the
//! audio and save collaborators, the shared RNG, the current input snapshot
//! and the queue of scene changes. Passed explicitly to every scene callback.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::engine::game_loop::FrameStats;
use crate::engine::scene::SceneCommands;
use crate::platform::audio::{AudioSink, NullAudio};
use crate::platform::input::InputFrame;
use crate::platform::storage::{MemorySaveStore, SaveStore};

/// How the last run ended, shown on the Win / GameOver screens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub won: bool,
    pub score: u32,
    pub survived: f32,
    pub cycles: u32,
}

pub struct GameContext {
    pub config: GameConfig,
    pub audio: Rc<dyn AudioSink>,
    pub saves: Box<dyn SaveStore>,
    pub rng: StdRng,
    pub commands: SceneCommands,
    /// Input for the current frame; movement reads `input.axis`
    pub input: InputFrame,
    pub stats: FrameStats,
    pub show_debug: bool,
    /// Cleared to leave the main loop
    pub running: bool,
    pub last_run: Option<RunSummary>,
}

impl GameContext {
    pub fn new(config: GameConfig, audio: Rc<dyn AudioSink>, saves: Box<dyn SaveStore>) -> Self {
        let rng = match config.map.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let show_debug = config.debug;
        Self {
            config,
            audio,
            saves,
            rng,
            commands: SceneCommands::default(),
            input: InputFrame::default(),
            stats: FrameStats::default(),
            show_debug,
            running: true,
            last_run: None,
        }
    }

    /// Silent, in-memory context with default configuration.
    pub fn headless() -> Self {
        Self::new(
            GameConfig::default(),
            Rc::new(NullAudio),
            Box::new(MemorySaveStore::default()),
        )
    }

    pub fn quit(&mut self) {
        tracing::info!("quit requested");
        self.running = false;
    }
}
