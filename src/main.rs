//! Flucht von der Dinosaurier-Insel
//!
//! A small top-down survival game: stay alive on a volcanic island full of
//! dinosaurs until the rescue boat shows up, then reach it.
//!
//! - engine: fixed-step loop, scene stack, spatial grid, camera, particles
//! - game: map, player, dinosaurs, hazards, collisions, snapshots
//! - scenes: menu, intro, help, pause, playing and the two endings
//! - platform: macroquad drawing, audio, input devices, save slots

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod engine;
mod error;
mod game;
mod logging;
mod platform;
mod scenes;
mod ui;

use std::rc::Rc;

use macroquad::prelude::*;

use app::GameContext;
use config::{GameConfig, CONFIG_PATH};
use engine::game_loop::GameLoop;
use engine::scene::{SceneId, SceneStack};
use platform::audio::{AudioSink, MacroquadAudio};
use platform::input::{DeviceInput, InputSource};
use platform::storage::SaveStore;
use platform::surface::MacroquadSurface;

fn window_conf() -> Conf {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    Conf {
        window_title: config.window.title.clone(),
        window_width: config.window.width as i32,
        window_height: config.window.height as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn save_store() -> Box<dyn SaveStore> {
    Box::new(platform::storage::LocalSaveStore::user_default())
}

#[cfg(target_arch = "wasm32")]
fn save_store() -> Box<dyn SaveStore> {
    Box::new(platform::storage::MemorySaveStore::default())
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    if let Some(path) = logging::init() {
        tracing::info!("logging to {}", path.display());
    }
    tracing::info!(version = VERSION, "starting");

    let config = GameConfig::load_or_default(CONFIG_PATH);

    let mut surface = MacroquadSurface::new();
    surface.load_sprites(&config.assets.sprite_dir).await;
    let audio: Rc<dyn AudioSink> =
        Rc::new(MacroquadAudio::load(&config.assets.sound_dir, &config.assets.music).await);

    let mut input = DeviceInput::new(config.assets.enable_joystick, config.assets.joystick_threshold);
    let mut game_loop = GameLoop::new(&config.timing);
    let start_scene = config.start_scene.clone();

    let mut ctx = GameContext::new(config, Rc::clone(&audio), save_store());
    let mut stack = SceneStack::new(scenes::scene_factory());

    ctx.commands.switch_to_named(&start_scene);
    if ctx.commands.is_empty() {
        ctx.commands.switch_to(SceneId::Menu);
    }
    stack.apply_pending(&mut ctx);

    while ctx.running {
        let frame = input.poll();
        // a panic inside a scene still falls through to the cleanup below
        if let Err(err) =
            game_loop.guarded_frame(get_frame_time(), frame, &mut stack, &mut ctx, &mut surface)
        {
            tracing::error!("stopping: {err}");
            break;
        }
        next_frame().await;
    }

    audio.stop_all();
    tracing::info!(frames = ctx.stats.frames, "bye");
}
