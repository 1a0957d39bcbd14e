//! The running game
//!
//! Owns the world plus everything that only exists to present it: camera,
//! particles, post effects, HUD and the event bus that turns world events
//! into sounds.
//! One `update` is one fixed simulation step.

use std::cell::Cell;

use crate::app::{GameContext, RunSummary};
use crate::engine::camera::{Camera, Falloff};
use crate::engine::event::EventBus;
use crate::engine::input_buffer::InputBuffer;
use crate::engine::particles::{BurstDef, ParticleSystem};
use crate::engine::post_processing::PostProcessing;
use crate::engine::scene::{Scene, SceneId};
use crate::error::SaveError;
use crate::game::events::{game_bus, GameEvent};
use crate::game::renderer::draw_world;
use crate::game::snapshot::{load_snapshot, save_world, QUICK_SLOT};
use crate::game::spawn;
use crate::game::{ItemKind, Outcome, TickReport, World};
use crate::platform::input::Key;
use crate::platform::surface::{Rgba, Surface};
use crate::ui::{DebugOverlay, Hud};

const FLASH_TIME: f32 = 0.2;
const FLASH_ALPHA: u8 = 100;
const DAMAGE_FLASH: Rgba = Rgba::rgb(255, 0, 0);
const PICKUP_FLASH: Rgba = Rgba::rgb(0, 255, 0);
const REPELLENT_FLASH: Rgba = Rgba::rgb(0, 0, 255);

pub struct PlayingScene {
    world: World,
    bus: EventBus<GameEvent>,
    camera: Camera,
    particles: ParticleSystem,
    post: PostProcessing,
    hud: Hud,
    actions: InputBuffer<ItemKind>,
    /// Seconds simulated in this scene
    sim_time: f32,
    /// Last surface size seen by `render`
    viewport: Cell<(f32, f32)>,
}

impl PlayingScene {
    pub fn new(ctx: &mut GameContext) -> Self {
        let world = spawn::new_world(&ctx.config, &mut ctx.rng);
        Self::with_world(world, ctx)
    }

    pub fn with_world(world: World, ctx: &GameContext) -> Self {
        let config = &ctx.config;
        let (vw, vh) = (config.window.width as f32, config.window.height as f32);
        let seed = world.map.seed();
        let camera = Camera::new(vw, vh, config.map.tile_size, &config.camera)
            .with_map_bounds(world.map.width(), world.map.height())
            .with_seed(seed);
        let particles = ParticleSystem::new(seed).with_max_burst(config.particles.max_burst);
        let post = PostProcessing::new(vw, vh, &config.post_processing, seed);
        Self {
            world,
            bus: game_bus(ctx.audio.clone()),
            camera,
            particles,
            post,
            hud: Hud::new(),
            actions: InputBuffer::new(config.player.input_buffer_time),
            sim_time: 0.0,
            viewport: Cell::new((vw, vh)),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    fn reset_view(&mut self) {
        self.hud.refresh_minimap(&self.world.map);
        self.follow_player();
        self.camera.snap_to_target();
    }

    fn follow_player(&mut self) {
        let player = &self.world.player;
        self.camera.set_target(player.x, player.y, Some(player.velocity));
    }

    /// Player position in world pixels, for particles.
    fn player_px(&self) -> (f32, f32) {
        let ts = self.camera.tile_size();
        (self.world.player.x * ts, self.world.player.y * ts)
    }

    fn quick_save(&self, ctx: &GameContext) {
        match save_world(&self.world, ctx.saves.as_ref(), QUICK_SLOT) {
            Ok(()) => tracing::info!(slot = QUICK_SLOT, "quick save written"),
            Err(err) => tracing::warn!("quick save failed: {err}"),
        }
    }

    fn quick_load(&mut self, ctx: &GameContext) {
        let snapshot = match load_snapshot(ctx.saves.as_ref(), QUICK_SLOT) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!("quick load failed: {err}");
                return;
            }
        };
        match snapshot.restore_into(&mut self.world) {
            Ok(()) => {}
            Err(SaveError::SeedMismatch { expected, found }) => {
                tracing::info!(expected, found, "snapshot is from another island, rebuilding");
                match snapshot.into_world(&ctx.config) {
                    Ok(world) => self.world = world,
                    Err(err) => {
                        tracing::warn!("quick load failed: {err}");
                        return;
                    }
                }
            }
            Err(err) => {
                tracing::warn!("quick load failed: {err}");
                return;
            }
        }
        self.particles.clear();
        self.actions.clear();
        self.reset_view();
        tracing::info!(slot = QUICK_SLOT, "quick save restored");
    }

    fn use_buffered_items(&mut self, ctx: &GameContext) {
        for kind in ItemKind::ALL {
            if !self.actions.is_buffered(kind, self.sim_time) {
                continue;
            }
            if !self.world.use_item(kind, &ctx.config) {
                continue;
            }
            self.actions.consume(kind, self.sim_time);
            let (px, py) = self.player_px();
            match kind {
                ItemKind::Repellent => {
                    self.hud.trigger_flash(REPELLENT_FLASH, FLASH_ALPHA, FLASH_TIME);
                    self.camera.shake(3.0, 0.2, Falloff::Linear);
                    self.particles.emit(px, py, &BurstDef::repellent_burst());
                }
                ItemKind::Potion => {
                    self.particles.emit(px, py, &BurstDef::potion_sparkle());
                }
            }
        }
    }

    fn present(&mut self, report: &TickReport, ctx: &GameContext) {
        let (px, py) = self.player_px();
        if !report.collisions.hits.is_empty() {
            self.hud.trigger_flash(DAMAGE_FLASH, FLASH_ALPHA, FLASH_TIME);
            self.particles.emit(px, py, &BurstDef::damage_sparks());
        }
        if !report.collisions.pickups.is_empty() {
            self.hud.trigger_flash(PICKUP_FLASH, FLASH_ALPHA, FLASH_TIME);
        }
        if report.lava_spawned.is_some() {
            self.camera.shake(4.0, 0.4, Falloff::Linear);
            let ts = self.camera.tile_size();
            let embers = BurstDef::lava_embers();
            for (x, y) in self
                .world
                .lava
                .sorted()
                .into_iter()
                .take(ctx.config.particles.max_lava_emitters)
            {
                self.particles
                    .emit((x as f32 + 0.5) * ts, (y as f32 + 0.5) * ts, &embers);
            }
        }
        if report.boat_arrived.is_some() {
            self.camera.shake(15.0, 1.2, Falloff::Quadratic);
        }
    }

    fn finish(&self, outcome: Outcome, ctx: &mut GameContext) {
        let won = outcome == Outcome::Won;
        ctx.last_run = Some(RunSummary {
            won,
            score: self.world.player.score,
            survived: self.world.clock.elapsed,
            cycles: self.world.clock.cycles_completed(&ctx.config.cycle),
        });
        ctx.commands
            .switch_to(if won { SceneId::Win } else { SceneId::GameOver });
    }

    fn debug_overlay(&self, ctx: &GameContext) -> DebugOverlay {
        let mut overlay = DebugOverlay::new();
        let player = &self.world.player;
        overlay.set("FPS", format!("{:.0}", ctx.stats.fps));
        overlay.set("Updates", ctx.stats.updates_last_frame);
        overlay.set("Entities", self.world.entity_count());
        overlay.set("Particles", self.particles.len());
        overlay.set("Player", format!("({:.1}, {:.1})", player.x, player.y));
        overlay.set("Time", format!("{:.2}s", self.sim_time));
        let shake = self
            .camera
            .current_shake()
            .map_or_else(|| "-".to_string(), |s| format!("{:.1}", s.intensity));
        overlay.set("Shake", shake);
        overlay.set("Memory", DebugOverlay::memory_line());
        overlay
    }
}

impl Scene for PlayingScene {
    fn id(&self) -> SceneId {
        SceneId::Playing
    }

    fn on_enter(&mut self, ctx: &mut GameContext) {
        self.reset_view();
        ctx.audio.play_music();
        tracing::info!(
            seed = self.world.map.seed(),
            dinosaurs = self.world.dinosaurs.len(),
            items = self.world.items.len(),
            "run started"
        );
    }

    fn on_exit(&mut self, ctx: &mut GameContext) {
        ctx.audio.stop_music();
    }

    fn handle_input(&mut self, key: Key, ctx: &mut GameContext) {
        match key {
            Key::Back => ctx.commands.push(SceneId::Pause),
            Key::Help => ctx.commands.push(SceneId::Help),
            Key::ToggleDebug => ctx.show_debug = !ctx.show_debug,
            Key::ToggleVignette => self.post.toggle_vignette(),
            Key::ToggleMusic => ctx.audio.toggle_music(),
            Key::Potion => self.actions.buffer(ItemKind::Potion, self.sim_time),
            Key::Repellent => self.actions.buffer(ItemKind::Repellent, self.sim_time),
            Key::QuickSave => self.quick_save(ctx),
            Key::QuickLoad => self.quick_load(ctx),
            Key::Quit => ctx.quit(),
            _ => {}
        }
    }

    fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        if self.world.outcome().is_some() {
            return;
        }
        self.sim_time += dt;

        self.use_buffered_items(ctx);
        self.actions.expire(self.sim_time);

        let report = self.world.tick(dt, ctx.input.axis, &ctx.config);
        self.present(&report, ctx);

        for event in self.world.events.drain() {
            self.bus.emit(&event);
        }

        let (vw, vh) = self.viewport.get();
        self.camera.set_viewport(vw, vh);
        self.post.resize(vw, vh);
        self.post.update(dt);
        self.follow_player();
        self.camera.update(dt);
        self.particles.update(dt);
        self.hud.update(dt);

        if let Some(outcome) = report.outcome {
            self.finish(outcome, ctx);
        }
    }

    fn render(&self, surface: &mut dyn Surface, ctx: &GameContext) {
        self.viewport.set(surface.size());
        draw_world(surface, &self.world, &self.camera, &ctx.config);
        self.particles.render(surface, &self.camera);

        if self.world.clock.night {
            let (w, h) = surface.size();
            surface.draw_rect(0.0, 0.0, w, h, Rgba::from_array(ctx.config.cycle.night_overlay));
        }
        self.post.apply(surface);

        self.hud.draw(surface, &self.world);

        if ctx.show_debug {
            self.debug_overlay(ctx).draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::tests::{meadow_world, test_config};
    use crate::game::Item;
    use crate::platform::audio::{AudioSink, RecordingAudio};
    use crate::platform::surface::{DrawCall, RecordingSurface};
    use std::rc::Rc;
    use macroquad::math::Vec2;

    fn ctx() -> GameContext {
        let mut ctx = GameContext::headless();
        ctx.config = test_config();
        ctx
    }

    fn meadow_scene(ctx: &mut GameContext) -> PlayingScene {
        let world = meadow_world(&ctx.config);
        let mut scene = PlayingScene::with_world(world, ctx);
        scene.on_enter(ctx);
        scene
    }

    #[test]
    fn test_buffered_repellent_is_used_next_tick() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.player.add_item(ItemKind::Repellent);

        scene.handle_input(Key::Repellent, &mut ctx);
        assert!(!scene.world.player.repellent_active());

        scene.update(1.0 / 60.0, &mut ctx);
        assert!(scene.world.player.repellent_active());
        assert_eq!(scene.world.player.count(ItemKind::Repellent), 0);
        assert!(scene.hud.flash().is_some());
        assert!(scene.camera.is_shaking());
        assert!(!scene.particles.is_empty());
    }

    #[test]
    fn test_press_without_item_does_nothing() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.handle_input(Key::Potion, &mut ctx);
        scene.update(1.0 / 60.0, &mut ctx);
        assert!(scene.hud.flash().is_none());
        assert!(scene.particles.is_empty());
    }

    #[test]
    fn test_pickup_flashes_and_plays_sound() {
        let audio = Rc::new(RecordingAudio::default());
        let mut ctx = ctx();
        ctx.audio = audio.clone();
        let mut scene = meadow_scene(&mut ctx);
        assert!(audio.is_music_playing());
        let (px, py) = (scene.world.player.x, scene.world.player.y);
        scene.world.spawn_item(Item::new(ItemKind::Potion, px, py));

        scene.update(1.0 / 60.0, &mut ctx);
        assert_eq!(scene.world.player.count(ItemKind::Potion), 1);
        let flash = scene.hud.flash().map(|f| f.color);
        assert_eq!(flash, Some(PICKUP_FLASH));
        assert_eq!(audio.take(), vec!["potion_pickup"]);
    }

    #[test]
    fn test_movement_follows_input_axis() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        let start = scene.world.player.x;
        ctx.input.axis = Vec2::new(1.0, 0.0);
        for _ in 0..30 {
            scene.update(1.0 / 60.0, &mut ctx);
        }
        assert!(scene.world.player.x > start);
    }

    #[test]
    fn test_death_switches_to_game_over() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.player.health.current = 0;

        scene.update(1.0 / 60.0, &mut ctx);
        assert_eq!(
            ctx.commands.pending(),
            &[crate::engine::scene::SceneCommand::SwitchTo(SceneId::GameOver)]
        );
        let run = ctx.last_run.expect("summary recorded");
        assert!(!run.won);

        // a finished run stops simulating
        let before = scene.sim_time();
        scene.update(1.0 / 60.0, &mut ctx);
        assert_eq!(scene.sim_time(), before);
    }

    #[test]
    fn test_quick_save_and_load() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.player.score = 40;
        scene.handle_input(Key::QuickSave, &mut ctx);

        scene.world.player.score = 0;
        scene.world.player.x += 3.0;
        scene.handle_input(Key::QuickLoad, &mut ctx);
        assert_eq!(scene.world.player.score, 40);
    }

    #[test]
    fn test_quick_load_without_save_keeps_world() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.player.score = 7;
        scene.handle_input(Key::QuickLoad, &mut ctx);
        assert_eq!(scene.world.player.score, 7);
    }

    #[test]
    fn test_night_overlay_and_debug_text() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.clock.night = true;
        ctx.show_debug = true;

        let mut surface = RecordingSurface::new(800, 600);
        scene.render(&mut surface, &ctx);
        let overlay = Rgba::from_array(ctx.config.cycle.night_overlay);
        assert!(surface.count(|c| matches!(c, DrawCall::Rect { color, .. } if *color == overlay)) >= 1);
        assert!(surface.texts().iter().any(|t| t.starts_with("Time: ")));
    }

    #[test]
    fn test_f4_toggles_vignette_over_night_tint() {
        let mut ctx = ctx();
        let mut scene = meadow_scene(&mut ctx);
        scene.world.clock.night = true;
        let overlay = Rgba::from_array(ctx.config.cycle.night_overlay);
        let (w, h) = (ctx.config.window.width, ctx.config.window.height);
        // outermost vignette band: a full-width black strip along the top edge
        let edge = Rgba::rgba(0, 0, 0, 124);
        let is_vignette = |c: &DrawCall| {
            matches!(c, DrawCall::Rect { x, y, w: width, color, .. }
                if *x == 0.0 && *y == 0.0 && *width == w as f32 && *color == edge)
        };

        let mut surface = RecordingSurface::new(w, h);
        scene.render(&mut surface, &ctx);
        assert_eq!(surface.count(is_vignette), 0);

        scene.handle_input(Key::ToggleVignette, &mut ctx);
        assert!(scene.post.vignette_enabled());
        let mut surface = RecordingSurface::new(w, h);
        scene.render(&mut surface, &ctx);

        let night = surface
            .calls
            .iter()
            .position(|c| matches!(c, DrawCall::Rect { color, .. } if *color == overlay))
            .expect("night tint drawn");
        let vignette = surface
            .calls
            .iter()
            .position(is_vignette)
            .expect("vignette drawn");
        assert!(vignette > night);
    }
}
