//! 2D follow camera
//!
//! Entities live in tile coordinates; the camera position is in world pixels
//! (tile * tile_size) and marks the top-left corner of the view. Screen
//! coordinates are world pixels relative to the camera, scaled by zoom, plus
//! the current shake offset.
//!
//! Per update: ease zoom, work out where the camera wants to be (dead zone
//! and look-ahead included), move a fixed fraction of the way there, clamp to
//! the map, then roll a new shake offset.

use macroquad::math::{Rect, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CameraConfig;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;

/// How shake intensity decays over its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Falloff {
    #[default]
    Linear,
    Quadratic,
}

impl Falloff {
    /// Scale for the given remaining fraction in [0, 1].
    fn scale(self, remaining: f32) -> f32 {
        match self {
            Falloff::Linear => remaining,
            Falloff::Quadratic => remaining * remaining,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shake {
    pub intensity: f32,
    pub duration: f32,
    pub remaining: f32,
    pub falloff: Falloff,
}

/// Half-open tile rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl TileRect {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| (x, y)))
    }
}

pub struct Camera {
    viewport: Vec2,
    tile_size: f32,
    /// Top-left of the view in world pixels
    position: Vec2,
    /// Followed point in tiles, look-ahead included
    target: Vec2,
    smoothness: f32,
    zoom: f32,
    target_zoom: f32,
    zoom_speed: f32,
    bounds: Option<Rect>,
    map_tiles: Option<(usize, usize)>,
    dead_zone: Option<Vec2>,
    look_ahead: f32,
    shake: Option<Shake>,
    shake_offset: Vec2,
    rng: StdRng,
}

impl Camera {
    pub fn new(viewport_w: f32, viewport_h: f32, tile_size: f32, config: &CameraConfig) -> Self {
        Self {
            viewport: Vec2::new(viewport_w, viewport_h),
            tile_size,
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            smoothness: config.smoothness.clamp(0.001, 1.0),
            zoom: 1.0,
            target_zoom: 1.0,
            zoom_speed: config.zoom_speed.max(0.0),
            bounds: None,
            map_tiles: None,
            dead_zone: config.dead_zone.map(|(w, h)| Vec2::new(w, h)),
            look_ahead: config.look_ahead,
            shake: None,
            shake_offset: Vec2::ZERO,
            rng: StdRng::seed_from_u64(0xD1_0C4A),
        }
    }

    /// Keep the view inside a `width` x `height` tile map.
    pub fn with_map_bounds(mut self, width: usize, height: usize) -> Self {
        self.bounds = Some(Rect::new(
            0.0,
            0.0,
            width as f32 * self.tile_size,
            height as f32 * self.tile_size,
        ));
        self.map_tiles = Some((width, height));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn set_dead_zone(&mut self, size: Option<Vec2>) {
        self.dead_zone = size;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.target_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Follow `(x, y)` in tiles. With a velocity the camera leads by
    /// `velocity * look_ahead`.
    pub fn set_target(&mut self, x: f32, y: f32, velocity: Option<Vec2>) {
        let lead = velocity.map_or(Vec2::ZERO, |v| v * self.look_ahead);
        self.target = Vec2::new(x, y) + lead;
    }

    /// Start a shake, replacing any shake in progress.
    pub fn shake(&mut self, intensity: f32, duration: f32, falloff: Falloff) {
        if duration <= 0.0 || intensity <= 0.0 {
            return;
        }
        self.shake = Some(Shake {
            intensity,
            duration,
            remaining: duration,
            falloff,
        });
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    pub fn current_shake(&self) -> Option<Shake> {
        self.shake
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// View size in world pixels at the current zoom.
    fn view_world(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    /// Camera position that centres the target, before dead zone and bounds.
    fn centred_on_target(&self) -> Vec2 {
        self.target * self.tile_size - self.view_world() * 0.5
    }

    fn desired_position(&self) -> Vec2 {
        let centred = self.centred_on_target();
        let Some(zone) = self.dead_zone else {
            return centred;
        };
        // hold still on each axis while the target stays inside the zone
        let half = zone * 0.5 / self.zoom;
        let offset = centred - self.position;
        let axis = |d: f32, h: f32| {
            if d.abs() <= h {
                0.0
            } else {
                d - h.copysign(d)
            }
        };
        self.position + Vec2::new(axis(offset.x, half.x), axis(offset.y, half.y))
    }

    fn clamp_to_bounds(&self, pos: Vec2) -> Vec2 {
        let Some(bounds) = self.bounds else {
            return pos;
        };
        let view = self.view_world();
        let clamp_axis = |p: f32, min: f32, size: f32, view: f32| {
            if view >= size {
                min + (size - view) * 0.5
            } else {
                p.clamp(min, min + size - view)
            }
        };
        Vec2::new(
            clamp_axis(pos.x, bounds.x, bounds.w, view.x),
            clamp_axis(pos.y, bounds.y, bounds.h, view.y),
        )
    }

    pub fn update(&mut self, dt: f32) {
        let ease = (self.zoom_speed * dt).clamp(0.0, 1.0);
        self.zoom = (self.zoom + (self.target_zoom - self.zoom) * ease).clamp(MIN_ZOOM, MAX_ZOOM);

        let desired = self.desired_position();
        self.position += (desired - self.position) * self.smoothness;
        self.position = self.clamp_to_bounds(self.position);

        self.shake_offset = Vec2::ZERO;
        if let Some(mut shake) = self.shake.take() {
            shake.remaining -= dt;
            if shake.remaining > 0.0 {
                let strength =
                    shake.intensity * shake.falloff.scale(shake.remaining / shake.duration);
                self.shake_offset = Vec2::new(
                    self.rng.gen_range(-1.0..=1.0) * strength,
                    self.rng.gen_range(-1.0..=1.0) * strength,
                );
                self.shake = Some(shake);
            }
        }
    }

    /// Jump straight to the target, no easing.
    pub fn snap_to_target(&mut self) {
        self.zoom = self.target_zoom;
        self.position = self.clamp_to_bounds(self.centred_on_target());
    }

    /// Tile coordinates to screen pixels.
    pub fn world_to_screen(&self, x: f32, y: f32) -> Vec2 {
        self.world_px_to_screen(x * self.tile_size, y * self.tile_size)
    }

    /// World pixels (particles) to screen pixels.
    pub fn world_px_to_screen(&self, px: f32, py: f32) -> Vec2 {
        (Vec2::new(px, py) - self.position) * self.zoom + self.shake_offset
    }

    /// `world_to_screen` truncated to whole pixels.
    pub fn apply(&self, x: f32, y: f32) -> (i32, i32) {
        let s = self.world_to_screen(x, y);
        (s.x as i32, s.y as i32)
    }

    /// Screen pixels back to tile coordinates.
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        ((Vec2::new(sx, sy) - self.shake_offset) / self.zoom + self.position) / self.tile_size
    }

    /// Tiles to draw this frame, with a one-tile margin on each side.
    pub fn visible_tiles(&self) -> TileRect {
        let top_left = self.position / self.tile_size;
        let bottom_right = (self.position + self.view_world()) / self.tile_size;
        let (max_x, max_y) = self.map_tiles.unwrap_or((usize::MAX, usize::MAX));
        let lo = |v: f32| (v.floor() - 1.0).max(0.0) as usize;
        let hi = |v: f32, max: usize| ((v.ceil() + 1.0).max(0.0) as usize).min(max);
        TileRect {
            x0: lo(top_left.x).min(max_x),
            y0: lo(top_left.y).min(max_y),
            x1: hi(bottom_right.x, max_x),
            y1: hi(bottom_right.y, max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dead_zone: Option<(f32, f32)>) -> CameraConfig {
        CameraConfig {
            smoothness: 0.15,
            zoom_speed: 5.0,
            dead_zone,
            look_ahead: 0.5,
        }
    }

    fn camera() -> Camera {
        Camera::new(640.0, 480.0, 32.0, &config(None))
    }

    #[test]
    fn test_converges_monotonically() {
        let mut cam = camera();
        cam.set_target(40.0, 25.0, None);
        let goal = Vec2::new(40.0 * 32.0 - 320.0, 25.0 * 32.0 - 240.0);
        let mut last = cam.position().distance(goal);
        for _ in 0..200 {
            cam.update(1.0 / 60.0);
            let d = cam.position().distance(goal);
            if last > 1e-3 {
                assert!(d < last, "camera stalled at {last}");
            } else {
                assert!(d <= last);
            }
            last = d;
        }
        assert!(last < 0.5);
    }

    #[test]
    fn test_screen_to_world_round_trip() {
        let mut cam = camera();
        cam.set_target(12.0, 7.0, None);
        cam.set_zoom(2.0);
        cam.shake(5.0, 1.0, Falloff::Linear);
        for _ in 0..10 {
            cam.update(1.0 / 60.0);
        }
        for (x, y) in [(0.0, 0.0), (12.5, 7.25), (-3.0, 100.0)] {
            let s = cam.world_to_screen(x, y);
            let back = cam.screen_to_world(s.x, s.y);
            assert!((back.x - x).abs() < 1e-3 && (back.y - y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_apply_truncates() {
        let mut cam = camera();
        cam.set_target(10.0, 10.0, None);
        cam.snap_to_target();
        let screen = cam.world_to_screen(10.3, 10.3);
        assert_eq!(cam.apply(10.3, 10.3), (screen.x as i32, screen.y as i32));
        assert_eq!(cam.apply(10.0, 10.0), (320, 240));
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut cam = camera();
        cam.shake(4.0, 0.4, Falloff::Quadratic);
        cam.update(0.1);
        assert!(cam.is_shaking());
        let offset = cam.shake_offset();
        assert!(offset.x.abs() <= 4.0 && offset.y.abs() <= 4.0);
        for _ in 0..5 {
            cam.update(0.1);
        }
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_last_shake_wins() {
        let mut cam = camera();
        cam.shake(15.0, 1.2, Falloff::Linear);
        cam.shake(4.0, 0.4, Falloff::Quadratic);
        let shake = cam.current_shake().unwrap();
        assert_eq!(shake.intensity, 4.0);
        assert_eq!(shake.falloff, Falloff::Quadratic);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = camera();
        cam.set_zoom(50.0);
        for _ in 0..120 {
            cam.update(1.0 / 60.0);
        }
        assert!(cam.zoom() <= MAX_ZOOM);
        assert!((cam.zoom() - MAX_ZOOM).abs() < 1e-3);
        cam.set_zoom(0.0);
        cam.snap_to_target();
        assert_eq!(cam.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_bounds_keep_view_on_map() {
        let mut cam = camera().with_map_bounds(100, 100);
        cam.set_target(0.0, 0.0, None);
        cam.snap_to_target();
        assert_eq!(cam.position(), Vec2::ZERO);

        cam.set_target(100.0, 100.0, None);
        cam.snap_to_target();
        assert_eq!(cam.position(), Vec2::new(3200.0 - 640.0, 3200.0 - 480.0));
    }

    #[test]
    fn test_dead_zone_holds_small_moves() {
        let mut cam = Camera::new(640.0, 480.0, 32.0, &config(Some((96.0, 64.0))));
        cam.set_target(20.0, 20.0, None);
        cam.snap_to_target();
        let start = cam.position();

        // one tile is 32 px, inside the 48 px half-width
        cam.set_target(21.0, 20.0, None);
        cam.update(1.0 / 60.0);
        assert_eq!(cam.position(), start);

        // five tiles is well outside
        cam.set_target(25.0, 20.0, None);
        cam.update(1.0 / 60.0);
        assert!(cam.position().x > start.x);
    }

    #[test]
    fn test_look_ahead_leads_velocity() {
        let mut cam = camera();
        cam.set_target(10.0, 10.0, Some(Vec2::new(4.0, 0.0)));
        assert_eq!(cam.target(), Vec2::new(12.0, 10.0));
    }

    #[test]
    fn test_visible_tiles_clamped_with_margin() {
        let mut cam = camera().with_map_bounds(64, 64);
        cam.set_target(32.0, 32.0, None);
        cam.snap_to_target();
        let rect = cam.visible_tiles();
        // view is 20x15 tiles starting at (22, 24.5)
        assert_eq!((rect.x0, rect.y0), (21, 23));
        assert_eq!((rect.x1, rect.y1), (43, 41));

        cam.set_target(0.0, 0.0, None);
        cam.snap_to_target();
        let rect = cam.visible_tiles();
        assert_eq!((rect.x0, rect.y0), (0, 0));
        assert!(rect.x1 <= 64 && rect.y1 <= 64);
    }
}
