//! Full-screen post effects: vignette, scanlines and screen noise
//!
//! Each effect is a list of translucent rects laid over the finished frame.
//! Vignette and scanlines depend only on the screen size and are rebuilt on
//! resize; noise is re-rolled every `noise_interval` seconds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PostProcessingConfig;
use crate::platform::surface::{Rgba, Surface};

/// Concentric frames making up the vignette
const VIGNETTE_BANDS: usize = 16;
/// One noise pixel per this many screen pixels
const NOISE_DENSITY: f32 = 200.0;
const NOISE_ALPHA: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
struct OverlayRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: Rgba,
}

impl OverlayRect {
    fn draw(&self, surface: &mut dyn Surface) {
        surface.draw_rect(self.x, self.y, self.w, self.h, self.color);
    }
}

pub struct PostProcessing {
    settings: PostProcessingConfig,
    vignette: bool,
    scanlines: bool,
    noise: bool,
    size: (f32, f32),
    vignette_rects: Vec<OverlayRect>,
    scanline_rects: Vec<OverlayRect>,
    noise_rects: Vec<OverlayRect>,
    noise_timer: f32,
    rng: StdRng,
}

impl PostProcessing {
    pub fn new(width: f32, height: f32, config: &PostProcessingConfig, seed: u64) -> Self {
        let mut post = Self {
            settings: config.clone(),
            vignette: config.vignette,
            scanlines: config.scanlines,
            noise: config.noise,
            size: (width, height),
            vignette_rects: Vec::new(),
            scanline_rects: Vec::new(),
            noise_rects: Vec::new(),
            noise_timer: 0.0,
            rng: StdRng::seed_from_u64(seed),
        };
        post.rebuild();
        post
    }

    /// Rebuild the cached overlays if the screen size changed.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.size != (width, height) {
            self.size = (width, height);
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let (w, h) = self.size;
        self.vignette_rects = vignette_rects(w, h, self.settings.vignette_strength);
        self.scanline_rects = scanline_rects(w, h, self.settings.scanline_intensity);
        if self.noise {
            self.roll_noise();
        } else {
            self.noise_rects.clear();
        }
    }

    pub fn vignette_enabled(&self) -> bool {
        self.vignette
    }

    pub fn toggle_vignette(&mut self) {
        self.vignette = !self.vignette;
        tracing::debug!(enabled = self.vignette, "vignette toggled");
    }

    pub fn update(&mut self, dt: f32) {
        if !self.noise {
            return;
        }
        self.noise_timer += dt;
        if self.noise_timer >= self.settings.noise_interval {
            self.noise_timer = 0.0;
            self.roll_noise();
        }
    }

    fn roll_noise(&mut self) {
        let (w, h) = self.size;
        self.noise_rects.clear();
        if w < 1.0 || h < 1.0 {
            return;
        }
        let count = (w * h / NOISE_DENSITY) as usize;
        for _ in 0..count {
            let x = self.rng.gen_range(0.0..w).floor();
            let y = self.rng.gen_range(0.0..h).floor();
            let v = self.rng.gen_range(0..=self.settings.noise_intensity);
            self.noise_rects.push(OverlayRect {
                x,
                y,
                w: 1.0,
                h: 1.0,
                color: Rgba::rgba(v, v, v, NOISE_ALPHA),
            });
        }
    }

    /// Draw every enabled effect. Returns the number of rects drawn.
    pub fn apply(&self, surface: &mut dyn Surface) -> usize {
        let layers = [
            (self.vignette, &self.vignette_rects),
            (self.scanlines, &self.scanline_rects),
            (self.noise, &self.noise_rects),
        ];
        let mut drawn = 0;
        for (enabled, rects) in layers {
            if !enabled {
                continue;
            }
            for rect in rects {
                rect.draw(surface);
            }
            drawn += rects.len();
        }
        drawn
    }
}

/// Nested frames, darkest at the screen edge, clear in the middle. The
/// frames do not overlap, so each pixel is darkened once.
fn vignette_rects(w: f32, h: f32, strength: f32) -> Vec<OverlayRect> {
    // one band's worth of the shorter half-axis stays uncovered
    let step = w.min(h) * 0.5 / (VIGNETTE_BANDS + 1) as f32;
    if step <= 0.0 || strength <= 0.0 {
        return Vec::new();
    }
    let mut rects = Vec::with_capacity(VIGNETTE_BANDS * 4);
    for band in 0..VIGNETTE_BANDS {
        let ratio = 1.0 - (band as f32 + 0.5) / VIGNETTE_BANDS as f32;
        let alpha = (255.0 * ratio * strength).round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            continue;
        }
        let color = Rgba::rgba(0, 0, 0, alpha);
        let inset = band as f32 * step;
        let (iw, ih) = (w - 2.0 * inset, h - 2.0 * inset);
        let side_h = ih - 2.0 * step;
        rects.push(OverlayRect { x: inset, y: inset, w: iw, h: step, color });
        rects.push(OverlayRect { x: inset, y: h - inset - step, w: iw, h: step, color });
        if side_h > 0.0 {
            rects.push(OverlayRect { x: inset, y: inset + step, w: step, h: side_h, color });
            rects.push(OverlayRect { x: w - inset - step, y: inset + step, w: step, h: side_h, color });
        }
    }
    rects
}

/// A one pixel line on every other row.
fn scanline_rects(w: f32, h: f32, intensity: u8) -> Vec<OverlayRect> {
    if intensity == 0 {
        return Vec::new();
    }
    let color = Rgba::rgba(0, 0, 0, intensity);
    (0..h.max(0.0) as usize)
        .step_by(2)
        .map(|y| OverlayRect { x: 0.0, y: y as f32, w, h: 1.0, color })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::surface::{DrawCall, RecordingSurface};

    fn rects(surface: &RecordingSurface) -> Vec<(f32, f32, f32, f32, u8)> {
        surface
            .calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Rect { x, y, w, h, color } => Some((*x, *y, *w, *h, color.a)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_everything_off_by_default() {
        let post = PostProcessing::new(800.0, 600.0, &PostProcessingConfig::default(), 1);
        let mut surface = RecordingSurface::new(800, 600);
        assert_eq!(post.apply(&mut surface), 0);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_vignette_darkens_edges_not_centre() {
        let mut post = PostProcessing::new(800.0, 600.0, &PostProcessingConfig::default(), 1);
        post.toggle_vignette();
        assert!(post.vignette_enabled());

        let mut surface = RecordingSurface::new(800, 600);
        assert!(post.apply(&mut surface) > 0);
        let drawn = rects(&surface);

        // outermost band hugs the top-left corner and is the darkest
        let (x, y, _, _, edge_alpha) = drawn[0];
        assert_eq!((x, y), (0.0, 0.0));
        assert!(drawn.iter().all(|r| r.4 <= edge_alpha));
        assert_eq!(edge_alpha, (255.0 * (1.0 - 0.5 / 16.0) * 0.5f32).round() as u8);

        // nothing covers the centre pixel
        let (cx, cy) = (400.0, 300.0);
        assert!(!drawn
            .iter()
            .any(|&(x, y, w, h, _)| cx >= x && cx < x + w && cy >= y && cy < y + h));

        post.toggle_vignette();
        let mut surface = RecordingSurface::new(800, 600);
        assert_eq!(post.apply(&mut surface), 0);
    }

    #[test]
    fn test_scanlines_every_other_row() {
        let config = PostProcessingConfig {
            scanlines: true,
            ..PostProcessingConfig::default()
        };
        let post = PostProcessing::new(100.0, 10.0, &config, 1);
        let mut surface = RecordingSurface::new(100, 10);
        post.apply(&mut surface);
        let rows: Vec<f32> = rects(&surface).iter().map(|r| r.1).collect();
        assert_eq!(rows, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert!(rects(&surface).iter().all(|r| r.4 == 50 && r.2 == 100.0));
    }

    #[test]
    fn test_noise_rerolls_on_interval() {
        let config = PostProcessingConfig {
            noise: true,
            ..PostProcessingConfig::default()
        };
        let mut post = PostProcessing::new(100.0, 100.0, &config, 7);
        let first = post.noise_rects.clone();
        assert_eq!(first.len(), 50);
        assert!(first.iter().all(|r| r.color.r <= 10 && r.x < 100.0 && r.y < 100.0));

        post.update(0.05);
        assert_eq!(post.noise_rects, first);
        post.update(0.06);
        assert_ne!(post.noise_rects, first);
    }

    #[test]
    fn test_resize_rebuilds_cache() {
        let config = PostProcessingConfig {
            scanlines: true,
            ..PostProcessingConfig::default()
        };
        let mut post = PostProcessing::new(100.0, 10.0, &config, 1);
        post.resize(100.0, 20.0);
        let mut surface = RecordingSurface::new(100, 20);
        assert_eq!(post.apply(&mut surface), 10);
    }
}
