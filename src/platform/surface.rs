//! Drawing surface
//!
//! Scenes, the HUD and the particle system draw through `Surface` and never
//! call macroquad directly. The binary uses `MacroquadSurface`, which also
//! owns the sprite textures; tests use `RecordingSurface`, which just keeps a
//! list of what was drawn.

use macroquad::prelude as mq;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const RED: Rgba = Rgba::rgb(255, 0, 0);
    pub const GREEN: Rgba = Rgba::rgb(0, 200, 0);
    pub const YELLOW: Rgba = Rgba::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    fn to_mq(self) -> mq::Color {
        mq::Color::from_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Sprite sheets the game knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Player,
    Dinosaur,
    AggressiveDinosaur,
    Potion,
    Repellent,
    Boat,
    TitleScreen,
    IntroScreen,
    HelpScreen,
    PauseScreen,
    LoseScreen,
    WinScreen,
}

impl SpriteKey {
    /// Image files for each animation frame, relative to the sprite dir.
    pub fn files(&self) -> &'static [&'static str] {
        match self {
            SpriteKey::Player => &["player_0.png", "player_1.png"],
            SpriteKey::Dinosaur => &["dino_0.png", "dino_1.png"],
            SpriteKey::AggressiveDinosaur => &["aggdino_0.png", "aggdino_1.png"],
            SpriteKey::Potion => &["healing0.png"],
            SpriteKey::Repellent => &["repellent1_0.png"],
            SpriteKey::Boat => &["ship_0.png", "ship_1.png"],
            SpriteKey::TitleScreen => &["title.png"],
            SpriteKey::IntroScreen => &["begin.png"],
            SpriteKey::HelpScreen => &["help.png"],
            SpriteKey::PauseScreen => &["pause.png"],
            SpriteKey::LoseScreen => &["lose.png"],
            SpriteKey::WinScreen => &["rescue.png"],
        }
    }

    pub const ALL: [SpriteKey; 12] = [
        SpriteKey::Player,
        SpriteKey::Dinosaur,
        SpriteKey::AggressiveDinosaur,
        SpriteKey::Potion,
        SpriteKey::Repellent,
        SpriteKey::Boat,
        SpriteKey::TitleScreen,
        SpriteKey::IntroScreen,
        SpriteKey::HelpScreen,
        SpriteKey::PauseScreen,
        SpriteKey::LoseScreen,
        SpriteKey::WinScreen,
    ];
}

/// One frame of a sprite, optionally mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRef {
    pub key: SpriteKey,
    pub frame: usize,
    pub flip_x: bool,
}

impl SpriteRef {
    pub fn new(key: SpriteKey) -> Self {
        Self {
            key,
            frame: 0,
            flip_x: false,
        }
    }

    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }

    pub fn flipped(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }
}

pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, color: Rgba);
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn draw_rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Rgba);
    fn draw_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn draw_circle_lines(&mut self, x: f32, y: f32, radius: f32, thickness: f32, color: Rgba);
    /// `y` is the text baseline.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba);
    fn text_width(&self, text: &str, size: f32) -> f32;
    /// Draw a sprite scaled to `w`x`h`. Returns false when the sprite is not
    /// loaded; the caller draws a placeholder.
    fn blit(&mut self, sprite: SpriteRef, x: f32, y: f32, w: f32, h: f32) -> bool;

    fn draw_text_centered(&mut self, text: &str, y: f32, size: f32, color: Rgba) {
        let (width, _) = self.size();
        let x = (width - self.text_width(text, size)) / 2.0;
        self.draw_text(text, x, y, size, color);
    }
}

// =============================================================================
// macroquad
// =============================================================================

/// Draws straight to the macroquad window.
#[derive(Default)]
pub struct MacroquadSurface {
    textures: FxHashMap<SpriteKey, Vec<mq::Texture2D>>,
}

impl MacroquadSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every sprite from `dir`. Missing files are logged and skipped.
    pub async fn load_sprites(&mut self, dir: &str) {
        for key in SpriteKey::ALL {
            let mut frames = Vec::new();
            for file in key.files() {
                let path = format!("{}/{}", dir, file);
                match mq::load_texture(&path).await {
                    Ok(texture) => {
                        texture.set_filter(mq::FilterMode::Nearest);
                        frames.push(texture);
                    }
                    Err(e) => tracing::warn!("sprite {:?} missing ({}): {:?}", key, path, e),
                }
            }
            if !frames.is_empty() {
                self.textures.insert(key, frames);
            }
        }
        tracing::info!(loaded = self.textures.len(), total = SpriteKey::ALL.len(), "sprites loaded");
    }
}

impl Surface for MacroquadSurface {
    fn size(&self) -> (f32, f32) {
        (mq::screen_width(), mq::screen_height())
    }

    fn clear(&mut self, color: Rgba) {
        mq::clear_background(color.to_mq());
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        mq::draw_rectangle(x, y, w, h, color.to_mq());
    }

    fn draw_rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Rgba) {
        mq::draw_rectangle_lines(x, y, w, h, thickness, color.to_mq());
    }

    fn draw_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        mq::draw_circle(x, y, radius, color.to_mq());
    }

    fn draw_circle_lines(&mut self, x: f32, y: f32, radius: f32, thickness: f32, color: Rgba) {
        mq::draw_circle_lines(x, y, radius, thickness, color.to_mq());
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
        mq::draw_text(text, x, y, size, color.to_mq());
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        mq::measure_text(text, None, size as u16, 1.0).width
    }

    fn blit(&mut self, sprite: SpriteRef, x: f32, y: f32, w: f32, h: f32) -> bool {
        let Some(frames) = self.textures.get(&sprite.key) else {
            return false;
        };
        let texture = &frames[sprite.frame % frames.len()];
        mq::draw_texture_ex(
            texture,
            x,
            y,
            mq::WHITE,
            mq::DrawTextureParams {
                dest_size: Some(mq::vec2(w, h)),
                flip_x: sprite.flip_x,
                ..Default::default()
            },
        );
        true
    }
}

// =============================================================================
// Recording (tests, headless runs)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Rgba),
    Rect { x: f32, y: f32, w: f32, h: f32, color: Rgba },
    RectLines { x: f32, y: f32, w: f32, h: f32, color: Rgba },
    Circle { x: f32, y: f32, radius: f32, color: Rgba },
    CircleLines { x: f32, y: f32, radius: f32, color: Rgba },
    Text { text: String, x: f32, y: f32, color: Rgba },
    Sprite { sprite: SpriteRef, x: f32, y: f32 },
}

/// Keeps every draw call in order. Sprites listed in `loaded` blit
/// successfully; everything else reports missing.
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub calls: Vec<DrawCall>,
    pub loaded: Vec<SpriteKey>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            calls: Vec::new(),
            loaded: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn draw_rect_lines(&mut self, x: f32, y: f32, w: f32, h: f32, _thickness: f32, color: Rgba) {
        self.calls.push(DrawCall::RectLines { x, y, w, h, color });
    }

    fn draw_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.calls.push(DrawCall::Circle { x, y, radius, color });
    }

    fn draw_circle_lines(&mut self, x: f32, y: f32, radius: f32, _thickness: f32, color: Rgba) {
        self.calls.push(DrawCall::CircleLines { x, y, radius, color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _size: f32, color: Rgba) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn blit(&mut self, sprite: SpriteRef, x: f32, y: f32, _w: f32, _h: f32) -> bool {
        if !self.loaded.contains(&sprite.key) {
            return false;
        }
        self.calls.push(DrawCall::Sprite { sprite, x, y });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sprite_reports_false() {
        let mut surface = RecordingSurface::new(100, 100);
        assert!(!surface.blit(SpriteRef::new(SpriteKey::Boat), 0.0, 0.0, 32.0, 32.0));
        surface.loaded.push(SpriteKey::Boat);
        assert!(surface.blit(SpriteRef::new(SpriteKey::Boat).frame(1), 4.0, 5.0, 32.0, 32.0));
        assert_eq!(surface.calls.len(), 1);
    }

    #[test]
    fn test_centered_text() {
        let mut surface = RecordingSurface::new(200, 100);
        surface.draw_text_centered("abcd", 50.0, 10.0, Rgba::WHITE);
        // 4 chars * 5 px, centered in 200
        assert_eq!(
            surface.calls[0],
            DrawCall::Text { text: "abcd".into(), x: 90.0, y: 50.0, color: Rgba::WHITE }
        );
    }
}
