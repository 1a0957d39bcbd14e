//! Shared layout for the text screens (menu, intro, help, pause, endings)
//!
//! A banner image at the top, then the first line as a title and the rest
//! as body text, all centred. A missing banner just moves the text up.

use crate::platform::surface::{SpriteKey, SpriteRef, Surface};
use crate::ui::theme::{FONT_SIZE_CONTENT, FONT_SIZE_TITLE, MENU_BG, OVERLAY_BG, TEXT_COLOR, TEXT_HIGHLIGHT};

const TOP: f32 = 80.0;
const LINE_GAP: f32 = 15.0;

pub fn draw_screen(surface: &mut dyn Surface, banner: SpriteKey, lines: &[&str]) {
    let (w, h) = surface.size();
    surface.clear(MENU_BG);
    let banner_h = h * 0.4;
    let banner_w = (banner_h * 1.6).min(w * 0.9);
    let drawn = surface.blit(SpriteRef::new(banner), (w - banner_w) / 2.0, TOP, banner_w, banner_h);
    let y = if drawn { TOP + banner_h + 40.0 } else { TOP + 40.0 };
    draw_lines(surface, lines, y);
}

/// Lines over a translucent panel, leaving the layer below visible.
pub fn draw_overlay(surface: &mut dyn Surface, lines: &[&str]) {
    let (w, h) = surface.size();
    surface.draw_rect(0.0, 0.0, w, h, OVERLAY_BG);
    draw_lines(surface, lines, h * 0.35);
}

fn draw_lines(surface: &mut dyn Surface, lines: &[&str], mut y: f32) {
    for (i, line) in lines.iter().enumerate() {
        let (size, color) = if i == 0 && lines.len() > 1 {
            (FONT_SIZE_TITLE, TEXT_HIGHLIGHT)
        } else {
            (FONT_SIZE_CONTENT, TEXT_COLOR)
        };
        y += size;
        surface.draw_text_centered(line, y, size, color);
        y += LINE_GAP;
    }
}
