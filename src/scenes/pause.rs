//! Pause menu: a blocking, transparent layer over the running game

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneId};
use crate::platform::input::Key;
use crate::platform::surface::{SpriteKey, SpriteRef, Surface};

use super::screen::draw_overlay;

const LINES: &[&str] = &[
    "SPIEL PAUSIERT",
    "Drücke [ESC] zum Fortsetzen, [H] für Hilfe, [M] für Musik an/aus oder [Q] zum Beenden.",
];

#[derive(Default)]
pub struct PauseScene {
    /// Music was playing when the pause started
    resume_music: bool,
}

impl Scene for PauseScene {
    fn id(&self) -> SceneId {
        SceneId::Pause
    }

    fn on_enter(&mut self, ctx: &mut GameContext) {
        self.resume_music = ctx.audio.is_music_playing();
        ctx.audio.stop_music();
    }

    fn on_exit(&mut self, ctx: &mut GameContext) {
        if self.resume_music {
            ctx.audio.play_music();
        }
    }

    fn handle_input(&mut self, key: Key, ctx: &mut GameContext) {
        match key {
            Key::Back => ctx.commands.pop(),
            Key::Help => ctx.commands.push(SceneId::Help),
            Key::ToggleMusic => {
                ctx.audio.toggle_music();
                self.resume_music = false;
            }
            Key::Quit => ctx.quit(),
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface, _ctx: &GameContext) {
        draw_overlay(surface, LINES);
        let (w, _) = surface.size();
        // small badge in the corner if the artwork is available
        surface.blit(SpriteRef::new(SpriteKey::PauseScreen), w - 138.0, 10.0, 128.0, 80.0);
    }

    fn is_transparent(&self) -> bool {
        true
    }
}
