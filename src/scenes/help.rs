//! Controls and goal, pushed over the menu or the pause screen

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneId};
use crate::platform::input::Key;
use crate::platform::surface::{SpriteKey, Surface};

use super::screen::draw_screen;

const LINES: &[&str] = &[
    "HILFE",
    "Kontrolle:",
    " - Bewegen: WASD / Pfeiltasten",
    " - Leertaste: Dino Spray benutzen",
    " - E oder Rechts-Shift: Heiltrank benutzen",
    " - ESC: Pause/Unpause oder Exit",
    " - F5 / F9: Schnellspeichern / Schnellladen",
    " - F4: Vignette an/aus",
    "",
    "Ziel des Spiels ist es auf der Dinosaurier-Insel zu überleben bis das rettende Boot ankommt.",
    "Drücke eine beliebige Taste, um zurückzukehren.",
];

pub struct HelpScene;

impl Scene for HelpScene {
    fn id(&self) -> SceneId {
        SceneId::Help
    }

    fn handle_input(&mut self, _key: Key, ctx: &mut GameContext) {
        ctx.commands.pop();
    }

    fn render(&self, surface: &mut dyn Surface, _ctx: &GameContext) {
        draw_screen(surface, SpriteKey::HelpScreen, LINES);
    }
}
