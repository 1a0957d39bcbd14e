//! Title screen

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneId};
use crate::platform::input::Key;
use crate::platform::surface::{SpriteKey, Surface};

use super::screen::draw_screen;

const LINES: &[&str] = &[
    "FLUCHT VON DER DINOSAURIER-INSEL",
    "Ein Spiel von Konrad Weber",
    "Drücke [ENTER] zum STARTEN, [H] für Hilfe, [Q] zum Beenden.",
];

pub struct MenuScene;

impl Scene for MenuScene {
    fn id(&self) -> SceneId {
        SceneId::Menu
    }

    fn handle_input(&mut self, key: Key, ctx: &mut GameContext) {
        match key {
            Key::Confirm => ctx.commands.switch_to(SceneId::Intro),
            Key::Help => ctx.commands.push(SceneId::Help),
            Key::Quit => ctx.quit(),
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface, _ctx: &GameContext) {
        draw_screen(surface, SpriteKey::TitleScreen, LINES);
    }
}
