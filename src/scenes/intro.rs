//! Story screen shown before a run starts

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneId};
use crate::platform::audio::SoundCategory;
use crate::platform::input::Key;
use crate::platform::surface::{SpriteKey, Surface};

use super::screen::draw_screen;

const LINES: &[&str] = &[
    "Willkommen auf der gefährlichen Dinosaurier-Insel.",
    "Du bist mit dem Flugzeug abgestürzt direkt neben dem Vulkan auf der Mitte der Insel.",
    "Du musst überleben und dich zum Strand durchschlagen, bis ein Boot ankommt.",
    "Dabei musst du gefährlichen Dinos ausweichen!",
    "Drücke eine beliebige Taste, um das Abenteuer zu beginnen! Viel Glück!",
];

pub struct IntroScene;

impl Scene for IntroScene {
    fn id(&self) -> SceneId {
        SceneId::Intro
    }

    fn handle_input(&mut self, _key: Key, ctx: &mut GameContext) {
        ctx.audio.play(SoundCategory::Actions, "game_start");
        ctx.commands.switch_to(SceneId::Playing);
    }

    fn render(&self, surface: &mut dyn Surface, _ctx: &GameContext) {
        draw_screen(surface, SpriteKey::IntroScreen, LINES);
    }
}
