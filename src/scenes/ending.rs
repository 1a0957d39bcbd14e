//! Win and game-over screens

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneId};
use crate::platform::input::Key;
use crate::platform::surface::{SpriteKey, Surface};

use super::screen::draw_screen;

const LOSE_LINES: &[&str] = &[
    "GAME OVER!",
    "Du musst leider aufgeben... Vielleicht beim nächsten Mal!",
];

const WIN_LINES: &[&str] = &[
    "GLÜCKWUNSCH!",
    "Du hast die Insel überlebt und das rettende Schiff erreicht!",
];

const BACK_TO_MENU: &str = "Drücke [ENTER] um zum Hauptmenü zurückzukehren.";

pub struct EndingScene {
    won: bool,
}

impl EndingScene {
    pub fn game_over() -> Self {
        Self { won: false }
    }

    pub fn win() -> Self {
        Self { won: true }
    }
}

impl Scene for EndingScene {
    fn id(&self) -> SceneId {
        if self.won {
            SceneId::Win
        } else {
            SceneId::GameOver
        }
    }

    fn handle_input(&mut self, key: Key, ctx: &mut GameContext) {
        match key {
            Key::Confirm => ctx.commands.switch_to(SceneId::Menu),
            Key::Quit => ctx.quit(),
            _ => {}
        }
    }

    fn render(&self, surface: &mut dyn Surface, ctx: &GameContext) {
        let (banner, base) = if self.won {
            (SpriteKey::WinScreen, WIN_LINES)
        } else {
            (SpriteKey::LoseScreen, LOSE_LINES)
        };
        let summary = ctx.last_run.map(|run| {
            format!(
                "Punkte: {}   Überlebt: {:.0}s   Zyklen: {}",
                run.score, run.survived, run.cycles
            )
        });
        let mut lines: Vec<&str> = base.to_vec();
        if let Some(summary) = &summary {
            lines.push(summary);
        }
        lines.push(BACK_TO_MENU);
        draw_screen(surface, banner, &lines);
    }
}
