//! Concrete scenes
//!
//! Menu -> Intro -> Playing, with Help and Pause pushed on top and the two
//! ending screens switched to when a run is over. `scene_factory` is what the
//! scene stack uses to build a layer from its id.

pub mod ending;
pub mod help;
pub mod intro;
pub mod menu;
pub mod pause;
pub mod playing;
pub mod screen;

use crate::app::GameContext;
use crate::engine::scene::{Scene, SceneFactory, SceneId};

pub use ending::EndingScene;
pub use help::HelpScene;
pub use intro::IntroScene;
pub use menu::MenuScene;
pub use pause::PauseScene;
pub use playing::PlayingScene;

/// Build a fresh scene. Playing starts a new run every time it is built.
pub fn build_scene(id: SceneId, ctx: &mut GameContext) -> Box<dyn Scene> {
    match id {
        SceneId::Menu => Box::new(MenuScene),
        SceneId::Intro => Box::new(IntroScene),
        SceneId::Help => Box::new(HelpScene),
        SceneId::Pause => Box::new(PauseScene::default()),
        SceneId::GameOver => Box::new(EndingScene::game_over()),
        SceneId::Win => Box::new(EndingScene::win()),
        SceneId::Playing => Box::new(PlayingScene::new(ctx)),
    }
}

pub fn scene_factory() -> SceneFactory {
    Box::new(build_scene)
}
