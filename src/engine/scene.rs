//! Scene stack
//!
//! Scenes are layered: the Pause menu sits on top of a live Playing scene,
//! Help can sit on top of either. Each layer says whether it blocks the
//! layers below from input/update (`is_blocking`) and whether the layer
//! below still shows through (`is_transparent`).
//!
//! Scenes never touch the stack directly. They queue `SceneCommand`s on
//! `GameContext::commands`; the stack applies them after the update phase,
//! so nothing is pushed or popped while the layers are being iterated.

use std::fmt;
use std::str::FromStr;

use crate::app::GameContext;
use crate::error::ConfigError;
use crate::platform::input::Key;
use crate::platform::surface::Surface;

/// Every scene the game can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Menu,
    Intro,
    Help,
    Pause,
    GameOver,
    Win,
    Playing,
}

impl SceneId {
    pub const ALL: [SceneId; 7] = [
        SceneId::Menu,
        SceneId::Intro,
        SceneId::Help,
        SceneId::Pause,
        SceneId::GameOver,
        SceneId::Win,
        SceneId::Playing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SceneId::Menu => "menu",
            SceneId::Intro => "intro",
            SceneId::Help => "help",
            SceneId::Pause => "pause",
            SceneId::GameOver => "game_over",
            SceneId::Win => "win",
            SceneId::Playing => "playing",
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        SceneId::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownScene(s.to_string()))
    }
}

/// A requested change to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    Push(SceneId),
    Pop,
    Replace(SceneId),
    Clear,
    /// Clear, then push. Used for top-level swaps like Menu -> Intro.
    SwitchTo(SceneId),
}

/// Commands queued during a tick.
#[derive(Debug, Default)]
pub struct SceneCommands {
    queue: Vec<SceneCommand>,
}

impl SceneCommands {
    pub fn push(&mut self, id: SceneId) {
        self.queue.push(SceneCommand::Push(id));
    }

    pub fn pop(&mut self) {
        self.queue.push(SceneCommand::Pop);
    }

    pub fn replace(&mut self, id: SceneId) {
        self.queue.push(SceneCommand::Replace(id));
    }

    pub fn clear(&mut self) {
        self.queue.push(SceneCommand::Clear);
    }

    pub fn switch_to(&mut self, id: SceneId) {
        self.queue.push(SceneCommand::SwitchTo(id));
    }

    /// Switch by name. Unknown names are logged and ignored.
    pub fn switch_to_named(&mut self, name: &str) {
        match name.parse::<SceneId>() {
            Ok(id) => self.switch_to(id),
            Err(err) => tracing::error!("ignoring scene change: {err}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn pending(&self) -> &[SceneCommand] {
        &self.queue
    }

    fn take(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.queue)
    }
}

/// One layer of the stack.
pub trait Scene {
    fn id(&self) -> SceneId;

    fn on_enter(&mut self, _ctx: &mut GameContext) {}
    fn on_exit(&mut self, _ctx: &mut GameContext) {}
    /// Another scene was pushed on top of this one.
    fn on_pause(&mut self, _ctx: &mut GameContext) {}
    /// The scene above this one was popped.
    fn on_resume(&mut self, _ctx: &mut GameContext) {}

    fn handle_input(&mut self, _key: Key, _ctx: &mut GameContext) {}
    fn update(&mut self, _dt: f32, _ctx: &mut GameContext) {}
    fn render(&self, surface: &mut dyn Surface, ctx: &GameContext);

    /// Stops input and update from reaching the layers below.
    fn is_blocking(&self) -> bool {
        true
    }

    /// Lets the layer below render underneath this one.
    fn is_transparent(&self) -> bool {
        false
    }
}

pub type SceneFactory = Box<dyn FnMut(SceneId, &mut GameContext) -> Box<dyn Scene>>;

/// Scenes that queue commands from `on_enter` can cascade; stop eventually.
const MAX_COMMAND_ROUNDS: usize = 16;

pub struct SceneStack {
    layers: Vec<Box<dyn Scene>>,
    factory: SceneFactory,
}

impl SceneStack {
    pub fn new(factory: SceneFactory) -> Self {
        Self {
            layers: Vec::new(),
            factory,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn top_id(&self) -> Option<SceneId> {
        self.layers.last().map(|s| s.id())
    }

    /// Layer ids, bottom first.
    pub fn ids(&self) -> Vec<SceneId> {
        self.layers.iter().map(|s| s.id()).collect()
    }

    /// Send a key press to the top layer and any non-blocked layers below.
    pub fn handle_input(&mut self, key: Key, ctx: &mut GameContext) {
        for layer in self.layers.iter_mut().rev() {
            layer.handle_input(key, ctx);
            if layer.is_blocking() {
                break;
            }
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut GameContext) {
        for layer in self.layers.iter_mut().rev() {
            layer.update(dt, ctx);
            if layer.is_blocking() {
                break;
            }
        }
    }

    /// Draw from the lowest visible layer up to the top.
    pub fn render(&self, surface: &mut dyn Surface, ctx: &GameContext) {
        let start = self
            .layers
            .iter()
            .rposition(|s| !s.is_transparent())
            .unwrap_or(0);
        for layer in &self.layers[start..] {
            layer.render(surface, ctx);
        }
    }

    /// Apply every queued command. Returns how many were applied.
    pub fn apply_pending(&mut self, ctx: &mut GameContext) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_COMMAND_ROUNDS {
            if ctx.commands.is_empty() {
                return applied;
            }
            for command in ctx.commands.take() {
                self.apply(command, ctx);
                applied += 1;
            }
        }
        if !ctx.commands.is_empty() {
            tracing::error!(
                pending = ctx.commands.pending().len(),
                "scene commands keep cascading, dropping the rest"
            );
            ctx.commands.take();
        }
        applied
    }

    fn apply(&mut self, command: SceneCommand, ctx: &mut GameContext) {
        tracing::debug!(?command, stack = ?self.ids(), "scene command");
        match command {
            SceneCommand::Push(id) => self.push(id, ctx),
            SceneCommand::Pop => self.pop(ctx),
            SceneCommand::Replace(id) => {
                if let Some(mut old) = self.layers.pop() {
                    old.on_exit(ctx);
                }
                self.enter(id, ctx);
            }
            SceneCommand::Clear => self.clear(ctx),
            SceneCommand::SwitchTo(id) => {
                self.clear(ctx);
                self.enter(id, ctx);
            }
        }
    }

    fn push(&mut self, id: SceneId, ctx: &mut GameContext) {
        if let Some(top) = self.layers.last_mut() {
            top.on_pause(ctx);
        }
        self.enter(id, ctx);
    }

    fn pop(&mut self, ctx: &mut GameContext) {
        let Some(mut old) = self.layers.pop() else {
            tracing::warn!("pop on an empty scene stack");
            return;
        };
        old.on_exit(ctx);
        if let Some(top) = self.layers.last_mut() {
            top.on_resume(ctx);
        }
    }

    fn clear(&mut self, ctx: &mut GameContext) {
        while let Some(mut layer) = self.layers.pop() {
            layer.on_exit(ctx);
        }
    }

    fn enter(&mut self, id: SceneId, ctx: &mut GameContext) {
        let mut scene = (self.factory)(id, ctx);
        scene.on_enter(ctx);
        self.layers.push(scene);
        tracing::info!(scene = %id, depth = self.layers.len(), "entered scene");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::platform::surface::RecordingSurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub type Log = Rc<RefCell<Vec<String>>>;

    /// Scene that records every callback it receives.
    pub struct SpyScene {
        pub id: SceneId,
        pub log: Log,
        pub blocking: bool,
        pub transparent: bool,
    }

    impl SpyScene {
        fn note(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.id, what));
        }
    }

    impl Scene for SpyScene {
        fn id(&self) -> SceneId {
            self.id
        }
        fn on_enter(&mut self, _ctx: &mut GameContext) {
            self.note("enter");
        }
        fn on_exit(&mut self, _ctx: &mut GameContext) {
            self.note("exit");
        }
        fn on_pause(&mut self, _ctx: &mut GameContext) {
            self.note("pause");
        }
        fn on_resume(&mut self, _ctx: &mut GameContext) {
            self.note("resume");
        }
        fn handle_input(&mut self, _key: Key, _ctx: &mut GameContext) {
            self.note("input");
        }
        fn update(&mut self, _dt: f32, _ctx: &mut GameContext) {
            self.note("update");
        }
        fn render(&self, _surface: &mut dyn Surface, _ctx: &GameContext) {
            self.note("render");
        }
        fn is_blocking(&self) -> bool {
            self.blocking
        }
        fn is_transparent(&self) -> bool {
            self.transparent
        }
    }

    /// Pause is a transparent blocking overlay, Help a non-blocking one.
    pub fn spy_stack(log: &Log) -> SceneStack {
        let log = log.clone();
        SceneStack::new(Box::new(move |id, _ctx| {
            Box::new(SpyScene {
                id,
                log: log.clone(),
                blocking: id != SceneId::Help,
                transparent: matches!(id, SceneId::Pause | SceneId::Help),
            })
        }))
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn test_scene_id_from_str() {
        assert_eq!("Playing".parse::<SceneId>().unwrap(), SceneId::Playing);
        assert_eq!("game-over".parse::<SceneId>().unwrap(), SceneId::GameOver);
        assert!("credits".parse::<SceneId>().is_err());
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let mut ctx = GameContext::headless();
        ctx.commands.switch_to_named("credits");
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn test_push_pauses_previous_top() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();

        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::Pause);
        assert_eq!(stack.apply_pending(&mut ctx), 2);

        assert_eq!(
            take(&log),
            vec!["playing:enter", "playing:pause", "pause:enter"]
        );
        assert_eq!(stack.ids(), vec![SceneId::Playing, SceneId::Pause]);
    }

    #[test]
    fn test_pop_resumes_revealed_layer() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::Pause);
        stack.apply_pending(&mut ctx);
        take(&log);

        ctx.commands.pop();
        stack.apply_pending(&mut ctx);
        assert_eq!(take(&log), vec!["pause:exit", "playing:resume"]);
        assert_eq!(stack.top_id(), Some(SceneId::Playing));
    }

    #[test]
    fn test_replace_exits_before_enter() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        ctx.commands.push(SceneId::Menu);
        stack.apply_pending(&mut ctx);
        take(&log);

        ctx.commands.replace(SceneId::Intro);
        stack.apply_pending(&mut ctx);
        assert_eq!(take(&log), vec!["menu:exit", "intro:enter"]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_switch_to_clears_everything() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::Pause);
        stack.apply_pending(&mut ctx);
        take(&log);

        ctx.commands.switch_to(SceneId::Menu);
        stack.apply_pending(&mut ctx);
        assert_eq!(
            take(&log),
            vec!["pause:exit", "playing:exit", "menu:enter"]
        );
        assert_eq!(stack.ids(), vec![SceneId::Menu]);
    }

    #[test]
    fn test_pop_on_empty_is_harmless() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        ctx.commands.pop();
        assert_eq!(stack.apply_pending(&mut ctx), 1);
        assert!(stack.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_blocking_overlay_stops_update_but_not_render() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(800, 600);
        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::Pause);
        stack.apply_pending(&mut ctx);
        take(&log);

        stack.update(1.0 / 60.0, &mut ctx);
        stack.handle_input(Key::Confirm, &mut ctx);
        stack.render(&mut surface, &ctx);
        assert_eq!(
            take(&log),
            vec!["pause:update", "pause:input", "playing:render", "pause:render"]
        );

        ctx.commands.pop();
        stack.apply_pending(&mut ctx);
        take(&log);
        stack.update(1.0 / 60.0, &mut ctx);
        assert_eq!(take(&log), vec!["playing:update"]);
    }

    #[test]
    fn test_non_blocking_layer_lets_update_through() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::Help);
        stack.apply_pending(&mut ctx);
        take(&log);

        stack.update(0.016, &mut ctx);
        assert_eq!(take(&log), vec!["help:update", "playing:update"]);
    }

    #[test]
    fn test_opaque_top_hides_lower_layers() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(800, 600);
        ctx.commands.push(SceneId::Playing);
        ctx.commands.push(SceneId::GameOver);
        stack.apply_pending(&mut ctx);
        take(&log);

        stack.render(&mut surface, &ctx);
        assert_eq!(take(&log), vec!["game_over:render"]);
    }
}
