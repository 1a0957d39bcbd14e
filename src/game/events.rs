//! Gameplay events
//!
//! Emitted by the world and the Playing scene, fanned out through an
//! `EventBus<GameEvent>`. Sound and the event log are plain subscribers.

use std::rc::Rc;

use crate::engine::event::{BusEvent, EventBus};
use crate::platform::audio::{AudioSink, SoundCategory};

use super::item::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageSource {
    Lava,
    Spikes,
    Dinosaur,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerDamaged { damage: i32, source: DamageSource },
    ItemPickedUp { kind: ItemKind, x: i32, y: i32 },
    ItemUsed { kind: ItemKind },
    DayNightChanged { night: bool },
    LavaSpawned { fields: usize },
    BoatArrived { x: i32, y: i32 },
    GameWon { score: u32 },
    GameLost { score: u32 },
}

/// Subscription key for `GameEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PlayerDamaged,
    ItemPickedUp,
    ItemUsed,
    DayNightChanged,
    LavaSpawned,
    BoatArrived,
    GameWon,
    GameLost,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::PlayerDamaged,
        EventKind::ItemPickedUp,
        EventKind::ItemUsed,
        EventKind::DayNightChanged,
        EventKind::LavaSpawned,
        EventKind::BoatArrived,
        EventKind::GameWon,
        EventKind::GameLost,
    ];
}

impl BusEvent for GameEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            GameEvent::PlayerDamaged { .. } => EventKind::PlayerDamaged,
            GameEvent::ItemPickedUp { .. } => EventKind::ItemPickedUp,
            GameEvent::ItemUsed { .. } => EventKind::ItemUsed,
            GameEvent::DayNightChanged { .. } => EventKind::DayNightChanged,
            GameEvent::LavaSpawned { .. } => EventKind::LavaSpawned,
            GameEvent::BoatArrived { .. } => EventKind::BoatArrived,
            GameEvent::GameWon { .. } => EventKind::GameWon,
            GameEvent::GameLost { .. } => EventKind::GameLost,
        }
    }
}

/// Sound effect for an event, if any.
pub fn sound_for(event: &GameEvent) -> Option<(SoundCategory, &'static str)> {
    match event {
        GameEvent::PlayerDamaged { .. } => Some((SoundCategory::Entities, "player_damage")),
        GameEvent::ItemPickedUp { .. } => Some((SoundCategory::Actions, "potion_pickup")),
        GameEvent::ItemUsed { kind: ItemKind::Potion } => Some((SoundCategory::Entities, "potion_use")),
        GameEvent::ItemUsed { kind: ItemKind::Repellent } => {
            Some((SoundCategory::Entities, "repellent_trigger"))
        }
        GameEvent::DayNightChanged { night: true } => Some((SoundCategory::Environment, "night")),
        GameEvent::DayNightChanged { night: false } => Some((SoundCategory::Environment, "day")),
        GameEvent::BoatArrived { .. } => Some((SoundCategory::Environment, "boat_arrives")),
        GameEvent::GameWon { .. } => Some((SoundCategory::Actions, "win_game")),
        GameEvent::GameLost { .. } => Some((SoundCategory::Actions, "game_over")),
        GameEvent::LavaSpawned { .. } => None,
    }
}

/// Bus with the standard subscribers: sounds and a debug log line per event.
pub fn game_bus(audio: Rc<dyn AudioSink>) -> EventBus<GameEvent> {
    let mut bus = EventBus::new();
    for kind in EventKind::ALL {
        let audio = Rc::clone(&audio);
        bus.subscribe(kind, move |event: &GameEvent| {
            if let Some((category, name)) = sound_for(event) {
                audio.play(category, name);
            }
            Ok(())
        });
        bus.subscribe(kind, |event: &GameEvent| {
            tracing::debug!(?event, "game event");
            Ok(())
        });
    }
    bus
}
