//! Game Module
//!
//! Everything specific to the island: the map, the player, dinosaurs and
//! their brains, items, hazards and the per-tick world simulation.
//!
//! Key pieces:
//! - World: owns all run state and advances it one fixed step at a time
//! - CollisionResolver: player vs lava, spikes, dinosaurs and items
//! - DinoBrain: the dinosaur behaviour run through the engine state machine
//! - WorldSnapshot: quick save / quick load

pub mod collision;
pub mod components;
pub mod dinosaur;
pub mod events;
pub mod hazards;
pub mod item;
pub mod map;
pub mod player;
pub mod renderer;
pub mod snapshot;
pub mod spawn;
pub mod world;

pub use collision::{CollisionReport, CollisionResolver};
pub use dinosaur::{DinoState, Dinosaur};
pub use events::{DamageSource, EventKind, GameEvent};
pub use item::{Item, ItemKind};
pub use map::TileMap;
pub use player::Player;
pub use snapshot::WorldSnapshot;
pub use world::{Outcome, TickReport, World};
