//! Engine core: frame timing, scenes, spatial queries, camera, particles,
//! post effects, events and state machines. Nothing in here knows about dinosaurs.

pub mod camera;
pub mod component;
pub mod entity;
pub mod event;
pub mod game_loop;
pub mod input_buffer;
pub mod particles;
pub mod post_processing;
pub mod scene;
pub mod spatial_grid;
pub mod state_machine;

