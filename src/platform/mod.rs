//! Platform collaborators: drawing, input devices, audio and save slots.
//!
//! Everything here sits behind a small trait so the simulation and the scenes
//! can run against recording fakes in tests.

pub mod audio;
pub mod input;
pub mod storage;
pub mod surface;
