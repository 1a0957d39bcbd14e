//! Screen-space UI: the HUD, the debug overlay and shared styling.

pub mod debug_overlay;
pub mod hud;
pub mod theme;

pub use debug_overlay::DebugOverlay;
pub use hud::Hud;
