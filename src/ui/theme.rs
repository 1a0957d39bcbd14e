//! UI Theme - Shared colors and text sizes
//!
//! Used by the HUD, the debug overlay and the menu screens.

use crate::platform::surface::Rgba;

// =============================================================================
// Colors
// =============================================================================

/// Primary text color
pub const TEXT_COLOR: Rgba = Rgba::rgb(255, 255, 255);

/// Dimmed/secondary text
pub const TEXT_DIM: Rgba = Rgba::rgb(170, 170, 180);

/// Highlighted text (titles, selected entries)
pub const TEXT_HIGHLIGHT: Rgba = Rgba::rgb(255, 215, 0);

/// Screen background for menus
pub const MENU_BG: Rgba = Rgba::rgb(30, 30, 30);

/// Translucent panel behind overlays
pub const OVERLAY_BG: Rgba = Rgba::rgba(0, 0, 0, 160);

/// Frame behind the minimap
pub const HUD_BACKDROP: Rgba = Rgba::rgba(0, 0, 0, 180);

// =============================================================================
// Font Sizes
// =============================================================================

/// Screen titles
pub const FONT_SIZE_TITLE: f32 = 48.0;

/// Menu body text
pub const FONT_SIZE_CONTENT: f32 = 28.0;

/// HUD labels
pub const FONT_SIZE_HUD: f32 = 22.0;

/// Status and debug lines
pub const FONT_SIZE_SMALL: f32 = 18.0;
