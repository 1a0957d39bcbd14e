//! Debug overlay (F3)
//!
//! A column of `name: value` lines in the top-left corner. The Playing scene
//! fills it each frame; process memory comes from `memory-stats`.

use crate::platform::surface::Surface;

use super::theme::{FONT_SIZE_SMALL, OVERLAY_BG, TEXT_COLOR};

const LINE_HEIGHT: f32 = 20.0;
const ORIGIN: (f32, f32) = (10.0, 90.0);

#[derive(Debug, Default)]
pub struct DebugOverlay {
    metrics: Vec<(&'static str, String)>,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a metric. Order of first insertion is kept.
    pub fn set(&mut self, name: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.metrics.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.metrics.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn clear(&mut self) {
        self.metrics.clear();
    }

    /// Resident memory of this process, if the platform reports it.
    pub fn memory_line() -> String {
        match memory_stats::memory_stats() {
            Some(usage) => format!("{:.1} MB", usage.physical_mem as f64 / (1024.0 * 1024.0)),
            None => "n/a".to_string(),
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if self.metrics.is_empty() {
            return;
        }
        let (x, y) = ORIGIN;
        let width = self
            .metrics
            .iter()
            .map(|(n, v)| surface.text_width(&format!("{n}: {v}"), FONT_SIZE_SMALL))
            .fold(0.0, f32::max);
        let height = self.metrics.len() as f32 * LINE_HEIGHT;
        surface.draw_rect(x - 5.0, y - 5.0, width + 10.0, height + 10.0, OVERLAY_BG);
        for (i, (name, value)) in self.metrics.iter().enumerate() {
            let line = format!("{name}: {value}");
            surface.draw_text(&line, x, y + (i as f32 + 0.8) * LINE_HEIGHT, FONT_SIZE_SMALL, TEXT_COLOR);
        }
    }
}
