//! Sound effects and background music
//!
//! Sounds are addressed by category and name. A missing sound is logged and
//! skipped; the game never fails because of audio.

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCategory {
    Entities,
    Environment,
    Actions,
}

/// Every effect with its category, file stem and volume.
pub const SOUNDS: &[(SoundCategory, &str, f32)] = &[
    (SoundCategory::Entities, "player_move_soft", 0.5),
    (SoundCategory::Entities, "potion_use", 0.6),
    (SoundCategory::Entities, "repellent_trigger", 0.6),
    (SoundCategory::Entities, "player_damage", 0.9),
    (SoundCategory::Environment, "day", 0.4),
    (SoundCategory::Environment, "night", 0.4),
    (SoundCategory::Environment, "boat_arrives", 0.6),
    (SoundCategory::Actions, "game_start", 0.5),
    (SoundCategory::Actions, "game_over", 0.8),
    (SoundCategory::Actions, "win_game", 0.7),
    (SoundCategory::Actions, "dino_roar", 0.2),
    (SoundCategory::Actions, "potion_pickup", 0.6),
    (SoundCategory::Actions, "healing", 0.7),
];

pub const MUSIC_VOLUME: f32 = 0.5;

/// Audio output. Methods take `&self` so event handlers can hold a shared
/// handle.
pub trait AudioSink {
    fn play(&self, category: SoundCategory, name: &str);
    fn play_music(&self);
    fn stop_music(&self);
    fn is_music_playing(&self) -> bool;
    fn stop_all(&self);

    fn toggle_music(&self) {
        if self.is_music_playing() {
            self.stop_music();
        } else {
            self.play_music();
        }
    }
}

/// Silence.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _category: SoundCategory, _name: &str) {}
    fn play_music(&self) {}
    fn stop_music(&self) {}
    fn is_music_playing(&self) -> bool {
        false
    }
    fn stop_all(&self) {}
}

/// Remembers what would have been played.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: RefCell<Vec<String>>,
    pub music: Cell<bool>,
}

impl RecordingAudio {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.played.borrow_mut())
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, _category: SoundCategory, name: &str) {
        self.played.borrow_mut().push(name.to_string());
    }
    fn play_music(&self) {
        self.music.set(true);
    }
    fn stop_music(&self) {
        self.music.set(false);
    }
    fn is_music_playing(&self) -> bool {
        self.music.get()
    }
    fn stop_all(&self) {
        self.music.set(false);
    }
}

/// macroquad's audio backend.
pub struct MacroquadAudio {
    effects: FxHashMap<(SoundCategory, &'static str), (macroquad::audio::Sound, f32)>,
    tracks: Vec<macroquad::audio::Sound>,
    current: Cell<Option<usize>>,
    next_track: Cell<usize>,
}

impl MacroquadAudio {
    /// Load all effects and music tracks from `dir` before the loop starts.
    pub async fn load(dir: &str, music: &[String]) -> Self {
        use macroquad::audio::load_sound;

        let mut effects = FxHashMap::default();
        for &(category, name, volume) in SOUNDS {
            let path = format!("{}/{}.ogg", dir, name);
            match load_sound(&path).await {
                Ok(sound) => {
                    effects.insert((category, name), (sound, volume));
                }
                Err(e) => tracing::warn!("could not load sound {:?}: {:?}", path, e),
            }
        }

        let mut tracks = Vec::new();
        for file in music {
            let path = format!("{}/{}", dir, file);
            match load_sound(&path).await {
                Ok(sound) => tracks.push(sound),
                Err(e) => tracing::warn!("could not load music {:?}: {:?}", path, e),
            }
        }
        if tracks.is_empty() {
            tracing::info!("no background music tracks found");
        }

        tracing::info!(effects = effects.len(), tracks = tracks.len(), "audio loaded");
        Self {
            effects,
            tracks,
            current: Cell::new(None),
            next_track: Cell::new(0),
        }
    }
}

impl AudioSink for MacroquadAudio {
    fn play(&self, category: SoundCategory, name: &str) {
        let found = self
            .effects
            .iter()
            .find(|((cat, n), _)| *cat == category && *n == name);
        match found {
            Some((_, (sound, volume))) => macroquad::audio::play_sound(
                sound,
                macroquad::audio::PlaySoundParams {
                    looped: false,
                    volume: *volume,
                },
            ),
            None => tracing::warn!("sound {:?}/{} not found", category, name),
        }
    }

    fn play_music(&self) {
        if self.tracks.is_empty() {
            return;
        }
        self.stop_music();
        let index = self.next_track.get() % self.tracks.len();
        self.next_track.set(index + 1);
        macroquad::audio::play_sound(
            &self.tracks[index],
            macroquad::audio::PlaySoundParams {
                looped: true,
                volume: MUSIC_VOLUME,
            },
        );
        self.current.set(Some(index));
        tracing::info!(track = index, "playing background music");
    }

    fn stop_music(&self) {
        if let Some(index) = self.current.take() {
            macroquad::audio::stop_sound(&self.tracks[index]);
        }
    }

    fn is_music_playing(&self) -> bool {
        self.current.get().is_some()
    }

    fn stop_all(&self) {
        self.stop_music();
        for (sound, _) in self.effects.values() {
            macroquad::audio::stop_sound(sound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_music() {
        let audio = RecordingAudio::default();
        audio.toggle_music();
        assert!(audio.is_music_playing());
        audio.toggle_music();
        assert!(!audio.is_music_playing());
    }

    #[test]
    fn test_sound_table_has_unique_names_per_category() {
        let mut seen = std::collections::HashSet::new();
        for (category, name, volume) in SOUNDS {
            assert!(seen.insert((*category, *name)), "duplicate {name}");
            assert!((0.0..=1.0).contains(volume));
        }
    }
}
