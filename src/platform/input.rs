//! Keyboard and joystick input
//!
//! Each frame the active `InputSource` produces an `InputFrame`: a movement
//! axis in `[-1, 1]²` and the discrete key presses that happened since the
//! last frame. Keyboard and joystick are merged additively and clamped.
//!
//! Native: joystick through gilrs. WASM: keyboard only.

use macroquad::prelude::{KeyCode, Vec2};

/// Game-level key presses. Several physical keys map to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Confirm,
    Back,
    Help,
    Quit,
    Potion,
    Repellent,
    ToggleMusic,
    ToggleDebug,
    ToggleVignette,
    QuickSave,
    QuickLoad,
    /// Anything else, for "press any key" screens
    Other,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pub axis: Vec2,
    pub presses: Vec<Key>,
}

pub trait InputSource {
    fn poll(&mut self) -> InputFrame;
}

/// Map a macroquad key code to a game key.
pub fn key_for(code: KeyCode) -> Key {
    match code {
        KeyCode::Enter | KeyCode::KpEnter => Key::Confirm,
        KeyCode::Escape => Key::Back,
        KeyCode::H => Key::Help,
        KeyCode::Q => Key::Quit,
        KeyCode::E | KeyCode::RightShift => Key::Potion,
        KeyCode::Space => Key::Repellent,
        KeyCode::M => Key::ToggleMusic,
        KeyCode::F3 => Key::ToggleDebug,
        KeyCode::F4 => Key::ToggleVignette,
        KeyCode::F5 => Key::QuickSave,
        KeyCode::F9 => Key::QuickLoad,
        _ => Key::Other,
    }
}

/// Sum two axis readings and clamp each component to [-1, 1].
pub fn merge_axis(a: Vec2, b: Vec2) -> Vec2 {
    (a + b).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
}

/// Radial deadzone with linear rescaling of the rest of the range.
pub fn apply_deadzone(x: f32, y: f32, deadzone: f32) -> Vec2 {
    let len = (x * x + y * y).sqrt();
    if len < deadzone || len == 0.0 {
        return Vec2::ZERO;
    }
    let scale = ((len - deadzone) / (1.0 - deadzone)).min(1.0) / len;
    Vec2::new(x * scale, y * scale)
}

fn keyboard_axis() -> Vec2 {
    use macroquad::input::is_key_down;
    let held = |a: KeyCode, b: KeyCode| (is_key_down(a) || is_key_down(b)) as i32 as f32;
    Vec2::new(
        held(KeyCode::Right, KeyCode::D) - held(KeyCode::Left, KeyCode::A),
        held(KeyCode::Down, KeyCode::S) - held(KeyCode::Up, KeyCode::W),
    )
}

/// Keyboard plus an optional joystick.
pub struct DeviceInput {
    joystick: Option<Joystick>,
}

impl DeviceInput {
    pub fn new(enable_joystick: bool, deadzone: f32) -> Self {
        let joystick = if enable_joystick {
            Joystick::open(deadzone)
        } else {
            None
        };
        Self { joystick }
    }
}

impl InputSource for DeviceInput {
    fn poll(&mut self) -> InputFrame {
        let mut presses: Vec<Key> = macroquad::input::get_keys_pressed()
            .into_iter()
            .filter(|code| !is_movement_key(*code))
            .map(key_for)
            .collect();
        let mut axis = keyboard_axis();

        if let Some(joystick) = &mut self.joystick {
            joystick.poll(&mut presses);
            axis = merge_axis(axis, joystick.stick());
        }

        InputFrame { axis, presses }
    }
}

fn is_movement_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
            | KeyCode::W | KeyCode::A | KeyCode::S | KeyCode::D
    )
}

#[cfg(not(target_arch = "wasm32"))]
mod joystick {
    use super::*;
    use gilrs::{Axis, Button, EventType, Gilrs};

    pub struct Joystick {
        gilrs: Gilrs,
        deadzone: f32,
    }

    impl Joystick {
        pub fn open(deadzone: f32) -> Option<Self> {
            match Gilrs::new() {
                Ok(gilrs) => {
                    let pads = gilrs.gamepads().count();
                    tracing::info!(pads, "joystick support enabled");
                    Some(Self { gilrs, deadzone })
                }
                Err(e) => {
                    tracing::warn!("joystick unavailable: {}", e);
                    None
                }
            }
        }

        pub fn poll(&mut self, presses: &mut Vec<Key>) {
            while let Some(event) = self.gilrs.next_event() {
                if let EventType::ButtonPressed(button, _) = event.event {
                    match button {
                        Button::South => {
                            presses.push(Key::Confirm);
                            presses.push(Key::Repellent);
                        }
                        Button::West => presses.push(Key::Potion),
                        Button::Start => presses.push(Key::Back),
                        Button::Select => presses.push(Key::Help),
                        _ => {}
                    }
                }
            }
        }

        pub fn stick(&self) -> Vec2 {
            let Some((_, pad)) = self.gilrs.gamepads().next() else {
                return Vec2::ZERO;
            };
            // gilrs has +Y up, the map has +Y down
            apply_deadzone(
                pad.value(Axis::LeftStickX),
                -pad.value(Axis::LeftStickY),
                self.deadzone,
            )
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod joystick {
    use super::*;

    pub struct Joystick;

    impl Joystick {
        pub fn open(_deadzone: f32) -> Option<Self> {
            tracing::info!("joystick not supported on this platform");
            None
        }

        pub fn poll(&mut self, _presses: &mut Vec<Key>) {}

        pub fn stick(&self) -> Vec2 {
            Vec2::ZERO
        }
    }
}

use joystick::Joystick;

/// Replays scripted frames, for tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<InputFrame>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputFrame {
        self.frames.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_for(KeyCode::Enter), Key::Confirm);
        assert_eq!(key_for(KeyCode::RightShift), Key::Potion);
        assert_eq!(key_for(KeyCode::F9), Key::QuickLoad);
        assert_eq!(key_for(KeyCode::F4), Key::ToggleVignette);
        assert_eq!(key_for(KeyCode::Z), Key::Other);
    }

    #[test]
    fn test_merge_axis_clamps() {
        let merged = merge_axis(Vec2::new(1.0, -1.0), Vec2::new(0.8, -0.5));
        assert_eq!(merged, Vec2::new(1.0, -1.0));
        let merged = merge_axis(Vec2::new(-1.0, 0.0), Vec2::new(0.5, 0.25));
        assert_eq!(merged, Vec2::new(-0.5, 0.25));
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(apply_deadzone(0.1, 0.1, 0.5), Vec2::ZERO);
        let full = apply_deadzone(1.0, 0.0, 0.5);
        assert!((full.x - 1.0).abs() < 1e-6);
        let half = apply_deadzone(0.75, 0.0, 0.5);
        assert!((half.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_scripted_input_runs_dry() {
        let mut input = ScriptedInput::new([InputFrame {
            axis: Vec2::X,
            presses: vec![Key::Back],
        }]);
        assert_eq!(input.poll().presses, vec![Key::Back]);
        assert_eq!(input.poll(), InputFrame::default());
    }
}
