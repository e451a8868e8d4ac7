//! Input backend built on enigo.

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use super::input::{InputDevice, InputSession, Key, KeyDirection, NamedKey};
use crate::error::InputError;

/// Opens a fresh enigo connection per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnigoInput;

impl InputDevice for EnigoInput {
    fn open(&self) -> Result<Box<dyn InputSession>, InputError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InputError::Init(e.to_string()))?;
        Ok(Box::new(EnigoSession { enigo }))
    }
}

struct EnigoSession {
    enigo: Enigo,
}

impl InputSession for EnigoSession {
    fn key(&mut self, key: &Key, which: KeyDirection) -> Result<(), InputError> {
        let direction = match which {
            KeyDirection::Press => Direction::Press,
            KeyDirection::Release => Direction::Release,
        };
        match key {
            Key::Named(named) => {
                let code = map_named(*named)
                    .ok_or_else(|| InputError::UnsupportedKey(key.to_string()))?;
                self.enigo
                    .key(code, direction)
                    .map_err(|e| InputError::Event(e.to_string()))
            }
            Key::Literal(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self
                        .enigo
                        .key(enigo::Key::Unicode(c), direction)
                        .map_err(|e| InputError::Event(e.to_string())),
                    // Multi-character literals are typed once, on press
                    _ if which == KeyDirection::Press => self.text(text),
                    _ => Ok(()),
                }
            }
        }
    }

    fn text(&mut self, text: &str) -> Result<(), InputError> {
        self.enigo
            .text(text)
            .map_err(|e| InputError::Event(e.to_string()))
    }

    fn click(&mut self, position: Option<(i32, i32)>) -> Result<(), InputError> {
        if let Some((x, y)) = position {
            self.enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| InputError::Event(e.to_string()))?;
        }
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| InputError::Event(e.to_string()))
    }
}

fn map_named(key: NamedKey) -> Option<enigo::Key> {
    use enigo::Key as K;
    let mapped = match key {
        NamedKey::Control => K::Control,
        NamedKey::Alt => K::Alt,
        NamedKey::Shift => K::Shift,
        NamedKey::Meta => K::Meta,
        NamedKey::Enter => K::Return,
        NamedKey::Tab => K::Tab,
        NamedKey::Space => K::Space,
        NamedKey::Backspace => K::Backspace,
        NamedKey::Delete => K::Delete,
        NamedKey::Escape => K::Escape,
        NamedKey::Up => K::UpArrow,
        NamedKey::Down => K::DownArrow,
        NamedKey::Left => K::LeftArrow,
        NamedKey::Right => K::RightArrow,
        NamedKey::Home => K::Home,
        NamedKey::End => K::End,
        NamedKey::PageUp => K::PageUp,
        NamedKey::PageDown => K::PageDown,
        NamedKey::F(n) => match n {
            1 => K::F1,
            2 => K::F2,
            3 => K::F3,
            4 => K::F4,
            5 => K::F5,
            6 => K::F6,
            7 => K::F7,
            8 => K::F8,
            9 => K::F9,
            10 => K::F10,
            11 => K::F11,
            12 => K::F12,
            _ => return None,
        },
        NamedKey::VolumeUp => K::VolumeUp,
        NamedKey::VolumeDown => K::VolumeDown,
        NamedKey::VolumeMute => K::VolumeMute,
        NamedKey::MediaPlayPause => K::MediaPlayPause,
        NamedKey::MediaNext => K::MediaNextTrack,
        NamedKey::MediaPrevious => K::MediaPrevTrack,
        #[cfg(not(target_os = "macos"))]
        NamedKey::MediaStop => K::MediaStop,
        #[cfg(target_os = "macos")]
        NamedKey::MediaStop => return None,
    };
    Some(mapped)
}
