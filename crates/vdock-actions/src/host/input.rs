//! Keyboard and mouse injection.
//!
//! Handlers never talk to an input backend directly. They open an
//! [`InputSession`] from the [`InputDevice`] held in `Services`, which lets
//! tests record the exact event sequence.

use std::fmt;
use std::time::Duration;

use crate::error::InputError;
use crate::host::Pause;

/// Keys with a symbolic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Control,
    Alt,
    Shift,
    /// Windows, Command or Super depending on the platform.
    Meta,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    VolumeUp,
    VolumeDown,
    VolumeMute,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
    MediaStop,
}

/// A key in a hotkey chord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Named(NamedKey),
    /// Anything not in the key table is sent as literal text.
    Literal(String),
}

impl Key {
    /// Map a key name to a key, case-insensitively.
    pub fn parse(name: &str) -> Key {
        let lower = name.to_ascii_lowercase();
        let named = match lower.as_str() {
            "ctrl" | "control" => NamedKey::Control,
            "alt" | "option" => NamedKey::Alt,
            "shift" => NamedKey::Shift,
            "win" | "windows" | "cmd" | "command" | "super" | "meta" => NamedKey::Meta,
            "enter" | "return" => NamedKey::Enter,
            "tab" => NamedKey::Tab,
            "space" => NamedKey::Space,
            "backspace" => NamedKey::Backspace,
            "delete" | "del" => NamedKey::Delete,
            "escape" | "esc" => NamedKey::Escape,
            "up" => NamedKey::Up,
            "down" => NamedKey::Down,
            "left" => NamedKey::Left,
            "right" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pageup" | "page_up" => NamedKey::PageUp,
            "pagedown" | "page_down" => NamedKey::PageDown,
            "volume_up" => NamedKey::VolumeUp,
            "volume_down" => NamedKey::VolumeDown,
            "volume_mute" => NamedKey::VolumeMute,
            "media_play_pause" => NamedKey::MediaPlayPause,
            "media_next" | "media_next_track" => NamedKey::MediaNext,
            "media_previous" | "media_previous_track" => NamedKey::MediaPrevious,
            "media_stop" => NamedKey::MediaStop,
            other => match function_key(other) {
                Some(n) => NamedKey::F(n),
                None => return Key::Literal(name.to_string()),
            },
        };
        Key::Named(named)
    }
}

fn function_key(name: &str) -> Option<u8> {
    let n: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Named(NamedKey::F(n)) => write!(f, "f{n}"),
            Key::Named(named) => write!(f, "{}", format!("{named:?}").to_ascii_lowercase()),
            Key::Literal(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Press,
    Release,
}

/// An open connection to the input backend.
pub trait InputSession {
    fn key(&mut self, key: &Key, direction: KeyDirection) -> Result<(), InputError>;

    fn text(&mut self, text: &str) -> Result<(), InputError>;

    /// Left click at `position`, or at the current pointer when `None`.
    fn click(&mut self, position: Option<(i32, i32)>) -> Result<(), InputError>;
}

/// Factory for input sessions.
pub trait InputDevice: Send + Sync {
    fn open(&self) -> Result<Box<dyn InputSession>, InputError>;
}

/// Press `keys` in order, then release them in reverse order.
///
/// `delay` is paused after every event. If a press fails, keys already held
/// are released before the error is returned. Every release is attempted even
/// when one fails; the first failure is returned.
pub fn send_chord(
    session: &mut dyn InputSession,
    keys: &[Key],
    delay: Duration,
    pause: &dyn Pause,
) -> Result<(), InputError> {
    let mut held: Vec<&Key> = Vec::with_capacity(keys.len());

    for key in keys {
        if let Err(e) = session.key(key, KeyDirection::Press) {
            for key in held.iter().rev() {
                let _ = session.key(key, KeyDirection::Release);
            }
            return Err(e);
        }
        held.push(key);
        pause.pause(delay);
    }

    let mut first_error = None;
    for key in held.iter().rev() {
        if let Err(e) = session.key(key, KeyDirection::Release) {
            first_error.get_or_insert(e);
        }
        pause.pause(delay);
    }

    first_error.map_or(Ok(()), Err)
}

/// The platform copy or paste chord: Command on macOS, Control elsewhere.
pub fn shortcut(letter: char) -> [Key; 2] {
    let modifier = if cfg!(target_os = "macos") {
        NamedKey::Meta
    } else {
        NamedKey::Control
    };
    [Key::Named(modifier), Key::Literal(letter.to_string())]
}
