//! Normalized key codes and host-side key tables.
//!
//! The native engine consumes single-byte key codes: printable input is
//! the lowercased ASCII byte, and control keys use the byte values the
//! doomgeneric family of ports established (arrow keys in the `0xa0..`
//! range, function keys offset by `0x80`). [`HostKey`] is the host-side
//! vocabulary: the full table of physical keys the sampler scans once
//! per host tick, each mapped onto a [`KeyCode`].

use std::fmt;

/// A normalized key code as consumed by the native engine.
///
/// Printable keys carry their lowercased ASCII byte; control keys use
/// the named constants below. Multiple physical keys may normalize to
/// the same code (alternate binds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u8);

impl KeyCode {
    /// Right arrow / turn right.
    pub const RIGHT: KeyCode = KeyCode(0xae);
    /// Left arrow / turn left.
    pub const LEFT: KeyCode = KeyCode(0xac);
    /// Up arrow / move forward.
    pub const UP: KeyCode = KeyCode(0xad);
    /// Down arrow / move backward.
    pub const DOWN: KeyCode = KeyCode(0xaf);
    /// Strafe left.
    pub const STRAFE_LEFT: KeyCode = KeyCode(0xa0);
    /// Strafe right.
    pub const STRAFE_RIGHT: KeyCode = KeyCode(0xa1);
    /// Use / interact.
    pub const USE: KeyCode = KeyCode(0xa2);
    /// Fire.
    pub const FIRE: KeyCode = KeyCode(0xa3);
    /// Escape (menu).
    pub const ESCAPE: KeyCode = KeyCode(27);
    /// Enter / confirm.
    pub const ENTER: KeyCode = KeyCode(13);
    /// Tab (automap).
    pub const TAB: KeyCode = KeyCode(9);
    /// Backspace.
    pub const BACKSPACE: KeyCode = KeyCode(127);
    /// Shift modifier (run).
    pub const SHIFT: KeyCode = KeyCode(0x80 + 0x36);
    /// Alt modifier (strafe).
    pub const ALT: KeyCode = KeyCode(0x80 + 0x38);
    /// Pause.
    pub const PAUSE: KeyCode = KeyCode(0xff);
    /// `-` (shrink view).
    pub const MINUS: KeyCode = KeyCode(0x2d);
    /// `=` (grow view).
    pub const EQUALS: KeyCode = KeyCode(0x3d);
    /// F1.
    pub const F1: KeyCode = KeyCode(0x80 + 0x3b);
    /// F2.
    pub const F2: KeyCode = KeyCode(0x80 + 0x3c);
    /// F3.
    pub const F3: KeyCode = KeyCode(0x80 + 0x3d);
    /// F4.
    pub const F4: KeyCode = KeyCode(0x80 + 0x3e);
    /// F5.
    pub const F5: KeyCode = KeyCode(0x80 + 0x3f);
    /// F6.
    pub const F6: KeyCode = KeyCode(0x80 + 0x40);
    /// F7.
    pub const F7: KeyCode = KeyCode(0x80 + 0x41);
    /// F8.
    pub const F8: KeyCode = KeyCode(0x80 + 0x42);
    /// F9.
    pub const F9: KeyCode = KeyCode(0x80 + 0x43);
    /// F10.
    pub const F10: KeyCode = KeyCode(0x80 + 0x44);
    /// F11.
    pub const F11: KeyCode = KeyCode(0x80 + 0x57);
    /// F12.
    pub const F12: KeyCode = KeyCode(0x80 + 0x58);

    /// Normalize a typed character into a key code.
    ///
    /// Uppercase ASCII folds to lowercase; everything else passes
    /// through unchanged.
    pub fn from_char(byte: u8) -> KeyCode {
        KeyCode(byte.to_ascii_lowercase())
    }

    /// Whether this code is a printable ASCII byte.
    pub fn is_printable(self) -> bool {
        (0x20..0x7f).contains(&self.0)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            write!(f, "'{}'", self.0 as char)
        } else {
            write!(f, "{:#04x}", self.0)
        }
    }
}

impl From<u8> for KeyCode {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// One discrete key transition produced by the host sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEdge {
    /// The normalized code.
    pub code: KeyCode,
    /// `true` for a press edge, `false` for a release edge.
    pub pressed: bool,
}

/// ASCII bytes excluded from typed-character folding.
///
/// These characters are also direct bindings in the host key table
/// (`W` forward, `S` backward, `E` use), so accepting them a second
/// time as typed input would make one physical key produce two events
/// in the same tick and the input would be dropped or spammed.
pub const DOUBLED_KEYS: [u8; 3] = [b's', b'w', b'e'];

/// A physical key on the host side, scanned once per host tick.
///
/// The table is deliberately flat: the sampler iterates [`HostKey::ALL`]
/// and asks the input source for the level of each entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum HostKey {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    Up, Down, Left, Right,
    Space, Enter, Escape, Tab, Backspace,
    LeftShift, RightShift, LeftControl, RightControl, LeftAlt, RightAlt,
    Minus, Equals, Comma, Period, Slash,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

impl HostKey {
    /// Every key the sampler scans, in scan order.
    pub const ALL: &'static [HostKey] = &[
        HostKey::A, HostKey::B, HostKey::C, HostKey::D, HostKey::E,
        HostKey::F, HostKey::G, HostKey::H, HostKey::I, HostKey::J,
        HostKey::K, HostKey::L, HostKey::M, HostKey::N, HostKey::O,
        HostKey::P, HostKey::Q, HostKey::R, HostKey::S, HostKey::T,
        HostKey::U, HostKey::V, HostKey::W, HostKey::X, HostKey::Y,
        HostKey::Z,
        HostKey::Digit0, HostKey::Digit1, HostKey::Digit2, HostKey::Digit3,
        HostKey::Digit4, HostKey::Digit5, HostKey::Digit6, HostKey::Digit7,
        HostKey::Digit8, HostKey::Digit9,
        HostKey::Up, HostKey::Down, HostKey::Left, HostKey::Right,
        HostKey::Space, HostKey::Enter, HostKey::Escape, HostKey::Tab,
        HostKey::Backspace,
        HostKey::LeftShift, HostKey::RightShift,
        HostKey::LeftControl, HostKey::RightControl,
        HostKey::LeftAlt, HostKey::RightAlt,
        HostKey::Minus, HostKey::Equals, HostKey::Comma, HostKey::Period,
        HostKey::Slash,
        HostKey::F1, HostKey::F2, HostKey::F3, HostKey::F4, HostKey::F5,
        HostKey::F6, HostKey::F7, HostKey::F8, HostKey::F9, HostKey::F10,
        HostKey::F11, HostKey::F12,
    ];

    /// The normalized code this physical key feeds to the engine.
    ///
    /// `W`/`S` are rebound to forward/backward and `E` to use, matching
    /// the movement layout the engine family expects; the remaining
    /// letters and digits pass through as their ASCII byte.
    pub fn to_code(self) -> KeyCode {
        match self {
            HostKey::W => KeyCode::UP,
            HostKey::S => KeyCode::DOWN,
            HostKey::E => KeyCode::USE,
            HostKey::A => KeyCode(b'a'),
            HostKey::B => KeyCode(b'b'),
            HostKey::C => KeyCode(b'c'),
            HostKey::D => KeyCode(b'd'),
            HostKey::F => KeyCode(b'f'),
            HostKey::G => KeyCode(b'g'),
            HostKey::H => KeyCode(b'h'),
            HostKey::I => KeyCode(b'i'),
            HostKey::J => KeyCode(b'j'),
            HostKey::K => KeyCode(b'k'),
            HostKey::L => KeyCode(b'l'),
            HostKey::M => KeyCode(b'm'),
            HostKey::N => KeyCode(b'n'),
            HostKey::O => KeyCode(b'o'),
            HostKey::P => KeyCode(b'p'),
            HostKey::Q => KeyCode(b'q'),
            HostKey::R => KeyCode(b'r'),
            HostKey::T => KeyCode(b't'),
            HostKey::U => KeyCode(b'u'),
            HostKey::V => KeyCode(b'v'),
            HostKey::X => KeyCode(b'x'),
            HostKey::Y => KeyCode(b'y'),
            HostKey::Z => KeyCode(b'z'),
            HostKey::Digit0 => KeyCode(b'0'),
            HostKey::Digit1 => KeyCode(b'1'),
            HostKey::Digit2 => KeyCode(b'2'),
            HostKey::Digit3 => KeyCode(b'3'),
            HostKey::Digit4 => KeyCode(b'4'),
            HostKey::Digit5 => KeyCode(b'5'),
            HostKey::Digit6 => KeyCode(b'6'),
            HostKey::Digit7 => KeyCode(b'7'),
            HostKey::Digit8 => KeyCode(b'8'),
            HostKey::Digit9 => KeyCode(b'9'),
            HostKey::Up => KeyCode::UP,
            HostKey::Down => KeyCode::DOWN,
            HostKey::Left => KeyCode::LEFT,
            HostKey::Right => KeyCode::RIGHT,
            HostKey::Space => KeyCode::USE,
            HostKey::Enter => KeyCode::ENTER,
            HostKey::Escape => KeyCode::ESCAPE,
            HostKey::Tab => KeyCode::TAB,
            HostKey::Backspace => KeyCode::BACKSPACE,
            HostKey::LeftShift | HostKey::RightShift => KeyCode::SHIFT,
            HostKey::LeftControl | HostKey::RightControl => KeyCode::FIRE,
            HostKey::LeftAlt | HostKey::RightAlt => KeyCode::ALT,
            HostKey::Minus => KeyCode::MINUS,
            HostKey::Equals => KeyCode::EQUALS,
            HostKey::Comma => KeyCode(b','),
            HostKey::Period => KeyCode(b'.'),
            HostKey::Slash => KeyCode(b'/'),
            HostKey::F1 => KeyCode::F1,
            HostKey::F2 => KeyCode::F2,
            HostKey::F3 => KeyCode::F3,
            HostKey::F4 => KeyCode::F4,
            HostKey::F5 => KeyCode::F5,
            HostKey::F6 => KeyCode::F6,
            HostKey::F7 => KeyCode::F7,
            HostKey::F8 => KeyCode::F8,
            HostKey::F9 => KeyCode::F9,
            HostKey::F10 => KeyCode::F10,
            HostKey::F11 => KeyCode::F11,
            HostKey::F12 => KeyCode::F12,
        }
    }
}
