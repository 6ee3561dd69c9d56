//! Canonical input code space
//!
//! Every backend translates its native key and button codes into the types in
//! this module before anything reaches the host. The integer codes are stable
//! across backends, so an input script recorded through one backend replays
//! identically through another.

mod table;

pub use table::CodeTable;

use serde::{Deserialize, Serialize};

macro_rules! canonical_keys {
    ($($(#[$doc:meta])* $name:ident = $code:literal,)*) => {
        /// Logical keyboard key with a stable canonical code
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(i32)]
        pub enum Key {
            $($(#[$doc])* $name = $code,)*
        }

        impl Key {
            /// Every canonical key, in code order
            pub const ALL: &'static [Key] = &[$(Key::$name,)*];
        }
    };
}

canonical_keys! {
    /// Space bar
    Space = 32,
    /// `'`
    Apostrophe = 39,
    /// `,`
    Comma = 44,
    /// `-`
    Minus = 45,
    /// `.`
    Period = 46,
    /// `/`
    Slash = 47,
    /// 0
    Num0 = 48,
    /// 1
    Num1 = 49,
    /// 2
    Num2 = 50,
    /// 3
    Num3 = 51,
    /// 4
    Num4 = 52,
    /// 5
    Num5 = 53,
    /// 6
    Num6 = 54,
    /// 7
    Num7 = 55,
    /// 8
    Num8 = 56,
    /// 9
    Num9 = 57,
    /// `;`
    Semicolon = 59,
    /// `=`
    Equal = 61,
    /// A key
    A = 65,
    /// B key
    B = 66,
    /// C key
    C = 67,
    /// D key
    D = 68,
    /// E key
    E = 69,
    /// F key
    F = 70,
    /// G key
    G = 71,
    /// H key
    H = 72,
    /// I key
    I = 73,
    /// J key
    J = 74,
    /// K key
    K = 75,
    /// L key
    L = 76,
    /// M key
    M = 77,
    /// N key
    N = 78,
    /// O key
    O = 79,
    /// P key
    P = 80,
    /// Q key
    Q = 81,
    /// R key
    R = 82,
    /// S key
    S = 83,
    /// T key
    T = 84,
    /// U key
    U = 85,
    /// V key
    V = 86,
    /// W key
    W = 87,
    /// X key
    X = 88,
    /// Y key
    Y = 89,
    /// Z key
    Z = 90,
    /// `[`
    LeftBracket = 91,
    /// `\`
    Backslash = 92,
    /// `]`
    RightBracket = 93,
    /// `` ` ``
    GraveAccent = 96,
    /// Non-US key #1
    World1 = 161,
    /// Non-US key #2
    World2 = 162,
    /// Escape
    Escape = 256,
    /// Enter / return
    Enter = 257,
    /// Tab
    Tab = 258,
    /// Backspace
    Backspace = 259,
    /// Insert
    Insert = 260,
    /// Delete
    Delete = 261,
    /// Right arrow
    Right = 262,
    /// Left arrow
    Left = 263,
    /// Down arrow
    Down = 264,
    /// Up arrow
    Up = 265,
    /// Page up
    PageUp = 266,
    /// Page down
    PageDown = 267,
    /// Home
    Home = 268,
    /// End
    End = 269,
    /// Caps lock
    CapsLock = 280,
    /// Scroll lock
    ScrollLock = 281,
    /// Num lock
    NumLock = 282,
    /// Print screen
    PrintScreen = 283,
    /// Pause
    Pause = 284,
    /// F1
    F1 = 290,
    /// F2
    F2 = 291,
    /// F3
    F3 = 292,
    /// F4
    F4 = 293,
    /// F5
    F5 = 294,
    /// F6
    F6 = 295,
    /// F7
    F7 = 296,
    /// F8
    F8 = 297,
    /// F9
    F9 = 298,
    /// F10
    F10 = 299,
    /// F11
    F11 = 300,
    /// F12
    F12 = 301,
    /// F13
    F13 = 302,
    /// F14
    F14 = 303,
    /// F15
    F15 = 304,
    /// F16
    F16 = 305,
    /// F17
    F17 = 306,
    /// F18
    F18 = 307,
    /// F19
    F19 = 308,
    /// F20
    F20 = 309,
    /// F21
    F21 = 310,
    /// F22
    F22 = 311,
    /// F23
    F23 = 312,
    /// F24
    F24 = 313,
    /// F25
    F25 = 314,
    /// Keypad 0
    Kp0 = 320,
    /// Keypad 1
    Kp1 = 321,
    /// Keypad 2
    Kp2 = 322,
    /// Keypad 3
    Kp3 = 323,
    /// Keypad 4
    Kp4 = 324,
    /// Keypad 5
    Kp5 = 325,
    /// Keypad 6
    Kp6 = 326,
    /// Keypad 7
    Kp7 = 327,
    /// Keypad 8
    Kp8 = 328,
    /// Keypad 9
    Kp9 = 329,
    /// Keypad decimal
    KpDecimal = 330,
    /// Keypad divide
    KpDivide = 331,
    /// Keypad multiply
    KpMultiply = 332,
    /// Keypad subtract
    KpSubtract = 333,
    /// Keypad add
    KpAdd = 334,
    /// Keypad enter
    KpEnter = 335,
    /// Keypad equal
    KpEqual = 336,
    /// Left shift
    LeftShift = 340,
    /// Left control
    LeftControl = 341,
    /// Left alt
    LeftAlt = 342,
    /// Left super / command
    LeftSuper = 343,
    /// Right shift
    RightShift = 344,
    /// Right control
    RightControl = 345,
    /// Right alt
    RightAlt = 346,
    /// Right super / command
    RightSuper = 347,
    /// Menu
    Menu = 348,
}

impl Key {
    /// Canonical integer code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Look a key up by canonical code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL
            .binary_search_by_key(&code, |key| key.code())
            .ok()
            .map(|index| Self::ALL[index])
    }
}

/// Mouse buttons, numbered like the canonical button codes 1..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button (1)
    Left,
    /// Right mouse button (2)
    Right,
    /// Middle mouse button (3)
    Middle,
    /// Extra button 4 (usually "back")
    Button4,
    /// Extra button 5 (usually "forward")
    Button5,
    /// Extra button 6
    Button6,
    /// Extra button 7
    Button7,
    /// Extra button 8
    Button8,
}

impl MouseButton {
    /// Every canonical button, in code order
    pub const ALL: &'static [MouseButton] = &[
        Self::Left,
        Self::Right,
        Self::Middle,
        Self::Button4,
        Self::Button5,
        Self::Button6,
        Self::Button7,
        Self::Button8,
    ];

    /// Canonical integer code
    pub fn code(self) -> i32 {
        match self {
            Self::Left => 1,
            Self::Right => 2,
            Self::Middle => 3,
            Self::Button4 => 4,
            Self::Button5 => 5,
            Self::Button6 => 6,
            Self::Button7 => 7,
            Self::Button8 => 8,
        }
    }

    /// Look a button up by canonical code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|button| button.code() == code)
    }
}

/// State transition reported for a key or button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    /// Released
    Release,
    /// Pressed
    Press,
    /// Held long enough to auto-repeat (keys only)
    Repeat,
}

bitflags::bitflags! {
    /// Modifier keys held while an event was generated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 0b0001;
        /// Either control key
        const CONTROL = 0b0010;
        /// Either alt / option key
        const ALT = 0b0100;
        /// Either super / command / windows key
        const SUPER = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_are_sorted_and_unique() {
        for pair in Key::ALL.windows(2) {
            assert!(pair[0].code() < pair[1].code(), "{:?} / {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_key_code_round_trip() {
        for &key in Key::ALL {
            assert_eq!(Key::from_code(key.code()), Some(key));
        }
        assert_eq!(Key::from_code(-1), None);
        assert_eq!(Key::from_code(1000), None);
    }

    #[test]
    fn test_well_known_codes() {
        assert_eq!(Key::W.code(), 87);
        assert_eq!(Key::Escape.code(), 256);
        assert_eq!(Key::F11.code(), 300);
        assert_eq!(Key::LeftShift.code(), 340);
        assert_eq!(MouseButton::from_code(3), Some(MouseButton::Middle));
    }
}
