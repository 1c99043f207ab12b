use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A button on the calculator keypad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Digit(u8),
    Point,
    Add,
    Subtract,
    Multiply,
    Divide,
    Percent,
    Clear,
    Backspace,
    Equals,
    // Decorative keys: they only interrupt the double-point gesture
    MemoryClear,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
    Negate,
}

/// One event delivered to the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    /// Tap that landed outside every button
    BackgroundTap,
}

impl From<Key> for Input {
    fn from(key: Key) -> Self {
        Input::Key(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key identifier `{0}`")]
pub struct ParseKeyError(pub String);

const DIGIT_IDS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

pub const KEYPAD_COLUMNS: usize = 4;
pub const KEYPAD_ROW_COUNT: usize = 6;

/// Keypad rows as laid out on screen, top to bottom
pub const KEYPAD_ROWS: [[Key; KEYPAD_COLUMNS]; KEYPAD_ROW_COUNT] = [
    [
        Key::MemoryClear,
        Key::MemoryAdd,
        Key::MemorySubtract,
        Key::MemoryRecall,
    ],
    [Key::Clear, Key::Backspace, Key::Negate, Key::Divide],
    [Key::Digit(7), Key::Digit(8), Key::Digit(9), Key::Multiply],
    [Key::Digit(4), Key::Digit(5), Key::Digit(6), Key::Subtract],
    [Key::Digit(1), Key::Digit(2), Key::Digit(3), Key::Add],
    [Key::Percent, Key::Digit(0), Key::Point, Key::Equals],
];

impl Key {
    /// Stable identifier carried by the input event
    pub fn id(&self) -> &'static str {
        match self {
            Key::Digit(d) => DIGIT_IDS[(*d as usize).min(9)],
            Key::Point => ".",
            Key::Add => "+",
            Key::Subtract => "-",
            Key::Multiply => "×",
            Key::Divide => "÷",
            Key::Percent => "%",
            Key::Clear => "AC",
            Key::Backspace => "x",
            Key::Equals => "=",
            Key::MemoryClear => "mc",
            Key::MemoryAdd => "m+",
            Key::MemorySubtract => "m-",
            Key::MemoryRecall => "mr",
            Key::Negate => "+/-",
        }
    }

    /// Text drawn on the button face
    pub fn label(&self) -> &'static str {
        match self {
            Key::Backspace => "⌫",
            other => other.id(),
        }
    }

    /// Character this key contributes to the display buffer, if any
    pub fn glyph(&self) -> Option<char> {
        match self {
            Key::Digit(d) => char::from_digit(u32::from(*d), 10),
            Key::Point => Some('.'),
            Key::Add => Some('+'),
            Key::Subtract => Some('-'),
            Key::Multiply => Some('×'),
            Key::Divide => Some('÷'),
            Key::Percent => Some('%'),
            _ => None,
        }
    }

    /// Keys accepted while entering hidden numbers
    pub fn is_numeric_entry(&self) -> bool {
        matches!(self, Key::Digit(_) | Key::Point)
    }

    pub fn is_inert(&self) -> bool {
        matches!(
            self,
            Key::MemoryClear
                | Key::MemoryAdd
                | Key::MemorySubtract
                | Key::MemoryRecall
                | Key::Negate
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "." => Key::Point,
            "+" => Key::Add,
            "-" => Key::Subtract,
            "×" => Key::Multiply,
            "÷" => Key::Divide,
            "%" => Key::Percent,
            "AC" => Key::Clear,
            "x" => Key::Backspace,
            "=" => Key::Equals,
            "mc" => Key::MemoryClear,
            "m+" => Key::MemoryAdd,
            "m-" => Key::MemorySubtract,
            "mr" => Key::MemoryRecall,
            "+/-" => Key::Negate,
            digit if digit.len() == 1 => {
                let d = digit
                    .chars()
                    .next()
                    .and_then(|c| c.to_digit(10))
                    .ok_or_else(|| ParseKeyError(s.to_string()))?;
                Key::Digit(d as u8)
            }
            _ => return Err(ParseKeyError(s.to_string())),
        };
        Ok(key)
    }
}

/// Parse a whitespace separated list of key identifiers
pub fn parse_sequence(s: &str) -> Result<Vec<Key>, ParseKeyError> {
    s.split_whitespace().map(str::parse).collect()
}
