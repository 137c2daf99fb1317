//! Logical key name -> device key code.
//!
//! Letters map to their lowercase ASCII value. Named keys use the codes the
//! firmware's keyboard library reserves for them. Everything else maps to
//! [`NO_KEY`] and is never put on the wire.

pub type KeyCode = u8;

/// "No such key". Commands carrying this code are skipped.
pub const NO_KEY: KeyCode = 0;

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("space", 32),
    ("?", 63),
    ("ctrl", 128),
    ("shift", 129),
    ("alt", 130),
    ("enter", 176),
    ("esc", 177),
    ("backspace", 178),
    ("f1", 194),
    ("f2", 195),
    ("f3", 196),
    ("f4", 197),
    ("f5", 198),
    ("f6", 199),
    ("f7", 200),
    ("f8", 201),
    ("f9", 202),
    ("f10", 203),
    ("f11", 204),
    ("f12", 205),
    ("right", 215),
    ("left", 216),
    ("down", 217),
    ("up", 218),
];

/// Pure and total: the same name always yields the same code.
pub fn key_code(key: &str) -> KeyCode {
    if key.is_empty() {
        return NO_KEY;
    }
    let sanitized = key.to_ascii_lowercase();

    let mut chars = sanitized.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return c as KeyCode;
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(name, _)| *name == sanitized)
        .map(|(_, code)| *code)
        .unwrap_or(NO_KEY)
}
