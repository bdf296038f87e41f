// SPDX-License-Identifier: MIT
//
// Key input parser.
//
// Turns raw stdin bytes into key events. Only the encodings a plain
// terminal sends without any extended protocol are understood:
//
// - C0 control bytes (Ctrl+letter, Tab, Enter, Backspace)
// - Legacy CSI sequences (arrows, Home/End, editing keys) with xterm
//   modifier parameters
// - SS3 arrows and Home/End from application cursor mode
// - Alt+key (ESC followed by a printable byte)
// - UTF-8 multi-byte characters
//
// Sequences may span several reads, so the parser keeps the unconsumed
// tail in a small buffer. A lone ESC stays pending until the caller
// gives up waiting and calls [`Parser::flush`].
//
// Byte 0x08 is reported as Ctrl+H and 0x0A as Ctrl+J, not as Backspace
// and Enter: terminals send 0x7F for the Backspace key and 0x0D for
// Return, and the editor binds the control chords separately.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A keyboard event: key identity plus active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + the given character.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags, in xterm's `param = 1 + bitmask` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental key parser.
///
/// Feed raw bytes with [`advance`](Parser::advance); incomplete sequences
/// are kept and resumed on the next call.
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed bytes and return every key that could be parsed.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        keys
    }

    /// Are there unconsumed bytes waiting for more input?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys.
    ///
    /// Called after an input timeout: a lone ESC becomes Escape, a
    /// truncated sequence degrades to its individual bytes.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(b as char))),
                b => control_key(b),
            })
            .collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    Key(KeyEvent, usize),
    Incomplete,
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        b @ (0x00..=0x1A | 0x7F) => control_key(b).map_or(Parsed::Skip(1), |k| Parsed::Key(k, 1)),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

/// Map a C0 control byte (or DEL) to its key.
fn control_key(byte: u8) -> Option<KeyEvent> {
    let key = match byte {
        0x00 => KeyEvent::ctrl(' '),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0D => KeyEvent::plain(KeyCode::Enter),
        0x7F => KeyEvent::plain(KeyCode::Backspace),
        b @ 0x01..=0x1A => KeyEvent::ctrl((b + b'a' - 1) as char),
        _ => return None,
    };
    Some(key)
}

fn parse_escape(buf: &[u8]) -> Parsed {
    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(b as char),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, the
    // final byte 0x40..=0x7E.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let consumed = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        },
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => {
            return Parsed::Key(
                KeyEvent {
                    code: KeyCode::Tab,
                    modifiers: Modifiers::SHIFT,
                },
                consumed,
            );
        }
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent { code, modifiers }, consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }
    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Key(KeyEvent::plain(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

/// Split `1;5` style parameters. Empty fields parse as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| acc.saturating_mul(10).saturating_add(u16::from(b - b'0')))
        })
        .collect()
}

/// xterm encodes modifiers as `1 + bitmask`.
fn decode_modifiers(param: u16) -> Modifiers {
    let mask = param.saturating_sub(1);
    #[allow(clippy::cast_possible_truncation)]
    Modifiers::from_bits_truncate(mask as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
