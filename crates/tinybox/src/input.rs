// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns one raw read chunk into one typed event: a key, a mouse action, or a
// bracketed-paste marker. Understands:
//
// - Lone ESC and the control bytes the session cares about
// - CSI letter keys (arrows, Home, End)
// - CSI tilde keys (Home, Delete, PageUp, PageDown, F1-F5)
// - SGR mouse (`ESC [ < b ; x ; y M|m`)
// - Legacy X10 mouse (`ESC [ M` + three raw bytes)
// - Bracketed paste delimiters (`ESC [ 200 ~` / `ESC [ 201 ~`)
//
// # Design
//
// Decoding is a pure function of the chunk. Nothing is carried between
// reads: a sequence split across two reads decodes as two degraded events
// (usually an Escape followed by literal characters). Anything unrecognised
// under ESC collapses to Escape, anything else to a literal character, so
// decoding never fails.
//
// Number parsing works directly on `&[u8]`, no intermediate `String`.

use bitflags::bitflags;

use crate::terminal::Size;

/// Largest chunk the session reads per poll.
pub const MAX_CHUNK: usize = 16;

const ESC: u8 = 0x1B;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded input or synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse button or wheel event.
    Mouse(MouseEvent),
    /// The terminal changed size. Queued by the session, never decoded.
    Resize(Size),
    /// A bracketed paste delimiter. The pasted bytes arrive as ordinary key
    /// events in between.
    Paste(PasteMarker),
}

/// A key with modifier bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub key: Key,
    /// Modifier keys. The decoder reports control keys by name instead
    /// (`CtrlC`), so this is currently always empty.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal character (the byte's value for single-byte input).
    Char(char),
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F5.
    F(u8),
    CtrlA,
    CtrlC,
    CtrlD,
    CtrlE,
    CtrlK,
    CtrlU,
    CtrlW,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A mouse event at a cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Which button (or wheel direction).
    pub button: MouseButton,
    /// Column. 0-based for SGR reports, 1-based for legacy reports.
    pub x: u16,
    /// Row. Same basis as `x`.
    pub y: u16,
    /// `true` for press (and wheel), `false` for release.
    pub press: bool,
}

/// Mouse buttons and wheel directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

/// Bracketed paste delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasteMarker {
    /// `ESC [ 200 ~`
    Start,
    /// `ESC [ 201 ~`
    End,
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Decode one read chunk into one event.
///
/// An empty chunk decodes as Escape; the session never passes one.
///
/// # Examples
///
/// ```
/// use tinybox::input::{decode, Event, Key, KeyEvent, MouseButton, MouseEvent};
///
/// assert_eq!(decode(b"\r"), Event::Key(KeyEvent::new(Key::Enter)));
/// assert_eq!(
///     decode(b"\x1b[<0;5;10M"),
///     Event::Mouse(MouseEvent { button: MouseButton::Left, x: 4, y: 9, press: true }),
/// );
/// ```
#[must_use]
pub fn decode(buf: &[u8]) -> Event {
    match buf.first() {
        None => key(Key::Escape),
        Some(&ESC) => decode_escape(buf),
        Some(&byte) => key(control_key(byte).unwrap_or(Key::Char(char::from(byte)))),
    }
}

/// Map the control bytes with dedicated keys.
const fn control_key(byte: u8) -> Option<Key> {
    Some(match byte {
        1 => Key::CtrlA,
        3 => Key::CtrlC,
        4 => Key::CtrlD,
        5 => Key::CtrlE,
        9 => Key::Tab,
        11 => Key::CtrlK,
        13 => Key::Enter,
        21 => Key::CtrlU,
        23 => Key::CtrlW,
        127 => Key::Backspace,
        _ => return None,
    })
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn decode_escape(buf: &[u8]) -> Event {
    debug_assert_eq!(buf.first(), Some(&ESC));

    if buf.len() == 1 {
        return key(Key::Escape);
    }
    if buf.len() >= 6 && buf[1] == b'[' && buf[2] == b'<' {
        if let Some(mouse) = decode_sgr_mouse(&buf[3..]) {
            return Event::Mouse(mouse);
        }
    }
    if buf.len() >= 3 && buf[1] == b'[' {
        if let Some(event) = decode_csi(&buf[2..]) {
            return event;
        }
    }
    key(Key::Escape)
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

/// Decode what follows `ESC [`. `None` means "fall back to Escape".
fn decode_csi(body: &[u8]) -> Option<Event> {
    let tilde_at = |i: usize| body.get(i) == Some(&b'~');

    let named = match body[0] {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        b'H' => Key::Home,
        b'F' => Key::End,
        b'1' if tilde_at(1) => Key::Home,
        b'3' if tilde_at(1) => Key::Delete,
        b'5' if tilde_at(1) => Key::PageUp,
        b'6' if tilde_at(1) => Key::PageDown,
        b'M' if body.len() >= 4 => return Some(Event::Mouse(decode_legacy_mouse(&body[1..4]))),
        _ => return decode_csi_number(body),
    };
    Some(key(named))
}

/// `ESC [ 1 d ~` function keys and the paste delimiters.
fn decode_csi_number(body: &[u8]) -> Option<Event> {
    match body {
        [b'1', d @ b'1'..=b'5', b'~', ..] => Some(key(Key::F(d - b'0'))),
        [b'2', b'0', b'0', b'~', ..] => Some(Event::Paste(PasteMarker::Start)),
        [b'2', b'0', b'1', b'~', ..] => Some(Event::Paste(PasteMarker::End)),
        _ => None,
    }
}

// ── Mouse ───────────────────────────────────────────────────────────────────

/// Parse `b ; x ; y (M|m)` after `ESC [ <`.
///
/// Coordinates arrive 1-based and are reported 0-based.
fn decode_sgr_mouse(params: &[u8]) -> Option<MouseEvent> {
    let (b, rest) = parse_u16(params)?;
    let rest = rest.strip_prefix(b";")?;
    let (x, rest) = parse_u16(rest)?;
    let rest = rest.strip_prefix(b";")?;
    let (y, rest) = parse_u16(rest)?;

    let press = match rest.first()? {
        b'M' => true,
        b'm' => false,
        _ => return None,
    };

    Some(MouseEvent {
        button: mouse_button(b, b >= 64),
        x: x.saturating_sub(1),
        y: y.saturating_sub(1),
        press,
    })
}

/// Decode the three raw bytes after `ESC [ M`.
///
/// Each byte is offset by 32. Coordinates are left 1-based, and every
/// report counts as a press since this encoding cannot express releases
/// per button.
fn decode_legacy_mouse(raw: &[u8]) -> MouseEvent {
    let b = raw[0].wrapping_sub(32);
    MouseEvent {
        button: mouse_button(u16::from(b), b & 64 != 0),
        x: u16::from(raw[1].saturating_sub(32)),
        y: u16::from(raw[2].saturating_sub(32)),
        press: true,
    }
}

/// Low two bits pick the button (3 reads as left); wheel reports use bit 0
/// for direction.
const fn mouse_button(code: u16, wheel: bool) -> MouseButton {
    if wheel {
        return if code & 1 == 0 {
            MouseButton::WheelUp
        } else {
            MouseButton::WheelDown
        };
    }
    match code & 3 {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn key(key: Key) -> Event {
    Event::Key(KeyEvent::new(key))
}

/// Parse a run of ASCII digits (at least one) as a saturating `u16`.
/// Returns `(value, remaining_bytes)`.
fn parse_u16(buf: &[u8]) -> Option<(u16, &[u8])> {
    let digits = buf.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let val = buf[..digits].iter().fold(0u16, |acc, &b| {
        acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
    });
    Some((val, &buf[digits..]))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
