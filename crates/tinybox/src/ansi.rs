// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the `CellWriter`'s job. This module
// only knows the byte-level encoding of every command the session sends.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// Colors are palette indices only (`ESC[38;5;Nm` / `ESC[48;5;Nm`). Every
// modern terminal understands the 256-color form, so there is a single
// encoding path and no truecolor negotiation.

use std::io::{self, Write};

use crate::cell::Attr;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Save the cursor position (SCOSC).
#[inline]
pub fn cursor_save(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[s")
}

/// Restore the cursor position saved by [`cursor_save`] (SCORC).
#[inline]
pub fn cursor_restore(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[u")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ row ; col R`, 1-based.
#[inline]
pub fn query_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

/// Park the cursor at the bottom-right corner and ask for its position.
///
/// Terminals clamp the move to the screen, so the reply is the screen size.
/// Used as the last size-discovery tier when `TIOCGWINSZ` is unavailable.
#[inline]
pub fn query_screen_size(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999;999H\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// This clears **everything**: bold, italic, colors, underline — all of it.
/// The stateful renderer must invalidate its tracked state after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Ring the terminal bell (BEL).
#[inline]
pub fn bell(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x07")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color to a 256-color palette index.
#[inline]
pub fn fg(w: &mut impl Write, idx: u8) -> io::Result<()> {
    write!(w, "\x1b[38;5;{idx}m")
}

/// Set the background color to a 256-color palette index.
#[inline]
pub fn bg(w: &mut impl Write, idx: u8) -> io::Result<()> {
    write!(w, "\x1b[48;5;{idx}m")
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Turn a single attribute on or off.
///
/// Each flag has its own fixed set/unset pair, so the renderer can toggle
/// one attribute without disturbing the others (no SGR 0 round trip).
/// `flag` must be exactly one of the [`Attr`] constants.
pub fn attr(w: &mut impl Write, flag: Attr, on: bool) -> io::Result<()> {
    let (set, unset): (&[u8], &[u8]) = if flag == Attr::BOLD {
        (b"\x1b[1m", b"\x1b[22m")
    } else if flag == Attr::ITALIC {
        (b"\x1b[3m", b"\x1b[23m")
    } else if flag == Attr::UNDERLINE {
        (b"\x1b[4m", b"\x1b[24m")
    } else if flag == Attr::REVERSE {
        (b"\x1b[7m", b"\x1b[27m")
    } else {
        return Ok(());
    };
    w.write_all(if on { set } else { unset })
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
///
/// The alternate screen is a separate buffer that preserves the original
/// terminal content. On exit, the original content is restored — this is
/// what makes full-screen programs non-destructive.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Mouse Protocol ─────────────────────────────────────────────────────────

/// Enable mouse reporting.
///
/// All four modes go out together: click tracking (1000), drag tracking
/// (1002), urxvt encoding (1015), and SGR encoding (1006). Terminals pick
/// the richest encoding they support; the decoder understands SGR and the
/// legacy X10 form.
#[inline]
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1002h\x1b[?1015h\x1b[?1006h")
}

/// Disable every mouse mode enabled by [`enable_mouse`].
#[inline]
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000l\x1b[?1002l\x1b[?1015l\x1b[?1006l")
}

// ─── Bracketed Paste ────────────────────────────────────────────────────────

/// Enable bracketed paste mode (DEC 2004).
///
/// Pasted text is wrapped with `\x1b[200~` / `\x1b[201~`, which the decoder
/// reports as [`PasteMarker`](crate::input::PasteMarker) events.
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

/// Disable bracketed paste mode.
#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Cursor Shape ───────────────────────────────────────────────────────────

/// Terminal cursor shape (DECSCUSR — Set Cursor Style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Terminal default (usually blinking block).
    Default,
    /// Blinking block cursor. The session starts with this shape.
    #[default]
    BlinkBlock,
    /// Steady (non-blinking) block cursor.
    SteadyBlock,
    /// Blinking underline cursor.
    BlinkUnderline,
    /// Steady underline cursor.
    SteadyUnderline,
    /// Blinking bar (I-beam) cursor.
    BlinkBar,
    /// Steady bar (I-beam) cursor.
    SteadyBar,
}

impl CursorShape {
    /// The DECSCUSR parameter for this shape.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::BlinkBlock => 1,
            Self::SteadyBlock => 2,
            Self::BlinkUnderline => 3,
            Self::SteadyUnderline => 4,
            Self::BlinkBar => 5,
            Self::SteadyBar => 6,
        }
    }
}

/// Set the cursor shape using DECSCUSR (`ESC [ N SP q`).
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    write!(w, "\x1b[{} q", shape.code())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
