// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell emission.
//
// Two components work together to keep terminal I/O minimal:
//
//   OutputBuffer — accumulates every byte of a frame in memory so the whole
//   frame goes out through a single platform write.
//
//   CellWriter — remembers what it last told the terminal (cursor position,
//   colors, each attribute) and only emits the escapes needed to get from
//   there to the next cell. Two neighbouring red-on-black bold cells cost one
//   cursor move, one set of SGRs, and two glyphs.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer holding one frame's worth of escape sequences and glyphs.
///
/// Default capacity: 16 KB, enough for a full redraw of a typical terminal
/// without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a glyph as UTF-8.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf
            .extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens through the platform's write.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell emitter that skips redundant escapes.
///
/// Per-frame state starts from "nothing known": no position, no colors, every
/// attribute off (the previous frame ended with `ESC[0m`).
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)`,
///   since the terminal advances after printing a glyph.
/// - **Attributes**: each of bold, italic, underline, reverse is toggled on
///   its own set/unset pair, in that order, only when it differs from the
///   last emitted state.
/// - **Colors**: foreground then background, each only on change.
#[allow(clippy::struct_field_names)] // The `last_` prefix IS the grouping.
pub struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_fg: Option<u8>,
    last_bg: Option<u8>,
    last_attrs: Attr,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Forget all tracked state. Call at the start of every frame.
    #[allow(clippy::missing_const_for_fn)] // *self = Self::new() isn't const-evaluable.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }


    /// Emit a single cell at `(x, y)`.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        for flag in Attr::EMIT_ORDER {
            let want = cell.attrs.contains(flag);
            if want != self.last_attrs.contains(flag) {
                ansi::attr(out, flag, want).ok();
            }
        }
        self.last_attrs = cell.attrs;

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }
        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }

        out.write_char(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn plain(ch: char) -> Cell {
        Cell::styled(ch, 7, 0, Attr::empty())
    }

    fn render_seq(cells: &[(u16, u16, Cell)]) -> String {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        for &(x, y, ref cell) in cells {
            writer.render_cell(&mut out, x, y, cell);
        }
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn write_char_encodes_utf8() {
        let mut buf = OutputBuffer::new();
        buf.write_char('A');
        buf.write_char('─');
        buf.write_char('🔥');
        assert_eq!(buf.as_bytes(), "A─🔥".as_bytes());
    }

    #[test]
    fn clear_empties() {
        let mut buf = OutputBuffer::new();
        write!(buf, "frame").unwrap();
        assert!(!buf.is_empty());
        buf.clear();
        assert!(buf.is_empty());
    }

    // ── CellWriter — cursor ─────────────────────────────────────────────

    #[test]
    fn first_cell_full_sequence() {
        let out = render_seq(&[(5, 3, plain('A'))]);
        assert_eq!(out, "\x1b[4;6H\x1b[38;5;7m\x1b[48;5;0mA");
    }

    #[test]
    fn adjacent_cells_share_cursor_and_style() {
        let out = render_seq(&[(0, 0, plain('A')), (1, 0, plain('B')), (2, 0, plain('C'))]);
        assert_eq!(out.matches('H').count(), 1);
        assert!(out.ends_with("ABC"));
    }

    #[test]
    fn gap_or_new_row_moves_cursor() {
        let out = render_seq(&[(0, 0, plain('A')), (5, 0, plain('B')), (6, 1, plain('C'))]);
        assert!(out.contains("\x1b[1;6HB"));
        assert!(out.contains("\x1b[2;7HC"));
    }

    // ── CellWriter — style ──────────────────────────────────────────────

    #[test]
    fn colors_emitted_only_on_change() {
        let red = Cell::styled('a', 1, 0, Attr::empty());
        let out = render_seq(&[(0, 0, red), (1, 0, red), (2, 0, plain('b'))]);
        assert_eq!(out.matches("\x1b[38;5;1m").count(), 1);
        assert_eq!(out.matches("\x1b[48;5;0m").count(), 1);
        assert!(out.contains("\x1b[38;5;7mb"));
    }

    #[test]
    fn attributes_toggle_independently() {
        let bold = Cell::styled('a', 7, 0, Attr::BOLD);
        let bold_rev = Cell::styled('b', 7, 0, Attr::BOLD | Attr::REVERSE);
        let rev = Cell::styled('c', 7, 0, Attr::REVERSE);
        let out = render_seq(&[(0, 0, bold), (1, 0, bold_rev), (2, 0, rev)]);

        // Bold set once, reverse added, then only bold cleared.
        assert_eq!(out.matches("\x1b[1m").count(), 1);
        assert!(out.contains("a\x1b[7mb"));
        assert!(out.contains("b\x1b[22mc"));
        assert!(!out.contains("\x1b[0m"));
    }

    #[test]
    fn attribute_order_is_fixed() {
        let all = Cell::styled('x', 7, 0, Attr::all());
        let out = render_seq(&[(0, 0, all)]);
        let tail = out.split_once('H').unwrap().1;
        assert!(tail.starts_with("\x1b[1m\x1b[3m\x1b[4m\x1b[7m\x1b[38;5;7m"));
    }

    #[test]
    fn reset_state_forgets_everything() {
        let mut out = OutputBuffer::new();
        let mut writer = CellWriter::new();
        writer.render_cell(&mut out, 0, 0, &plain('a'));
        writer.reset_state();

        out.clear();
        writer.render_cell(&mut out, 1, 0, &plain('b'));
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert_eq!(s, "\x1b[1;2H\x1b[38;5;7m\x1b[48;5;0mb");
    }
}
