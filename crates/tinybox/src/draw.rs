// SPDX-License-Identifier: MIT
//
// Drawing helpers — shapes and text on top of `Session::set_cell`.
//
// Everything here clips against the grid: coordinates may be negative or run
// off the edge, and only the visible part is written. Shape and text helpers
// draw with the pen colors; the clearing helpers write default blanks
// (`clear_rect` keeps the pen background so a cleared panel still shows its
// fill).
//
// Text is laid out one `char` per column. Wide glyphs and combining marks
// are not measured.

use crate::cell::{DEFAULT_BG, DEFAULT_FG};
use crate::platform::Platform;
use crate::session::Session;

// ─── Box Glyphs ──────────────────────────────────────────────────────────────

pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';
pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';

/// Offsets `0..len`, empty for non-positive lengths.
fn span(len: i32) -> impl Iterator<Item = i32> {
    0..len.max(0)
}

fn char_count(text: &str) -> i32 {
    i32::try_from(text.chars().count()).unwrap_or(i32::MAX)
}

impl<P: Platform> Session<P> {
    /// Write with the pen colors.
    fn put(&mut self, x: i32, y: i32, ch: char) {
        let (fg, bg) = (self.pen.fg, self.pen.bg);
        self.set_cell(x, y, ch, fg, bg);
    }

    // ── Shapes ──────────────────────────────────────────────────────────

    /// Fill a `w`×`h` rectangle with `ch`.
    pub fn fill(&mut self, x: i32, y: i32, w: i32, h: i32, ch: char) {
        for dy in span(h) {
            for dx in span(w) {
                self.put(x.saturating_add(dx), y.saturating_add(dy), ch);
            }
        }
    }

    /// Horizontal run of `len` copies of `ch` starting at `(x, y)`.
    pub fn hline(&mut self, x: i32, y: i32, len: i32, ch: char) {
        for i in span(len) {
            self.put(x.saturating_add(i), y, ch);
        }
    }

    /// Vertical run of `len` copies of `ch` starting at `(x, y)`.
    pub fn vline(&mut self, x: i32, y: i32, len: i32, ch: char) {
        for i in span(len) {
            self.put(x, y.saturating_add(i), ch);
        }
    }

    /// Single-line box outline. Boxes narrower or shorter than 2 draw
    /// nothing.
    pub fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w < 2 || h < 2 {
            return;
        }
        let right = x.saturating_add(w - 1);
        let bottom = y.saturating_add(h - 1);

        self.put(x, y, BOX_TOP_LEFT);
        self.put(right, y, BOX_TOP_RIGHT);
        self.put(x, bottom, BOX_BOTTOM_LEFT);
        self.put(right, bottom, BOX_BOTTOM_RIGHT);

        self.hline(x.saturating_add(1), y, w - 2, BOX_HORIZONTAL);
        self.hline(x.saturating_add(1), bottom, w - 2, BOX_HORIZONTAL);
        self.vline(x, y.saturating_add(1), h - 2, BOX_VERTICAL);
        self.vline(right, y.saturating_add(1), h - 2, BOX_VERTICAL);
    }

    // ── Text ────────────────────────────────────────────────────────────

    /// Write `text` starting at `(x, y)` with the pen colors.
    pub fn print_at(&mut self, x: i32, y: i32, text: &str) {
        let mut cx = x;
        for ch in text.chars() {
            self.put(cx, y, ch);
            cx = cx.saturating_add(1);
        }
    }

    /// Write raw bytes one per column, each byte taken as a code point
    /// (so `0xE9` draws `é`).
    pub fn draw_bytes(&mut self, x: i32, y: i32, data: &[u8]) {
        let mut cx = x;
        for &byte in data {
            self.put(cx, y, char::from(byte));
            cx = cx.saturating_add(1);
        }
    }

    /// Write `text` flush left on row `y`.
    pub fn draw_text_left(&mut self, y: i32, text: &str, fg: u8, bg: u8) {
        self.text_from(0, y, text, fg, bg);
    }

    /// Write `text` centered on row `y`. Text wider than the screen starts
    /// at column 0 and is clipped on the right.
    pub fn draw_text_center(&mut self, y: i32, text: &str, fg: u8, bg: u8) {
        let start = ((i32::from(self.width()) - char_count(text)) / 2).max(0);
        self.text_from(start, y, text, fg, bg);
    }

    /// Write `text` flush right on row `y`. Text wider than the screen
    /// starts at column 0 and is clipped on the right.
    pub fn draw_text_right(&mut self, y: i32, text: &str, fg: u8, bg: u8) {
        let start = (i32::from(self.width()) - char_count(text)).max(0);
        self.text_from(start, y, text, fg, bg);
    }

    fn text_from(&mut self, x: i32, y: i32, text: &str, fg: u8, bg: u8) {
        let width = i32::from(self.width());
        for (cx, ch) in (x..width).zip(text.chars()) {
            self.set_cell(cx, y, ch, fg, bg);
        }
    }

    // ── Clearing ────────────────────────────────────────────────────────

    /// Blank row `y` with default colors.
    pub fn clear_line(&mut self, y: i32) {
        for x in 0..i32::from(self.width()) {
            self.set_cell(x, y, ' ', DEFAULT_FG, DEFAULT_BG);
        }
    }

    /// Blank a rectangle with default colors.
    pub fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for dy in span(h) {
            for dx in span(w) {
                self.set_cell(x.saturating_add(dx), y.saturating_add(dy), ' ', DEFAULT_FG, DEFAULT_BG);
            }
        }
    }

    /// Blank a rectangle, keeping the pen background.
    pub fn clear_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let bg = self.pen.bg;
        for dy in span(h) {
            for dx in span(w) {
                self.set_cell(x.saturating_add(dx), y.saturating_add(dy), ' ', DEFAULT_FG, bg);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
