// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell. It holds a glyph, a
// foreground and background palette index, four independent text
// attributes, and a dirty flag. The entire rendering pipeline exists to
// produce, diff, and output these.
//
// Glyphs are passed through verbatim. There is no width or grapheme logic:
// one `char` occupies one cell, and what the terminal makes of it is the
// caller's business.
//
// Dirty semantics differ slightly between the two grids:
//
//   - front: dirty means "may differ from what was last sent"; the renderer
//     must look at it on the next present.
//   - back: dirty means "device content unknown" (after a resize, a resume,
//     or a clear). A dirty back cell never matches anything, which forces
//     the renderer to redraw over it.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to its own SGR set/unset pair, so the renderer toggles
    /// them independently:
    ///
    /// ```
    /// use tinybox::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::REVERSE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 / 22 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 3 / 23 — italic.
        const ITALIC    = 1 << 1;
        /// SGR 4 / 24 — single underline.
        const UNDERLINE = 1 << 2;
        /// SGR 7 / 27 — swap foreground and background.
        const REVERSE   = 1 << 3;
    }
}

impl Attr {
    /// The individual flags in the order the renderer emits them.
    pub const EMIT_ORDER: [Self; 4] = [Self::BOLD, Self::ITALIC, Self::UNDERLINE, Self::REVERSE];

    /// Build from the four independent booleans.
    #[inline]
    #[must_use]
    pub fn from_bools(bold: bool, italic: bool, underline: bool, reverse: bool) -> Self {
        let mut attrs = Self::empty();
        attrs.set(Self::BOLD, bold);
        attrs.set(Self::ITALIC, italic);
        attrs.set(Self::UNDERLINE, underline);
        attrs.set(Self::REVERSE, reverse);
        attrs
    }
}

// ─── Pen ─────────────────────────────────────────────────────────────────────

/// Default foreground palette index (white).
pub const DEFAULT_FG: u8 = 7;
/// Default background palette index (black).
pub const DEFAULT_BG: u8 = 0;

/// The active drawing state: colors used by the text helpers and the
/// attributes merged into every cell write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pen {
    /// Foreground palette index.
    pub fg: u8,
    /// Background palette index.
    pub bg: u8,
    /// Attributes applied to every `set_cell`.
    pub attrs: Attr,
}

impl Pen {
    /// White on black, no attributes.
    pub const DEFAULT: Self = Self {
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
        attrs: Attr::empty(),
    };
}

impl Default for Pen {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// `PartialEq` compares every field including `dirty`; use
/// [`same_look`](Self::same_look) to ask whether two cells render the same.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Glyph to display.
    pub ch: char,
    /// Foreground palette index.
    pub fg: u8,
    /// Background palette index.
    pub bg: u8,
    /// Text attributes.
    pub attrs: Attr,
    /// Needs attention on the next present (front) / content unknown (back).
    pub dirty: bool,
}

impl Cell {
    /// A blank cell: space, white on black, no attributes, dirty.
    ///
    /// Fresh grids start dirty so the first present draws everything.
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: DEFAULT_FG,
        bg: DEFAULT_BG,
        attrs: Attr::empty(),
        dirty: true,
    };

    /// Create a clean cell with explicit styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: u8, bg: u8, attrs: Attr) -> Self {
        Self {
            ch,
            fg,
            bg,
            attrs,
            dirty: false,
        }
    }

    /// Whether two cells render identically (ignores `dirty`).
    #[inline]
    #[must_use]
    pub fn same_look(&self, other: &Self) -> bool {
        self.ch == other.ch && self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }

    /// Copy of this cell with the dirty flag set.
    #[inline]
    #[must_use]
    pub const fn marked_dirty(self) -> Self {
        Self { dirty: true, ..self }
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::BLANK
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({:?}, fg={}, bg={}", self.ch, self.fg, self.bg)?;
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        if self.dirty {
            write!(f, ", dirty")?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_white_on_black_space() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, 7);
        assert_eq!(cell.bg, 0);
        assert!(cell.attrs.is_empty());
        assert!(cell.dirty);
    }

    #[test]
    fn same_look_ignores_dirty() {
        let a = Cell::styled('x', 1, 2, Attr::BOLD);
        let b = a.marked_dirty();
        assert_ne!(a, b);
        assert!(a.same_look(&b));
    }

    #[test]
    fn same_look_sees_each_field() {
        let base = Cell::styled('x', 1, 2, Attr::BOLD);
        assert!(!base.same_look(&Cell { ch: 'y', ..base }));
        assert!(!base.same_look(&Cell { fg: 9, ..base }));
        assert!(!base.same_look(&Cell { bg: 9, ..base }));
        assert!(!base.same_look(&Cell {
            attrs: Attr::ITALIC,
            ..base
        }));
    }

    #[test]
    fn attr_from_bools() {
        assert_eq!(Attr::from_bools(false, false, false, false), Attr::empty());
        assert_eq!(
            Attr::from_bools(true, false, true, false),
            Attr::BOLD | Attr::UNDERLINE
        );
        assert_eq!(Attr::from_bools(true, true, true, true), Attr::all());
    }

    #[test]
    fn emit_order_covers_all_flags() {
        let all = Attr::EMIT_ORDER
            .iter()
            .fold(Attr::empty(), |acc, flag| acc | *flag);
        assert_eq!(all, Attr::all());
    }

    #[test]
    fn pen_default() {
        let pen = Pen::default();
        assert_eq!(pen.fg, DEFAULT_FG);
        assert_eq!(pen.bg, DEFAULT_BG);
        assert!(pen.attrs.is_empty());
    }

    #[test]
    fn debug_shows_style() {
        let cell = Cell::styled('A', 3, 4, Attr::BOLD).marked_dirty();
        let s = format!("{cell:?}");
        assert!(s.contains("'A'"));
        assert!(s.contains("fg=3"));
        assert!(s.contains("BOLD"));
        assert!(s.contains("dirty"));
    }
}
