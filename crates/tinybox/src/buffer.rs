// SPDX-License-Identifier: MIT
//
// Grid — the 2D cell array behind both the front and back screens.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing for cache efficiency.
//     A row's cells are contiguous in memory, so left-to-right iteration
//     (which the renderer does) is a linear scan.
//
//   - A per-row dirty flag mirrors the per-cell flags. The renderer skips
//     clean rows without touching their cells, which keeps a present
//     proportional to what changed rather than to the screen area.
//
//   - Writes coalesce: storing a cell that already looks identical leaves
//     the grid untouched and clean.
//
// Memory: 200×50 terminal = 10,000 cells × 12 bytes ≈ 120 KB per grid. Two
// grids (front and back) plus an optional saved snapshot. No concern.

use crate::cell::Cell;

/// A row-major grid of [`Cell`]s.
///
/// # Examples
///
/// ```
/// use tinybox::buffer::Grid;
/// use tinybox::cell::{Attr, Cell};
///
/// let mut grid = Grid::new(80, 24);
/// assert!(grid.write(5, 3, Cell::styled('X', 1, 0, Attr::empty())));
/// assert_eq!(grid.get(5, 3).unwrap().ch, 'X');
/// assert!(grid.get(80, 0).is_none());
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// `dirty_rows[y]` is set whenever any cell in row `y` is dirty.
    dirty_rows: Vec<bool>,
}

impl Grid {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid of blank cells, every one of them dirty.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; size],
            dirty_rows: vec![true; usize::from(height)],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Convert `(x, y)` to a flat index.
    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Mutable cell access that bypasses row tracking. Renderer only.
    #[inline]
    pub(crate) fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Whether any cell in row `y` may be dirty.
    #[inline]
    #[must_use]
    pub fn row_dirty(&self, y: u16) -> bool {
        self.dirty_rows.get(usize::from(y)).copied().unwrap_or(false)
    }

    /// Clear the row flag once the renderer has processed every cell in it.
    #[inline]
    pub(crate) fn clear_row_dirty(&mut self, y: u16) {
        if let Some(flag) = self.dirty_rows.get_mut(usize::from(y)) {
            *flag = false;
        }
    }

    /// Number of dirty cells (linear scan, for tests and diagnostics).
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.dirty).count()
    }

    /// Whether every cell is dirty.
    #[must_use]
    pub fn all_dirty(&self) -> bool {
        self.cells.iter().all(|c| c.dirty)
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    /// Store `cell` at `(x, y)` unless it already looks the same.
    ///
    /// A stored cell is marked dirty. Returns `true` if the grid changed.
    /// Out-of-bounds writes are ignored and return `false`.
    pub fn write(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if self.cells[idx].same_look(&cell) {
            return false;
        }
        self.cells[idx] = cell.marked_dirty();
        self.dirty_rows[usize::from(y)] = true;
        true
    }

    /// Overwrite `(x, y)` and mark it dirty, even if nothing changed.
    pub fn force(&mut self, x: u16, y: u16, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell.marked_dirty();
        self.dirty_rows[usize::from(y)] = true;
    }

    /// Mark every cell dirty.
    pub fn mark_all_dirty(&mut self) {
        for cell in &mut self.cells {
            cell.dirty = true;
        }
        self.dirty_rows.fill(true);
    }

    /// Reset every cell to [`Cell::BLANK`] (dirty).
    pub fn fill_blank(&mut self) {
        self.cells.fill(Cell::BLANK);
        self.dirty_rows.fill(true);
    }

    /// Reallocate at new dimensions, discarding content.
    ///
    /// Resize is a hard reset, not a reflow: every cell comes back blank
    /// and dirty.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    /// Copy the overlapping region of `other` into this grid, marking
    /// every copied cell dirty.
    pub fn copy_from(&mut self, other: &Self) {
        let w = self.width.min(other.width);
        let h = self.height.min(other.height);
        for y in 0..h {
            for x in 0..w {
                let src = other.cells[other.index(x, y)];
                self.force(x, y, src);
            }
        }
    }

    /// Shift rows by `lines`: positive moves content down, negative up.
    ///
    /// Vacated rows are blanked. Every cell ends up dirty because each
    /// position may now show different content.
    pub fn scroll(&mut self, lines: i32) {
        if lines == 0 || self.height == 0 {
            return;
        }
        let w = usize::from(self.width);
        let h = usize::from(self.height);
        let shift = usize::try_from(lines.unsigned_abs()).unwrap_or(usize::MAX).min(h);
        let span = shift * w;

        if lines > 0 {
            self.cells.copy_within(..(h - shift) * w, span);
            self.cells[..span].fill(Cell::BLANK);
        } else {
            self.cells.copy_within(span.., 0);
            let len = self.cells.len();
            self.cells[len - span..].fill(Cell::BLANK);
        }
        self.mark_all_dirty();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
