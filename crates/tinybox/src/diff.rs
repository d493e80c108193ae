// SPDX-License-Identifier: MIT
//
// Differential renderer — the core of frame rendering performance.
//
// The application draws into the front grid; the back grid mirrors what the
// terminal is showing. A present walks the front grid's dirty rows, skips
// cells whose back counterpart already looks the same, and hands the rest to
// CellWriter. Each rendered cell is copied into the back grid, so after the
// pass both grids agree and every dirty flag is clear.
//
// The pipeline per present:
//
//   1. Skip rows whose dirty flag is clear, without touching their cells.
//   2. For each dirty cell in a dirty row, compare against the back cell.
//      A dirty back cell ("content unknown") never matches.
//   3. Emit mismatches through CellWriter into OutputBuffer.
//   4. Close the frame with `ESC[0m` if any cell went out.
//   5. Park the hardware cursor if it is visible and something moved.
//
// Cost is proportional to the number of dirty cells, not to the screen area.
// A second present with no writes in between produces zero bytes.

use crate::ansi;
use crate::buffer::Grid;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Dirty cells that differed from the back grid and were emitted.
    pub cells_rendered: usize,
    /// Dirty cells that turned out to match the back grid.
    pub cells_skipped: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Dirty cells examined (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Differential renderer over a front/back grid pair.
///
/// # Usage
///
/// ```
/// use tinybox::buffer::Grid;
/// use tinybox::diff::Renderer;
///
/// let mut front = Grid::new(20, 5);
/// let mut back = Grid::new(20, 5);
/// let mut renderer = Renderer::new();
///
/// let first = renderer.render(&mut front, &mut back, None);
/// assert_eq!(first.cells_rendered, 100);
///
/// let second = renderer.render(&mut front, &mut back, None);
/// assert_eq!(second.bytes_written, 0);
/// ```
pub struct Renderer {
    output: OutputBuffer,
    writer: CellWriter,
    /// Where the hardware cursor was parked by the last present, if visible.
    parked: Option<(u16, u16)>,
}

impl Renderer {
    /// Create a renderer with no cursor history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            parked: None,
        }
    }

    /// Diff `front` against `back` and build the frame's output.
    ///
    /// `cursor` is the hardware cursor position when visible, `None` when
    /// hidden. After this call every cell of `front` is clean and `back`
    /// matches it. Fetch the bytes with [`output_bytes`](Self::output_bytes).
    pub fn render(&mut self, front: &mut Grid, back: &mut Grid, cursor: Option<(u16, u16)>) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let mut stats = RenderStats::default();
        let width = front.width().min(back.width());
        let height = front.height().min(back.height());

        for y in 0..height {
            if !front.row_dirty(y) {
                continue;
            }
            for x in 0..width {
                let (Some(cell), Some(shown)) = (front.cell_mut(x, y), back.cell_mut(x, y)) else {
                    continue;
                };
                if !cell.dirty {
                    continue;
                }
                cell.dirty = false;

                if !shown.dirty && shown.same_look(cell) {
                    stats.cells_skipped += 1;
                    continue;
                }

                self.writer.render_cell(&mut self.output, x, y, cell);
                *shown = *cell;
                stats.cells_rendered += 1;
            }
            front.clear_row_dirty(y);
            back.clear_row_dirty(y);
        }

        let emitted = stats.cells_rendered > 0;
        if emitted {
            ansi::reset(&mut self.output).ok();
        }

        if let Some((cx, cy)) = cursor {
            if emitted || self.parked != cursor {
                ansi::cursor_to(&mut self.output, cx, cy).ok();
            }
        }
        self.parked = cursor;

        stats.bytes_written = self.output.len();
        stats
    }

    /// Whether the last [`render`](Self::render) produced anything to send.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// The bytes built by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Drop the last frame's bytes once they have been written.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Forget where the cursor was parked, so the next present places it
    /// again. Needed after anything that moves the real cursor behind the
    /// renderer's back (clear screen, resume).
    pub const fn forget_cursor(&mut self) {
        self.parked = None;
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cell::{Attr, Cell};

    struct Screen {
        front: Grid,
        back: Grid,
        renderer: Renderer,
    }

    impl Screen {
        fn new(w: u16, h: u16) -> Self {
            Self {
                front: Grid::new(w, h),
                back: Grid::new(w, h),
                renderer: Renderer::new(),
            }
        }

        fn present(&mut self, cursor: Option<(u16, u16)>) -> (RenderStats, String) {
            let stats = self.renderer.render(&mut self.front, &mut self.back, cursor);
            let out = String::from_utf8(self.renderer.output_bytes().to_vec()).unwrap();
            (stats, out)
        }

        fn put(&mut self, x: u16, y: u16, ch: char) {
            self.front.write(x, y, Cell::styled(ch, 7, 0, Attr::empty()));
        }
    }

    // ── First present ───────────────────────────────────────────────────

    #[test]
    fn first_present_draws_every_cell() {
        let mut screen = Screen::new(10, 5);
        let (stats, out) = screen.present(None);

        assert_eq!(stats.cells_rendered, 50);
        assert_eq!(stats.cells_skipped, 0);
        assert!(out.ends_with("\x1b[0m"));
        assert_eq!(screen.front.dirty_count(), 0);
        assert_eq!(screen.back.dirty_count(), 0);
    }

    #[test]
    fn first_present_moves_cursor_once_per_row() {
        let mut screen = Screen::new(4, 3);
        let (_, out) = screen.present(None);
        assert_eq!(out.matches('H').count(), 3);
    }

    // ── Idempotence ─────────────────────────────────────────────────────

    #[test]
    fn second_present_emits_nothing() {
        let mut screen = Screen::new(10, 5);
        screen.present(None);
        let (stats, out) = screen.present(None);
        assert_eq!(stats, RenderStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn idle_present_with_visible_cursor_is_silent() {
        let mut screen = Screen::new(10, 5);
        screen.present(Some((2, 2)));
        let (_, out) = screen.present(Some((2, 2)));
        assert!(out.is_empty());
    }

    // ── Minimality ──────────────────────────────────────────────────────

    #[test]
    fn single_change_emits_single_cell() {
        let mut screen = Screen::new(10, 5);
        screen.present(None);

        screen.put(7, 4, 'Z');
        let (stats, out) = screen.present(None);

        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(out, "\x1b[5;8H\x1b[38;5;7m\x1b[48;5;0mZ\x1b[0m");
    }

    #[test]
    fn output_independent_of_area() {
        let mut small = Screen::new(10, 5);
        let mut large = Screen::new(200, 60);
        small.present(None);
        large.present(None);

        for screen in [&mut small, &mut large] {
            screen.put(1, 1, 'a');
            screen.put(3, 2, 'b');
            screen.put(4, 2, 'c');
        }
        let (s1, o1) = small.present(None);
        let (s2, o2) = large.present(None);
        assert_eq!(s1.cells_rendered, 3);
        assert_eq!(o1, o2);
        assert_eq!(s1.bytes_written, s2.bytes_written);
    }

    #[test]
    fn reverted_write_emits_nothing() {
        let mut screen = Screen::new(5, 1);
        screen.present(None);

        screen.put(2, 0, 'q');
        screen.put(2, 0, ' ');
        let (stats, out) = screen.present(None);

        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 1);
        assert!(out.is_empty());
        assert_eq!(screen.front.dirty_count(), 0);
    }

    #[test]
    fn styled_cell_escapes() {
        let mut screen = Screen::new(3, 1);
        screen.present(None);
        screen
            .front
            .write(0, 0, Cell::styled('E', 196, 21, Attr::BOLD | Attr::UNDERLINE));

        let (_, out) = screen.present(None);
        assert_eq!(out, "\x1b[1;1H\x1b[1m\x1b[4m\x1b[38;5;196m\x1b[48;5;21mE\x1b[0m");
    }

    // ── Back grid invalidation ──────────────────────────────────────────

    #[test]
    fn unknown_back_forces_redraw_of_identical_cells() {
        let mut screen = Screen::new(6, 2);
        screen.present(None);

        screen.front.mark_all_dirty();
        screen.back.mark_all_dirty();
        let (stats, _) = screen.present(None);
        assert_eq!(stats.cells_rendered, 12);
    }

    #[test]
    fn dirty_front_over_known_back_is_skipped() {
        let mut screen = Screen::new(6, 2);
        screen.present(None);

        screen.front.mark_all_dirty();
        let (stats, out) = screen.present(None);
        assert_eq!(stats.cells_skipped, 12);
        assert!(out.is_empty());
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_parked_after_frame() {
        let mut screen = Screen::new(4, 1);
        let (_, out) = screen.present(Some((1, 0)));
        assert!(out.ends_with("\x1b[0m\x1b[1;2H"));
    }

    #[test]
    fn cursor_move_alone_repositions() {
        let mut screen = Screen::new(4, 2);
        screen.present(Some((0, 0)));
        let (_, out) = screen.present(Some((3, 1)));
        assert_eq!(out, "\x1b[2;4H");
    }

    #[test]
    fn hidden_cursor_not_positioned() {
        let mut screen = Screen::new(4, 1);
        screen.present(None);
        screen.put(0, 0, 'x');
        let (_, out) = screen.present(None);
        assert!(out.ends_with("x\x1b[0m"));
    }

    #[test]
    fn forget_cursor_forces_reposition() {
        let mut screen = Screen::new(4, 1);
        screen.present(Some((2, 0)));
        screen.renderer.forget_cursor();
        let (_, out) = screen.present(Some((2, 0)));
        assert_eq!(out, "\x1b[1;3H");
    }

    // ── Degenerate ──────────────────────────────────────────────────────

    #[test]
    fn zero_size_grid_produces_no_output() {
        let mut screen = Screen::new(0, 0);
        let (stats, out) = screen.present(None);
        assert_eq!(stats, RenderStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn render_stats_total() {
        let stats = RenderStats {
            cells_rendered: 10,
            cells_skipped: 40,
            bytes_written: 256,
        };
        assert_eq!(stats.total_cells(), 50);
    }
}
