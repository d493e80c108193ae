// SPDX-License-Identifier: MIT
//
// Session — one live terminal takeover.
//
// `Session::init` puts the terminal into raw mode, discovers its size,
// switches to the alternate screen, and starts the signal bridge. From then
// on the caller draws into the front grid (see `draw.rs`), calls `present`
// to flush differences, and polls for events. `close` (or dropping the
// session) undoes everything.
//
// The event loop model:
//
//   ┌─────────────────┐  Notification  ┌──────────────────────────────────┐
//   │ signal bridge   │ ─────────────► │ poll_event / poll_event_timeout  │
//   │ (SIGWINCH/CONT) │    channel     │  1. apply notifications          │
//   └─────────────────┘                │  2. pop queued event             │
//                                      │  3. wait + read + decode         │
//                                      └──────────────────────────────────┘
//
// Notifications are applied on the caller's thread at the start of every
// poll: a resize re-queries the size, reallocates both grids, and queues an
// `Event::Resize`; a continue runs `resume`. The bridge thread never touches
// session state.
//
// Exactly one session may be live per process. A process-wide flag enforces
// this and is released by `close` or drop.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::ansi::{self, CursorShape};
use crate::buffer::Grid;
use crate::cell::{Attr, Cell, DEFAULT_BG, DEFAULT_FG, Pen};
use crate::diff::{RenderStats, Renderer};
use crate::error::{Error, Result};
use crate::input::{self, Event, Key, KeyEvent, MAX_CHUNK};
use crate::platform::Platform;
use crate::signals::{Notification, SignalBridge};
use crate::terminal::{self, RawMode, Size, SizeQuery};

/// Set while a session is live.
static SESSION_LIVE: AtomicBool = AtomicBool::new(false);

/// How often a blocking poll wakes up to check for notifications.
const NOTIFY_TICK: Duration = Duration::from_millis(50);

// ─── Config ─────────────────────────────────────────────────────────────────

/// Session tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum queued synthetic events. Further events are dropped.
    pub queue_capacity: usize,
    /// After a lone ESC byte, how long to wait for the rest of an escape
    /// sequence before reporting the Escape key. Zero disables the wait.
    pub escape_delay: Duration,
    /// How long to wait for the terminal's reply to a position query.
    pub size_query_timeout: Duration,
    /// Let COLUMNS / LINES override the detected size.
    pub honor_env_size: bool,
    /// Listen for SIGWINCH / SIGCONT.
    pub install_signal_handlers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            escape_delay: Duration::from_millis(25),
            size_query_timeout: Duration::from_secs(1),
            honor_env_size: true,
            install_signal_handlers: true,
        }
    }
}

impl Config {
    const fn size_query(&self) -> SizeQuery {
        SizeQuery {
            honor_env: self.honor_env_size,
            timeout: self.size_query_timeout,
        }
    }
}

// ─── Cursor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    x: u16,
    y: u16,
    visible: bool,
    shape: CursorShape,
}

// ─── Session ────────────────────────────────────────────────────────────────

/// The live terminal: screen state, modes, and the event queue.
///
/// # Example
///
/// ```no_run
/// use tinybox::input::{Event, Key};
/// use tinybox::session::Session;
/// use tinybox::sys::UnixPlatform;
///
/// let mut term = Session::init(UnixPlatform::new())?;
/// term.print_at(2, 1, "press q to quit");
/// term.present()?;
/// loop {
///     if let Event::Key(k) = term.poll_event()? {
///         if k.key == Key::Char('q') {
///             break;
///         }
///     }
/// }
/// term.close()?;
/// # Ok::<(), tinybox::error::Error>(())
/// ```
pub struct Session<P: Platform> {
    platform: P,
    config: Config,
    mode: RawMode<P::Attributes>,
    raw: bool,
    closed: bool,

    size: Size,
    pub(crate) front: Grid,
    back: Grid,
    renderer: Renderer,
    pub(crate) pen: Pen,
    cursor: Cursor,
    saved: Option<Grid>,

    mouse: bool,
    paste: bool,
    escape_delay: Duration,

    queue: VecDeque<Event>,
    /// Bytes read after a lone ESC that did not complete a sequence.
    carry: Vec<u8>,
    notes: Receiver<Notification>,
    notifier: Sender<Notification>,
    bridge: Option<SignalBridge>,
}

impl<P: Platform> Session<P> {
    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Take over the terminal with the default [`Config`].
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyInitialized`] if another session is live,
    /// [`Error::Mode`] if raw mode cannot be entered (the terminal is left
    /// untouched), [`Error::Io`] if the setup sequence cannot be written.
    pub fn init(platform: P) -> Result<Self> {
        Self::init_with_config(platform, Config::default())
    }

    /// Take over the terminal with explicit settings.
    ///
    /// # Errors
    ///
    /// Same as [`init`](Self::init).
    pub fn init_with_config(platform: P, config: Config) -> Result<Self> {
        if SESSION_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInitialized);
        }
        Self::start(platform, config).inspect_err(|_| SESSION_LIVE.store(false, Ordering::Release))
    }

    fn start(mut platform: P, config: Config) -> Result<Self> {
        let mode = RawMode::enter(&mut platform)?;
        let size = terminal::query_size(&mut platform, config.size_query());

        let (notifier, notes) = mpsc::channel();
        let bridge = if config.install_signal_handlers {
            match SignalBridge::start(notifier.clone()) {
                Ok(bridge) => Some(bridge),
                Err(err) => {
                    let _ = mode.restore(&mut platform);
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        let mut setup = Vec::with_capacity(32);
        ansi::enter_alt_screen(&mut setup)?;
        ansi::cursor_hide(&mut setup)?;
        ansi::clear_screen(&mut setup)?;
        if let Err(err) = platform.write(&setup) {
            let _ = mode.restore(&mut platform);
            return Err(err.into());
        }

        debug!("session initialized at {}x{}", size.cols, size.rows);
        Ok(Self {
            platform,
            config,
            mode,
            raw: true,
            closed: false,
            size,
            front: Grid::new(size.cols, size.rows),
            back: Grid::new(size.cols, size.rows),
            renderer: Renderer::new(),
            pen: Pen::DEFAULT,
            cursor: Cursor {
                x: 0,
                y: 0,
                visible: false,
                shape: CursorShape::default(),
            },
            saved: None,
            mouse: false,
            paste: false,
            escape_delay: config.escape_delay,
            queue: VecDeque::with_capacity(config.queue_capacity),
            carry: Vec::with_capacity(MAX_CHUNK),
            notes,
            notifier,
            bridge,
        })
    }

    /// Restore the terminal and end the session.
    ///
    /// Every restorative step is attempted even if an earlier one fails;
    /// the session counts as closed either way.
    ///
    /// # Errors
    ///
    /// The first step that failed.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first = None;
        if self.mouse {
            keep_first(&mut first, "disable mouse", self.emit(|w| ansi::disable_mouse(w)));
            self.mouse = false;
        }
        if self.paste {
            keep_first(&mut first, "disable paste", self.emit(|w| ansi::disable_bracketed_paste(w)));
            self.paste = false;
        }
        if let Some(mut bridge) = self.bridge.take() {
            bridge.stop();
        }
        keep_first(&mut first, "show cursor", self.emit(|w| ansi::cursor_show(w)));
        keep_first(&mut first, "leave alternate screen", self.emit(|w| ansi::exit_alt_screen(w)));
        keep_first(&mut first, "reset attributes", self.emit(|w| ansi::reset(w)));
        if self.raw {
            keep_first(&mut first, "restore mode", self.mode.restore(&mut self.platform));
            self.raw = false;
        }
        self.platform.release();

        SESSION_LIVE.store(false, Ordering::Release);
        debug!("session closed");
        first.map_or(Ok(()), Err)
    }

    /// Hand the terminal back to the shell and stop the process (job
    /// control). Cooked mode and the normal screen are restored first.
    ///
    /// When the process is continued, the next poll runs [`resume`]
    /// (via SIGCONT); call it directly when signal handlers are off.
    ///
    /// # Errors
    ///
    /// [`Error::Mode`] if cooked mode cannot be restored, [`Error::Io`] if
    /// the restore sequence or the stop signal fails.
    ///
    /// [`resume`]: Self::resume
    pub fn suspend(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        debug!("suspending");
        self.mode.restore(&mut self.platform)?;
        self.raw = false;

        let (mouse, paste) = (self.mouse, self.paste);
        self.emit(|w| {
            if mouse {
                ansi::disable_mouse(w)?;
            }
            if paste {
                ansi::disable_bracketed_paste(w)?;
            }
            ansi::clear_screen(w)?;
            ansi::cursor_show(w)?;
            ansi::exit_alt_screen(w)
        })?;
        self.platform.stop_process()?;
        Ok(())
    }

    /// Take the terminal back after a stop: raw mode, alternate screen,
    /// reporting modes, cursor visibility. The screen is cleared and every
    /// cell of both grids marked dirty, so the next present redraws all of
    /// it. Dimensions and pen are untouched. A session that is not
    /// suspended is left alone.
    ///
    /// # Errors
    ///
    /// [`Error::Mode`] if raw mode cannot be re-entered, [`Error::Io`] if
    /// the setup sequence cannot be written.
    pub fn resume(&mut self) -> Result<()> {
        if self.closed || self.raw {
            return Ok(());
        }
        debug!("resuming");
        self.mode.reapply(&mut self.platform)?;
        self.raw = true;

        let (mouse, paste, visible) = (self.mouse, self.paste, self.cursor.visible);
        self.emit(|w| {
            ansi::enter_alt_screen(w)?;
            if mouse {
                ansi::enable_mouse(w)?;
            }
            if paste {
                ansi::enable_bracketed_paste(w)?;
            }
            if !visible {
                ansi::cursor_hide(w)?;
            }
            ansi::clear_screen(w)
        })?;

        self.front.mark_all_dirty();
        self.back.mark_all_dirty();
        self.renderer.forget_cursor();
        Ok(())
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Flush every change since the last present in a single write.
    ///
    /// A present with nothing changed writes nothing. If the write fails,
    /// the terminal's content is unknown: every cell of both grids is marked
    /// dirty so the next present repaints the whole screen.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn present(&mut self) -> Result<RenderStats> {
        let cursor = self
            .cursor
            .visible
            .then_some((self.cursor.x, self.cursor.y));
        let stats = self.renderer.render(&mut self.front, &mut self.back, cursor);
        if !self.renderer.has_output() {
            return Ok(stats);
        }

        trace!(
            "present: {} cells, {} bytes",
            stats.cells_rendered, stats.bytes_written
        );
        let written = self.platform.write(self.renderer.output_bytes());
        self.renderer.clear_output();
        if let Err(err) = written {
            warn!("present failed, full repaint pending: {err}");
            self.front.mark_all_dirty();
            self.back.mark_all_dirty();
            self.renderer.forget_cursor();
            return Err(err.into());
        }
        Ok(stats)
    }

    /// Reset the pen, blank the front grid, and forget what the terminal
    /// shows, so the next present repaints every cell.
    pub fn clear(&mut self) {
        self.pen = Pen::DEFAULT;
        self.front.fill_blank();
        self.back.mark_all_dirty();
        self.renderer.forget_cursor();
    }

    // ── Cells ───────────────────────────────────────────────────────────

    /// Write one cell with the pen's attributes. Out of bounds is a no-op.
    pub fn set_cell(&mut self, x: i32, y: i32, ch: char, fg: u8, bg: u8) {
        if let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) {
            self.front
                .write(x, y, Cell::styled(ch, fg, bg, self.pen.attrs));
        }
    }

    /// Glyph and colors at `(x, y)` in the front grid. Out of bounds reads
    /// as a default blank.
    #[must_use]
    pub fn get_cell(&self, x: i32, y: i32) -> (char, u8, u8) {
        self.cell(x, y)
            .map_or((' ', DEFAULT_FG, DEFAULT_BG), |c| (c.ch, c.fg, c.bg))
    }

    /// The full front-grid cell at `(x, y)`, if in bounds.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        self.front.get(x, y).copied()
    }

    /// Shift the front grid down (positive) or up (negative) by `lines`
    /// rows, blanking what scrolls in.
    pub fn scroll(&mut self, lines: i32) {
        self.front.scroll(lines);
    }

    /// Remember the current front grid (for overlays).
    pub fn save_buffer(&mut self) {
        self.saved = Some(self.front.clone());
    }

    /// Put back the grid saved by [`save_buffer`](Self::save_buffer),
    /// clipped to the current size. No-op if nothing was saved.
    pub fn restore_buffer(&mut self) {
        if let Some(saved) = &self.saved {
            self.front.copy_from(saved);
        }
    }

    // ── Pen ─────────────────────────────────────────────────────────────

    /// Set the pen colors used by the text and shape helpers.
    pub const fn set_color(&mut self, fg: u8, bg: u8) {
        self.pen.fg = fg;
        self.pen.bg = bg;
    }

    /// Set the attributes merged into every subsequent cell write.
    pub fn set_attr(&mut self, bold: bool, italic: bool, underline: bool, reverse: bool) {
        self.pen.attrs = Attr::from_bools(bold, italic, underline, reverse);
    }

    /// Back to white on black with no attributes.
    pub const fn reset_attr(&mut self) {
        self.pen = Pen::DEFAULT;
    }

    /// The current pen.
    #[must_use]
    pub const fn pen(&self) -> Pen {
        self.pen
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    /// Where to park the hardware cursor after each present.
    pub const fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    /// Show or hide the hardware cursor. Writes only on change.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible == self.cursor.visible {
            return Ok(());
        }
        self.cursor.visible = visible;
        if visible {
            self.emit(|w| ansi::cursor_show(w))
        } else {
            self.emit(|w| ansi::cursor_hide(w))
        }
    }

    /// Whether the hardware cursor is shown.
    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    /// Change the cursor shape.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn set_cursor_style(&mut self, shape: CursorShape) -> Result<()> {
        self.cursor.shape = shape;
        self.emit(|w| ansi::set_cursor_shape(w, shape))
    }

    /// The last shape set with [`set_cursor_style`](Self::set_cursor_style).
    #[must_use]
    pub const fn cursor_style(&self) -> CursorShape {
        self.cursor.shape
    }

    /// Ask the terminal to remember the cursor position.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn save_cursor(&mut self) -> Result<()> {
        self.emit(|w| ansi::cursor_save(w))
    }

    /// Return the cursor to the position saved by
    /// [`save_cursor`](Self::save_cursor).
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn restore_cursor(&mut self) -> Result<()> {
        self.emit(|w| ansi::cursor_restore(w))?;
        self.renderer.forget_cursor();
        Ok(())
    }

    /// Ask the terminal where its cursor is. 0-based `(x, y)`, or `(0, 0)`
    /// when the terminal does not answer in time.
    pub fn cursor_position(&mut self) -> (u16, u16) {
        if self.closed {
            return (0, 0);
        }
        if let Err(err) = self.emit(|w| ansi::query_cursor_position(w)) {
            debug!("cursor position query failed: {err}");
            return (0, 0);
        }
        match terminal::read_cursor_report(&mut self.platform, self.config.size_query_timeout) {
            Ok(Some((row, col))) => (col.saturating_sub(1), row.saturating_sub(1)),
            Ok(None) => (0, 0),
            Err(err) => {
                debug!("cursor position reply failed: {err}");
                (0, 0)
            }
        }
    }

    // ── Reporting modes ─────────────────────────────────────────────────

    /// Start mouse reporting. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn enable_mouse(&mut self) -> Result<()> {
        if self.mouse {
            return Ok(());
        }
        self.emit(|w| ansi::enable_mouse(w))?;
        self.mouse = true;
        debug!("mouse reporting on");
        Ok(())
    }

    /// Stop mouse reporting. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn disable_mouse(&mut self) -> Result<()> {
        if !self.mouse {
            return Ok(());
        }
        self.emit(|w| ansi::disable_mouse(w))?;
        self.mouse = false;
        debug!("mouse reporting off");
        Ok(())
    }

    /// Start bracketed paste. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn enable_bracketed_paste(&mut self) -> Result<()> {
        if self.paste {
            return Ok(());
        }
        self.emit(|w| ansi::enable_bracketed_paste(w))?;
        self.paste = true;
        debug!("bracketed paste on");
        Ok(())
    }

    /// Stop bracketed paste. Idempotent.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn disable_bracketed_paste(&mut self) -> Result<()> {
        if !self.paste {
            return Ok(());
        }
        self.emit(|w| ansi::disable_bracketed_paste(w))?;
        self.paste = false;
        debug!("bracketed paste off");
        Ok(())
    }

    /// Whether mouse reporting is on.
    #[must_use]
    pub const fn mouse_enabled(&self) -> bool {
        self.mouse
    }

    /// Whether bracketed paste is on.
    #[must_use]
    pub const fn bracketed_paste_enabled(&self) -> bool {
        self.paste
    }

    // ── Misc ────────────────────────────────────────────────────────────

    /// Ring the terminal bell.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the write fails.
    pub fn bell(&mut self) -> Result<()> {
        self.emit(|w| ansi::bell(w))
    }

    /// Throw away input that has arrived but not been read.
    ///
    /// # Errors
    ///
    /// [`Error::Input`] if the flush fails.
    pub fn flush_input(&mut self) -> Result<()> {
        self.platform.discard_input().map_err(Error::Input)
    }

    /// Whether the terminal is in raw mode.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// Current dimensions.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Current width in columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.cols
    }

    /// Current height in rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.size.rows
    }

    /// Change how long a lone ESC waits for the rest of a sequence.
    pub const fn set_escape_delay(&mut self, delay: Duration) {
        self.escape_delay = delay;
    }

    /// The current escape delay.
    #[must_use]
    pub const fn escape_delay(&self) -> Duration {
        self.escape_delay
    }

    /// A sender for injecting notifications, as the signal bridge does.
    #[must_use]
    pub fn notifier(&self) -> Sender<Notification> {
        self.notifier.clone()
    }

    /// Number of synthetic events waiting.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// The underlying platform.
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// The underlying platform, mutably.
    pub const fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Wait for the next event.
    ///
    /// Queued events come first; otherwise this blocks until input arrives,
    /// waking periodically to apply resize/continue notifications.
    ///
    /// # Errors
    ///
    /// [`Error::Input`] if reading fails or input reaches end of file.
    pub fn poll_event(&mut self) -> Result<Event> {
        loop {
            self.apply_notifications()?;
            if let Some(event) = self.queue.pop_front() {
                return Ok(event);
            }
            if !self.carry.is_empty() || self.platform.wait_readable(NOTIFY_TICK).map_err(Error::Input)? {
                return self.read_event(None);
            }
        }
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if nothing arrives in time, [`Error::Input`] if
    /// reading fails or input reaches end of file.
    pub fn poll_event_timeout(&mut self, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;
        loop {
            self.apply_notifications()?;
            if let Some(event) = self.queue.pop_front() {
                return Ok(event);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            if !self.carry.is_empty() || self.platform.wait_readable(remaining).map_err(Error::Input)? {
                return self.read_event(Some(deadline));
            }
        }
    }

    /// Read one chunk (held-back bytes first) and decode it.
    ///
    /// A lone ESC waits up to `escape_delay`, never past `deadline`, for one
    /// more read. The two are decoded together only when they form a known
    /// sequence; otherwise the ESC is reported alone and the extra bytes are
    /// held back for the next poll.
    fn read_event(&mut self, deadline: Option<Instant>) -> Result<Event> {
        let mut buf = [0u8; MAX_CHUNK];
        let len = if self.carry.is_empty() {
            self.read_some(&mut buf)?
        } else {
            let n = self.carry.len().min(MAX_CHUNK);
            buf[..n].copy_from_slice(&self.carry[..n]);
            self.carry.drain(..n);
            n
        };

        let delay = deadline.map_or(self.escape_delay, |d| {
            self.escape_delay.min(d.saturating_duration_since(Instant::now()))
        });
        if len == 1
            && buf[0] == 0x1B
            && !delay.is_zero()
            && self.platform.wait_readable(delay).map_err(Error::Input)?
        {
            let extra = self.read_some(&mut buf[1..])?;
            let joined = input::decode(&buf[..=extra]);
            if joined != Event::Key(KeyEvent::new(Key::Escape)) {
                return Ok(joined);
            }
            self.carry.extend_from_slice(&buf[1..=extra]);
        }
        Ok(input::decode(&buf[..len]))
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.platform.read(buf).map_err(Error::Input)? {
            0 => Err(Error::Input(io::ErrorKind::UnexpectedEof.into())),
            n => Ok(n),
        }
    }

    fn apply_notifications(&mut self) -> Result<()> {
        while let Ok(note) = self.notes.try_recv() {
            match note {
                Notification::Resize => self.handle_resize(),
                Notification::Continue => self.resume()?,
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self) {
        let size = terminal::query_size(&mut self.platform, self.config.size_query());
        if size == self.size {
            return;
        }
        debug!(
            "resize {}x{} -> {}x{}",
            self.size.cols, self.size.rows, size.cols, size.rows
        );
        self.size = size;
        self.front.resize(size.cols, size.rows);
        self.back.resize(size.cols, size.rows);
        self.renderer.forget_cursor();
        self.enqueue(Event::Resize(size));
    }

    fn enqueue(&mut self, event: Event) {
        if self.queue.len() >= self.config.queue_capacity {
            debug!("event queue full, dropping {event:?}");
            return;
        }
        self.queue.push_back(event);
    }

    /// Build a control sequence and write it immediately.
    fn emit(&mut self, build: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Result<()> {
        let mut seq = Vec::with_capacity(32);
        build(&mut seq)?;
        self.platform.write(&seq)?;
        Ok(())
    }
}

impl<P: Platform> Drop for Session<P> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!("terminal restore on drop failed: {err}");
        }
    }
}

/// Record `result`'s error if it is the first, logging every failure.
fn keep_first(first: &mut Option<Error>, step: &str, result: Result<()>) {
    if let Err(err) = result {
        warn!("close: {step} failed: {err}");
        first.get_or_insert(err);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
