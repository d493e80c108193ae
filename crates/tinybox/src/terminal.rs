// SPDX-License-Identifier: MIT
//
// Mode controller — raw mode snapshots and terminal size discovery.
//
// Raw mode is entered by snapshotting the current attributes, deriving raw
// attributes from the snapshot, and applying them. The snapshot is what gets
// reinstalled on exit, suspend, and close, so the shell always gets back the
// exact mode it handed over.
//
// Size discovery walks three tiers and never fails:
//
//   1. COLUMNS / LINES from the environment, when both are positive.
//   2. The device's window-size query.
//   3. A self-query: park the cursor at the far corner (`ESC[999;999H`),
//      ask where it ended up (`ESC[6n`), and parse the `ESC[row;colR`
//      reply. Some virtual terminals answer this but not the ioctl.
//
// If all three fail the answer is 80×24, with a warning in the log.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::platform::Platform;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Used when every discovery tier fails.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Construct from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::FALLBACK
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// The attribute snapshot taken on entering raw mode.
///
/// Holding one means raw mode was applied; [`restore`](Self::restore) puts
/// the snapshot back and may be called any number of times.
#[derive(Debug, Clone)]
pub struct RawMode<A> {
    original: A,
}

impl<A: Clone> RawMode<A> {
    /// Snapshot the current attributes and switch to raw mode.
    ///
    /// # Errors
    ///
    /// [`Error::Mode`] if the attributes cannot be fetched or applied. On
    /// error the terminal has not been changed.
    pub fn enter<P: Platform<Attributes = A>>(platform: &mut P) -> Result<Self> {
        let original = platform.get_attributes().map_err(Error::Mode)?;
        let raw = platform.make_raw(&original);
        platform.set_attributes(&raw).map_err(Error::Mode)?;
        Ok(Self { original })
    }

    /// Re-apply raw mode derived from the original snapshot (after resume).
    ///
    /// # Errors
    ///
    /// [`Error::Mode`] if the attributes cannot be applied.
    pub fn reapply<P: Platform<Attributes = A>>(&self, platform: &mut P) -> Result<()> {
        let raw = platform.make_raw(&self.original);
        platform.set_attributes(&raw).map_err(Error::Mode)
    }

    /// Reinstall the original snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::Mode`] if the attributes cannot be applied.
    pub fn restore<P: Platform<Attributes = A>>(&self, platform: &mut P) -> Result<()> {
        platform.set_attributes(&self.original).map_err(Error::Mode)
    }
}

// ─── Size Discovery ─────────────────────────────────────────────────────────

/// Knobs for [`query_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeQuery {
    /// Consult COLUMNS / LINES first.
    pub honor_env: bool,
    /// How long to wait for the self-query reply.
    pub timeout: Duration,
}

impl Default for SizeQuery {
    fn default() -> Self {
        Self {
            honor_env: true,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Discover the terminal size. Never fails; see the module docs for the
/// tier order.
pub fn query_size<P: Platform>(platform: &mut P, query: SizeQuery) -> Size {
    if query.honor_env {
        let cols = std::env::var("COLUMNS").ok();
        let lines = std::env::var("LINES").ok();
        if let Some(size) = size_from_env(cols.as_deref(), lines.as_deref()) {
            debug!("size {}x{} from environment", size.cols, size.rows);
            return size;
        }
    }

    match platform.window_size() {
        Ok(size) if size.cols > 0 && size.rows > 0 => return size,
        Ok(_) => debug!("window size query reported zero"),
        Err(err) => debug!("window size query failed: {err}"),
    }

    match self_query(platform, query.timeout) {
        Ok(size) => size,
        Err(err) => {
            warn!("{err}; assuming {}x{}", Size::FALLBACK.cols, Size::FALLBACK.rows);
            Size::FALLBACK
        }
    }
}

/// Parse the COLUMNS / LINES override. Both must be positive integers.
#[must_use]
pub fn size_from_env(cols: Option<&str>, lines: Option<&str>) -> Option<Size> {
    let cols: u16 = cols?.trim().parse().ok()?;
    let rows: u16 = lines?.trim().parse().ok()?;
    (cols > 0 && rows > 0).then_some(Size { cols, rows })
}

/// Ask the terminal where a cursor parked at the far corner ended up.
fn self_query<P: Platform>(platform: &mut P, timeout: Duration) -> Result<Size> {
    platform
        .write(b"\x1b[999;999H\x1b[6n")
        .map_err(|e| Error::SizeQuery(format!("self-query write failed: {e}")))?;

    let (row, col) = read_cursor_report(platform, timeout)?
        .ok_or_else(|| Error::SizeQuery("no cursor position reply".into()))?;

    if row == 0 || col == 0 {
        return Err(Error::SizeQuery(format!("nonsensical reply {row};{col}")));
    }
    Ok(Size { cols: col, rows: row })
}

/// Collect a cursor-position reply within `timeout`.
///
/// Returns `(row, col)` as reported (1-based), or `None` if the deadline
/// passes first.
///
/// # Errors
///
/// [`Error::Input`] if waiting or reading fails.
pub fn read_cursor_report<P: Platform>(platform: &mut P, timeout: Duration) -> Result<Option<(u16, u16)>> {
    let deadline = Instant::now() + timeout;
    let mut reply = [0u8; 64];
    let mut len = 0;

    while len < reply.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !platform.wait_readable(remaining).map_err(Error::Input)? {
            break;
        }
        let n = platform.read(&mut reply[len..]).map_err(Error::Input)?;
        if n == 0 {
            break;
        }
        len += n;
        if let Some(pos) = parse_cursor_report(&reply[..len]) {
            return Ok(Some(pos));
        }
    }
    Ok(parse_cursor_report(&reply[..len]))
}

/// Find an `ESC [ row ; col R` reply in `buf`. Returns `(row, col)`.
///
/// Anything before the reply (keystrokes typed meanwhile) is skipped.
#[must_use]
pub fn parse_cursor_report(buf: &[u8]) -> Option<(u16, u16)> {
    let mut rest = buf;
    while let Some(start) = rest.windows(2).position(|w| w == b"\x1b[") {
        rest = &rest[start + 2..];
        if let Some(pos) = parse_row_col(rest) {
            return Some(pos);
        }
    }
    None
}

fn parse_row_col(body: &[u8]) -> Option<(u16, u16)> {
    let (row, rest) = split_number(body)?;
    let rest = rest.strip_prefix(b";")?;
    let (col, rest) = split_number(rest)?;
    (rest.first() == Some(&b'R')).then_some((row, col))
}

fn split_number(buf: &[u8]) -> Option<(u16, &[u8])> {
    let digits = buf.iter().take_while(|b| b.is_ascii_digit()).count();
    let value = std::str::from_utf8(&buf[..digits]).ok()?.parse().ok()?;
    Some((value, &buf[digits..]))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::MockPlatform;

    fn no_env(timeout_ms: u64) -> SizeQuery {
        SizeQuery {
            honor_env: false,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    // ── Size ────────────────────────────────────────────────────────────

    #[test]
    fn size_default_is_fallback() {
        assert_eq!(Size::default(), Size::FALLBACK);
        assert_eq!(Size::FALLBACK, Size::new(80, 24));
    }

    // ── Environment override ────────────────────────────────────────────

    #[test]
    fn env_requires_both_positive() {
        assert_eq!(size_from_env(Some("120"), Some("40")), Some(Size::new(120, 40)));
        assert_eq!(size_from_env(Some(" 90 "), Some("30\n")), Some(Size::new(90, 30)));
        assert_eq!(size_from_env(Some("120"), None), None);
        assert_eq!(size_from_env(None, Some("40")), None);
        assert_eq!(size_from_env(Some("0"), Some("40")), None);
        assert_eq!(size_from_env(Some("-5"), Some("40")), None);
        assert_eq!(size_from_env(Some("wide"), Some("40")), None);
    }

    // ── Cursor report parsing ───────────────────────────────────────────

    #[test]
    fn parse_report() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80R"), Some((24, 80)));
        assert_eq!(parse_cursor_report(b"ab\x1b[3;7R"), Some((3, 7)));
        assert_eq!(parse_cursor_report(b"\x1b[A\x1b[3;7R"), Some((3, 7)));
        assert_eq!(parse_cursor_report(b"\x1b[24;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[;80R"), None);
        assert_eq!(parse_cursor_report(b""), None);
    }

    // ── Tiers ───────────────────────────────────────────────────────────

    #[test]
    fn ioctl_tier_wins() {
        let mut p = MockPlatform::new(Size::new(132, 43));
        assert_eq!(query_size(&mut p, no_env(10)), Size::new(132, 43));
        assert!(p.written().is_empty());
    }

    #[test]
    fn self_query_tier() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        p.fail_window_size();
        p.push_input(b"\x1b[50;100R");

        assert_eq!(query_size(&mut p, no_env(10)), Size::new(100, 50));
        assert_eq!(p.written(), b"\x1b[999;999H\x1b[6n");
    }

    #[test]
    fn self_query_reply_split_across_reads() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        p.fail_window_size();
        p.push_input(b"\x1b[50;");
        p.push_input(b"100R");
        assert_eq!(query_size(&mut p, no_env(10)), Size::new(100, 50));
    }

    #[test]
    fn everything_fails_falls_back() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        p.fail_window_size();
        assert_eq!(query_size(&mut p, no_env(1)), Size::FALLBACK);
    }

    #[test]
    fn zero_reply_falls_back() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        p.fail_window_size();
        p.push_input(b"\x1b[0;0R");
        assert_eq!(query_size(&mut p, no_env(10)), Size::FALLBACK);
    }

    // ── Raw mode ────────────────────────────────────────────────────────

    #[test]
    fn raw_mode_snapshot_and_restore() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        let raw = RawMode::enter(&mut p).unwrap();
        assert!(p.is_raw());

        raw.restore(&mut p).unwrap();
        assert!(!p.is_raw());

        raw.reapply(&mut p).unwrap();
        assert!(p.is_raw());
    }

    #[test]
    fn raw_mode_fails_without_terminal() {
        let mut p = MockPlatform::new(Size::new(80, 24));
        p.not_a_terminal();
        let err = RawMode::enter(&mut p).unwrap_err();
        assert!(matches!(err, Error::Mode(_)));
        assert!(!p.is_raw());
    }
}
