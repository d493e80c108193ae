// SPDX-License-Identifier: MIT
//
// Scripted platform for unit tests.
//
// Records every byte written, serves input from a queue of chunks (one
// chunk per read), and lets a test break individual services. Input is
// readable when a chunk is queued or end of file was scripted; otherwise a
// wait sleeps for its full timeout, as the real one would.

use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::platform::Platform;
use crate::session::Config;
use crate::terminal::Size;

/// Only one session may be live per process; tests that create one hold
/// this lock for the session's lifetime.
static SESSION_LOCK: Mutex<()> = Mutex::new(());

pub fn session_lock() -> MutexGuard<'static, ()> {
    SESSION_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// No signal handlers, no environment override, short self-query.
pub fn test_config() -> Config {
    Config {
        install_signal_handlers: false,
        honor_env_size: false,
        size_query_timeout: Duration::from_millis(5),
        ..Config::default()
    }
}

/// Terminal attributes as the mock sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MockAttributes {
    pub raw: bool,
}

#[derive(Debug)]
pub struct MockPlatform {
    attrs: MockAttributes,
    tty: bool,
    size: Size,
    size_ok: bool,
    input: VecDeque<Vec<u8>>,
    output: Vec<u8>,
    eof: bool,
    writes_ok: bool,
    pub stops: usize,
    /// Raw flag and bytes written at the moment of the last stop.
    pub at_stop: Option<(bool, usize)>,
    pub releases: usize,
    pub discards: usize,
    pub waits: usize,
}

impl MockPlatform {
    pub fn new(size: Size) -> Self {
        Self {
            attrs: MockAttributes::default(),
            tty: true,
            size,
            size_ok: true,
            input: VecDeque::new(),
            output: Vec::new(),
            eof: false,
            writes_ok: true,
            stops: 0,
            at_stop: None,
            releases: 0,
            discards: 0,
            waits: 0,
        }
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Queue one read's worth of input.
    pub fn push_input(&mut self, chunk: &[u8]) {
        self.input.push_back(chunk.to_vec());
    }

    /// Once queued input runs out, reads return zero bytes.
    pub const fn end_of_input(&mut self) {
        self.eof = true;
    }

    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub const fn fail_window_size(&mut self) {
        self.size_ok = false;
    }

    pub const fn not_a_terminal(&mut self) {
        self.tty = false;
    }

    /// Make every write fail (or succeed again).
    pub const fn fail_writes(&mut self, fail: bool) {
        self.writes_ok = !fail;
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn written(&self) -> &[u8] {
        &self.output
    }

    pub fn written_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Return and forget everything written so far.
    pub fn take_written(&mut self) -> String {
        let out = self.written_str();
        self.output.clear();
        out
    }

    pub const fn is_raw(&self) -> bool {
        self.attrs.raw
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl Platform for MockPlatform {
    type Attributes = MockAttributes;

    fn get_attributes(&mut self) -> io::Result<MockAttributes> {
        if self.tty {
            Ok(self.attrs)
        } else {
            Err(io::Error::other("not a terminal"))
        }
    }

    fn set_attributes(&mut self, attrs: &MockAttributes) -> io::Result<()> {
        if !self.tty {
            return Err(io::Error::other("not a terminal"));
        }
        self.attrs = *attrs;
        Ok(())
    }

    fn make_raw(&self, attrs: &MockAttributes) -> MockAttributes {
        MockAttributes { raw: true, ..*attrs }
    }

    fn window_size(&mut self) -> io::Result<Size> {
        if self.size_ok {
            Ok(self.size)
        } else {
            Err(io::Error::other("no window size"))
        }
    }

    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        self.waits += 1;
        if self.input.is_empty() && !self.eof {
            thread::sleep(timeout);
            return Ok(false);
        }
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.input.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunk.drain(..n);
            self.input.push_front(chunk);
        }
        Ok(n)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.writes_ok {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.input.clear();
        self.discards += 1;
        Ok(())
    }

    fn stop_process(&mut self) -> io::Result<()> {
        self.stops += 1;
        self.at_stop = Some((self.attrs.raw, self.output.len()));
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}
