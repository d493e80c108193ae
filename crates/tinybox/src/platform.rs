// SPDX-License-Identifier: MIT
//
// Platform seam — everything the engine needs from the operating system.
//
// The session, the mode controller, and the size query only talk to the
// terminal through this trait. `sys::UnixPlatform` implements it over libc
// for stdin/stdout; tests substitute a scripted double. The engine itself
// never branches on the target platform.

use std::io;
use std::time::Duration;

use crate::terminal::Size;

/// Operating-system services for one controlling terminal.
pub trait Platform {
    /// Saved terminal attributes (termios on Unix).
    type Attributes: Clone;

    /// Fetch the current terminal attributes.
    ///
    /// # Errors
    ///
    /// Fails when the input descriptor is not a terminal.
    fn get_attributes(&mut self) -> io::Result<Self::Attributes>;

    /// Apply terminal attributes immediately.
    ///
    /// # Errors
    ///
    /// Fails when the attributes cannot be applied.
    fn set_attributes(&mut self, attrs: &Self::Attributes) -> io::Result<()>;

    /// Derive raw-mode attributes from a snapshot: no echo, no canonical
    /// input, no signal keys, no extended input, no input translation or
    /// flow control, no output processing, 8-bit characters, reads that
    /// return after one byte.
    fn make_raw(&self, attrs: &Self::Attributes) -> Self::Attributes;

    /// Ask the device for its window size.
    ///
    /// # Errors
    ///
    /// Fails when the device does not support the query or reports zero.
    fn window_size(&mut self) -> io::Result<Size>;

    /// Wait until input is readable or `timeout` elapses. Returns whether
    /// input is ready.
    ///
    /// # Errors
    ///
    /// Fails when the wait itself fails.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read available input bytes, blocking until at least one arrives.
    /// Zero means end of file.
    ///
    /// # Errors
    ///
    /// Fails when the read fails.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write every byte to the output descriptor.
    ///
    /// # Errors
    ///
    /// Fails when the write fails.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Drop pending, unread input.
    ///
    /// # Errors
    ///
    /// Fails when the flush fails.
    fn discard_input(&mut self) -> io::Result<()>;

    /// Stop the running process (job control). Returns after it has been
    /// continued.
    ///
    /// # Errors
    ///
    /// Fails when the signal cannot be sent.
    fn stop_process(&mut self) -> io::Result<()>;

    /// The session has given the terminal back for good. Platforms that
    /// keep state for emergency restores drop it here.
    fn release(&mut self) {}
}
