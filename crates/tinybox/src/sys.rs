// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Unix platform — termios, ioctl, poll, and raw fd I/O over libc.
//
// Safety: this module is the only place that calls into libc. Every unsafe
// block wraps one POSIX call on a descriptor we own for the life of the
// process (stdin, stdout) with pointers to live stack values.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built restore
// sequence straight to fd 1, then reinstalls the attributes saved by the last
// `get_attributes`. A panic mid-frame (with the lock held) still leaves the
// user with a working shell and a readable panic message. The hook is armed
// only between `get_attributes` and `release`; outside a session it does
// nothing.

use std::io;
use std::os::unix::io::RawFd;
use std::sync::{Mutex, Once};
use std::time::Duration;

use crate::platform::Platform;
use crate::terminal::Size;

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Attributes captured by the last `get_attributes`, for the panic hook.
/// `None` while no session holds the terminal.
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Mouse off (all four modes), paste off, SGR reset, cursor shown, then
/// leave the alternate screen last so the shell's content reappears clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?1006l\x1b[?1015l\x1b[?1002l\x1b[?1000l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            original(info);
        }));
    });
}

fn emergency_restore() {
    let Some(original) = saved_attributes() else {
        return;
    };
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
        let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const original);
    }
}

fn saved_attributes() -> Option<libc::termios> {
    TERMIOS_BACKUP.lock().ok().and_then(|guard| *guard)
}

// ─── UnixPlatform ───────────────────────────────────────────────────────────

/// [`Platform`] over the process's stdin and stdout.
///
/// Creating one installs the terminal-restoring panic hook (once per
/// process).
#[derive(Debug)]
pub struct UnixPlatform {
    input: RawFd,
    output: RawFd,
}

impl UnixPlatform {
    /// Use stdin for input and stdout for output.
    #[must_use]
    pub fn new() -> Self {
        install_panic_hook();
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
        }
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a libc `-1` return into the thread's last OS error.
fn check(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl Platform for UnixPlatform {
    type Attributes = libc::termios;

    fn get_attributes(&mut self) -> io::Result<libc::termios> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        check(unsafe { libc::tcgetattr(self.input, &raw mut termios) })?;
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(termios);
        }
        Ok(termios)
    }

    fn set_attributes(&mut self, attrs: &libc::termios) -> io::Result<()> {
        check(unsafe { libc::tcsetattr(self.input, libc::TCSAFLUSH, attrs) })
    }

    fn make_raw(&self, attrs: &libc::termios) -> libc::termios {
        let mut raw = *attrs;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag &= !libc::CSIZE;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;
        raw
    }

    fn window_size(&mut self) -> io::Result<Size> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        check(unsafe { libc::ioctl(self.output, libc::TIOCGWINSZ, &raw mut ws) })?;
        if ws.ws_col == 0 || ws.ws_row == 0 {
            return Err(io::Error::other("window size reported as zero"));
        }
        Ok(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    }

    /// An interrupted wait (a signal arrived) reports "not ready" so the
    /// caller gets a chance to drain notifications.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
        let mut pfd = libc::pollfd {
            fd: self.input,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, millis) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            };
        }
        Ok(ready > 0)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = unsafe { libc::read(self.input, buf.as_mut_ptr().cast(), buf.len()) };
            if n >= 0 {
                #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = unsafe { libc::write(self.output, rest.as_ptr().cast(), rest.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if n == 0 {
                return Err(io::ErrorKind::WriteZero.into());
            }
            #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
            let written = n as usize;
            rest = &rest[written..];
        }
        Ok(())
    }

    fn discard_input(&mut self) -> io::Result<()> {
        check(unsafe { libc::tcflush(self.input, libc::TCIFLUSH) })
    }

    fn stop_process(&mut self) -> io::Result<()> {
        check(unsafe { libc::raise(libc::SIGTSTP) })
    }

    fn release(&mut self) {
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_raw_clears_line_discipline() {
        let platform = UnixPlatform::new();
        let mut cooked: libc::termios = unsafe { std::mem::zeroed() };
        cooked.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;
        cooked.c_iflag = libc::ICRNL | libc::IXON;
        cooked.c_oflag = libc::OPOST;

        let raw = platform.make_raw(&cooked);
        assert_eq!(raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN), 0);
        assert_eq!(raw.c_iflag & (libc::ICRNL | libc::IXON), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, 0);
        assert_eq!(raw.c_cflag & libc::CSIZE, libc::CS8);
        assert_eq!(raw.c_cc[libc::VMIN], 1);
        assert_eq!(raw.c_cc[libc::VTIME], 0);
    }

    #[test]
    fn release_disarms_emergency_restore() {
        let mut platform = UnixPlatform::new();
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(unsafe { std::mem::zeroed() });
        }
        assert!(saved_attributes().is_some());

        platform.release();
        assert!(saved_attributes().is_none());
        // Disarmed: returns without touching the terminal.
        emergency_restore();
    }

    #[test]
    fn emergency_restore_exits_alt_screen_last() {
        assert!(EMERGENCY_RESTORE.ends_with(b"\x1b[?1049l"));
        let text = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(text.contains("\x1b[?25h"));
        assert!(text.contains("\x1b[?1000l"));
        assert!(text.contains("\x1b[?2004l"));
    }
}
