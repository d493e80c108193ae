// SPDX-License-Identifier: MIT
//
// Signal bridge — turns SIGWINCH and SIGCONT into channel messages.
//
// A dedicated thread blocks on a signal-hook iterator and forwards each
// delivery as a `Notification`. It touches no terminal state and performs no
// I/O: the session drains the channel at the start of every poll and does
// the actual work (re-query size, reallocate grids, resume) on the caller's
// thread.
//
// Shutdown: closing the iterator's handle wakes the thread, which then
// exits its loop; `stop` joins it. Dropping the bridge does the same.

/// Something the operating system told us between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The window size changed (SIGWINCH).
    Resize,
    /// The process was continued after a stop (SIGCONT).
    Continue,
}

#[cfg(unix)]
pub use unix::SignalBridge;

#[cfg(not(unix))]
pub use fallback::SignalBridge;

#[cfg(unix)]
mod unix {
    use std::io;
    use std::sync::mpsc::Sender;
    use std::thread::{self, JoinHandle};

    use log::debug;
    use signal_hook::consts::signal::{SIGCONT, SIGWINCH};
    use signal_hook::iterator::{Handle, Signals};

    use super::Notification;

    /// Background listener forwarding resize/continue notifications.
    pub struct SignalBridge {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
    }

    impl SignalBridge {
        /// Register for SIGWINCH and SIGCONT and start forwarding them.
        ///
        /// # Errors
        ///
        /// Fails if the handlers cannot be registered or the thread cannot
        /// be spawned.
        pub fn start(tx: Sender<Notification>) -> io::Result<Self> {
            let mut signals = Signals::new([SIGWINCH, SIGCONT])?;
            let handle = signals.handle();

            let thread = thread::Builder::new()
                .name("tinybox-signals".into())
                .spawn(move || {
                    for signal in signals.forever() {
                        let note = match signal {
                            SIGWINCH => Notification::Resize,
                            SIGCONT => Notification::Continue,
                            _ => continue,
                        };
                        if tx.send(note).is_err() {
                            break;
                        }
                    }
                })?;

            debug!("signal bridge started");
            Ok(Self {
                handle,
                thread: Some(thread),
            })
        }

        /// Unregister and join the listener thread. Idempotent.
        pub fn stop(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
                debug!("signal bridge stopped");
            }
        }
    }

    impl Drop for SignalBridge {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

#[cfg(not(unix))]
mod fallback {
    use std::io;
    use std::sync::mpsc::Sender;

    use super::Notification;

    /// No job control or window signals on this target.
    pub struct SignalBridge;

    impl SignalBridge {
        /// Nothing to register.
        ///
        /// # Errors
        ///
        /// Never fails.
        pub fn start(_tx: Sender<Notification>) -> io::Result<Self> {
            Ok(Self)
        }

        /// Nothing to stop.
        pub const fn stop(&mut self) {}
    }
}
