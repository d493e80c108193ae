// SPDX-License-Identifier: MIT
//
// Error taxonomy for session, mode, and input failures.
//
// Drawing never fails, and decode ambiguity never surfaces here: the
// decoder always produces a best-effort event. What remains are the
// failures a caller can actually act on (retry, degrade, abort).

use std::io;

use thiserror::Error;

/// Errors returned by session, mode, and polling operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal attributes could not be fetched or applied (not a TTY,
    /// or insufficient permission).
    #[error("terminal mode change failed: {0}")]
    Mode(#[source] io::Error),

    /// Every size-discovery tier failed. Callers normally never see this:
    /// size discovery degrades to 80×24 and only logs it.
    #[error("terminal size query failed: {0}")]
    SizeQuery(String),

    /// Reading the input descriptor failed, or it reached end of file.
    #[error("input read failed: {0}")]
    Input(#[source] io::Error),

    /// A bounded wait elapsed with no input available.
    #[error("timed out waiting for input")]
    Timeout,

    /// `Session::init` was called while another session is still live.
    #[error("terminal session already initialized")]
    AlreadyInitialized,

    /// Writing to the output descriptor failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this is the expected "nothing arrived" outcome of
    /// [`Session::poll_event_timeout`](crate::session::Session::poll_event_timeout).
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
