// SPDX-License-Identifier: MIT
//
// tinybox — minimal terminal control.
//
// Takes over a character terminal (raw mode, alternate screen), keeps a
// grid of styled cells in memory, and sends only what changed since the last
// frame. Keyboard, mouse, and paste input comes back as decoded events, with
// window resizes and job-control continues folded into the same stream.
//
// Layering, bottom up:
//
//   ansi, input         escape sequences out, byte chunks in
//   cell, buffer        styled cells and the grids that hold them
//   output, diff        stateful cell emission and the front/back diff
//   platform, sys       termios / ioctl / poll behind a trait
//   terminal, signals   raw mode guard, size discovery, SIGWINCH/SIGCONT
//   session, draw       the live session and its drawing helpers
//
// No TUI framework underneath: every byte sent to the terminal is built
// here, and the only OS calls live in `sys`.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod draw;
pub mod error;
pub mod input;
pub mod output;
pub mod platform;
pub mod session;
pub mod signals;
#[cfg(unix)]
pub mod sys;
pub mod terminal;

#[cfg(test)]
mod testing;

pub use ansi::CursorShape;
pub use cell::{Attr, Cell, Pen};
pub use error::{Error, Result};
pub use input::{Event, Key, KeyEvent, Modifiers, MouseButton, MouseEvent, PasteMarker};
pub use session::{Config, Session};
pub use terminal::Size;
