// SPDX-License-Identifier: MIT
//
// tinybox drag demo — move a box around with the mouse.
//
// Exercises the whole loop: init → draw → present → poll → close. Only the
// cells the box leaves and enters are rewritten each frame. Resize the
// window and the box stays on screen; Ctrl-Z suspends to the shell.
//
// Usage:
//   RUST_LOG=debug cargo run -p tinybox --example drag 2>drag.log

use std::process::ExitCode;

use log::error;
use tinybox::sys::UnixPlatform;
use tinybox::{Event, Key, MouseButton, MouseEvent, Session};

const BOX_W: i32 = 18;
const BOX_H: i32 = 7;
const LABEL: &str = "drag me";

/// Box position and, while dragging, where inside the box it was grabbed.
struct Drag {
    x: i32,
    y: i32,
    grab: Option<(i32, i32)>,
}

impl Drag {
    const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + BOX_W && y >= self.y && y < self.y + BOX_H
    }

    /// Keep the box fully on a `w`×`h` screen where possible.
    fn bound(&mut self, w: u16, h: u16) {
        let max_x = (i32::from(w) - BOX_W).max(0);
        let max_y = (i32::from(h) - BOX_H).max(0);
        self.x = self.x.clamp(0, max_x);
        self.y = self.y.clamp(0, max_y);
    }

    fn on_mouse(&mut self, m: MouseEvent, w: u16, h: u16) {
        if m.button != MouseButton::Left {
            return;
        }
        let (mx, my) = (i32::from(m.x), i32::from(m.y));
        if !m.press {
            self.grab = None;
            return;
        }
        if self.grab.is_none() && self.contains(mx, my) {
            self.grab = Some((mx - self.x, my - self.y));
        }
        if let Some((gx, gy)) = self.grab {
            self.x = mx - gx;
            self.y = my - gy;
            self.bound(w, h);
        }
    }
}

fn draw(term: &mut Session<UnixPlatform>, d: &Drag) -> tinybox::Result<()> {
    let (w, h) = (i32::from(term.width()), i32::from(term.height()));
    term.reset_attr();
    term.clear_region(0, 0, w, h);

    term.draw_text_left(0, "tinybox mouse demo", 14, 0);
    term.draw_text_right(0, "esc/q to quit", 8, 0);
    term.draw_text_left(2, "Drag the box with the left mouse button", 15, 0);

    term.set_color(13, 0);
    if d.grab.is_some() {
        term.set_attr(true, false, false, false);
    }
    term.draw_box(d.x, d.y, BOX_W, BOX_H);
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let label_w = LABEL.len() as i32;
    term.print_at(d.x + (BOX_W - label_w) / 2, d.y + BOX_H / 2, LABEL);

    term.present()?;
    Ok(())
}

fn run(term: &mut Session<UnixPlatform>) -> tinybox::Result<()> {
    term.enable_mouse()?;

    let mut d = Drag { x: 6, y: 4, grab: None };
    loop {
        draw(term, &d)?;
        match term.poll_event()? {
            Event::Key(k) => match k.key {
                Key::CtrlC | Key::Escape | Key::Char('q' | 'Q') => return Ok(()),
                Key::Char('\u{1a}') => {
                    term.suspend()?;
                    term.resume()?;
                }
                _ => {}
            },
            Event::Mouse(m) => d.on_mouse(m, term.width(), term.height()),
            Event::Resize(size) => d.bound(size.cols, size.rows),
            Event::Paste(_) => {}
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut term = match Session::init(UnixPlatform::new()) {
        Ok(term) => term,
        Err(err) => {
            error!("init failed: {err}");
            eprintln!("tinybox: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut term);
    let closed = term.close();
    if let Err(err) = result.and(closed) {
        eprintln!("tinybox: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
