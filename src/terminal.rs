// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Style and cursor state the terminal is known to be in while a frame is
/// written. Starts from the reset state every draw ends with.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn apply<W: Write>(&mut self, out: &mut W, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn move_to<W: Write>(&mut self, out: &mut W, x: u16, y: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }
}

fn same_style(a: &Cell, b: &Cell) -> bool {
    a.fg == b.fg && a.bg == b.bg && a.bold == b.bold
}

/// Writes `frame` to `out` and clears its change set. With `full` every
/// cell is written; otherwise only changed cells, batched into runs of
/// adjacent cells that share a style.
pub fn write_frame<W: Write>(out: &mut W, frame: &mut Frame, full: bool) -> Result<()> {
    let mut pen = Pen::default();
    let width = frame.width as usize;

    if full {
        for y in 0..frame.height {
            out.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let cell = frame.cell_at_index(y as usize * width + x as usize);
                pen.apply(out, &cell)?;
                out.queue(Print(cell.ch))?;
            }
        }
    } else if width > 0 {
        let mut dirty = frame.dirty_indices().to_vec();
        dirty.sort_unstable();

        let mut run = String::with_capacity(64);
        let mut i = 0;
        while i < dirty.len() {
            let start = dirty[i];
            let head = frame.cell_at_index(start);
            let (x0, y0) = ((start % width) as u16, (start / width) as u16);

            run.clear();
            run.push(head.ch);
            let mut j = i + 1;
            while j < dirty.len() {
                let idx = dirty[j];
                let next = frame.cell_at_index(idx);
                // runs never wrap onto the next row
                if idx != dirty[j - 1] + 1 || idx % width == 0 || !same_style(&head, &next) {
                    break;
                }
                run.push(next.ch);
                j += 1;
            }

            pen.move_to(out, x0, y0)?;
            pen.apply(out, &head)?;
            out.queue(Print(run.as_str()))?;

            let end_x = x0 as usize + (j - i);
            pen.pos = (end_x < width).then_some((end_x as u16, y0));
            i = j;
        }
    }

    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(ResetColor)?;
    out.flush()?;
    frame.clear_dirty();
    Ok(())
}

pub struct Terminal {
    stdout: Stdout,
    drawn_size: Option<(u16, u16)>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            drawn_size: None,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flushes the frame's pending changes. A new size, an invalidated
    /// frame or a change set covering a third of the screen repaint it all.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let resized = self.drawn_size != Some(size);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let total = frame.width as usize * frame.height as usize;
        let large = total > 0 && frame.dirty_indices().len() >= total / 3;
        let full = resized || frame.is_dirty_all() || large;

        write_frame(&mut self.stdout, frame, full)?;
        self.drawn_size = Some(size);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.execute(SetAttribute(Attribute::Reset));
        let _ = self.stdout.execute(ResetColor);
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(terminal::EnableLineWrap);
        let _ = self.stdout.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(frame: &mut Frame, full: bool) -> String {
        let mut buf: Vec<u8> = Vec::new();
        write_frame(&mut buf, frame, full).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn full_write_prints_every_cell() {
        let mut f = Frame::new(3, 2, None);
        f.set(1, 1, Cell::glyph('z', None, None, false));
        let out = written(&mut f, true);
        assert_eq!(out.matches(' ').count(), 5);
        assert!(out.contains('z'));
        assert!(!f.has_changes());
    }

    #[test]
    fn adjacent_changes_with_one_style_form_a_single_run() {
        let mut f = Frame::new(6, 2, None);
        f.clear_dirty();
        f.set(2, 0, Cell::glyph('b', None, None, false));
        f.set(1, 0, Cell::glyph('a', None, None, false));
        f.set(4, 1, Cell::glyph('c', None, None, false));

        let out = written(&mut f, false);
        assert!(out.contains("\x1b[1;2Hab"), "{out:?}");
        assert!(out.contains("\x1b[2;5Hc"), "{out:?}");
        assert!(!f.has_changes());
    }

    #[test]
    fn runs_split_on_style_and_row_changes() {
        let red = Some(Color::Red);
        let mut f = Frame::new(2, 2, None);
        f.clear_dirty();
        f.set(0, 0, Cell::glyph('a', None, None, false));
        f.set(1, 0, Cell::glyph('b', red, None, true));
        f.set(0, 1, Cell::glyph('c', red, None, true));

        let out = written(&mut f, false);
        assert!(!out.contains("ab"));
        assert!(!out.contains("bc"));
        assert!(out.contains("\x1b[2;1H"));
    }
}
