// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;
use crate::palette::{term_color, ColorMode};

struct LastFrame {
    width: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl LastFrame {
    fn new(width: u16, rows: u16) -> Self {
        Self {
            width,
            rows,
            cells: vec![Cell::blank(); width as usize * rows as usize],
        }
    }
}

/// Terminal rows needed for `pixel_rows` pixel rows (two per row).
pub fn rows_for(pixel_rows: u16) -> u16 {
    pixel_rows.div_ceil(2)
}

/// Builds the terminal cell at column `x`, terminal row `row`.
pub fn compose_cell(frame: &Frame, mode: ColorMode, bg: Color, x: u16, row: u16) -> Cell {
    let pixel = |y: u16| {
        frame
            .get(x, y)
            .map(|c| term_color(mode, c))
            .unwrap_or(bg)
    };
    Cell::pixel_pair(pixel(row * 2), pixel(row * 2 + 1))
}

pub struct Terminal {
    stdout: Stdout,
    color_mode: ColorMode,
    bg: Color,
    origin: (u16, u16),
    last: Option<LastFrame>,
    run_buf: String,
    row_buf: Vec<Cell>,
    touched_rows: Vec<u16>,
}

impl Terminal {
    pub fn new(color_mode: ColorMode, bg: Color) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(EnableMouseCapture)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            color_mode,
            bg,
            origin: (0, 0),
            last: None,
            run_buf: String::with_capacity(64),
            row_buf: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Drops what is on screen so the next draw repaints everything, centered
    /// in a terminal of `cols` x `lines`.
    pub fn invalidate(&mut self, cols: u16, lines: u16, frame: &Frame) {
        let rows = rows_for(frame.height);
        self.origin = (
            cols.saturating_sub(frame.width) / 2,
            lines.saturating_sub(rows) / 2,
        );
        self.last = None;
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let rows = rows_for(frame.height);
        let needs_full_redraw = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.rows != rows)
            .unwrap_or(true);

        if needs_full_redraw {
            self.stdout.queue(SetBackgroundColor(Color::Reset))?;
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = None;
        }

        self.touched_rows.clear();
        if needs_full_redraw || frame.is_dirty_all() {
            self.touched_rows.extend(0..rows);
        } else {
            let w = frame.width.max(1) as usize;
            for &idx in frame.dirty_indices() {
                self.touched_rows.push((idx / w) as u16 / 2);
            }
            self.touched_rows.sort_unstable();
            self.touched_rows.dedup();
        }

        let mode = self.color_mode;
        let bg = self.bg;
        let (ox, oy) = self.origin;
        let last = self
            .last
            .get_or_insert_with(|| LastFrame::new(frame.width, rows));

        let mut cur_fg: Option<Color> = None;
        let mut cur_bg: Option<Color> = None;
        let mut cur_pos: Option<(u16, u16)> = None;

        for &row in &self.touched_rows {
            self.row_buf.clear();
            self.row_buf
                .extend((0..frame.width).map(|x| compose_cell(frame, mode, bg, x, row)));

            let base = row as usize * frame.width as usize;
            let mut i = 0usize;
            while i < self.row_buf.len() {
                let cell0 = self.row_buf[i];
                if !needs_full_redraw && last.cells[base + i] == cell0 {
                    i += 1;
                    continue;
                }

                // Batch the following cells that changed and share colors.
                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                last.cells[base + i] = cell0;
                let mut j = i + 1;
                while j < self.row_buf.len() {
                    let cell1 = self.row_buf[j];
                    if cell1.fg != cell0.fg || cell1.bg != cell0.bg {
                        break;
                    }
                    if !needs_full_redraw && last.cells[base + j] == cell1 {
                        break;
                    }
                    self.run_buf.push(cell1.ch);
                    last.cells[base + j] = cell1;
                    j += 1;
                }

                let pos = (ox + i as u16, oy + row);
                if cur_pos != Some(pos) {
                    self.stdout.queue(cursor::MoveTo(pos.0, pos.1))?;
                }

                if cell0.fg != cur_fg {
                    if let Some(fg) = cell0.fg {
                        self.stdout.queue(SetForegroundColor(fg))?;
                    }
                    cur_fg = cell0.fg;
                }

                if cell0.bg != cur_bg {
                    self.stdout
                        .queue(SetBackgroundColor(cell0.bg.unwrap_or(Color::Reset)))?;
                    cur_bg = cell0.bg;
                }

                self.stdout.queue(Print(self.run_buf.as_str()))?;
                cur_pos = Some((ox + j as u16, oy + row));
                i = j;
            }
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::cell::HALF_BLOCK;
    use crate::color::Rgb;

    #[test]
    fn odd_pixel_rows_round_up() {
        assert_eq!(rows_for(27), 14);
        assert_eq!(rows_for(26), 13);
        assert_eq!(rows_for(0), 0);
    }

    #[test]
    fn compose_stacks_two_pixels() {
        let mut f = Frame::new(2, 3, 10, Rgb::default());
        f.fill_rect(0, 0, 10, 10, Rgb::new(0, 255, 0));
        let black = Color::Rgb { r: 0, g: 0, b: 0 };

        let top = compose_cell(&f, ColorMode::TrueColor, black, 0, 0);
        assert_eq!(top.ch, HALF_BLOCK);
        assert_eq!(top.fg, Some(Color::Rgb { r: 0, g: 255, b: 0 }));
        assert_eq!(top.bg, Some(black));

        let plain = compose_cell(&f, ColorMode::TrueColor, black, 1, 0);
        assert_eq!(plain.ch, ' ');
        assert_eq!(plain.bg, Some(black));

        // Third pixel row pairs with the background below the grid.
        let bottom = compose_cell(&f, ColorMode::TrueColor, black, 0, 1);
        assert_eq!(bottom, Cell::pixel_pair(black, black));
    }
}
