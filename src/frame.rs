// Copyright (c) 2026 rezky_nightky

use crate::canvas::Canvas;
use crate::color::Rgb;

/// Cell-resolution framebuffer. Each entry is one grid cell (`cell` pixels
/// square); drawing calls in pixel space are snapped onto it.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cell: i32,
    pixels: Vec<Rgb>,
    gen: u32,
    pixel_gen: Vec<u32>,
    blank: Rgb,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, cell: i32, bg: Rgb) -> Self {
        let len = width as usize * height as usize;
        let gen = 1u32;
        Self {
            width,
            height,
            cell: cell.max(1),
            pixels: vec![bg; len],
            gen,
            pixel_gen: vec![gen; len],
            blank: bg,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty_all = true;
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixel_at_index(i))
    }

    pub fn pixel_at_index(&self, i: usize) -> Rgb {
        if self.pixel_gen.get(i).copied() == Some(self.gen) {
            self.pixels[i]
        } else {
            self.blank
        }
    }

    pub fn set(&mut self, x: u16, y: u16, color: Rgb) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.pixel_at_index(i) == color {
            return;
        }

        self.pixels[i] = color;
        self.pixel_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }

    /// Maps a pixel span onto the cell range it touches, clipped to `len`.
    fn cell_span(&self, start: i32, extent: i32, len: u16) -> std::ops::Range<u16> {
        if extent <= 0 {
            return 0..0;
        }
        let lo = start.div_euclid(self.cell).max(0);
        let hi = (start + extent + self.cell - 1).div_euclid(self.cell).min(len as i32);
        if lo >= hi {
            return 0..0;
        }
        lo as u16..hi as u16
    }
}

impl Canvas for Frame {
    fn clear(&mut self, color: Rgb) {
        // Reset every pixel at once by retiring the current generation.
        self.blank = color;
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.pixel_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let cols = self.cell_span(x, w, self.width);
        let rows = self.cell_span(y, h, self.height);
        for cy in rows {
            for cx in cols.clone() {
                self.set(cx, cy, color);
            }
        }
    }
}
