// Copyright (c) 2026 rezky_nightky

use crate::color::Rgb;

/// Drawing surface the simulation paints into. Coordinates are in pixels and
/// may fall partly or fully outside the surface.
pub trait Canvas {
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb);
}
