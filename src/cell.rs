// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// Upper half block: the foreground paints the top pixel, the background the
/// bottom one.
pub const HALF_BLOCK: char = '\u{2580}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }

    /// One terminal cell holding two vertically stacked pixels.
    pub fn pixel_pair(upper: Color, lower: Color) -> Self {
        if upper == lower {
            return Self {
                ch: ' ',
                fg: None,
                bg: Some(lower),
            };
        }
        Self {
            ch: HALF_BLOCK,
            fg: Some(upper),
            bg: Some(lower),
        }
    }
}
