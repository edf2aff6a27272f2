// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::Rgb;

#[allow(dead_code)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StuckPhase {
    Holding,
    Delaying,
    Fading,
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    Expired,
}

/// A cell that stays lit after its column has moved on, then fades to black.
#[derive(Clone, Debug)]
pub struct StuckPixel {
    x: i32,
    y: i32,
    size: i32,
    color: Rgb,
    hold_ticks: u8,
    fade_delay_ticks: u8,
    fade_step: u8,
}

impl StuckPixel {
    pub fn new<R: Rng + ?Sized>(x: i32, y: i32, size: i32, color: Rgb, rng: &mut R) -> Self {
        let hold = rng.random_range(5..=15);
        let delay = rng.random_range(1..=11);
        let step = rng.random_range(6..=12);
        Self::with_timing(x, y, size, color, hold, delay, step)
    }

    /// Same random timing as [`StuckPixel::new`] but skips the hold, so
    /// fading starts on the next tick.
    pub fn immediate<R: Rng + ?Sized>(x: i32, y: i32, size: i32, color: Rgb, rng: &mut R) -> Self {
        let mut p = Self::new(x, y, size, color, rng);
        p.hold_ticks = 0;
        p
    }

    pub fn with_timing(
        x: i32,
        y: i32,
        size: i32,
        color: Rgb,
        hold_ticks: u8,
        fade_delay_ticks: u8,
        fade_step: u8,
    ) -> Self {
        Self {
            x,
            y,
            size,
            color,
            hold_ticks,
            fade_delay_ticks,
            fade_step,
        }
    }
}

#[allow(dead_code)]
impl StuckPixel {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn hold_ticks(&self) -> u8 {
        self.hold_ticks
    }

    pub fn fade_delay_ticks(&self) -> u8 {
        self.fade_delay_ticks
    }

    pub fn fade_step(&self) -> u8 {
        self.fade_step
    }

    pub fn phase(&self) -> StuckPhase {
        if self.hold_ticks > 0 {
            StuckPhase::Holding
        } else if self.fade_delay_ticks > 0 {
            StuckPhase::Delaying
        } else if self.color.is_black() {
            StuckPhase::Expired
        } else {
            StuckPhase::Fading
        }
    }
}

impl StuckPixel {
    pub fn tick(&mut self) -> Lifecycle {
        if self.hold_ticks > 0 {
            self.hold_ticks -= 1;
            return Lifecycle::Alive;
        }
        if self.fade_delay_ticks > 0 {
            self.fade_delay_ticks -= 1;
            return Lifecycle::Alive;
        }

        self.color = self.color.saturating_sub(self.fade_step);
        if self.color.is_black() {
            Lifecycle::Expired
        } else {
            Lifecycle::Alive
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_rect(self.x, self.y, self.size, self.size, self.color);
    }
}
