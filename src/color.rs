// Copyright (c) 2026 rezky_nightky

use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    #[allow(dead_code)]
    pub fn max_channel(self) -> u8 {
        self.r.max(self.g).max(self.b)
    }

    pub fn saturating_sub(self, v: u8) -> Self {
        Self {
            r: self.r.saturating_sub(v),
            g: self.g.saturating_sub(v),
            b: self.b.saturating_sub(v),
        }
    }

    fn channels(self) -> [i32; 3] {
        [self.r as i32, self.g as i32, self.b as i32]
    }

    fn from_clamped(c: [i32; 3]) -> Self {
        let clamp = |v: i32| v.clamp(0, 255) as u8;
        Self::new(clamp(c[0]), clamp(c[1]), clamp(c[2]))
    }
}

/// Gradient coloring for column cells: a linear blend between two colors, an
/// optional sharp periodic pulse, and a per-channel random jitter.
#[derive(Clone, Copy, Debug)]
pub struct ColorBlender {
    /// Jitter half-width as a fraction of the channel value.
    pub jitter: f64,
    /// Brightness added to every channel at the top of a pulse.
    pub pulse_gain: f64,
    /// Phase advance per engine tick.
    pub pulse_rate: f64,
}

impl Default for ColorBlender {
    fn default() -> Self {
        Self {
            jitter: 0.2,
            pulse_gain: 200.0,
            pulse_rate: 0.1,
        }
    }
}

impl ColorBlender {
    /// `sin(ticks * rate + phase)^8`: zero most of the time with short spikes
    /// reaching 1.0 twice per period.
    pub fn pulse_intensity(&self, phase: f64, ticks: u64) -> f64 {
        (ticks as f64 * self.pulse_rate + phase).sin().powi(8)
    }

    /// Blended channels before jitter and clamping. Values can exceed 255
    /// while a pulse is active.
    pub fn base(&self, start: Rgb, end: Rgb, ratio: f64, pulse: Option<f64>, ticks: u64) -> [i32; 3] {
        let s = start.channels();
        let e = end.channels();
        let mut out: [i32; 3] =
            std::array::from_fn(|i| (s[i] as f64 + ratio * (e[i] - s[i]) as f64) as i32);

        if let Some(phase) = pulse {
            let boost = self.pulse_intensity(phase, ticks) * self.pulse_gain;
            for c in &mut out {
                *c = (*c as f64 + boost) as i32;
            }
        }
        out
    }

    pub fn blend<R: Rng + ?Sized>(
        &self,
        start: Rgb,
        end: Rgb,
        ratio: f64,
        pulse: Option<f64>,
        ticks: u64,
        rng: &mut R,
    ) -> Rgb {
        let mut c = self.base(start, end, ratio, pulse, ticks);
        for v in &mut c {
            let spread = (self.jitter * (*v as f64)).abs() as i32;
            if spread > 0 {
                *v += rng.random_range(-spread..=spread);
            }
        }
        Rgb::from_clamped(c)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::{DARK_GREEN, GREEN};

    #[test]
    fn base_is_truncated_linear_interpolation() {
        let b = ColorBlender::default();
        for (ratio, g) in [(0.0, 255), (0.25, 192), (0.5, 130), (0.75, 67), (1.0, 5)] {
            assert_eq!(b.base(GREEN, DARK_GREEN, ratio, None, 0), [0, g, 0]);
        }
    }

    #[test]
    fn jitter_stays_within_twenty_percent() {
        let b = ColorBlender::default();
        let mut rng = StdRng::seed_from_u64(7);
        for step in 0..=20 {
            let ratio = step as f64 / 20.0;
            let base = b.base(GREEN, DARK_GREEN, ratio, None, 0)[1];
            let spread = (base as f64 * 0.2) as i32;
            for _ in 0..50 {
                let c = b.blend(GREEN, DARK_GREEN, ratio, None, 0, &mut rng);
                assert_eq!(c.r, 0);
                assert_eq!(c.b, 0);
                let g = c.g as i32;
                assert!(g >= (base - spread).max(0) && g <= (base + spread).min(255));
            }
        }
    }

    #[test]
    fn zero_channels_are_not_jittered() {
        let b = ColorBlender::default();
        let mut rng = StdRng::seed_from_u64(1);
        let black = Rgb::new(0, 0, 0);
        for _ in 0..100 {
            assert_eq!(b.blend(black, black, 0.5, None, 0, &mut rng), black);
        }
    }

    #[test]
    fn pulse_peak_adds_full_gain() {
        let b = ColorBlender::default();
        assert_eq!(b.pulse_intensity(FRAC_PI_2, 0), 1.0);
        assert_eq!(b.base(GREEN, DARK_GREEN, 0.0, Some(FRAC_PI_2), 0), [200, 455, 200]);

        let t = 40;
        let phase = FRAC_PI_2 - t as f64 * 0.1;
        assert!((b.pulse_intensity(phase, t) * 200.0 - 200.0).abs() < 1e-6);
    }

    #[test]
    fn pulse_trough_adds_nothing() {
        let b = ColorBlender::default();
        assert_eq!(b.pulse_intensity(0.0, 0), 0.0);
        assert_eq!(b.base(GREEN, DARK_GREEN, 0.0, Some(0.0), 0), [0, 255, 0]);
    }

    #[test]
    fn pulsed_blend_is_clamped() {
        let b = ColorBlender::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let c = b.blend(GREEN, DARK_GREEN, 0.0, Some(FRAC_PI_2), 0, &mut rng);
            assert_eq!(c.g, 255);
            assert!(c.r >= 160 && c.b >= 160);
        }
    }
}
