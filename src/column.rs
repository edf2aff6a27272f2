// Copyright (c) 2026 rezky_nightky

use std::f64::consts::TAU;

use rand::Rng;

use crate::canvas::Canvas;
use crate::color::{ColorBlender, Rgb};
use crate::config::{Grid, DARK_GREEN, GREEN};
use crate::stuck::StuckPixel;

const PULSE_CHANCE: f64 = 0.20;

const STUCK_GREEN_MIN: u8 = 200;
const STUCK_GREEN_IMMEDIATE: u8 = 250;
const STUCK_CHANCE: f64 = 0.005;

/// Emitted once per column when its head first passes the trigger line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StuckKind {
    Normal,
    Immediate,
}

/// Decides whether a freshly drawn cell becomes a stuck pixel. `roll` is a
/// uniform draw in [0, 1).
pub fn stuck_kind(color: Rgb, roll: f64) -> Option<StuckKind> {
    if color.g < STUCK_GREEN_MIN || roll >= STUCK_CHANCE {
        return None;
    }
    if color.g > STUCK_GREEN_IMMEDIATE {
        Some(StuckKind::Immediate)
    } else {
        Some(StuckKind::Normal)
    }
}

/// A vertical run of cells sliding down one grid column. `y` is the head
/// (brightest, bottom) cell; the trail extends `height` pixels above it.
#[derive(Clone, Debug)]
pub struct FallingColumn {
    x: i32,
    y: i32,
    speed: i32,
    height: i32,
    cell: i32,
    trigger_y: i32,
    spawned: bool,
    pulse_phase: Option<f64>,
    dead: bool,
}

impl FallingColumn {
    pub fn new<R: Rng + ?Sized>(x: i32, grid: &Grid, rng: &mut R) -> Self {
        let screen_h = grid.screen_height();
        let cell = grid.cell;
        let pulse_phase = if rng.random::<f64>() < PULSE_CHANCE {
            Some(rng.random_range(0.0..TAU))
        } else {
            None
        };

        Self {
            x,
            y: rng.random_range(-grid.max_height..=0) * cell,
            speed: if rng.random_bool(0.5) { cell } else { 2 * cell },
            height: rng.random_range(grid.min_height..=grid.max_height) * cell,
            cell,
            trigger_y: rng.random_range(screen_h / 4..=3 * screen_h / 4),
            spawned: false,
            pulse_phase,
            dead: false,
        }
    }
}

#[allow(dead_code)]
impl FallingColumn {
    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn trigger_y(&self) -> i32 {
        self.trigger_y
    }

    pub fn pulse_phase(&self) -> Option<f64> {
        self.pulse_phase
    }

    pub fn has_spawned(&self) -> bool {
        self.spawned
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

impl FallingColumn {
    fn cells(&self) -> i32 {
        self.height / self.cell
    }

    pub fn advance(&mut self, grid: &Grid) -> Option<SpawnRequest> {
        self.y += self.speed;

        let mut req = None;
        if self.y > self.trigger_y && !self.spawned {
            self.spawned = true;
            req = Some(SpawnRequest { x: self.x });
        }

        if self.y - self.height > grid.screen_height() {
            self.dead = true;
        }
        req
    }

    pub fn draw<C, R, F>(
        &self,
        canvas: &mut C,
        blender: &ColorBlender,
        rng: &mut R,
        ticks: u64,
        mut on_stuck: F,
    ) where
        C: Canvas + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(StuckPixel),
    {
        let n = self.cells();
        for i in 0..n {
            let ratio = i as f64 / n as f64;
            let pulse = if i == 0 { self.pulse_phase } else { None };
            let color = blender.blend(GREEN, DARK_GREEN, ratio, pulse, ticks, rng);
            let cy = self.y - i * self.cell;
            canvas.fill_rect(self.x, cy, self.cell, self.cell, color);

            // The roll is only taken for bright cells.
            if color.g < STUCK_GREEN_MIN {
                continue;
            }
            match stuck_kind(color, rng.random::<f64>()) {
                Some(StuckKind::Immediate) => {
                    on_stuck(StuckPixel::immediate(self.x, cy, self.cell, color, rng))
                }
                Some(StuckKind::Normal) => {
                    on_stuck(StuckPixel::new(self.x, cy, self.cell, color, rng))
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[derive(Default)]
    struct Cells(Vec<(i32, i32, Rgb)>);

    impl Canvas for Cells {
        fn clear(&mut self, _color: Rgb) {
            self.0.clear();
        }

        fn fill_rect(&mut self, x: i32, y: i32, _w: i32, _h: i32, color: Rgb) {
            self.0.push((x, y, color));
        }
    }

    #[test]
    fn new_column_fields_are_in_range() {
        let grid = Grid::DEFAULT;
        let mut rng = StdRng::seed_from_u64(5);
        let mut pulsed = 0;
        for _ in 0..1000 {
            let c = FallingColumn::new(40, &grid, &mut rng);
            assert_eq!(c.x(), 40);
            assert!(c.y() <= 0 && c.y() >= -270 && c.y() % 10 == 0);
            assert!(c.speed() == 10 || c.speed() == 20);
            assert!(c.height() >= 30 && c.height() <= 270 && c.height() % 10 == 0);
            assert!(c.trigger_y() >= 67 && c.trigger_y() <= 202);
            assert!(!c.has_spawned() && !c.is_dead());
            if let Some(p) = c.pulse_phase() {
                assert!((0.0..TAU).contains(&p));
                pulsed += 1;
            }
        }
        assert!((100..300).contains(&pulsed), "pulsed={pulsed}");
    }

    #[test]
    fn spawn_fires_once_at_first_crossing() {
        let grid = Grid::DEFAULT;
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let mut c = FallingColumn::new(0, &grid, &mut rng);
            let mut spawns = 0;
            while !c.is_dead() {
                let before = c.y();
                let req = c.advance(&grid);
                if let Some(r) = req {
                    spawns += 1;
                    assert_eq!(r.x, 0);
                    assert!(c.y() > c.trigger_y() && before <= c.trigger_y());
                }
                assert_eq!(c.has_spawned(), c.y() > c.trigger_y());
            }
            assert_eq!(spawns, 1);
        }
    }

    #[test]
    fn dead_iff_trail_below_screen() {
        let grid = Grid::DEFAULT;
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..100 {
            let mut c = FallingColumn::new(0, &grid, &mut rng);
            let mut was_dead = false;
            for _ in 0..200 {
                c.advance(&grid);
                assert_eq!(c.is_dead(), c.y() - c.height() > grid.screen_height());
                if was_dead {
                    assert!(c.is_dead());
                }
                was_dead = c.is_dead();
            }
            assert!(was_dead);
        }
    }

    #[test]
    fn draw_paints_trail_upward_from_head() {
        let grid = Grid::DEFAULT;
        let mut rng = StdRng::seed_from_u64(2);
        let c = FallingColumn::new(30, &grid, &mut rng);
        let mut cells = Cells::default();
        c.draw(&mut cells, &ColorBlender::default(), &mut rng, 0, |_| {});

        let n = (c.height() / 10) as usize;
        assert_eq!(cells.0.len(), n);
        for (i, &(x, y, _)) in cells.0.iter().enumerate() {
            assert_eq!(x, 30);
            assert_eq!(y, c.y() - i as i32 * 10);
        }
    }

    #[test]
    fn stuck_policy_thresholds() {
        let bright = |g| Rgb::new(0, g, 0);
        assert_eq!(stuck_kind(bright(199), 0.0), None);
        assert_eq!(stuck_kind(bright(200), 0.004), Some(StuckKind::Normal));
        assert_eq!(stuck_kind(bright(250), 0.0), Some(StuckKind::Normal));
        assert_eq!(stuck_kind(bright(251), 0.0), Some(StuckKind::Immediate));
        assert_eq!(stuck_kind(bright(255), 0.0049), Some(StuckKind::Immediate));
        assert_eq!(stuck_kind(bright(255), 0.005), None);
    }

    #[test]
    fn stuck_pixels_come_from_bright_cells() {
        let grid = Grid::DEFAULT;
        let mut rng = StdRng::seed_from_u64(77);
        let blender = ColorBlender::default();
        let mut cells = Cells::default();
        let mut stuck = Vec::new();
        for t in 0..2000 {
            let c = FallingColumn::new(50, &grid, &mut rng);
            cells.clear(Rgb::default());
            c.draw(&mut cells, &blender, &mut rng, t, |p| stuck.push(p));
        }
        assert!(!stuck.is_empty());
        for p in &stuck {
            assert_eq!(p.position().0, 50);
            assert!(p.color().g >= 200);
            if p.color().g > 250 {
                assert_eq!(p.hold_ticks(), 0);
            } else {
                assert!(p.hold_ticks() >= 5);
            }
        }
    }
}
