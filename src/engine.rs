// Copyright (c) 2026 rezky_nightky

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    canvas::Canvas,
    color::ColorBlender,
    column::{FallingColumn, SpawnRequest},
    config::{Grid, BACKGROUND},
    stuck::{Lifecycle, StuckPixel},
};

/// Owns every falling column and stuck pixel and advances them one frame at
/// a time. Nothing outside the engine holds a reference to either set.
pub struct Engine<R = StdRng> {
    grid: Grid,
    blender: ColorBlender,
    rng: R,

    columns: Vec<FallingColumn>,
    stuck: Vec<StuckPixel>,

    ticks: u64,
    paused: bool,
}

impl Engine<StdRng> {
    pub fn with_seed(grid: Grid, seed: u64) -> Self {
        Self::new(grid, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn new(grid: Grid, rng: R) -> Self {
        Self {
            grid,
            blender: ColorBlender::default(),
            rng,
            columns: Vec::new(),
            stuck: Vec::new(),
            ticks: 0,
            paused: false,
        }
    }

    /// Fills every grid column with one falling column, left to right.
    pub fn initialize(&mut self) {
        self.columns.clear();
        self.stuck.clear();
        for c in 0..self.grid.cols as i32 {
            let col = FallingColumn::new(c * self.grid.cell, &self.grid, &mut self.rng);
            self.columns.push(col);
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn columns(&self) -> &[FallingColumn] {
        &self.columns
    }

    pub fn stuck_pixels(&self) -> &[StuckPixel] {
        &self.stuck
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!("paused={} at tick {}", self.paused, self.ticks);
    }

    /// Runs one frame. Returns false without touching anything when paused.
    pub fn tick<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> bool {
        if self.paused {
            return false;
        }

        canvas.clear(BACKGROUND);

        // Children and new stuck pixels are buffered so the column vector
        // is never grown while it is being walked.
        let mut spawns: Vec<SpawnRequest> = Vec::new();
        let mut born: Vec<StuckPixel> = Vec::new();
        for col in &mut self.columns {
            if let Some(req) = col.advance(&self.grid) {
                spawns.push(req);
            }
            col.draw(canvas, &self.blender, &mut self.rng, self.ticks, |p| {
                born.push(p)
            });
        }

        if !born.is_empty() {
            debug!("tick {}: {} stuck pixel(s) born", self.ticks, born.len());
        }
        self.stuck.append(&mut born);

        self.stuck.retain_mut(|p| {
            let state = p.tick();
            p.draw(canvas);
            state == Lifecycle::Alive
        });

        self.columns.retain(|c| !c.is_dead());
        for req in spawns {
            let child = FallingColumn::new(req.x, &self.grid, &mut self.rng);
            self.columns.push(child);
        }

        self.ticks += 1;
        trace!(
            "tick {}: columns={} stuck={}",
            self.ticks,
            self.columns.len(),
            self.stuck.len()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::canvas::Canvas;
    use crate::color::Rgb;
    use crate::config::Grid;

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        rects: usize,
    }

    impl Canvas for Recorder {
        fn clear(&mut self, _color: Rgb) {
            self.clears += 1;
        }

        fn fill_rect(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _color: Rgb) {
            self.rects += 1;
        }
    }

    fn make_engine(seed: u64) -> Engine {
        let mut engine = Engine::with_seed(Grid::DEFAULT, seed);
        engine.initialize();
        engine
    }

    #[test]
    fn initialize_covers_every_grid_column() {
        let engine = make_engine(1);
        let xs: Vec<i32> = engine.columns().iter().map(|c| c.x()).collect();
        let want: Vec<i32> = (0..27).map(|i| i * 10).collect();
        assert_eq!(xs, want);
        assert!(engine.stuck_pixels().is_empty());
        assert_eq!(engine.ticks(), 0);
    }

    #[test]
    fn tick_clears_then_draws_and_counts() {
        let mut engine = make_engine(2);
        let mut rec = Recorder::default();
        assert!(engine.tick(&mut rec));
        assert_eq!(rec.clears, 1);
        assert!(rec.rects >= 27 * 3);
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn paused_engine_draws_nothing() {
        let mut engine = make_engine(3);
        let mut rec = Recorder::default();
        engine.tick(&mut rec);
        let before: Vec<i32> = engine.columns().iter().map(|c| c.y()).collect();

        let mut rec = Recorder::default();
        engine.toggle_pause();
        assert!(engine.is_paused());
        assert!(!engine.tick(&mut rec));
        assert!(!engine.tick(&mut rec));
        assert_eq!(rec.clears, 0);
        assert_eq!(rec.rects, 0);
        assert_eq!(engine.ticks(), 1);
        let after: Vec<i32> = engine.columns().iter().map(|c| c.y()).collect();
        assert_eq!(before, after);

        engine.toggle_pause();
        assert!(engine.tick(&mut rec));
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn every_lane_stays_populated() {
        // A column lives at most (270 + 540) / 10 + 1 ticks and a lane can
        // gain a child no faster than every 4 ticks.
        let max_per_lane = 22;
        for seed in [4, 40, 400] {
            let mut engine = make_engine(seed);
            let mut rec = Recorder::default();
            for _ in 0..600 {
                engine.tick(&mut rec);
                let mut lanes = [0usize; 27];
                for c in engine.columns() {
                    assert!(!c.is_dead());
                    lanes[(c.x() / 10) as usize] += 1;
                }
                assert!(lanes.iter().all(|&n| n >= 1 && n <= max_per_lane), "{lanes:?}");
            }
            assert_eq!(engine.ticks(), 600);
        }
    }

    #[test]
    fn stuck_pixels_appear_and_fade_out() {
        let mut engine = make_engine(5);
        let mut rec = Recorder::default();
        let mut seen = false;
        for _ in 0..400 {
            engine.tick(&mut rec);
            seen |= !engine.stuck_pixels().is_empty();
            for p in engine.stuck_pixels() {
                assert!(!p.color().is_black());
            }
        }
        assert!(seen);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = make_engine(99);
        let mut b = make_engine(99);
        let mut rec = Recorder::default();
        for _ in 0..50 {
            a.tick(&mut rec);
            b.tick(&mut rec);
        }
        let ya: Vec<(i32, i32)> = a.columns().iter().map(|c| (c.x(), c.y())).collect();
        let yb: Vec<(i32, i32)> = b.columns().iter().map(|c| (c.x(), c.y())).collect();
        assert_eq!(ya, yb);
        assert_eq!(a.stuck_pixels().len(), b.stuck_pixels().len());
    }
}
