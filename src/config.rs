// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

use crate::color::Rgb;

pub const BACKGROUND: Rgb = Rgb::new(0, 0, 0);
pub const GREEN: Rgb = Rgb::new(0, 255, 0);
pub const DARK_GREEN: Rgb = Rgb::new(0, 5, 0);

pub const TICKS_PER_SEC: f64 = 5.0;

/// Pixel lattice the rain falls through. All positions are in pixels and are
/// multiples of `cell`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub cols: u16,
    pub rows: u16,
    pub cell: i32,
    pub min_height: i32,
    pub max_height: i32,
}

impl Grid {
    pub const DEFAULT: Grid = Grid {
        cols: 27,
        rows: 27,
        cell: 10,
        min_height: 3,
        max_height: 27,
    };

    pub fn screen_width(&self) -> i32 {
        self.cols as i32 * self.cell
    }

    pub fn screen_height(&self) -> i32 {
        self.rows as i32 * self.cell
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pixelrain",
    version,
    disable_version_flag = true,
    about = "Green pixel rain with pulsing heads and fading afterglow",
    after_help = "CONTROLS:\n  mouse click, p, space   pause / resume\n  q, Esc, Ctrl-C          quit"
)]
pub struct Args {
    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed for a replayable run (default: random)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 16, 8/256, 24/32). Default: 24-bit if supported (COLORTERM), else 256-color"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}
