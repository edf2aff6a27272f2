// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod color;
mod column;
mod config;
mod engine;
mod frame;
mod palette;
mod stuck;
mod terminal;

use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use log::info;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{color_enabled_stdout, Args, Grid, BACKGROUND, TICKS_PER_SEC};
use crate::engine::Engine;
use crate::frame::Frame;
use crate::palette::{term_color, ColorMode};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("PIXELRAIN_BUILD")
}

fn git_sha() -> &'static str {
    env!("PIXELRAIN_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(bits) = args.colormode {
        return ColorMode::from_bits(bits).unwrap_or_else(|| {
            eprintln!("invalid --colormode: {} (allowed: 16,8,256,24,32)", bits);
            std::process::exit(1);
        });
    }
    ColorMode::detect()
}

fn main() -> std::io::Result<()> {
    env_logger::init();

    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        if git_sha().is_empty() {
            println!("Build: {}", build_info());
        } else {
            println!("Build: {} ({})", build_info(), git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);
    if args.check_bitcolor {
        println!("BITCOLOR CHECK:");
        println!("  auto_detected: {}", ColorMode::detect().label());
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode.label());
        }
        println!("  effective: {}", color_mode.label());
        return Ok(());
    }

    let duration_s = args
        .duration
        .map(|s| {
            if s.is_finite() && s <= 0.0 {
                return s;
            }
            require_f64_range("--duration", s, 0.1, 86400.0)
        })
        .filter(|&s| s > 0.0);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {}", seed);

    let mut engine = Engine::with_seed(Grid::DEFAULT, seed);
    engine.initialize();

    let grid = *engine.grid();
    let mut frame = Frame::new(grid.cols, grid.rows, grid.cell, BACKGROUND);
    let mut term = Terminal::new(color_mode, term_color(color_mode, BACKGROUND))?;
    let (w, h) = term.size()?;
    term.invalidate(w, h, &frame);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / TICKS_PER_SEC);
    let mut next_frame = Instant::now();
    let mut running = true;
    let mut drawn_frames: u64 = 0;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Mouse(m) => {
                        if let MouseEventKind::Down(_) = m.kind {
                            engine.toggle_pause();
                        }
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
                        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => running = false,
                        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                            running = false
                        }
                        (KeyCode::Char('p'), _) | (KeyCode::Char(' '), _) => {
                            engine.toggle_pause();
                        }
                        _ => {}
                    },
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            term.invalidate(nw, nh, &frame);
            frame.mark_all_dirty();
        }

        if Instant::now() >= next_frame {
            engine.tick(&mut frame);
            next_frame += target_period;
            let now = Instant::now();
            if now > next_frame {
                next_frame = now;
            }
        }

        if frame.is_dirty() {
            term.draw(&mut frame)?;
            drawn_frames += 1;
        }
    }

    drop(term);
    info!(
        "ran {:.1}s: {} ticks{}, {} frames drawn, {} columns, {} stuck pixels",
        start_time.elapsed().as_secs_f64(),
        engine.ticks(),
        if engine.is_paused() { " (paused)" } else { "" },
        drawn_frames,
        engine.columns().len(),
        engine.stuck_pixels().len()
    );

    Ok(())
}
