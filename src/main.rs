// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod charset;
mod config;
mod error;
mod frame;
mod logging;
mod palette;
mod rain;
mod runtime;
mod scene;
mod scramble;
mod terminal;
mod timer;
mod typewriter;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, parse_color_mode, print_list_charsets,
    print_list_colors, Args,
};
use crate::error::ConfigError;
use crate::frame::Frame;
use crate::palette::build_palette;
use crate::runtime::ColorMode;
use crate::scene::Hero;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::timer::earliest;

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

/// Upper bound on one blocking wait, so a stalled timer set never freezes
/// input handling.
const MAX_WAIT: Duration = Duration::from_millis(250);

fn build_info() -> &'static str {
    env!("GLYPHRAIN_BUILD")
}

fn git_sha() -> &'static str {
    env!("GLYPHRAIN_GIT_SHA")
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

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> Result<ColorMode, ConfigError> {
    match args.colormode {
        Some(m) => parse_color_mode(m),
        None => Ok(detect_color_mode_auto()),
    }
}

fn exit_with(err: impl std::fmt::Display) -> ! {
    eprintln!("{}", err);
    std::process::exit(1);
}

enum KeyAction {
    Quit,
    Remount,
    NextScheme,
    Ignore,
}

fn key_action(k: &KeyEvent, screensaver: bool) -> KeyAction {
    if screensaver {
        return KeyAction::Quit;
    }
    match (k.code, k.modifiers) {
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => KeyAction::Quit,
        (KeyCode::Char(' '), _) => KeyAction::Remount,
        (KeyCode::Char('c'), _) => KeyAction::NextScheme,
        _ => KeyAction::Ignore,
    }
}

fn main() -> std::io::Result<()> {
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
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        if !git_sha().is_empty() {
            println!("Commit: {}", git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let settings = args.settings().unwrap_or_else(|e| exit_with(e));
    let color_mode = detect_color_mode(&args).unwrap_or_else(|e| exit_with(e));

    if let Err(e) = logging::init(args.log_file.as_deref()) {
        exit_with(format!("failed to open log file: {}", e));
    }

    let mut mt = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut scheme = settings.scheme;
    let palette = build_palette(scheme, color_mode, settings.default_background);
    let bg = palette.bg;
    let mut hero = Hero::new(
        settings.text,
        settings.scene,
        palette,
        settings.glyphs,
        &mut mt,
    )
    .unwrap_or_else(|e| exit_with(e));

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h, bg);

    let start_time = Instant::now();
    let end_time = settings.duration.map(|d| start_time + d);
    hero.mount(start_time, Some((w, h)));
    info!(
        width = w,
        height = h,
        ?color_mode,
        seed = ?args.seed,
        "glyphrain: started"
    );

    let mut running = true;
    let mut needs_draw = true;

    while running {
        if needs_draw {
            hero.render(&mut frame);
            if frame.has_changes() {
                term.draw(&mut frame)?;
            }
            needs_draw = false;
        }

        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            break;
        }
        let timeout = earliest([hero.next_deadline(), end_time])
            .map_or(MAX_WAIT, |at| at.saturating_duration_since(now))
            .min(MAX_WAIT);

        let mut pending_resize: Option<(u16, u16)> = None;
        if Terminal::poll_event(timeout)? {
            loop {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        match key_action(&k, args.screensaver) {
                            KeyAction::Quit => running = false,
                            KeyAction::Remount => {
                                hero.mount(Instant::now(), Some((frame.width, frame.height)));
                                needs_draw = true;
                            }
                            KeyAction::NextScheme => {
                                scheme = scheme.next();
                                hero.set_scheme(scheme);
                                info!(?scheme, "glyphrain: color scheme changed");
                                needs_draw = true;
                            }
                            KeyAction::Ignore => {}
                        }
                    }
                    _ => {}
                }
                if !running || !Terminal::poll_event(Duration::ZERO)? {
                    break;
                }
            }
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            if hero.rain().is_active() {
                hero.resize(nw, nh);
            } else {
                hero.mount(Instant::now(), Some((nw, nh)));
            }
            frame = Frame::new(nw, nh, bg);
            needs_draw = true;
        }

        needs_draw |= hero.update(Instant::now());
    }

    hero.unmount();
    drop(term);
    info!(elapsed_s = start_time.elapsed().as_secs_f64(), "glyphrain: stopped");
    Ok(())
}
