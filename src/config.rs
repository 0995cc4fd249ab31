// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::charset::{build_glyphs, charset_from_str, glyphs_from_literal};
use crate::error::ConfigError;
use crate::rain::RainConfig;
use crate::runtime::{ColorMode, ColorScheme, ResizePolicy};
use crate::scene::{HeroText, SceneConfig};
use crate::scramble::ScrambleConfig;
use crate::typewriter::TypingSpeeds;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --color green --charset matrix --rain-ms 50 --reset-pct 2.5 --opacity 0.5 --typing-ms 100 --deleting-ms 50 --pause-ms 2000 --glitch-every-ms 3000 --glitch-pct 5 --glitch-step-ms 30 --glitch-steps 10";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        if !line.starts_with(' ') && line.ends_with(':') {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  glyphrain") {
            out.push_str("  \x1b[1;34mglyphrain\x1b[0m");
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeArg {
    #[value(name = "keep")]
    Keep,
    #[value(name = "reflow")]
    Reflow,
}

impl From<ResizeArg> for ResizePolicy {
    fn from(arg: ResizeArg) -> Self {
        match arg {
            ResizeArg::Keep => ResizePolicy::Keep,
            ResizeArg::Reflow => ResizePolicy::Reflow,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random generator for a repeatable show"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Write logs to PATH (filter from GLYPHRAIN_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "title",
        help_heading = "TEXT",
        help = "Title shown with the glitch effect"
    )]
    pub title: Option<String>,

    #[arg(long = "greeting", help_heading = "TEXT", help = "Line above the title")]
    pub greeting: Option<String>,

    #[arg(
        short = 'r',
        long = "role",
        help_heading = "TEXT",
        help = "Role for the typing line (repeat for several)"
    )]
    pub roles: Vec<String>,

    #[arg(
        long = "tagline",
        help_heading = "TEXT",
        help = "Line below the roles (empty string hides it)"
    )]
    pub tagline: Option<String>,

    #[arg(
        long = "charset",
        default_value = "matrix",
        help_heading = "RAIN",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "glyphs",
        help_heading = "RAIN",
        help = "Literal glyph override, e.g. \"01\" (single-width characters only)"
    )]
    pub glyphs: Option<String>,

    #[arg(
        long = "cell-size",
        default_value_t = 1,
        help_heading = "RAIN",
        help = "Glyph cell size in terminal cells (min 1 max 8)"
    )]
    pub cell_size: u16,

    #[arg(
        long = "rain-ms",
        default_value_t = 50,
        help_heading = "RAIN",
        help = "Rain tick period in ms (min 10 max 1000)"
    )]
    pub rain_ms: u64,

    #[arg(
        long = "reset-pct",
        default_value_t = 2.5,
        help_heading = "RAIN",
        help = "Chance per tick that a finished column restarts, in percent (min 0 max 100)"
    )]
    pub reset_pct: f32,

    #[arg(
        long = "opacity",
        default_value_t = 0.5,
        help_heading = "RAIN",
        help = "Backdrop brightness (min 0 max 1)"
    )]
    pub opacity: f32,

    #[arg(
        long = "resize-policy",
        default_value_t = ResizeArg::Reflow,
        value_enum,
        help_heading = "RAIN",
        help = "Column handling on terminal resize (keep, reflow)"
    )]
    pub resize_policy: ResizeArg,

    #[arg(
        long = "typing-ms",
        default_value_t = 100,
        help_heading = "TIMING",
        help = "Delay per typed character in ms (min 1 max 5000)"
    )]
    pub typing_ms: u64,

    #[arg(
        long = "deleting-ms",
        default_value_t = 50,
        help_heading = "TIMING",
        help = "Delay per deleted character in ms (min 1 max 5000)"
    )]
    pub deleting_ms: u64,

    #[arg(
        long = "pause-ms",
        default_value_t = 2000,
        help_heading = "TIMING",
        help = "Hold time for a fully typed role in ms (min 0 max 60000)"
    )]
    pub pause_ms: u64,

    #[arg(
        long = "blink-ms",
        default_value_t = 1000,
        help_heading = "TIMING",
        help = "Caret blink period in ms (min 50 max 10000)"
    )]
    pub blink_ms: u64,

    #[arg(
        long = "glitch-every-ms",
        default_value_t = 3000,
        help_heading = "TIMING",
        help = "How often the title may start glitching, in ms (min 100 max 600000)"
    )]
    pub glitch_every_ms: u64,

    #[arg(
        long = "glitch-pct",
        default_value_t = 5.0,
        help_heading = "TIMING",
        help = "Chance to glitch on each check, in percent (min 0 max 100)"
    )]
    pub glitch_pct: f32,

    #[arg(
        long = "glitch-step-ms",
        default_value_t = 30,
        help_heading = "TIMING",
        help = "Delay between glitch steps in ms (min 1 max 1000)"
    )]
    pub glitch_step_ms: u64,

    #[arg(
        long = "glitch-steps",
        default_value_t = 10,
        help_heading = "TIMING",
        help = "Steps in one glitch episode (min 1 max 100)"
    )]
    pub glitch_steps: u16,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

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

/// Everything the scene needs, checked and converted from [`Args`].
#[derive(Clone, Debug)]
pub struct Settings {
    pub text: HeroText,
    pub scene: SceneConfig,
    pub glyphs: Vec<char>,
    pub scheme: ColorScheme,
    pub default_background: bool,
    pub duration: Option<Duration>,
}

pub fn require_f64_range(
    name: &'static str,
    v: f64,
    min: f64,
    max: f64,
) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

pub fn require_f32_range(
    name: &'static str,
    v: f32,
    min: f32,
    max: f32,
) -> Result<f32, ConfigError> {
    require_f64_range(name, v as f64, min as f64, max as f64).map(|v| v as f32)
}

pub fn require_ms_range(
    name: &'static str,
    v: u64,
    min: u64,
    max: u64,
) -> Result<Duration, ConfigError> {
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(Duration::from_millis(v))
}

fn require_u16_range(
    name: &'static str,
    v: u16,
    min: u16,
    max: u16,
) -> Result<u16, ConfigError> {
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(v)
}

pub fn parse_color_scheme(s: &str) -> Result<ColorScheme, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" | "matrix" => Ok(ColorScheme::Green),
        "cyan" => Ok(ColorScheme::Cyan),
        "blue" => Ok(ColorScheme::Blue),
        "gold" | "amber" => Ok(ColorScheme::Gold),
        "red" => Ok(ColorScheme::Red),
        "purple" => Ok(ColorScheme::Purple),
        "neon" | "synthwave" => Ok(ColorScheme::Neon),
        "gray" | "grey" => Ok(ColorScheme::Gray),
        _ => Err(ConfigError::ColorScheme(s.to_string())),
    }
}

pub fn parse_color_mode(m: u16) -> Result<ColorMode, ConfigError> {
    match m {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(ConfigError::ColorMode(m)),
    }
}

impl Args {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let rain = RainConfig {
            cell_size: require_u16_range("--cell-size", self.cell_size, 1, 8)?,
            tick: require_ms_range("--rain-ms", self.rain_ms, 10, 1000)?,
            reset_chance: require_f32_range("--reset-pct", self.reset_pct, 0.0, 100.0)? / 100.0,
            resize_policy: self.resize_policy.into(),
            ..RainConfig::default()
        };
        let typing = TypingSpeeds {
            typing: require_ms_range("--typing-ms", self.typing_ms, 1, 5000)?,
            deleting: require_ms_range("--deleting-ms", self.deleting_ms, 1, 5000)?,
            pause: require_ms_range("--pause-ms", self.pause_ms, 0, 60000)?,
        };
        let glitch = ScrambleConfig {
            trigger_every: require_ms_range(
                "--glitch-every-ms",
                self.glitch_every_ms,
                100,
                600_000,
            )?,
            trigger_chance: require_f32_range("--glitch-pct", self.glitch_pct, 0.0, 100.0)?
                / 100.0,
            step_every: require_ms_range("--glitch-step-ms", self.glitch_step_ms, 1, 1000)?,
            steps: require_u16_range("--glitch-steps", self.glitch_steps, 1, 100)? as usize,
        };
        let scene = SceneConfig {
            rain,
            typing,
            blink_period: require_ms_range("--blink-ms", self.blink_ms, 50, 10_000)?,
            glitch,
            opacity: require_f32_range("--opacity", self.opacity, 0.0, 1.0)?,
        };

        let duration = match self.duration {
            Some(s) if !s.is_finite() => {
                return Err(ConfigError::NotFinite {
                    name: "--duration",
                    value: s,
                })
            }
            Some(s) if s > 0.0 => Some(Duration::from_secs_f64(require_f64_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            _ => None,
        };

        let glyphs = match &self.glyphs {
            Some(literal) => glyphs_from_literal(literal)?,
            None => build_glyphs(charset_from_str(&self.charset)?),
        };

        let defaults = HeroText::default();
        let text = HeroText {
            greeting: self.greeting.clone().unwrap_or(defaults.greeting),
            title: self.title.clone().unwrap_or(defaults.title),
            roles: if self.roles.is_empty() {
                defaults.roles
            } else {
                self.roles.clone()
            },
            tagline: match &self.tagline {
                Some(t) => Some(t.clone()),
                None => defaults.tagline,
            },
        };

        Ok(Settings {
            text,
            scene,
            glyphs,
            scheme: parse_color_scheme(&self.color)?,
            default_background: self.color_bg == ColorBg::DefaultBackground,
            duration,
        })
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSET PRESETS:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --charset.\x1b[0m");
    } else {
        println!("AVAILABLE CHARSET PRESETS:");
        println!("NOTE: Use only the VALUE (left side) with --charset.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("matrix       Half-width katakana + digits + A-Z + brackets (default)");
    println!("ascii        Letters + digits + punctuation");
    println!("katakana     Half-width katakana");
    println!("digits       Digits only (aliases: dec, decimal)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("symbols      Math symbols");
    println!("blocks       Block elements (shading blocks)");
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR THEMES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --color.\x1b[0m");
    } else {
        println!("AVAILABLE COLOR THEMES:");
        println!("NOTE: Use only the VALUE (left side) with --color.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("green        Green theme (alias: matrix, default)");
    println!("cyan         Cyan theme");
    println!("blue         Blue theme");
    println!("gold         Gold theme (alias: amber)");
    println!("red          Red theme");
    println!("purple       Purple theme");
    println!("neon         Neon theme (alias: synthwave)");
    println!("gray         Gray theme (alias: grey)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["glyphrain"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_effect_defaults() {
        let s = parse(&[]).settings().unwrap();
        assert_eq!(s.scene.rain, RainConfig::default());
        assert_eq!(s.scene.typing, TypingSpeeds::default());
        assert_eq!(s.scene.glitch, ScrambleConfig::default());
        assert_eq!(s.scene.blink_period, Duration::from_millis(1000));
        assert_eq!(s.scheme, ColorScheme::Green);
        assert_eq!(s.text.roles.len(), 4);
        assert!(s.duration.is_none());
        assert!(!s.default_background);
    }

    #[test]
    fn repeated_roles_replace_the_defaults() {
        let s = parse(&["-r", "Rustacean", "--role", "Tinkerer", "--tagline", ""])
            .settings()
            .unwrap();
        assert_eq!(s.text.roles, vec!["Rustacean", "Tinkerer"]);
        assert_eq!(s.text.tagline.as_deref(), Some(""));
    }

    #[test]
    fn out_of_range_values_name_the_flag() {
        let err = parse(&["--opacity", "1.5"]).settings().unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                name: "--opacity",
                value: 1.5,
                min: 0.0,
                max: 1.0
            }
        );
        assert_eq!(
            err.to_string(),
            "failed to apply --opacity 1.5 (min 0 max 1)"
        );

        assert!(parse(&["--rain-ms", "5"]).settings().is_err());
        assert!(parse(&["--glitch-steps", "0"]).settings().is_err());
    }

    #[test]
    fn non_positive_duration_disables_the_timer() {
        assert!(parse(&["--duration", "0"]).settings().unwrap().duration.is_none());
        assert_eq!(
            parse(&["--duration", "2.5"]).settings().unwrap().duration,
            Some(Duration::from_millis(2500))
        );
        assert!(parse(&["--duration", "0.01"]).settings().is_err());
    }

    #[test]
    fn glyph_literal_wins_over_charset() {
        let s = parse(&["--charset", "hex", "--glyphs", "0 1 0"]).settings().unwrap();
        assert_eq!(s.glyphs, vec!['0', '1']);

        let err = parse(&["--charset", "klingon"]).settings().unwrap_err();
        assert!(matches!(err, ConfigError::Charset(_)));
    }

    #[test]
    fn percentages_become_probabilities() {
        let s = parse(&["--reset-pct", "50", "--glitch-pct", "100"])
            .settings()
            .unwrap();
        assert!((s.scene.rain.reset_chance - 0.5).abs() < f32::EPSILON);
        assert!((s.scene.glitch.trigger_chance - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn color_flags() {
        assert_eq!(parse_color_scheme(" Grey "), Ok(ColorScheme::Gray));
        assert!(parse_color_scheme("rainbow").is_err());
        assert_eq!(parse_color_mode(256), Ok(ColorMode::Color256));
        assert_eq!(parse_color_mode(7), Err(ConfigError::ColorMode(7)));

        let a = parse(&["--color-bg", "default-background", "--resize-policy", "keep"]);
        let s = a.settings().unwrap();
        assert!(s.default_background);
        assert_eq!(s.scene.rain.resize_policy, ResizePolicy::Keep);
    }
}
