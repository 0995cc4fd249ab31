// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crossterm::style::Color;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use unicode_width::UnicodeWidthChar;

use crate::canvas::{Surface, TrailCanvas};
use crate::cell::Cell;
use crate::error::EffectError;
use crate::frame::Frame;
use crate::palette::{scheme_tones, Palette};
use crate::rain::{RainConfig, RainRenderer};
use crate::runtime::ColorScheme;
use crate::scramble::{GlitchText, ScrambleConfig};
use crate::timer::earliest;
use crate::typewriter::{TypeCycler, Typewriter, TypingSpeeds};

pub const PROMPT: &str = "> ";
pub const CARET: char = '█';

#[derive(Clone, Debug)]
pub struct HeroText {
    pub greeting: String,
    pub title: String,
    pub roles: Vec<String>,
    pub tagline: Option<String>,
}

impl Default for HeroText {
    fn default() -> Self {
        Self {
            greeting: "hi, i am".to_string(),
            title: "Anonymous".to_string(),
            roles: [
                "Full Stack Developer",
                "Ethical Hacker in Training",
                "Cybersecurity Enthusiast",
                "Builder of Secure Solutions",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            tagline: Some("Hack the planet!".to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    pub rain: RainConfig,
    pub typing: TypingSpeeds,
    pub blink_period: Duration,
    pub glitch: ScrambleConfig,
    /// Backdrop brightness, 0 hides the rain and 1 paints it at full colour.
    pub opacity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rain: RainConfig::default(),
            typing: TypingSpeeds::default(),
            blink_period: Duration::from_millis(1000),
            glitch: ScrambleConfig::default(),
            opacity: 0.5,
        }
    }
}

struct Span {
    text: String,
    fg: Option<Color>,
    bold: bool,
}

impl Span {
    fn new(text: impl Into<String>, fg: Option<Color>, bold: bool) -> Self {
        Self {
            text: text.into(),
            fg,
            bold,
        }
    }
}

type Line = Vec<Span>;

/// Columns `Frame::put_str` will actually fill for `text`.
fn cell_width(text: &str) -> u16 {
    let n = text.chars().filter(|c| c.width() == Some(1)).count();
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn line_width(line: &Line) -> u16 {
    line.iter()
        .fold(0u16, |acc, s| acc.saturating_add(cell_width(&s.text)))
}

/// The hero banner: rain backdrop with a greeting, a glitching title, a
/// typed role line and a tagline centred on top.
pub struct Hero {
    config: SceneConfig,
    palette: Palette,
    greeting: String,
    tagline: Option<String>,
    rain: RainRenderer<TrailCanvas>,
    title: GlitchText,
    roles: Typewriter,
}

impl Hero {
    pub fn new(
        text: HeroText,
        config: SceneConfig,
        palette: Palette,
        glyphs: Vec<char>,
        mt: &mut StdRng,
    ) -> Result<Self, EffectError> {
        let rain = RainRenderer::new(
            config.rain,
            palette.tones,
            glyphs,
            StdRng::from_rng(&mut *mt),
        )?;
        let title = GlitchText::new(&text.title, config.glitch, StdRng::from_rng(&mut *mt));
        let roles = Typewriter::new(
            TypeCycler::new(text.roles, config.typing)?,
            config.blink_period,
        );
        Ok(Self {
            config,
            palette,
            greeting: text.greeting,
            tagline: text.tagline.filter(|t| !t.is_empty()),
            rain,
            title,
            roles,
        })
    }

    /// Starts every effect from its initial state. `size` is the terminal
    /// size; without one the backdrop stays off and only text is drawn.
    pub fn mount(&mut self, now: Instant, size: Option<(u16, u16)>) {
        let canvas = size.map(|(w, h)| TrailCanvas::new(w, h, self.palette.tones.overlay));
        self.rain.mount(now, canvas);
        self.title.mount(now);
        self.roles.mount(now);
        info!(
            backdrop = self.rain.is_active(),
            columns = self.rain.column_count(),
            "scene: mounted"
        );
    }

    pub fn unmount(&mut self) {
        self.rain.unmount();
        self.title.unmount();
        self.roles.unmount();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.rain.resize(width, height);
    }

    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        self.palette.tones = scheme_tones(scheme);
        self.rain.set_tones(self.palette.tones);
    }

    pub fn rain(&self) -> &RainRenderer<TrailCanvas> {
        &self.rain
    }

    /// Delivers every due tick. Returns true when the frame needs a repaint.
    pub fn update(&mut self, now: Instant) -> bool {
        let rain = self.rain.update(now);
        let title = self.title.update(now);
        let roles = self.roles.update(now);
        rain || title || roles
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.rain.next_deadline(),
            self.title.next_deadline(),
            self.roles.next_deadline(),
        ])
    }

    pub fn render(&self, frame: &mut Frame) {
        self.render_backdrop(frame);

        let lines = self.lines();
        let block = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let top = frame.height.saturating_sub(block) / 2;
        let bg = self.palette.bg;

        for (row, line) in lines.iter().enumerate() {
            let y = top.saturating_add(row as u16);
            if y >= frame.height {
                break;
            }
            let mut x = frame.width.saturating_sub(line_width(line)) / 2;
            for span in line {
                x = frame.put_str(x, y, &span.text, bg, |_| (span.fg, span.bold));
            }
        }
    }

    fn render_backdrop(&self, frame: &mut Frame) {
        let (w, h) = match self.rain.surface() {
            Some(canvas) => {
                canvas.paint(frame, &self.palette, self.config.opacity);
                (canvas.width(), canvas.height())
            }
            None => (0, 0),
        };
        let blank = Cell::blank_with_bg(self.palette.bg);
        for y in 0..frame.height {
            for x in 0..frame.width {
                if x >= w || y >= h {
                    frame.set(x, y, blank);
                }
            }
        }
    }

    fn lines(&self) -> Vec<Line> {
        let tones = &self.palette.tones;
        let muted = self.palette.color(tones.muted);
        let base = self.palette.color(tones.base);
        let accent = self.palette.color(tones.accent);

        let mut lines = vec![
            vec![Span::new(self.greeting.as_str(), muted, false)],
            Vec::new(),
            self.title_line(),
            Vec::new(),
        ];

        let caret = if self.roles.caret_visible() { CARET } else { ' ' };
        lines.push(vec![
            Span::new(PROMPT, base, true),
            Span::new(self.roles.visible_text(), accent, false),
            Span::new(caret.to_string(), accent, false),
        ]);

        if let Some(tagline) = &self.tagline {
            lines.push(Vec::new());
            lines.push(vec![Span::new(tagline.as_str(), muted, false)]);
        }
        lines
    }

    /// Resolved chars keep the base colour; while glitching the rest
    /// alternate between the two glitch tints.
    fn title_line(&self) -> Line {
        let tones = &self.palette.tones;
        let base = self.palette.color(tones.base);
        let text = self.title.text();
        if !self.title.is_glitching() {
            return vec![Span::new(text.display(), base, true)];
        }

        let tint = [
            self.palette.color(tones.glitch_a),
            self.palette.color(tones.glitch_b),
        ];
        text.display_chars()
            .iter()
            .enumerate()
            .map(|(i, &ch)| {
                let fg = if i < text.locked() { base } else { tint[i % 2] };
                Span::new(ch.to_string(), fg, true)
            })
            .collect()
    }
}
