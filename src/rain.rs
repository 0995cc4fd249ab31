// Copyright (c) 2026 rezky_nightky

//! Digital rain backdrop.
//!
//! Every column keeps one fall position. On each tick the whole surface is
//! faded a little toward the overlay colour, then each column draws a random
//! glyph at its position and moves down one row. A column that has left the
//! bottom edge restarts from the top only with a small probability, which
//! keeps the columns from falling in lockstep.

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
};
use tracing::{debug, info, trace, warn};

use crate::canvas::{Surface, Tone};
use crate::error::EffectError;
use crate::palette::Tones;
use crate::runtime::ResizePolicy;
use crate::timer::Interval;

pub const INITIAL_POSITION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainConfig {
    /// Width and height of one glyph cell, in surface cells.
    pub cell_size: u16,
    pub tick: Duration,
    /// Chance that a column past the bottom edge restarts on a given tick.
    pub reset_chance: f32,
    pub fade_alpha: f32,
    pub resize_policy: ResizePolicy,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            cell_size: 1,
            tick: Duration::from_millis(50),
            reset_chance: 0.025,
            fade_alpha: 0.05,
            resize_policy: ResizePolicy::Reflow,
        }
    }
}

/// Brightness band a draw landed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Bright,
    Accent,
    Base,
}

/// Maps a uniform roll in `[0, 1)` to a draw tone: the top 5% of rolls are
/// bright, the next 15% accent, the rest base colour at opacity 0.3..0.7.
pub fn pick_tone(roll: f32, tones: &Tones) -> (Band, Tone) {
    if roll > 0.95 {
        (Band::Bright, Tone::solid(tones.bright))
    } else if roll > 0.8 {
        (Band::Accent, Tone::solid(tones.accent))
    } else {
        (
            Band::Base,
            Tone {
                rgb: tones.base,
                alpha: 0.3 + roll * 0.5,
            },
        )
    }
}

pub fn column_count(width: u16, cell_size: u16) -> usize {
    (width / cell_size.max(1)) as usize
}

pub struct RainRenderer<S: Surface> {
    config: RainConfig,
    tones: Tones,
    glyphs: Vec<char>,
    surface: Option<S>,
    positions: Vec<u32>,
    ticker: Interval,
    ticks: u64,

    mt: StdRng,
    rand_glyph: Uniform<usize>,
    rand_chance: Uniform<f32>,
}

impl<S: Surface> RainRenderer<S> {
    pub fn new(
        config: RainConfig,
        tones: Tones,
        glyphs: Vec<char>,
        mt: StdRng,
    ) -> Result<Self, EffectError> {
        let rand_glyph =
            Uniform::new(0, glyphs.len()).map_err(|_| EffectError::EmptyGlyphSet)?;
        Ok(Self {
            ticker: Interval::new(config.tick),
            config,
            tones,
            glyphs,
            surface: None,
            positions: Vec::new(),
            ticks: 0,
            mt,
            rand_glyph,
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
        })
    }

    /// Takes ownership of the drawing surface and starts ticking. Without a
    /// usable surface the renderer stays idle and draws nothing.
    pub fn mount(&mut self, now: Instant, surface: Option<S>) {
        self.unmount();

        let Some(surface) = surface.filter(|s| s.width() > 0 && s.height() > 0) else {
            warn!("rain: no drawing surface available, backdrop disabled");
            return;
        };

        let columns = column_count(surface.width(), self.config.cell_size);
        self.positions = vec![INITIAL_POSITION; columns];
        info!(
            width = surface.width(),
            height = surface.height(),
            columns,
            "rain: mounted"
        );
        self.surface = Some(surface);
        self.ticker.start(now);
    }

    pub fn unmount(&mut self) {
        if self.surface.is_some() {
            debug!(ticks = self.ticks, "rain: unmounted");
        }
        self.ticker.cancel();
        self.surface = None;
        self.positions.clear();
        self.ticks = 0;
    }

    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn column_count(&self) -> usize {
        self.positions.len()
    }

    pub fn set_tones(&mut self, tones: Tones) {
        self.tones = tones;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.ticker.deadline()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(width, height);

        if self.config.resize_policy == ResizePolicy::Reflow {
            let columns = column_count(width, self.config.cell_size);
            self.positions.resize(columns, INITIAL_POSITION);
        }
        debug!(
            width,
            height,
            columns = self.positions.len(),
            policy = ?self.config.resize_policy,
            "rain: resized"
        );
    }

    /// Runs a tick if one is due. Returns true when the surface changed.
    pub fn update(&mut self, now: Instant) -> bool {
        if !self.ticker.fire(now) {
            return false;
        }
        self.tick();
        true
    }

    pub fn tick(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        surface.fade(self.tones.overlay, self.config.fade_alpha);

        let cell = self.config.cell_size.max(1) as u32;
        let bottom = surface.height() as u32;
        for (i, pos) in self.positions.iter_mut().enumerate() {
            let glyph = self.glyphs[self.rand_glyph.sample(&mut self.mt)];
            let (_, tone) = pick_tone(self.rand_chance.sample(&mut self.mt), &self.tones);

            let x = (i as u32).saturating_mul(cell);
            let y = pos.saturating_mul(cell);
            surface.draw_glyph(x, y, glyph, tone);

            if y > bottom && self.rand_chance.sample(&mut self.mt) < self.config.reset_chance {
                *pos = 0;
            }
            *pos = pos.saturating_add(1);
        }

        self.ticks += 1;
        trace!(tick = self.ticks, "rain: tick");
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::palette::{scheme_tones, Rgb};
    use crate::runtime::ColorScheme;

    #[derive(Default)]
    struct Recorder {
        width: u16,
        height: u16,
        fades: usize,
        draws: Vec<(u32, u32, char, Tone)>,
    }

    impl Recorder {
        fn sized(width: u16, height: u16) -> Self {
            Self {
                width,
                height,
                ..Self::default()
            }
        }
    }

    impl Surface for Recorder {
        fn width(&self) -> u16 {
            self.width
        }
        fn height(&self) -> u16 {
            self.height
        }
        fn resize(&mut self, width: u16, height: u16) {
            self.width = width;
            self.height = height;
        }
        fn fade(&mut self, _overlay: Rgb, _alpha: f32) {
            self.fades += 1;
        }
        fn draw_glyph(&mut self, x: u32, y: u32, ch: char, tone: Tone) {
            self.draws.push((x, y, ch, tone));
        }
    }

    fn renderer(config: RainConfig) -> RainRenderer<Recorder> {
        RainRenderer::new(
            config,
            scheme_tones(ColorScheme::Green),
            vec!['a', 'b', 'c'],
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    #[test]
    fn empty_glyph_set_is_rejected() {
        let r = RainRenderer::<Recorder>::new(
            RainConfig::default(),
            scheme_tones(ColorScheme::Green),
            Vec::new(),
            StdRng::seed_from_u64(1),
        );
        assert!(matches!(r, Err(EffectError::EmptyGlyphSet)));
    }

    #[test]
    fn mount_sizes_columns_from_width_and_cell_size() {
        let mut rain = renderer(RainConfig {
            cell_size: 14,
            ..RainConfig::default()
        });
        rain.mount(Instant::now(), Some(Recorder::sized(140, 70)));
        assert_eq!(rain.column_count(), 10);
        assert!(rain.positions.iter().all(|&p| p == INITIAL_POSITION));
        assert!(rain.next_deadline().is_some());
    }

    #[test]
    fn missing_or_empty_surface_makes_the_renderer_inert() {
        let t0 = Instant::now();
        let mut rain = renderer(RainConfig::default());

        rain.mount(t0, None);
        assert!(!rain.is_active());
        assert_eq!(rain.next_deadline(), None);
        assert!(!rain.update(t0 + Duration::from_secs(1)));

        rain.mount(t0, Some(Recorder::sized(0, 24)));
        assert!(!rain.is_active());
        rain.tick();
        rain.resize(80, 24);
        assert_eq!(rain.column_count(), 0);
    }

    #[test]
    fn tick_fades_then_draws_one_glyph_per_column() {
        let mut rain = renderer(RainConfig {
            cell_size: 2,
            ..RainConfig::default()
        });
        rain.mount(Instant::now(), Some(Recorder::sized(8, 20)));
        rain.tick();

        let s = rain.surface().unwrap();
        assert_eq!(s.fades, 1);
        assert_eq!(s.draws.len(), 4);
        for (i, (x, y, ch, _)) in s.draws.iter().enumerate() {
            assert_eq!(*x, i as u32 * 2);
            assert_eq!(*y, INITIAL_POSITION * 2);
            assert!(['a', 'b', 'c'].contains(ch));
        }
        assert!(rain.positions.iter().all(|&p| p == INITIAL_POSITION + 1));
    }

    #[test]
    fn update_ticks_on_the_configured_period() {
        let t0 = Instant::now();
        let mut rain = renderer(RainConfig::default());
        rain.mount(t0, Some(Recorder::sized(4, 4)));

        assert!(!rain.update(t0 + Duration::from_millis(49)));
        assert!(rain.update(t0 + Duration::from_millis(50)));
        assert!(!rain.update(t0 + Duration::from_millis(60)));
        assert!(rain.update(t0 + Duration::from_millis(100)));
        assert_eq!(rain.surface().unwrap().fades, 2);
    }

    #[test]
    fn positions_only_advance_by_one_or_restart_at_the_top() {
        let mut rain = renderer(RainConfig::default());
        rain.mount(Instant::now(), Some(Recorder::sized(30, 6)));

        let mut restarts = 0;
        for _ in 0..3000 {
            let before = rain.positions.to_vec();
            rain.tick();
            for (old, new) in before.iter().zip(&rain.positions) {
                if *new == 1 {
                    assert!(*old > 6, "restart before leaving the surface: {old}");
                    restarts += 1;
                } else {
                    assert_eq!(*new, old + 1);
                }
            }
            assert_eq!(rain.positions.len(), 30);
        }
        assert!(restarts > 0);
    }

    #[test]
    fn brightness_bands_follow_their_probabilities() {
        let tones = scheme_tones(ColorScheme::Green);
        let mut rain = renderer(RainConfig::default());
        rain.mount(Instant::now(), Some(Recorder::sized(100, 200)));
        for _ in 0..100 {
            rain.tick();
        }

        let draws = &rain.surface().unwrap().draws;
        assert_eq!(draws.len(), 10_000);
        let (mut bright, mut accent, mut base) = (0usize, 0usize, 0usize);
        for (_, _, _, tone) in draws {
            if tone.alpha < 1.0 {
                assert!((0.3..=0.7).contains(&tone.alpha));
                assert_eq!(tone.rgb, tones.base);
                base += 1;
            } else if tone.rgb == tones.bright {
                bright += 1;
            } else {
                assert_eq!(tone.rgb, tones.accent);
                accent += 1;
            }
        }
        let frac = |n: usize| n as f64 / draws.len() as f64;
        assert!((0.03..=0.07).contains(&frac(bright)), "bright {}", frac(bright));
        assert!((0.12..=0.18).contains(&frac(accent)), "accent {}", frac(accent));
        assert!((0.76..=0.84).contains(&frac(base)), "base {}", frac(base));
    }

    #[test]
    fn pick_tone_band_edges() {
        let tones = scheme_tones(ColorScheme::Green);
        assert_eq!(pick_tone(0.96, &tones).0, Band::Bright);
        assert_eq!(pick_tone(0.95, &tones).0, Band::Accent);
        assert_eq!(pick_tone(0.81, &tones).0, Band::Accent);
        assert_eq!(pick_tone(0.8, &tones).0, Band::Base);
        let (_, tone) = pick_tone(0.0, &tones);
        assert!((tone.alpha - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn keep_policy_leaves_columns_alone_on_resize() {
        let mut rain = renderer(RainConfig {
            resize_policy: ResizePolicy::Keep,
            ..RainConfig::default()
        });
        rain.mount(Instant::now(), Some(Recorder::sized(10, 5)));
        rain.resize(4, 5);
        assert_eq!(rain.column_count(), 10);
        assert_eq!(rain.surface().unwrap().width(), 4);

        rain.tick();
        let xs: Vec<u32> = rain.surface().unwrap().draws.iter().map(|d| d.0).collect();
        assert_eq!(xs.len(), 10);
        assert_eq!(xs.last(), Some(&9));
    }

    #[test]
    fn reflow_policy_recomputes_columns_and_keeps_survivors() {
        let mut rain = renderer(RainConfig::default());
        rain.mount(Instant::now(), Some(Recorder::sized(5, 50)));
        for _ in 0..3 {
            rain.tick();
        }
        assert!(rain.positions.iter().all(|&p| p == 4));

        rain.resize(8, 50);
        assert_eq!(rain.positions, [4, 4, 4, 4, 4, 1, 1, 1]);

        rain.resize(2, 50);
        assert_eq!(rain.positions, [4, 4]);
    }

    #[test]
    fn remount_restores_initial_positions() {
        let t0 = Instant::now();
        let mut rain = renderer(RainConfig::default());
        rain.mount(t0, Some(Recorder::sized(6, 40)));
        for _ in 0..5 {
            rain.tick();
        }
        rain.unmount();
        assert!(!rain.is_active());
        assert_eq!(rain.next_deadline(), None);

        rain.mount(t0, Some(Recorder::sized(6, 40)));
        assert_eq!(rain.positions, [1; 6]);
        assert!(rain.surface().unwrap().draws.is_empty());
    }
}
