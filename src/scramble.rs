// Copyright (c) 2026 rezky_nightky

//! Glitching label.
//!
//! A slow trigger timer occasionally starts an episode. During an episode a
//! fast timer re-renders the label: the first `k` chars are the real text,
//! the rest are decoys, and spaces always stay spaces. When `k` passes the
//! step count the label snaps back to the source text.

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
};
use tracing::debug;

use crate::timer::{earliest, Interval};

pub const DECOYS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '-', '=', '[', ']', '{', '}', '|',
    ';', ':', ',', '.', '<', '>', '?', '/', '~', '`',
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrambleConfig {
    pub trigger_every: Duration,
    pub trigger_chance: f32,
    pub step_every: Duration,
    pub steps: usize,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            trigger_every: Duration::from_millis(3000),
            trigger_chance: 0.05,
            step_every: Duration::from_millis(30),
            steps: 10,
        }
    }
}

/// Text state of one label: the source, what is shown, and how many leading
/// chars are locked to the source.
#[derive(Clone, Debug)]
pub struct Scramble {
    source: Vec<char>,
    display: Vec<char>,
    locked: usize,
}

impl Scramble {
    pub fn new(text: &str) -> Self {
        let source: Vec<char> = text.chars().collect();
        Self {
            display: source.clone(),
            source,
            locked: 0,
        }
    }

    pub fn display(&self) -> String {
        self.display.iter().collect()
    }

    pub fn display_chars(&self) -> &[char] {
        &self.display
    }

    pub fn locked(&self) -> usize {
        self.locked
    }

    /// Renders step `k` of an episode: chars before `k` resolved, later
    /// non-space chars replaced by `decoy()`.
    pub fn render_step<F>(&mut self, k: usize, mut decoy: F)
    where
        F: FnMut() -> char,
    {
        self.locked = k.min(self.source.len());
        for (i, (out, &src)) in self.display.iter_mut().zip(&self.source).enumerate() {
            *out = if i < k || src == ' ' { src } else { decoy() };
        }
    }

    pub fn resolve(&mut self) {
        self.display.copy_from_slice(&self.source);
        self.locked = 0;
    }
}

/// A scramble label driven by its trigger and step timers.
pub struct GlitchText {
    config: ScrambleConfig,
    text: Scramble,
    trigger: Interval,
    step: Interval,
    /// Next step index while an episode runs.
    episode: Option<usize>,
    episodes: u64,

    mt: StdRng,
    rand_chance: Uniform<f32>,
    rand_decoy: Uniform<usize>,
}

impl GlitchText {
    pub fn new(text: &str, config: ScrambleConfig, mt: StdRng) -> Self {
        Self {
            trigger: Interval::new(config.trigger_every),
            step: Interval::new(config.step_every),
            config,
            text: Scramble::new(text),
            episode: None,
            episodes: 0,
            mt,
            rand_chance: Uniform::new(0.0, 1.0).expect("valid range"),
            rand_decoy: Uniform::new(0, DECOYS.len()).expect("valid range"),
        }
    }

    pub fn mount(&mut self, now: Instant) {
        self.end_episode();
        self.episodes = 0;
        self.trigger.start(now);
    }

    pub fn unmount(&mut self) {
        debug!(episodes = self.episodes, "glitch: unmounted");
        self.trigger.cancel();
        self.end_episode();
    }

    pub fn is_glitching(&self) -> bool {
        self.episode.is_some()
    }

    pub fn text(&self) -> &Scramble {
        &self.text
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.trigger.deadline(), self.step.deadline()])
    }

    /// Starts an episode now unless one is already running.
    pub fn start_episode(&mut self, now: Instant) -> bool {
        if self.episode.is_some() {
            return false;
        }
        self.episode = Some(0);
        self.episodes += 1;
        self.step.start(now);
        debug!(episode = self.episodes, "glitch: episode started");
        true
    }

    fn end_episode(&mut self) {
        self.step.cancel();
        self.episode = None;
        self.text.resolve();
    }

    fn advance_episode(&mut self) {
        let Some(k) = self.episode else {
            return;
        };
        let (mt, dist) = (&mut self.mt, &self.rand_decoy);
        self.text.render_step(k, || DECOYS[dist.sample(&mut *mt)]);
        if k + 1 > self.config.steps {
            self.end_episode();
        } else {
            self.episode = Some(k + 1);
        }
    }

    pub fn update(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.trigger.fire(now) && self.episode.is_none() {
            let roll = self.rand_chance.sample(&mut self.mt);
            if roll < self.config.trigger_chance {
                changed |= self.start_episode(now);
            }
        }
        if self.step.fire(now) {
            self.advance_episode();
            changed = true;
        }
        changed
    }
}
