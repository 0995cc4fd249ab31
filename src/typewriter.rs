// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::EffectError;
use crate::timer::{earliest, Interval, Timeout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Growing,
    Shrinking,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingSpeeds {
    pub typing: Duration,
    pub deleting: Duration,
    /// Hold time once a candidate is fully typed.
    pub pause: Duration,
}

impl Default for TypingSpeeds {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(100),
            deleting: Duration::from_millis(50),
            pause: Duration::from_millis(2000),
        }
    }
}

fn prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Type-in / pause / delete-out loop over a fixed list of strings.
///
/// The visible text is always a prefix of the active candidate and changes
/// by at most one char per tick.
#[derive(Clone, Debug)]
pub struct TypeCycler {
    candidates: Vec<String>,
    speeds: TypingSpeeds,
    active: usize,
    visible_chars: usize,
    mode: Mode,
}

impl TypeCycler {
    pub fn new(candidates: Vec<String>, speeds: TypingSpeeds) -> Result<Self, EffectError> {
        if candidates.is_empty() {
            return Err(EffectError::NoCandidates);
        }
        Ok(Self {
            candidates,
            speeds,
            active: 0,
            visible_chars: 0,
            mode: Mode::Growing,
        })
    }

    pub fn reset(&mut self) {
        self.active = 0;
        self.visible_chars = 0;
        self.mode = Mode::Growing;
    }

    pub fn speeds(&self) -> TypingSpeeds {
        self.speeds
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_candidate(&self) -> &str {
        &self.candidates[self.active]
    }

    pub fn visible_text(&self) -> &str {
        prefix(self.active_candidate(), self.visible_chars)
    }

    /// Advances one step and returns how long to wait before the next one.
    pub fn tick(&mut self) -> Duration {
        let full = self.active_candidate().chars().count();
        match self.mode {
            Mode::Growing => {
                if self.visible_chars < full {
                    self.visible_chars += 1;
                }
                if self.visible_chars >= full {
                    self.mode = Mode::Shrinking;
                    self.speeds.pause
                } else {
                    self.speeds.typing
                }
            }
            Mode::Shrinking => {
                if self.visible_chars > 0 {
                    self.visible_chars -= 1;
                    self.speeds.deleting
                } else {
                    self.active = (self.active + 1) % self.candidates.len();
                    self.mode = Mode::Growing;
                    self.speeds.typing
                }
            }
        }
    }
}

/// Text cycler plus a blinking caret, each on its own timer.
pub struct Typewriter {
    cycler: TypeCycler,
    step: Timeout,
    blink: Interval,
    caret_visible: bool,
}

impl Typewriter {
    /// `blink_period` is one full on/off cycle of the caret.
    pub fn new(cycler: TypeCycler, blink_period: Duration) -> Self {
        Self {
            cycler,
            step: Timeout::default(),
            blink: Interval::new(blink_period / 2),
            caret_visible: true,
        }
    }

    pub fn mount(&mut self, now: Instant) {
        self.cycler.reset();
        self.caret_visible = true;
        self.step.arm(now, self.cycler.speeds().typing);
        self.blink.start(now);
        debug!("typewriter: mounted");
    }

    pub fn unmount(&mut self) {
        self.step.cancel();
        self.blink.cancel();
        self.cycler.reset();
        self.caret_visible = true;
    }

    pub fn update(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.step.fire(now) {
            let index = self.cycler.active_index();
            let delay = self.cycler.tick();
            if self.cycler.active_index() != index {
                trace!(index = self.cycler.active_index(), "typewriter: next candidate");
            }
            self.step.arm(now, delay);
            changed = true;
        }
        if self.blink.fire(now) {
            self.caret_visible = !self.caret_visible;
            changed = true;
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.step.deadline(), self.blink.deadline()])
    }

    pub fn visible_text(&self) -> &str {
        self.cycler.visible_text()
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn cycler(list: &[&str], speeds: TypingSpeeds) -> TypeCycler {
        TypeCycler::new(list.iter().map(|s| s.to_string()).collect(), speeds).unwrap()
    }

    fn unit_speeds() -> TypingSpeeds {
        TypingSpeeds {
            typing: Duration::from_millis(1),
            deleting: Duration::from_millis(1),
            pause: Duration::ZERO,
        }
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let r = TypeCycler::new(Vec::new(), TypingSpeeds::default());
        assert_eq!(r.err(), Some(EffectError::NoCandidates));
    }

    #[test]
    fn two_candidates_cycle_through_type_delete_advance() {
        let mut c = cycler(&["AB", "C"], unit_speeds());
        assert_eq!((c.active_index(), c.visible_text()), (0, ""));

        let expected = [
            (0, "A"),
            (0, "AB"),
            (0, "A"),
            (0, ""),
            (1, ""),
            (1, "C"),
            (1, ""),
            (0, ""),
            (0, "A"),
        ];
        for (i, want) in expected.iter().enumerate() {
            c.tick();
            assert_eq!((c.active_index(), c.visible_text()), *want, "tick {}", i + 1);
        }
    }

    #[test]
    fn text_changes_per_cycle_total_twice_the_candidate_lengths() {
        let list = ["hello", "ab", "wörld"];
        let mut c = cycler(&list, unit_speeds());
        let ticks: usize = list.iter().map(|s| 2 * s.chars().count() + 1).sum();

        let mut changes = 0;
        let mut prev = c.visible_text().to_string();
        for _ in 0..ticks {
            c.tick();
            if c.visible_text() != prev {
                changes += 1;
                prev = c.visible_text().to_string();
            }
        }
        assert_eq!(changes, 24);
        assert_eq!(c.active_index(), 0);
        assert_eq!(c.visible_text(), "");
        assert_eq!(c.mode, Mode::Growing);
    }

    #[test]
    fn delays_follow_the_mode() {
        let speeds = TypingSpeeds::default();
        let mut c = cycler(&["ab"], speeds);
        assert_eq!(c.tick(), speeds.typing);
        assert_eq!(c.tick(), speeds.pause);
        assert_eq!(c.mode, Mode::Shrinking);
        assert_eq!(c.tick(), speeds.deleting);
        assert_eq!(c.tick(), speeds.deleting);
        assert_eq!(c.tick(), speeds.typing);
        assert_eq!(c.mode, Mode::Growing);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let mut c = cycler(&["Développeur"], unit_speeds());
        c.tick();
        c.tick();
        assert_eq!(c.visible_text(), "Dé");
    }

    #[test]
    fn typewriter_waits_for_its_timers() {
        let t0 = Instant::now();
        let mut tw = Typewriter::new(
            cycler(&["xy"], TypingSpeeds::default()),
            Duration::from_millis(1000),
        );
        tw.mount(t0);
        assert!(tw.caret_visible());
        assert_eq!(tw.next_deadline(), Some(t0 + Duration::from_millis(100)));

        assert!(!tw.update(t0 + Duration::from_millis(99)));
        assert!(tw.update(t0 + Duration::from_millis(100)));
        assert_eq!(tw.visible_text(), "x");

        assert!(tw.update(t0 + Duration::from_millis(500)));
        assert!(!tw.caret_visible());
        assert_eq!(tw.visible_text(), "xy");
    }

    #[test]
    fn remount_starts_over() {
        let t0 = Instant::now();
        let mut tw = Typewriter::new(cycler(&["abc", "d"], unit_speeds()), Duration::from_secs(1));
        tw.mount(t0);
        for ms in 1..6 {
            tw.update(t0 + Duration::from_millis(ms));
        }
        assert_ne!(tw.visible_text(), "");

        tw.unmount();
        assert_eq!(tw.next_deadline(), None);
        assert!(!tw.update(t0 + Duration::from_secs(10)));

        tw.mount(t0);
        assert_eq!(tw.cycler.active_index(), 0);
        assert_eq!(tw.visible_text(), "");
        assert_eq!(tw.cycler.mode, Mode::Growing);
    }

    proptest! {
        #[test]
        fn visible_text_is_always_a_prefix_of_the_active_candidate(
            list in prop::collection::vec("[a-zé ]{0,8}", 1..5),
            steps in 0usize..400,
        ) {
            let mut c = TypeCycler::new(list, unit_speeds()).unwrap();
            let mut prev_len = 0usize;
            for _ in 0..steps {
                c.tick();
                prop_assert!(c.active_candidate().starts_with(c.visible_text()));
                let len = c.visible_text().chars().count();
                prop_assert!(len.abs_diff(prev_len) <= 1);
                prev_len = len;
            }
        }
    }
}
