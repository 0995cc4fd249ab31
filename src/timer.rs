// Copyright (c) 2026 rezky_nightky

//! Deadline timers for the single-threaded effect loop.
//!
//! Nothing here sleeps or spawns. A component owns its timers, asks them
//! whether they are due with the current `Instant`, and reports the earliest
//! deadline so the event loop knows how long it may block on input.

use std::time::{Duration, Instant};

/// One-shot timer, re-armed by its owner after every firing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timeout {
    due: Option<Instant>,
}

impl Timeout {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Disarms and returns true once `now` reaches the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-rate timer. Missed periods are dropped rather than replayed.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }
        let mut following = next + self.period;
        if now >= following {
            following = now + self.period;
        }
        self.next = Some(following);
        true
    }
}

pub fn earliest<I>(deadlines: I) -> Option<Instant>
where
    I: IntoIterator<Item = Option<Instant>>,
{
    deadlines.into_iter().flatten().min()
}
