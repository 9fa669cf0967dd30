//! Simulation clock and polling timers.
//!
//! Nothing in the simulation sleeps. Cooldowns and lifetimes store a timestamp and are
//! polled against the monotonic [`SimClock`] once per tick.

use std::time::Duration;

use bevy::prelude::*;

/// Monotonic simulation time, advanced once per rendered frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    now: Duration,
    dt: f32,
    tick: u64,
}

impl SimClock {
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Seconds since the previous tick.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        self.dt = dt.as_secs_f32();
        self.tick += 1;
    }

    /// Jump to an absolute time without integrating anything (tests, scripted scenarios).
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

/// "At most once per `interval`" gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    interval: Duration,
    last: Option<Duration>,
}

impl Cooldown {
    pub fn from_secs(secs: f32) -> Self {
        Self { interval: Duration::from_secs_f32(secs.max(0.0)), last: None }
    }

    /// A cooldown that counts as just triggered at `now`.
    pub fn started_at(secs: f32, now: Duration) -> Self {
        Self { last: Some(now), ..Self::from_secs(secs) }
    }

    #[inline]
    pub fn ready(&self, now: Duration) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    #[inline]
    pub fn trigger(&mut self, now: Duration) {
        self.last = Some(now);
    }

    pub fn try_trigger(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.trigger(now);
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Self-destruct timer.
#[derive(Component, Debug, Clone, Copy)]
pub struct Lifetime {
    pub born: Duration,
    pub ttl: Duration,
}

impl Lifetime {
    pub fn new(born: Duration, ttl_secs: f32) -> Self {
        Self { born, ttl: Duration::from_secs_f32(ttl_secs.max(0.0)) }
    }

    #[inline]
    pub fn expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.born) > self.ttl
    }
}
