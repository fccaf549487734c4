//! Simulation time model.
//!
//! # Design
//!
//! Time is a step counter plus a floating-point clock in seconds.  In
//! fast-time mode the two are locked together:
//!
//!   current_time = t0 + count * dt
//!
//! The product is recomputed on every advance rather than accumulated, so the
//! relation holds exactly no matter how many ticks have elapsed.
//!
//! In wall-clock mode the clock follows real time: a tick happens only once
//! at least `dt` real seconds have passed since the previous one, and the
//! actual elapsed delta becomes that tick's width.

use std::fmt;

use crate::{AvError, AvResult};

// ── ClockMode ─────────────────────────────────────────────────────────────────

/// How the clock decides when a tick happens and how wide it is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockMode {
    /// Fixed-width ticks, as fast as the host can compute them.
    #[default]
    FastTime,
    /// Variable-width ticks paced by the host's monotonic clock.
    WallClock,
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Step counter and simulation time in seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulation time at count 0, seconds.
    pub t0: f64,
    /// Nominal tick width, seconds.
    pub dt: f64,
    /// Number of ticks taken so far.
    pub count: u64,
    /// Simulation time of the latest tick, seconds.
    pub current_time: f64,
    pub mode: ClockMode,
}

impl SimClock {
    pub fn new(t0: f64, dt: f64, mode: ClockMode) -> Self {
        Self {
            t0,
            dt,
            count: 0,
            current_time: t0,
            mode,
        }
    }

    /// Take one fixed-width tick.  Returns the tick width (always `dt`).
    #[inline]
    pub fn advance(&mut self) -> f64 {
        self.count += 1;
        self.current_time = self.t0 + self.count as f64 * self.dt;
        self.dt
    }

    /// Wall-clock tick: advance to `now` if at least `dt` has passed since
    /// the last tick.
    ///
    /// Returns the effective tick width (`now - previous time`) when the tick
    /// was taken, `None` otherwise.
    pub fn advance_to(&mut self, now: f64) -> Option<f64> {
        let delta = now - self.current_time;
        if delta < self.dt {
            return None;
        }
        self.count += 1;
        self.current_time = now;
        Some(delta)
    }

    /// Simulated seconds since `t0`.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.current_time - self.t0
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} t={:.3}s", self.count, self.current_time)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON scenario file by the application crate and
/// passed to the environment builder.  Every field has a default, so a
/// scenario only needs to name what it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulation time of the first tick's origin, seconds.
    pub t0: f64,

    /// Tick width, seconds.  Must be positive.  Default: 0.05.
    pub dt: f64,

    /// `true` for fixed-width fast-time ticks, `false` to pace ticks by the
    /// host clock.
    pub fast_time: bool,

    /// Global limit on elapsed simulation time.  `None` runs until every
    /// agent completes its mission.
    pub time_limit: Option<f64>,

    /// Seed for the channel's reception RNG and the uncertainty filters.
    /// The same seed always produces identical results in fast-time mode.
    pub seed: u64,

    /// Report a vehicle snapshot to observers every N ticks.  0 disables
    /// snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            t0:                    0.0,
            dt:                    0.05,
            fast_time:             true,
            time_limit:            None,
            seed:                  0,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// Reject values that would make the tick loop meaningless.
    ///
    /// A zero or negative `dt` would let the wall-clock loop spin forever
    /// without ever taking a tick.
    pub fn validate(&self) -> AvResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(AvError::Config(format!("dt must be positive, got {}", self.dt)));
        }
        if !self.t0.is_finite() {
            return Err(AvError::Config(format!("t0 must be finite, got {}", self.t0)));
        }
        if let Some(limit) = self.time_limit {
            if !(limit >= 0.0) {
                return Err(AvError::Config(format!(
                    "time_limit must be non-negative, got {limit}"
                )));
            }
        }
        Ok(())
    }

    pub fn clock_mode(&self) -> ClockMode {
        if self.fast_time { ClockMode::FastTime } else { ClockMode::WallClock }
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.t0, self.dt, self.clock_mode())
    }
}
