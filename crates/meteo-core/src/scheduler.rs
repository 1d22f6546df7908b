//! Cadence gates for the cooperative main loop
//!
//! Each periodic task owns a [`Cadence`]. The loop asks every cadence whether
//! it is due on each pass. A task that was starved for several periods fires
//! once and then waits a full period again, so missed ticks are coalesced
//! rather than replayed.

use core::time::Duration;

use crate::config::Cadences;

/// Period gate for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    last_run: Option<Duration>,
}

impl Cadence {
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            last_run: None,
        }
    }

    /// Returns `true` and records the run when the task should fire at `now`.
    ///
    /// A task that has never run is always due.
    pub fn poll(&mut self, now: Duration) -> bool {
        let due = match self.last_run {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.period,
        };
        if due {
            self.last_run = Some(now);
        }
        due
    }

    /// Forget the last run so the task fires on the next poll.
    pub fn expedite(&mut self) {
        self.last_run = None;
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn last_run(&self) -> Option<Duration> {
        self.last_run
    }
}

/// Tasks that fire on a pass of the main loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueTasks {
    pub sample_sensor: bool,
    pub update_leds: bool,
    pub recompute_stats: bool,
    pub update_display: bool,
}

/// Cadences of all periodic tasks of the station.
///
/// The staleness check and the button scan run on every pass and therefore
/// have no gate.
#[derive(Debug, Clone)]
pub struct Scheduler {
    sensor: Cadence,
    leds: Cadence,
    stats: Cadence,
    display: Cadence,
    tick: Duration,
}

impl Scheduler {
    pub fn new(cadences: &Cadences) -> Self {
        Self {
            sensor: Cadence::new(cadences.sensor_sample),
            leds: Cadence::new(cadences.led_update),
            stats: Cadence::new(cadences.stats_recompute),
            display: Cadence::new(cadences.display_update),
            tick: cadences.loop_tick,
        }
    }

    /// Evaluate every gate once for this pass.
    pub fn poll(&mut self, now: Duration) -> DueTasks {
        DueTasks {
            sample_sensor: self.sensor.poll(now),
            update_leds: self.leds.poll(now),
            recompute_stats: self.stats.poll(now),
            update_display: self.display.poll(now),
        }
    }

    /// Force a redraw on the next pass, used after a page switch.
    pub fn expedite_display(&mut self) {
        self.display.expedite();
    }

    /// Sleep between two passes of the main loop.
    pub fn tick(&self) -> Duration {
        self.tick
    }
}
