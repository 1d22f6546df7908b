//! Bounded outdoor temperature history
//!
//! Holds the last [`HISTORY_CAPACITY`] outdoor temperatures in arrival order.
//! Inserting into a full history evicts the oldest sample. The history lives
//! only in memory and feeds the daily statistics and the stats page strip.

use heapless::Deque;

use crate::config::HISTORY_CAPACITY;
use crate::trend::{HISTORY_TREND_DEADBAND, Trend};

/// Samples per half when comparing recent and older temperatures.
const TREND_WINDOW: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct TemperatureHistory {
    samples: Deque<f32, HISTORY_CAPACITY>,
}

impl TemperatureHistory {
    pub fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// Non-finite values are ignored.
    pub fn push(&mut self, temperature: f32) {
        if !temperature.is_finite() {
            return;
        }
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Cannot fail: a slot was freed above when the buffer was full.
        let _ = self.samples.push_back(temperature);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Compare the mean of the newest six samples against the six before.
    ///
    /// Histories shorter than twelve samples report [`Trend::Stable`].
    pub fn overall_trend(&self) -> Trend {
        let len = self.samples.len();
        if len < TREND_WINDOW * 2 {
            return Trend::Stable;
        }

        let older_start = len - TREND_WINDOW * 2;
        let recent_start = len - TREND_WINDOW;

        let mut older = 0.0;
        let mut recent = 0.0;
        for (i, value) in self.iter().enumerate() {
            if i >= recent_start {
                recent += value;
            } else if i >= older_start {
                older += value;
            }
        }

        let window = TREND_WINDOW as f32;
        Trend::from_delta(recent / window - older / window, HISTORY_TREND_DEADBAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_arrival_order() {
        let mut history = TemperatureHistory::new();
        for t in [10.0, 20.0, 30.0] {
            history.push(t);
        }

        assert_eq!(history.iter().collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
        assert_eq!(history.latest(), Some(30.0));
    }

    #[test]
    fn test_history_evicts_oldest_when_full() {
        let mut history = TemperatureHistory::new();
        for i in 0..30 {
            history.push(i as f32);
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        let values: Vec<f32> = history.iter().collect();
        assert_eq!(values.first(), Some(&6.0));
        assert_eq!(values.last(), Some(&29.0));
    }

    #[test]
    fn test_overall_trend_needs_twelve_samples() {
        let mut history = TemperatureHistory::new();
        for i in 0..11 {
            history.push(i as f32);
        }
        assert_eq!(history.overall_trend(), Trend::Stable);

        history.push(11.0);
        assert_eq!(history.overall_trend(), Trend::Up);
    }

    #[test]
    fn test_overall_trend_falling() {
        let mut history = TemperatureHistory::new();
        for _ in 0..6 {
            history.push(20.0);
        }
        for _ in 0..6 {
            history.push(18.0);
        }
        assert_eq!(history.overall_trend(), Trend::Down);
    }

    #[test]
    fn test_non_finite_samples_are_ignored() {
        let mut history = TemperatureHistory::new();
        history.push(f32::NAN);
        history.push(f32::INFINITY);
        assert!(history.is_empty());
    }
}
