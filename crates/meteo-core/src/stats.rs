//! Daily statistics over the outdoor temperature history

use crate::history::TemperatureHistory;

/// Extremes and mean of the temperature history, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    pub day_max: f32,
    pub day_min: f32,
    pub day_avg: f32,
    /// Always `day_max - day_min`.
    pub variation: f32,
}

impl Statistics {
    /// Compute statistics from the whole history.
    ///
    /// Returns `None` for an empty history so the caller can keep the previous
    /// values.
    pub fn from_history(history: &TemperatureHistory) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let mut max = f32::MIN;
        let mut min = f32::MAX;
        let mut sum = 0.0_f64;

        for value in history.iter() {
            max = max.max(value);
            min = min.min(value);
            sum += f64::from(value);
        }

        // The mean is computed in f64 and clamped so rounding cannot push it
        // outside [min, max].
        let avg = ((sum / history.len() as f64) as f32).clamp(min, max);

        Some(Self {
            day_max: max,
            day_min: min,
            day_avg: avg,
            variation: max - min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_three_samples() {
        let mut history = TemperatureHistory::new();
        for t in [10.0, 20.0, 30.0] {
            history.push(t);
        }

        let stats = Statistics::from_history(&history).unwrap();
        assert_eq!(stats.day_min, 10.0);
        assert_eq!(stats.day_max, 30.0);
        assert_eq!(stats.day_avg, 20.0);
        assert_eq!(stats.variation, 20.0);
    }

    #[test]
    fn test_empty_history_has_no_stats() {
        assert_eq!(Statistics::from_history(&TemperatureHistory::new()), None);
    }

    #[test]
    fn test_single_sample_has_zero_variation() {
        let mut history = TemperatureHistory::new();
        history.push(-3.5);

        let stats = Statistics::from_history(&history).unwrap();
        assert_eq!(stats.day_min, -3.5);
        assert_eq!(stats.day_max, -3.5);
        assert_eq!(stats.day_avg, -3.5);
        assert_eq!(stats.variation, 0.0);
    }
}
