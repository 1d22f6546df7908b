//! Host system information for the stats page
//!
//! The parsers take the text of the usual Linux files so they can be used
//! (and tested) without touching `/proc`.

use core::time::Duration;

/// Snapshot of the host's load and health.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemInfo {
    pub cpu_percent: f32,
    pub ram_percent: f32,
    /// SoC temperature in °C, when a thermal zone is available.
    pub cpu_temperature: Option<f32>,
    pub uptime: Duration,
}

/// Render an uptime as `Xd Yh Zm`.
pub fn format_uptime(uptime: Duration) -> String {
    let minutes = uptime.as_secs() / 60;
    let days = minutes / (24 * 60);
    let hours = (minutes / 60) % 24;
    format!("{}d {}h {}m", days, hours, minutes % 60)
}

/// Cumulative CPU time counters from the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub idle: u64,
    pub total: u64,
}

impl CpuTimes {
    pub fn parse(stat: &str) -> Option<Self> {
        let line = stat.lines().find(|line| line.starts_with("cpu "))?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        if fields.len() < 4 {
            return None;
        }

        // idle + iowait
        let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
        Some(Self {
            idle,
            total: fields.iter().sum(),
        })
    }

    /// Busy percentage between an earlier sample and this one.
    pub fn usage_since(&self, earlier: &CpuTimes) -> f32 {
        let total = self.total.saturating_sub(earlier.total);
        if total == 0 {
            return 0.0;
        }
        let idle = self.idle.saturating_sub(earlier.idle);
        (100.0 * (1.0 - idle as f64 / total as f64)) as f32
    }
}

/// Used memory percentage from `/proc/meminfo`.
pub fn parse_meminfo(meminfo: &str) -> Option<f32> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|value| value.parse().ok())
    };

    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    if total == 0 {
        return None;
    }
    Some((100.0 * (1.0 - available as f64 / total as f64)) as f32)
}

/// Temperature in °C from a thermal zone file holding millidegrees.
pub fn parse_thermal_zone(text: &str) -> Option<f32> {
    let millidegrees: i64 = text.trim().parse().ok()?;
    Some(millidegrees as f32 / 1000.0)
}

/// Uptime from the first field of `/proc/uptime`.
pub fn parse_uptime(text: &str) -> Option<Duration> {
    let seconds: f64 = text.split_whitespace().next()?.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        let uptime = Duration::from_secs(2 * 86_400 + 14 * 3_600 + 32 * 60 + 59);
        assert_eq!(format_uptime(uptime), "2d 14h 32m");
        assert_eq!(format_uptime(Duration::ZERO), "0d 0h 0m");
    }

    #[test]
    fn test_cpu_usage_between_samples() {
        let before = CpuTimes::parse("cpu  100 0 100 700 100 0 0 0 0 0\ncpu0 1 2 3 4\n").unwrap();
        let after = CpuTimes::parse("cpu  150 0 150 750 100 0 0 0 0 0\n").unwrap();

        assert_eq!(before, CpuTimes { idle: 800, total: 1000 });
        assert!((after.usage_since(&before) - 66.666).abs() < 0.01);
        assert_eq!(after.usage_since(&after), 0.0);
    }

    #[test]
    fn test_meminfo() {
        let meminfo = "MemTotal:        1000 kB\nMemFree:          100 kB\nMemAvailable:     330 kB\n";
        assert!((parse_meminfo(meminfo).unwrap() - 67.0).abs() < 0.01);
        assert_eq!(parse_meminfo("MemTotal: 10 kB\n"), None);
    }

    #[test]
    fn test_thermal_and_uptime() {
        assert_eq!(parse_thermal_zone("55000\n"), Some(55.0));
        assert_eq!(parse_thermal_zone("n/a"), None);
        assert_eq!(parse_uptime("3600.50 7000.00\n"), Some(Duration::from_secs_f64(3600.5)));
    }
}
