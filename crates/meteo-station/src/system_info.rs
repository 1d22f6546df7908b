//! `/proc` and sysfs backed [`SystemMonitor`].

use std::fs;

use log::debug;
use meteo_core::hardware::SystemMonitor;
use meteo_core::system::{CpuTimes, SystemInfo, parse_meminfo, parse_thermal_zone, parse_uptime};

pub struct ProcSystemMonitor {
    thermal_zone: &'static str,
    previous: Option<CpuTimes>,
}

impl ProcSystemMonitor {
    pub fn new(thermal_zone: &'static str) -> Self {
        Self {
            thermal_zone,
            previous: None,
        }
    }
}

fn read(path: &str) -> Option<String> {
    fs::read_to_string(path)
        .map_err(|e| debug!("Cannot read {}: {}", path, e))
        .ok()
}

impl SystemMonitor for ProcSystemMonitor {
    fn sample(&mut self) -> SystemInfo {
        let cpu = read("/proc/stat").and_then(|text| CpuTimes::parse(&text));
        let cpu_percent = match (cpu, self.previous) {
            (Some(now), Some(before)) => now.usage_since(&before),
            _ => 0.0,
        };
        if cpu.is_some() {
            self.previous = cpu;
        }

        SystemInfo {
            cpu_percent,
            ram_percent: read("/proc/meminfo")
                .and_then(|text| parse_meminfo(&text))
                .unwrap_or(0.0),
            cpu_temperature: read(self.thermal_zone).and_then(|text| parse_thermal_zone(&text)),
            uptime: read("/proc/uptime")
                .and_then(|text| parse_uptime(&text))
                .unwrap_or_default(),
        }
    }
}
