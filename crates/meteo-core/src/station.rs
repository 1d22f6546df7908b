//! The cooperative main loop
//!
//! Each pass of [`Station::tick`] runs, in order:
//!
//! 1. button scan (every pass)
//! 2. remote staleness check (every pass)
//! 3. local sensor sample (30 s)
//! 4. LED update (5 s)
//! 5. statistics recompute (300 s)
//! 6. display update (2 s, or right after a page switch)
//!
//! [`Station::run`] repeats passes with a short sleep in between until the
//! stop flag is raised. The bus worker writes to the same [`DataStore`] from
//! another thread; the loop only ever holds the lock for a snapshot or a
//! single update, never across hardware I/O.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::{debug, error, info};

use crate::button::ButtonDebouncer;
use crate::clock::Clock;
use crate::config::StationConfig;
use crate::display_manager::DisplayManager;
use crate::hardware::Hardware;
use crate::leds::LedFrame;
use crate::sampler::LocalSampler;
use crate::scheduler::{DueTasks, Scheduler};
use crate::store::DataStore;
use crate::system::SystemInfo;
use crate::ui::{Label, PageId};

/// What happened during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pass {
    pub now: Duration,
    pub due: DueTasks,
    /// A button press switched the page.
    pub page_toggled: bool,
    /// The staleness check took the outdoor node offline.
    pub remote_cleared: bool,
}

pub struct Station<H> {
    config: StationConfig,
    hardware: H,
    store: DataStore,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    sampler: LocalSampler,
    button: ButtonDebouncer,
    display: DisplayManager,
    system: SystemInfo,
    last_leds: Option<LedFrame>,
}

impl<H: Hardware> Station<H> {
    pub fn new(config: StationConfig, hardware: H, store: DataStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            scheduler: Scheduler::new(&config.cadences),
            button: ButtonDebouncer::new(config.cadences.button_debounce),
            display: DisplayManager::new(&config.display, &config.colors),
            sampler: LocalSampler::new(),
            system: SystemInfo::default(),
            last_leds: None,
            config,
            hardware,
            store,
            clock,
        }
    }

    /// Run one pass of the main loop.
    pub fn tick(&mut self) -> Pass {
        let now = self.clock.now();
        let mut pass = Pass {
            now,
            ..Pass::default()
        };

        let pressed = self.hardware.button_pressed(now);
        if self.button.update(pressed, now) {
            let page = self.display.toggle_page();
            self.scheduler.expedite_display();
            debug!("Button press at {:?}, showing {:?}", now, page);
            pass.page_toggled = true;
        }

        pass.due = self.scheduler.poll(now);

        // Before the LEDs, so a link that just went stale shows as offline.
        pass.remote_cleared = self
            .store
            .maybe_clear_remote_online(now, self.config.thresholds.remote_stale_window);

        if pass.due.sample_sensor {
            let result = self.hardware.read_sensor();
            self.sampler.record(result, now, &self.store);
        }

        if pass.due.update_leds {
            self.update_leds(now);
        }

        if pass.due.recompute_stats {
            match self.store.recompute_stats() {
                Some(stats) => debug!(
                    "Statistics: max {:.1} min {:.1} avg {:.1}",
                    stats.day_max, stats.day_min, stats.day_avg
                ),
                None => debug!("No outdoor history yet, statistics unknown"),
            }
        }

        if pass.due.update_display {
            self.update_display(now);
        }

        pass
    }

    fn update_leds(&mut self, now: Duration) {
        let remote = self.store.snapshot().remote;
        let frame = LedFrame::compose(&remote, now, &self.config.thresholds);
        if let Err(e) = self.hardware.show_leds(&frame) {
            error!("LED update failed: {}", e);
        }
        self.last_leds = Some(frame);
    }

    fn update_display(&mut self, now: Duration) {
        self.system = self.hardware.system_info();
        let data = self.store.snapshot();
        let local_time = self.clock.local_time();

        // Failures are logged by the display manager; the next refresh retries.
        let _ = self
            .display
            .render(&mut self.hardware, &data, &self.system, now, local_time);
    }

    /// Run passes until `stop` is raised, then switch the outputs off.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!(
            "Station running, pass every {} ms",
            self.scheduler.tick().as_millis()
        );

        while !stop.load(Ordering::Relaxed) {
            self.tick();
            std::thread::sleep(self.scheduler.tick());
        }

        info!("Station stopping");
        self.hardware.shutdown();
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn current_page(&self) -> PageId {
        self.display.current_page()
    }

    /// Text of the visible page as of the last display update.
    pub fn labels(&self) -> &[Label] {
        self.display.labels()
    }

    /// The frame most recently sent to the LEDs.
    pub fn last_leds(&self) -> Option<LedFrame> {
        self.last_leds
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::hardware::SimulatedHardware;

    fn station() -> (Station<SimulatedHardware>, ManualClock) {
        let clock = ManualClock::new();
        // Start away from a synthetic button press.
        clock.set(Duration::from_secs(1));
        let station = Station::new(
            StationConfig::DEFAULT,
            SimulatedHardware::new(),
            DataStore::new(),
            Arc::new(clock.clone()),
        );
        (station, clock)
    }

    #[test]
    fn test_first_pass_runs_every_task() {
        let (mut station, _clock) = station();
        let pass = station.tick();

        assert!(pass.due.sample_sensor);
        assert!(pass.due.update_leds);
        assert!(pass.due.update_display);
        assert_eq!(
            station.store().snapshot().local.map(|r| r.temperature),
            Some(22.5)
        );
        assert!(station.last_leds().is_some());
        assert_eq!(station.hardware().frames_presented(), 1);
    }

    #[test]
    fn test_synthetic_button_switches_page() {
        let (mut station, clock) = station();
        station.tick();
        assert_eq!(station.current_page(), PageId::Main);

        clock.set(Duration::from_secs(30));
        let pass = station.tick();
        assert!(pass.page_toggled);
        assert!(pass.due.update_display);
        assert_eq!(station.current_page(), PageId::Stats);
        assert!(station.labels().iter().any(|l| l.text == "CPU 45%"));

        // Still held a moment later: same press.
        clock.set(Duration::from_millis(30_100));
        assert!(!station.tick().page_toggled);
    }

    #[test]
    fn test_run_stops_on_flag() {
        let (mut station, _clock) = station();
        let stop = AtomicBool::new(true);
        station.run(&stop);
        assert_eq!(station.hardware().frames_presented(), 0);
    }
}
