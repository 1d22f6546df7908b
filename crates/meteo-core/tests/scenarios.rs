//! End-to-end behavior of the station through its public API: bus messages
//! go through the ingress, time is driven by a manual clock and the board is
//! replaced by a scripted fake.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use meteo_core::alerts::{AlertLevel, RecordingAlertSink};
use meteo_core::climate::ClimateClass;
use meteo_core::clock::ManualClock;
use meteo_core::config::StationConfig;
use meteo_core::framebuffer::FrameBuffer;
use meteo_core::hardware::{DisplayError, Hardware};
use meteo_core::ingress::Ingress;
use meteo_core::leds::{HealthStatus, LedError, LedFrame};
use meteo_core::sensors::{EnvironmentSample, SensorError};
use meteo_core::station::Station;
use meteo_core::store::DataStore;
use meteo_core::system::SystemInfo;
use meteo_core::ui::PageId;

const CONFIG: StationConfig = StationConfig::DEFAULT;
const TEMP_TOPIC: &str = CONFIG.topics.exterior_temp;

struct Harness {
    clock: ManualClock,
    store: DataStore,
    alerts: Arc<RecordingAlertSink>,
    ingress: Ingress,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::new();
        let store = DataStore::new();
        let alerts = Arc::new(RecordingAlertSink::new());
        let ingress = Ingress::new(
            store.clone(),
            &CONFIG.topics,
            CONFIG.thresholds,
            Arc::new(clock.clone()),
            alerts.clone(),
        );
        Self {
            clock,
            store,
            alerts,
            ingress,
        }
    }

    fn outdoor_temperature(&self, at_ms: u64, celsius: f32) {
        self.clock.set(Duration::from_millis(at_ms));
        self.ingress
            .on_message(TEMP_TOPIC, celsius.to_string().as_bytes())
            .unwrap();
    }

    fn leds_at(&self, at_secs: u64) -> LedFrame {
        let remote = self.store.snapshot().remote;
        LedFrame::compose(&remote, Duration::from_secs(at_secs), &CONFIG.thresholds)
    }
}

/// Board fake with a button level set from the test.
#[derive(Clone, Default)]
struct ScriptedHardware {
    button: Arc<AtomicBool>,
}

impl Hardware for ScriptedHardware {
    fn read_sensor(&mut self) -> Result<EnvironmentSample, SensorError> {
        Ok(EnvironmentSample {
            temperature_celsius: 21.0,
            pressure_hpa: 1012.0,
            altitude_m: 10.0,
        })
    }

    fn button_pressed(&mut self, _now: Duration) -> bool {
        self.button.load(Ordering::Relaxed)
    }

    fn show_leds(&mut self, _frame: &LedFrame) -> Result<(), LedError> {
        Ok(())
    }

    fn present(&mut self, frame: &mut FrameBuffer) -> Result<(), DisplayError> {
        frame.discard_damage();
        Ok(())
    }

    fn system_info(&mut self) -> SystemInfo {
        SystemInfo::default()
    }
}

#[test]
fn test_cold_alert_respects_cooldown() {
    let harness = Harness::new();

    harness.outdoor_temperature(0, 1.5);
    harness.outdoor_temperature(60_000, 1.0);
    harness.outdoor_temperature(310_000, 1.0);

    let alerts = harness.alerts.alerts();
    let times: Vec<Duration> = alerts.iter().map(|a| a.at).collect();
    assert_eq!(times, [Duration::ZERO, Duration::from_secs(310)]);
    assert!(alerts.iter().all(|a| a.level == AlertLevel::Cold));
}

#[test]
fn test_heat_alert_fires_at_threshold() {
    let harness = Harness::new();

    harness.outdoor_temperature(0, 34.9);
    harness.outdoor_temperature(1_000, 35.0);

    let alerts = harness.alerts.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].level, AlertLevel::Hot);
    assert_eq!(alerts[0].at, Duration::from_secs(1));
    assert_eq!(alerts[0].temperature, 35.0);
}

#[test]
fn test_health_led_degrades_with_age() {
    let harness = Harness::new();
    harness.outdoor_temperature(0, 20.0);

    assert_eq!(harness.leds_at(299).pixels[0], HealthStatus::Fresh.color());
    assert_eq!(harness.leds_at(301).pixels[0], HealthStatus::Stale.color());
    assert_eq!(harness.leds_at(601).pixels[0], HealthStatus::VeryStale.color());

    harness.ingress.on_disconnect();
    assert_eq!(harness.leds_at(601).pixels[0], HealthStatus::Offline.color());
}

#[test]
fn test_staleness_check_takes_link_offline() {
    let harness = Harness::new();
    harness.outdoor_temperature(0, 20.0);
    let window = CONFIG.thresholds.remote_stale_window;

    assert!(!harness.store.maybe_clear_remote_online(Duration::from_secs(300), window));
    assert!(harness.store.maybe_clear_remote_online(Duration::from_secs(301), window));

    let data = harness.store.snapshot();
    assert!(!data.remote.online);
    // Last values are kept for display.
    assert_eq!(data.remote.temperature, Some(20.0));
    assert_eq!(harness.leds_at(301).pixels[0], HealthStatus::Offline.color());
}

#[test]
fn test_classification_boundaries() {
    let cases = [
        (35.0, "EXTREMO"),
        (34.999, "CALUROSO"),
        (0.0, "MUY FRÍO"),
        (-0.001, "HELADA"),
        (-5.0, "HELADA"),
        (-5.001, "H.EXTREMA"),
    ];

    for (celsius, label) in cases {
        assert_eq!(ClimateClass::classify(Some(celsius)).label(), label, "{}", celsius);
    }
    assert_eq!(ClimateClass::classify(None), ClimateClass::NoData);
}

#[test]
fn test_history_statistics() {
    let harness = Harness::new();
    for (i, t) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        harness.outdoor_temperature(i as u64 * 1_000, t);
    }

    let stats = harness.store.recompute_stats().unwrap();
    assert_eq!(stats.day_min, 10.0);
    assert_eq!(stats.day_max, 30.0);
    assert_eq!(stats.day_avg, 20.0);
    assert_eq!(stats.variation, 20.0);
}

#[test]
fn test_button_presses_inside_debounce_window_are_ignored() {
    let clock = ManualClock::new();
    let hardware = ScriptedHardware::default();
    let button = hardware.button.clone();
    let mut station = Station::new(CONFIG, hardware, DataStore::new(), Arc::new(clock.clone()));

    let mut toggles = 0;
    for edge_ms in [0, 300, 600] {
        clock.set(Duration::from_millis(edge_ms));
        button.store(true, Ordering::Relaxed);
        toggles += usize::from(station.tick().page_toggled);

        clock.set(Duration::from_millis(edge_ms + 100));
        button.store(false, Ordering::Relaxed);
        station.tick();
    }

    assert_eq!(toggles, 2);
    assert_eq!(station.current_page(), PageId::Main);
}

#[test]
fn test_outdoor_data_reaches_the_main_page() {
    let clock = ManualClock::new();
    let store = DataStore::new();
    let ingress = Ingress::new(
        store.clone(),
        &CONFIG.topics,
        CONFIG.thresholds,
        Arc::new(clock.clone()),
        Arc::new(RecordingAlertSink::new()),
    );
    let mut station = Station::new(
        CONFIG,
        ScriptedHardware::default(),
        store.clone(),
        Arc::new(clock.clone()),
    );

    ingress
        .on_message(CONFIG.topics.exterior_status, b"online")
        .unwrap();
    ingress.on_message(TEMP_TOPIC, b"24.0").unwrap();
    ingress.on_message(CONFIG.topics.exterior_hum, b"55").unwrap();
    assert!(ingress.on_message(CONFIG.topics.exterior_pres, b"high").is_err());

    clock.set(Duration::from_secs(1));
    station.tick();

    let texts: Vec<&str> = station.labels().iter().map(|l| l.text.as_str()).collect();
    assert!(texts.contains(&"ONLINE"), "{:?}", texts);
    assert!(texts.contains(&"Humedad 55.0%"), "{:?}", texts);
    assert!(texts.contains(&"Sensación 22.0°C"), "{:?}", texts);
    assert!(texts.contains(&"ÓPTIMO"), "{:?}", texts);

    let counters = ingress.counters();
    assert_eq!(counters.received, 4);
    assert_eq!(counters.dropped, 1);
}

#[test]
fn test_silent_outdoor_node_goes_offline_during_a_pass() {
    let clock = ManualClock::new();
    let store = DataStore::new();
    let ingress = Ingress::new(
        store.clone(),
        &CONFIG.topics,
        CONFIG.thresholds,
        Arc::new(clock.clone()),
        Arc::new(RecordingAlertSink::new()),
    );
    let mut station = Station::new(
        CONFIG,
        ScriptedHardware::default(),
        store.clone(),
        Arc::new(clock.clone()),
    );

    clock.set(Duration::from_secs(1));
    ingress.on_message(TEMP_TOPIC, b"18.0").unwrap();

    clock.set(Duration::from_secs(2));
    assert!(!station.tick().remote_cleared);
    assert!(store.snapshot().remote.online);

    clock.set(Duration::from_millis(301_100));
    let pass = station.tick();
    assert!(pass.remote_cleared);
    assert!(pass.due.update_leds);
    assert!(!store.snapshot().remote.online);

    // The LED refresh in the same pass already sees the link as offline.
    let leds = station.last_leds().unwrap();
    assert_eq!(leds.pixels[0], HealthStatus::Offline.color());

    clock.set(Duration::from_secs(302));
    assert!(!station.tick().remote_cleared);
}
