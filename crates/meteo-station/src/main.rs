//! Raspberry Pi entry point of the meteo station
//!
//! The display/LED loop runs on a blocking thread; the MQTT worker (and, in
//! test mode, the simulated outdoor node) run as tokio tasks. Both sides
//! share one [`DataStore`]. Ctrl+C stops everything and turns the LEDs off.

mod bus;
mod config;
mod linux;
mod system_info;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use log::{LevelFilter, debug, error, info};
use meteo_core::alerts::LogAlertSink;
use meteo_core::clock::{Clock, MonotonicClock};
use meteo_core::config::StationConfig;
use meteo_core::hardware::{Hardware, SimulatedHardware, SimulatedTelemetry};
use meteo_core::ingress::Ingress;
use meteo_core::station::Station;
use meteo_core::store::DataStore;

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let config = config::load().context("invalid configuration")?;
    if config.test_mode {
        info!("Starting in test mode with simulated hardware");
    }

    let store = DataStore::new();
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let ingress = Ingress::new(
        store.clone(),
        &config.topics,
        config.thresholds,
        clock.clone(),
        Arc::new(LogAlertSink),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let mut station = {
        let stop = stop.clone();
        let store = store.clone();
        tokio::task::spawn_blocking(move || {
            if config.test_mode {
                run_station(config, SimulatedHardware::new(), store, clock, &stop);
            } else {
                run_station(config, linux::open(&config), store, clock, &stop);
            }
        })
    };

    let (client, eventloop) = bus::connect(&config.broker);
    let mut bus_task = tokio::spawn(bus::run(client.clone(), eventloop, ingress.clone()));

    let telemetry_task = config.test_mode.then(|| {
        let mut telemetry = SimulatedTelemetry::new(ingress.clone(), config.topics);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SimulatedTelemetry::INTERVAL);
            loop {
                interval.tick().await;
                telemetry.publish_next();
            }
        })
    });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("Interrupted, shutting down");
        }
        result = &mut station => {
            result.context("station loop panicked")?;
            bail!("station loop exited unexpectedly");
        }
    }

    stop.store(true, Ordering::Relaxed);

    if let Some(task) = telemetry_task {
        task.abort();
    }
    // The worker has to poll once more for the DISCONNECT to go out.
    match client.disconnect().await {
        Ok(()) => {
            if tokio::time::timeout(DISCONNECT_TIMEOUT, &mut bus_task).await.is_err() {
                debug!("Broker did not take the disconnect in time");
            }
        }
        Err(e) => debug!("Broker disconnect failed: {}", e),
    }
    bus_task.abort();

    station.await.context("station loop panicked")?;
    info!("Stopped");
    Ok(())
}

fn run_station<H: Hardware>(
    config: StationConfig,
    hardware: H,
    store: DataStore,
    clock: Arc<dyn Clock>,
    stop: &AtomicBool,
) {
    let mut station = Station::new(config, hardware, store, clock);
    station.run(stop);
}
