//! Hardware-independent core library for the meteo weather station
//!
//! This crate contains all platform-agnostic logic of the indoor station:
//! the shared data store fed by the local sensor and the outdoor MQTT node,
//! alert debouncing, rolling statistics, the LED state machine, climate
//! classification, button handling and the two dashboard pages.
//!
//! Everything that touches real devices sits behind the [`hardware::Hardware`]
//! trait so the same runtime drives a Raspberry Pi or a simulated station.

pub mod alerts;
pub mod button;
pub mod climate;
pub mod clock;
pub mod config;
pub mod display_manager;
pub mod framebuffer;
pub mod hardware;
pub mod history;
pub mod ingress;
pub mod leds;
pub mod levels;
pub mod pages;
pub mod sampler;
pub mod scheduler;
pub mod sensors;
pub mod station;
pub mod stats;
pub mod store;
pub mod system;
pub mod trend;
pub mod ui;
