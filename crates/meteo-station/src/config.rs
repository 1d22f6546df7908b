//! Runtime configuration: compiled-in defaults patched with the overrides
//! captured by `build.rs`.

use meteo_core::config::{ConfigError, Overrides, StationConfig};

const BUILD_OVERRIDES: Overrides = Overrides {
    broker_host: option_env!("METEO_BROKER_HOST"),
    broker_port: option_env!("METEO_BROKER_PORT"),
    client_id: option_env!("METEO_CLIENT_ID"),
    test_mode: option_env!("METEO_TEST_MODE"),
};

/// Load and validate the station configuration.
pub fn load() -> Result<StationConfig, ConfigError> {
    let config = StationConfig::DEFAULT.with_overrides(&BUILD_OVERRIDES)?;
    config.validate()?;
    Ok(config)
}
