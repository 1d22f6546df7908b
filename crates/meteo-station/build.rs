//! Bakes deployment overrides from the environment (or a `.env` file next to
//! the workspace) into the binary, where `option_env!` picks them up.

const OVERRIDES: [&str; 4] = [
    "METEO_BROKER_HOST",
    "METEO_BROKER_PORT",
    "METEO_CLIENT_ID",
    "METEO_TEST_MODE",
];

fn main() {
    // A missing .env is fine; plain environment variables still apply.
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for name in OVERRIDES {
        println!("cargo:rerun-if-env-changed={}", name);
        if let Ok(value) = std::env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
        }
    }
}
