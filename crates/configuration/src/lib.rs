// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

pub use error::ConfigError;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, MonitorDefaults, PriceFeedConfig, TelegramConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// layers environment variables on top (prefix `PRICEWATCH`, `__` separator, so the
/// Telegram token can stay out of the file), and deserializes the result into our
/// strongly-typed `Config` struct.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        // e.g. PRICEWATCH__TELEGRAM__TOKEN overrides telegram.token
        .add_source(config::Environment::with_prefix("PRICEWATCH").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    Ok(config)
}
