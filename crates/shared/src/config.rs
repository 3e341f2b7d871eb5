//! Engine configuration management.

use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Batch recomputation configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Calendar configuration.
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Batch recomputation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of per-user updates processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Calendar configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Maximum number of days walked backward when resolving the last
    /// working day before a date.
    #[serde(default = "default_holiday_lookback")]
    pub max_holiday_lookback_days: u32,
}

fn default_concurrency() -> usize {
    8
}

fn default_holiday_lookback() -> u32 {
    14
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_holiday_lookback_days: default_holiday_lookback(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FURLOUGH").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
