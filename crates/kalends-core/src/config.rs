use std::str::FromStr;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_COLLECT_LIMIT, DEFAULT_FOLD_WIDTH, DEFAULT_MAX_EMPTY_PERIODS, DEFAULT_PRODID,
    ICALENDAR_VERSION,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub recurrence: RecurrenceConfig,
    #[serde(default)]
    pub serializer: SerializerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    pub prodid: String,
    pub version: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            prodid: DEFAULT_PRODID.to_string(),
            version: ICALENDAR_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub max_empty_periods: u32,
    pub collect_limit: usize,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
            collect_limit: DEFAULT_COLLECT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializerConfig {
    pub fold_width: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            fold_width: DEFAULT_FOLD_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// ## Summary
    /// Returns a filter directive limiting the library crates to the
    /// configured level, for hosts that build a `tracing` subscriber.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidSetting` when the level is not a `tracing` level.
    pub fn directive(&self) -> CoreResult<String> {
        let level = tracing::Level::from_str(self.level.trim())
            .map_err(|e| CoreError::invalid("logging.level", e.to_string()))?;
        let level = level.as_str().to_ascii_lowercase();
        Ok(format!("kalends_core={level},kalends_rfc={level}"))
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`
    /// into a `Settings`. Environment variables are layered below the file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails,
    /// or if a loaded value is outside its allowed range.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("calendar.prodid", DEFAULT_PRODID)?
            .set_default("calendar.version", ICALENDAR_VERSION)?
            .set_default("recurrence.max_empty_periods", DEFAULT_MAX_EMPTY_PERIODS)?
            .set_default(
                "recurrence.collect_limit",
                u64::try_from(DEFAULT_COLLECT_LIMIT)?,
            )?
            .set_default("serializer.fold_width", u64::try_from(DEFAULT_FOLD_WIDTH)?)?
            .set_default("logging.level", "info")?
            // Env file
            .add_source(
                config::Environment::with_prefix("KALENDS")
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks that loaded values are usable by the serializer and recurrence engine.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidSetting` naming the offending setting, or
    /// `CoreError::UnsupportedVersion` for a version other than 2.0.
    pub fn validate(&self) -> CoreResult<()> {
        // Room for the continuation space and one octet
        if self.serializer.fold_width < 2 {
            return Err(CoreError::invalid(
                "serializer.fold_width",
                format!("must be at least 2, got {}", self.serializer.fold_width),
            ));
        }
        if self.recurrence.max_empty_periods == 0 {
            return Err(CoreError::invalid(
                "recurrence.max_empty_periods",
                "must be positive",
            ));
        }
        if self.calendar.prodid.trim().is_empty() {
            return Err(CoreError::invalid("calendar.prodid", "must not be empty"));
        }
        if self.calendar.version != ICALENDAR_VERSION {
            return Err(CoreError::UnsupportedVersion(self.calendar.version.clone()));
        }
        self.logging.directive()?;
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(error) = dotenvy::dotenv() {
        tracing::debug!(%error, "No .env file loaded");
    }

    Settings::load()
}
