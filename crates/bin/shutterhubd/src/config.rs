//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `shutterhub.toml` from the working directory, or the file named by
//! `SHUTTERHUB_CONFIG`. Device credentials, coordinates and the weather API
//! key have no defaults; every other field does. Environment variables take
//! precedence over file values. The result is validated before any network
//! client is built.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use shutterhub_adapter_openweather::{DEFAULT_BASE_URL, OpenWeatherConfig};
use shutterhub_adapter_shutter_http::ShutterHttpConfig;
use shutterhub_app::services::actuation_service::RetryPolicy;
use shutterhub_domain::error::ShutterHubError;
use shutterhub_domain::forecast::CloudAdjustmentConfig;
use shutterhub_domain::location::Location;
use shutterhub_domain::offset::OffsetConfig;
use shutterhub_domain::solar::{CloseAnchor, OpenAnchor, SolarEventCalculator};

const DEFAULT_PATH: &str = "shutterhub.toml";
pub const DEFAULT_LOG_FILTER: &str = "shutterhubd=info,shutterhub=info";

/// A credential that never shows up in logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Validated configuration.
#[derive(Debug)]
pub struct Config {
    pub device: DeviceConfig,
    pub location: Location,
    pub solar: SolarConfig,
    pub weather: WeatherConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// Shutter controller connection and retry settings.
#[derive(Debug)]
pub struct DeviceConfig {
    pub address: String,
    pub login: String,
    pub password: Secret,
    pub open_path: String,
    pub close_path: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

/// Offsets and anchors for the raw solar events.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SolarConfig {
    pub open_offset_hours: f64,
    pub close_offset_hours: f64,
    pub open_anchor: OpenAnchor,
    pub close_anchor: CloseAnchor,
}

/// Forecast source and cloud adjustment thresholds.
#[derive(Debug)]
pub struct WeatherConfig {
    /// Present whenever `enabled` is set.
    pub api_key: Option<Secret>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub enabled: bool,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub max_shift_hours: f64,
    pub staleness_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause after each actuation.
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for SolarConfig {
    fn default() -> Self {
        let offsets = OffsetConfig::default();
        Self {
            open_offset_hours: offsets.open_offset_hours,
            close_offset_hours: offsets.close_offset_hours,
            open_anchor: OpenAnchor::default(),
            close_anchor: CloseAnchor::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { cooldown_secs: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// ── File representation ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    device: RawDevice,
    location: RawLocation,
    solar: SolarConfig,
    weather: RawWeather,
    scheduler: SchedulerConfig,
    logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawDevice {
    address: Option<String>,
    login: Option<String>,
    password: Option<Secret>,
    open_path: String,
    close_path: String,
    timeout_secs: u64,
    max_retries: u32,
    retry_delay_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawWeather {
    api_key: Option<Secret>,
    base_url: String,
    timeout_secs: u64,
    enabled: bool,
    lower_bound: f64,
    upper_bound: f64,
    max_shift_hours: f64,
    staleness_secs: u64,
}

impl Default for RawDevice {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            address: None,
            login: None,
            password: None,
            open_path: "right".to_string(),
            close_path: "left".to_string(),
            timeout_secs: 10,
            max_retries: retry.max_retries,
            retry_delay_secs: retry.retry_delay.as_secs(),
        }
    }
}

impl Default for RawWeather {
    fn default() -> Self {
        let adjustment = CloudAdjustmentConfig::default();
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            enabled: true,
            lower_bound: adjustment.lower_bound,
            upper_bound: adjustment.upper_bound,
            max_shift_hours: adjustment.max_shift_hours,
            staleness_secs: adjustment.staleness_secs,
        }
    }
}

impl RawConfig {
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides<E>(&mut self, env: E) -> Result<(), ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env("SHUTTERHUB_DEVICE_ADDRESS") {
            self.device.address = Some(val);
        }
        if let Some(val) = env("SHUTTERHUB_DEVICE_LOGIN") {
            self.device.login = Some(val);
        }
        if let Some(val) = env("SHUTTERHUB_DEVICE_PASSWORD") {
            self.device.password = Some(Secret(val));
        }
        if let Some(val) = env("SHUTTERHUB_LATITUDE") {
            self.location.latitude = Some(parse_env("SHUTTERHUB_LATITUDE", &val)?);
        }
        if let Some(val) = env("SHUTTERHUB_LONGITUDE") {
            self.location.longitude = Some(parse_env("SHUTTERHUB_LONGITUDE", &val)?);
        }
        if let Some(val) = env("SHUTTERHUB_WEATHER_API_KEY") {
            self.weather.api_key = Some(Secret(val));
        }
        if let Some(val) = env("SHUTTERHUB_WEATHER_ENABLED") {
            self.weather.enabled = parse_env("SHUTTERHUB_WEATHER_ENABLED", &val)?;
        }
        if let Some(val) = env("SHUTTERHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn resolve(self) -> Result<Config, ConfigError> {
        let device = DeviceConfig {
            address: required(self.device.address, "device.address")?,
            login: required(self.device.login, "device.login")?,
            password: required(self.device.password, "device.password")?,
            open_path: self.device.open_path,
            close_path: self.device.close_path,
            timeout_secs: self.device.timeout_secs,
            max_retries: self.device.max_retries,
            retry_delay_secs: self.device.retry_delay_secs,
        };
        let location = Location {
            latitude: required(self.location.latitude, "location.latitude")?,
            longitude: required(self.location.longitude, "location.longitude")?,
        };
        let api_key = if self.weather.enabled {
            Some(required(self.weather.api_key, "weather.api_key")?)
        } else {
            self.weather.api_key
        };
        let weather = WeatherConfig {
            api_key,
            base_url: self.weather.base_url,
            timeout_secs: self.weather.timeout_secs,
            enabled: self.weather.enabled,
            lower_bound: self.weather.lower_bound,
            upper_bound: self.weather.upper_bound,
            max_shift_hours: self.weather.max_shift_hours,
            staleness_secs: self.weather.staleness_secs,
        };
        Ok(Config {
            device,
            location,
            solar: self.solar,
            weather,
            scheduler: self.scheduler,
            logging: self.logging,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField(field))
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{name} has invalid value {value:?}")))
}

impl Config {
    /// Load from the configured path, apply environment overrides and
    /// validate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, a
    /// required field is missing, or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SHUTTERHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut raw = RawConfig::from_file(&path)?;
        raw.apply_env_overrides(|name| std::env::var(name).ok())?;
        let config = raw.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document without environment overrides.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus IO.
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let config = raw.resolve()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "device.address must not be empty".to_string(),
            ));
        }
        if self.device.login.trim().is_empty() {
            return Err(ConfigError::Validation(
                "device.login must not be empty".to_string(),
            ));
        }
        if self.device.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "device.timeout_secs must be positive".to_string(),
            ));
        }
        if self.weather.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "weather.timeout_secs must be positive".to_string(),
            ));
        }
        self.location.validate()?;
        self.offsets().validate()?;
        self.cloud_adjustment().validate()?;
        Ok(())
    }

    #[must_use]
    pub fn offsets(&self) -> OffsetConfig {
        OffsetConfig {
            open_offset_hours: self.solar.open_offset_hours,
            close_offset_hours: self.solar.close_offset_hours,
        }
    }

    #[must_use]
    pub fn cloud_adjustment(&self) -> CloudAdjustmentConfig {
        CloudAdjustmentConfig {
            lower_bound: self.weather.lower_bound,
            upper_bound: self.weather.upper_bound,
            max_shift_hours: self.weather.max_shift_hours,
            staleness_secs: self.weather.staleness_secs,
        }
    }

    #[must_use]
    pub fn calculator(&self) -> SolarEventCalculator {
        SolarEventCalculator::new(self.location, self.offsets())
            .with_anchors(self.solar.open_anchor, self.solar.close_anchor)
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.device.max_retries,
            retry_delay: Duration::from_secs(self.device.retry_delay_secs),
        }
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.scheduler.cooldown_secs)
    }

    #[must_use]
    pub fn shutter_http(&self) -> ShutterHttpConfig {
        ShutterHttpConfig::new(
            self.device.address.clone(),
            self.device.login.clone(),
            self.device.password.expose(),
        )
        .with_paths(self.device.open_path.clone(), self.device.close_path.clone())
        .with_timeout(Duration::from_secs(self.device.timeout_secs))
    }

    /// Forecast client settings, `None` when weather adjustment is off.
    #[must_use]
    pub fn openweather(&self) -> Option<OpenWeatherConfig> {
        if !self.weather.enabled {
            return None;
        }
        let api_key = self.weather.api_key.as_ref()?;
        Some(
            OpenWeatherConfig::new(api_key.expose())
                .with_base_url(self.weather.base_url.clone())
                .with_timeout(Duration::from_secs(self.weather.timeout_secs)),
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// A field without default is absent from both file and environment.
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<ShutterHubError> for ConfigError {
    fn from(err: ShutterHubError) -> Self {
        match err {
            ShutterHubError::Validation(inner) => Self::Validation(inner.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}
