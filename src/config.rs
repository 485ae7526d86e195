// config.rs

use crate::cli::Args;
use crate::indicator::IndicatorSlot;
use crate::injection::{InjectionConfig, RAW_LEVEL_MAX};
use crate::relay::RelaySettings;
use config::{Config, Environment, File};
use log::{debug, info};
use std::fmt;
use std::time::Duration;

pub const ENV_PREFIX: &str = "CLOCKSHIM";

#[derive(Debug)]
pub enum ConfigError {
    /// A setting is out of range
    Invalid(String),
    /// A configuration source could not be read or parsed
    Source(config::ConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::Source(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Source(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub input_port: Option<String>,
    pub output_port: Option<String>,
    pub monitored_channel: u8,
    pub count_raw: u16,
    pub delay_raw: u16,
    pub pulse_ms: u64,
    pub poll_interval_us: u64,
    pub panel: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            input_port: None,
            output_port: None,
            monitored_channel: 1,
            count_raw: 0,
            delay_raw: 0,
            pulse_ms: 20,
            poll_interval_us: 500,
            panel: true,
        }
    }
}

impl RelayConfig {
    /// Layers defaults, the config file, `CLOCKSHIM_*` variables and `args`
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let builder = Config::builder()
            .set_default("monitored_channel", defaults.monitored_channel as i64)?
            .set_default("count_raw", defaults.count_raw as i64)?
            .set_default("delay_raw", defaults.delay_raw as i64)?
            .set_default("pulse_ms", defaults.pulse_ms as i64)?
            .set_default("poll_interval_us", defaults.poll_interval_us as i64)?
            .set_default("panel", defaults.panel)?
            .add_source(File::with_name(&args.config).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("input_port", args.input.clone())?
            .set_override_option("output_port", args.output.clone())?
            .set_override_option("monitored_channel", args.channel.map(i64::from))?
            .set_override_option(
                "count_raw",
                args.count
                    .map(|n| InjectionConfig::count_to_raw(n) as i64),
            )?
            .set_override_option(
                "delay_raw",
                args.delay
                    .map(|n| InjectionConfig::delay_to_raw(n) as i64),
            )?;
        let builder = if args.no_panel {
            builder.set_override("panel", false)?
        } else {
            builder
        };

        let settings = builder.build()?;
        debug!("Loaded configuration sources from '{}'", args.config);
        Self::from_settings(&settings)
    }

    fn from_settings(settings: &Config) -> Result<Self, ConfigError> {
        let config = RelayConfig {
            input_port: settings.get_string("input_port").ok(),
            output_port: settings.get_string("output_port").ok(),
            monitored_channel: int_in_range(settings, "monitored_channel", 1, 16)? as u8,
            count_raw: int_in_range(settings, "count_raw", 0, RAW_LEVEL_MAX as i64)? as u16,
            delay_raw: int_in_range(settings, "delay_raw", 0, RAW_LEVEL_MAX as i64)? as u16,
            pulse_ms: int_in_range(settings, "pulse_ms", 0, 10_000)? as u64,
            poll_interval_us: int_in_range(settings, "poll_interval_us", 1, 1_000_000)? as u64,
            panel: settings.get_bool("panel")?,
        };

        info!(
            "Relay configuration: channel {}, {:?}",
            config.monitored_channel,
            config.injection()
        );
        Ok(config)
    }

    /// Injection settings the levels start at
    pub fn injection(&self) -> InjectionConfig {
        InjectionConfig::from_raw(self.count_raw, self.delay_raw)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            monitored_channel: self.monitored_channel,
            pulse_slot: IndicatorSlot::Count,
            pulse_duration: Duration::from_millis(self.pulse_ms),
            pulse_level: true,
            poll_interval: Duration::from_micros(self.poll_interval_us),
        }
    }
}

fn int_in_range(settings: &Config, key: &str, min: i64, max: i64) -> Result<i64, ConfigError> {
    let value = settings.get_int(key)?;
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!(
            "{} must be between {} and {}, got {}",
            key, min, max, value
        )));
    }
    Ok(value)
}
