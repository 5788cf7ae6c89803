//! Simulation configuration loading and validation.
//!
//! Every option has a default, so an empty TOML file (or no file at all) runs
//! the reference scenario: 10 stations for 10 time units around an access
//! point at (50, 50).

use serde::Deserialize;
use std::path::Path;

use crate::simulation::geometry::Point;
use crate::simulation::signal_calculations::ChannelParameters;

/// Error type for configuration loading failures.
#[derive(Debug)]
pub(crate) enum ConfigLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::FileReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigLoadError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

/// All parameters of one simulation run, consumed at start.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Number of stations generated.
    pub(crate) station_count: u32,
    /// Virtual-time horizon of the run.
    pub(crate) simulation_duration: f64,
    pub(crate) access_point_position: Point,
    /// Access point service rate in size units per time unit.
    pub(crate) data_rate: f64,
    /// Mean of the exponential packet-size draw.
    pub(crate) mean_packet_size: f64,
    /// Spacing between station creations.
    pub(crate) packet_interval: f64,
    pub(crate) x_range: (f64, f64),
    pub(crate) y_range: (f64, f64),
    /// Inclusive upper bound of the backoff draw, in slots.
    pub(crate) contention_window_max: u32,
    /// Duration of one backoff slot.
    pub(crate) slot_time: f64,
    /// Carrier frequency in Hz.
    pub(crate) carrier_frequency: f64,
    /// Transmit power in dBm.
    pub(crate) tx_power: f64,
    /// Minimum received power in dBm for an accepted link.
    pub(crate) success_threshold: f64,
    /// Standard deviation of the Gaussian shadowing term in dB.
    pub(crate) shadowing_sigma: f64,
    /// Seed of the random source. Same seed and configuration give the same run.
    pub(crate) seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            station_count: 10,
            simulation_duration: 10.0,
            access_point_position: Point::new(50.0, 50.0),
            data_rate: 100.0,
            mean_packet_size: 1000.0,
            packet_interval: 0.1,
            x_range: (0.0, 100.0),
            y_range: (0.0, 100.0),
            contention_window_max: 63,
            slot_time: 9e-6,
            carrier_frequency: 5.0e9,
            tx_power: 20.0,
            success_threshold: -80.0,
            shadowing_sigma: 4.0,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Arguments
    /// * `config_path` - Path to the TOML file; missing keys take their defaults
    pub(crate) fn load(config_path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(config_path).map_err(|e| ConfigLoadError::FileReadError(format!("{}: {}", config_path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub(crate) fn from_toml_str(content: &str) -> Result<Self, ConfigLoadError> {
        let config: SimulationConfig = toml::from_str(content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigLoadError::ValidationError)?;
        Ok(config)
    }

    /// Validate configuration to reject values that would break the run.
    ///
    /// Checks for:
    /// - Non-finite or negative durations, intervals, slot time and sigma
    /// - Non-positive data rate, mean packet size and carrier frequency
    /// - Inverted or non-finite placement ranges
    /// - Non-finite positions and power levels
    ///
    /// # Returns
    ///
    /// `Ok(())` if validation passes, `Err(String)` describing the first problem otherwise.
    pub(crate) fn validate(&self) -> Result<(), String> {
        fn non_negative(name: &str, value: f64) -> Result<(), String> {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be finite and non-negative, got {}", name, value));
            }
            Ok(())
        }

        fn positive(name: &str, value: f64) -> Result<(), String> {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and positive, got {}", name, value));
            }
            Ok(())
        }

        fn range(name: &str, (low, high): (f64, f64)) -> Result<(), String> {
            if !low.is_finite() || !high.is_finite() || low > high {
                return Err(format!("{} must be a finite (low, high) pair with low <= high, got ({}, {})", name, low, high));
            }
            Ok(())
        }

        non_negative("simulation_duration", self.simulation_duration)?;
        non_negative("packet_interval", self.packet_interval)?;
        non_negative("slot_time", self.slot_time)?;
        non_negative("shadowing_sigma", self.shadowing_sigma)?;
        positive("data_rate", self.data_rate)?;
        positive("mean_packet_size", self.mean_packet_size)?;
        positive("carrier_frequency", self.carrier_frequency)?;
        range("x_range", self.x_range)?;
        range("y_range", self.y_range)?;

        if !self.access_point_position.is_finite() {
            return Err(format!("access_point_position must be finite, got {:?}", self.access_point_position));
        }
        if !self.tx_power.is_finite() {
            return Err(format!("tx_power must be finite, got {}", self.tx_power));
        }
        if !self.success_threshold.is_finite() {
            return Err(format!("success_threshold must be finite, got {}", self.success_threshold));
        }

        Ok(())
    }

    /// Radio channel parameters derived from this configuration.
    pub(crate) fn channel_parameters(&self) -> ChannelParameters {
        ChannelParameters {
            carrier_frequency: self.carrier_frequency,
            tx_power: self.tx_power,
            success_threshold: self.success_threshold,
            shadowing_sigma: self.shadowing_sigma,
        }
    }
}
