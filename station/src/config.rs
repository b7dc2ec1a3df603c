//! Station Configuration
//!
//! YAML configuration for the demo transceiver: radio session
//! parameters, link settings, and logging.

use common::types::Rate;
use interfaces::RadioParams;
use serde::{Deserialize, Serialize};

/// Top-level configuration file structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    /// Radio session parameters
    #[serde(default)]
    pub radio: RadioConfig,
    /// Link settings
    #[serde(default)]
    pub link: LinkConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            radio: RadioConfig::default(),
            link: LinkConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl StationConfig {
    pub fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Radio session parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RadioConfig {
    /// Center frequency in Hz
    #[serde(default = "default_freq")]
    pub freq: f64,
    /// Sample rate in samples/s
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Transmit gain in dB
    #[serde(default = "default_gain")]
    pub tx_gain: f64,
    /// Receive gain in dB
    #[serde(default = "default_gain")]
    pub rx_gain: f64,
    /// Transmit amplitude scale, at most 1.0
    #[serde(default = "default_tx_amp")]
    pub tx_amp: f64,
    /// Device arguments, e.g. ZMQ endpoints
    #[serde(default)]
    pub device_addr: String,
}

fn default_freq() -> f64 {
    5.72e9
}

fn default_rate() -> f64 {
    5e6
}

fn default_gain() -> f64 {
    20.0
}

fn default_tx_amp() -> f64 {
    0.5
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            freq: default_freq(),
            rate: default_rate(),
            tx_gain: default_gain(),
            rx_gain: default_gain(),
            tx_amp: default_tx_amp(),
            device_addr: String::new(),
        }
    }
}

impl RadioConfig {
    pub fn to_params(&self) -> RadioParams {
        RadioParams {
            freq: self.freq,
            rate: self.rate,
            tx_gain: self.tx_gain,
            rx_gain: self.rx_gain,
            tx_amp: self.tx_amp,
            device_addr: self.device_addr.clone(),
        }
    }
}

/// Link settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// PHY rate for transmitted frames
    #[serde(default = "default_phy_rate")]
    pub phy_rate: Rate,
}

fn default_phy_rate() -> Rate {
    Rate::Qpsk1_2
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            phy_rate: default_phy_rate(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Default level filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_file() {
        let yaml = r#"
radio:
  freq: 2.412e9
  tx_amp: 0.8
link:
  phy_rate: Qam16_3_4
"#;
        let config: StationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.radio.freq, 2.412e9);
        assert_eq!(config.radio.tx_amp, 0.8);
        assert_eq!(config.radio.rate, 5e6); // default
        assert_eq!(config.link.phy_rate, Rate::Qam16_3_4);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn empty_document_takes_defaults() {
        let config: StationConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.radio.freq, 5.72e9);
        assert_eq!(config.link.phy_rate, Rate::Qpsk1_2);
    }
}
