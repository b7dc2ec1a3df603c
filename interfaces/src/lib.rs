//! Radio I/O Boundary
//!
//! This crate defines the sample-stream boundary between the PHY and
//! whatever produces and consumes baseband I/Q: the `SampleSource` and
//! `SampleSink` traits, the radio session parameters, a ZMQ-based
//! software radio driver, and an in-process loopback pair for
//! simulation and tests.

pub mod loopback;
pub mod zmq_rf;

pub use loopback::{loopback_pair, LoopbackSink, LoopbackSource};
pub use zmq_rf::{ZmqRf, ZmqRfConfig};

use common::types::Sample;
use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("ZMQ error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("Invalid sample payload on the wire")]
    InvalidMessage,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Interface not initialized")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stream closed")]
    StreamClosed,
}

/// Radio session parameters.
#[derive(Debug, Clone)]
pub struct RadioParams {
    /// Center frequency in Hz
    pub freq: f64,
    /// Sample rate in samples/s (5 MHz is the standard half-rate
    /// 802.11a baseband)
    pub rate: f64,
    /// Transmit gain in dB
    pub tx_gain: f64,
    /// Receive gain in dB
    pub rx_gain: f64,
    /// Scalar applied to transmit samples before send (at most 1.0)
    pub tx_amp: f64,
    /// Device selection string; empty autoselects
    pub device_addr: String,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            freq: 5.72e9,
            rate: 5e6,
            tx_gain: 20.0,
            rx_gain: 20.0,
            tx_amp: 1.0,
            device_addr: String::new(),
        }
    }
}

/// Running statistics kept by a radio driver.
#[derive(Debug, Default, Clone)]
pub struct RfStats {
    pub tx_samples: u64,
    pub rx_samples: u64,
    pub tx_underruns: u64,
    pub rx_overruns: u64,
}

/// A blocking producer of received baseband samples.
///
/// Streaming is started once when the source is created and stopped
/// when it is dropped; `fetch` blocks until the requested number of
/// samples has been delivered.
pub trait SampleSource: Send {
    /// Fill `buf` with `n` received samples, blocking until they are
    /// available. `buf` is resized to `n`.
    fn fetch(&mut self, n: usize, buf: &mut Vec<Sample>) -> Result<(), InterfaceError>;
}

/// A consumer of transmit bursts.
pub trait SampleSink: Send {
    /// Queue a burst for transmission and return immediately.
    fn send_burst(&mut self, samples: Vec<Sample>) -> Result<(), InterfaceError>;

    /// Send a burst and block until the far side has consumed it (or
    /// the hardware has acknowledged burst end).
    fn send_burst_sync(&mut self, samples: Vec<Sample>) -> Result<(), InterfaceError>;
}
