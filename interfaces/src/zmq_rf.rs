//! ZMQ Software Radio Driver
//!
//! Exchanges baseband I/Q with a peer transceiver (or a channel
//! simulator) over ZeroMQ, speaking the raw little-endian complex-float
//! convention used by srsRAN and the GNU Radio ZMQ blocks. The
//! transmit side binds a REP socket and serves queued bursts to
//! whoever requests them; the receive side connects a REQ socket and
//! pulls sample chunks on demand.

use crate::{InterfaceError, RfStats, SampleSink, SampleSource};
use common::types::Sample;
use common::utils::{db_to_linear, linear_to_db, signal_power};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace, warn};

/// Default ZMQ endpoints.
pub const DEFAULT_TX_PORT: u16 = 2000;
pub const DEFAULT_RX_PORT: u16 = 2001;

/// ZMQ radio configuration.
#[derive(Debug, Clone)]
pub struct ZmqRfConfig {
    /// TX binding address (REP socket)
    pub tx_address: String,
    /// RX connection address (REQ socket)
    pub rx_address: String,
    /// Digital transmit gain in dB, applied to outgoing bursts
    pub tx_gain_db: f64,
    /// Digital receive gain in dB, applied to incoming samples
    pub rx_gain_db: f64,
    /// Socket receive timeout in milliseconds
    pub recv_timeout_ms: i32,
    /// Socket send timeout in milliseconds
    pub send_timeout_ms: i32,
}

impl Default for ZmqRfConfig {
    fn default() -> Self {
        Self {
            tx_address: format!("tcp://*:{DEFAULT_TX_PORT}"),
            rx_address: format!("tcp://localhost:{DEFAULT_RX_PORT}"),
            tx_gain_db: 0.0,
            rx_gain_db: 0.0,
            recv_timeout_ms: 100,
            send_timeout_ms: 100,
        }
    }
}

impl ZmqRfConfig {
    /// Parse device arguments of the form `key1=value1,key2=value2`.
    /// Recognized keys: `tx_port`, `rx_port` (full endpoint strings),
    /// `tx_gain`, `rx_gain` (dB).
    pub fn from_device_args(args: &str) -> Result<Self, InterfaceError> {
        let mut config = Self::default();

        for pair in args.split(',') {
            let mut parts = pair.trim().splitn(2, '=');
            let (key, value) = match (parts.next(), parts.next()) {
                (Some(k), Some(v)) => (k.trim(), v.trim()),
                _ => continue,
            };

            match key {
                "tx_port" => config.tx_address = value.to_string(),
                "rx_port" => config.rx_address = value.to_string(),
                "tx_gain" => {
                    config.tx_gain_db = value.parse().map_err(|_| {
                        InterfaceError::InvalidConfig("invalid tx_gain".to_string())
                    })?
                }
                "rx_gain" => {
                    config.rx_gain_db = value.parse().map_err(|_| {
                        InterfaceError::InvalidConfig("invalid rx_gain".to_string())
                    })?
                }
                "" => {}
                _ => {
                    return Err(InterfaceError::InvalidConfig(format!(
                        "unknown device argument '{key}'"
                    )))
                }
            }
        }

        Ok(config)
    }
}

/// Serialize samples to the cf32 wire format.
fn samples_to_bytes(samples: &[Sample]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 8);
    for sample in samples {
        bytes.extend_from_slice(&(sample.re as f32).to_le_bytes());
        bytes.extend_from_slice(&(sample.im as f32).to_le_bytes());
    }
    bytes
}

/// Deserialize samples from the cf32 wire format.
fn bytes_to_samples(bytes: &[u8]) -> Result<Vec<Sample>, InterfaceError> {
    if bytes.len() % 8 != 0 {
        return Err(InterfaceError::InvalidMessage);
    }

    let mut samples = Vec::with_capacity(bytes.len() / 8);
    for chunk in bytes.chunks_exact(8) {
        let re = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let im = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        samples.push(Sample::new(re as f64, im as f64));
    }
    Ok(samples)
}

/// ZMQ radio endpoint. Owns both sockets; `split` hands the receive
/// half and the transmit half to their respective threads.
pub struct ZmqRf {
    source: ZmqSource,
    sink: ZmqSink,
}

impl ZmqRf {
    /// Open both sockets. The TX side binds, the RX side connects.
    pub fn new(config: ZmqRfConfig) -> Result<Self, InterfaceError> {
        let context = zmq::Context::new();
        let stats = Arc::new(Mutex::new(RfStats::default()));

        info!(tx = %config.tx_address, rx = %config.rx_address, "opening ZMQ radio");

        let tx_socket = context.socket(zmq::REP)?;
        tx_socket.bind(&config.tx_address)?;
        tx_socket.set_rcvtimeo(config.recv_timeout_ms)?;
        tx_socket.set_sndtimeo(config.send_timeout_ms)?;

        let rx_socket = context.socket(zmq::REQ)?;
        rx_socket.connect(&config.rx_address)?;
        rx_socket.set_rcvtimeo(config.recv_timeout_ms)?;
        rx_socket.set_sndtimeo(config.send_timeout_ms)?;

        Ok(Self {
            source: ZmqSource {
                socket: rx_socket,
                leftover: VecDeque::new(),
                awaiting_reply: false,
                rx_scale: db_to_linear(config.rx_gain_db),
                stats: stats.clone(),
            },
            sink: ZmqSink {
                socket: tx_socket,
                pending: VecDeque::new(),
                tx_scale: db_to_linear(config.tx_gain_db),
                stats,
            },
        })
    }

    /// Split into the receive half and the transmit half.
    pub fn split(self) -> (ZmqSource, ZmqSink) {
        (self.source, self.sink)
    }
}

/// Receive half: REQ socket pulling sample chunks from the peer.
pub struct ZmqSource {
    socket: zmq::Socket,
    /// Samples received beyond what the last `fetch` asked for.
    leftover: VecDeque<Sample>,
    /// A request is outstanding and the reply has not arrived yet.
    awaiting_reply: bool,
    /// Linear receive gain applied to incoming samples.
    rx_scale: f64,
    stats: Arc<Mutex<RfStats>>,
}

impl ZmqSource {
    /// Driver statistics snapshot.
    pub fn stats(&self) -> RfStats {
        self.stats.lock().expect("stats lock").clone()
    }
}

impl SampleSource for ZmqSource {
    fn fetch(&mut self, n: usize, buf: &mut Vec<Sample>) -> Result<(), InterfaceError> {
        buf.clear();

        while buf.len() < n {
            while buf.len() < n {
                match self.leftover.pop_front() {
                    Some(sample) => buf.push(sample),
                    None => break,
                }
            }
            if buf.len() == n {
                break;
            }

            // REQ sockets strictly alternate send/recv; re-entering
            // after a timed-out recv must not send again.
            if !self.awaiting_reply {
                match self.socket.send(&[0u8][..], 0) {
                    Ok(()) => self.awaiting_reply = true,
                    Err(zmq::Error::EAGAIN) => {
                        trace!("rx request not accepted yet");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            match self.socket.recv_bytes(0) {
                Ok(bytes) => {
                    self.awaiting_reply = false;
                    let mut samples = bytes_to_samples(&bytes)?;
                    if self.rx_scale != 1.0 {
                        for sample in samples.iter_mut() {
                            *sample *= self.rx_scale;
                        }
                    }
                    let mut stats = self.stats.lock().expect("stats lock");
                    stats.rx_samples += samples.len() as u64;
                    drop(stats);
                    self.leftover.extend(samples);
                }
                Err(zmq::Error::EAGAIN) => {
                    trace!("rx reply pending");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

/// Transmit half: REP socket serving queued bursts to the peer.
pub struct ZmqSink {
    socket: zmq::Socket,
    /// Bursts waiting to be pulled by the peer.
    pending: VecDeque<Vec<Sample>>,
    /// Linear transmit gain applied to outgoing bursts.
    tx_scale: f64,
    stats: Arc<Mutex<RfStats>>,
}

impl ZmqSink {
    /// Driver statistics snapshot.
    pub fn stats(&self) -> RfStats {
        self.stats.lock().expect("stats lock").clone()
    }

    /// Serve one outstanding peer request from the pending queue, if
    /// both exist. Returns whether a burst was handed out.
    fn serve_one(&mut self, block: bool) -> Result<bool, InterfaceError> {
        if self.pending.is_empty() {
            return Ok(false);
        }

        let flags = if block { 0 } else { zmq::DONTWAIT };
        let mut request = [0u8; 8];
        match self.socket.recv_into(&mut request, flags) {
            Ok(_) => {}
            Err(zmq::Error::EAGAIN) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        let mut burst = self.pending.pop_front().expect("pending burst");
        if self.tx_scale != 1.0 {
            for sample in burst.iter_mut() {
                *sample *= self.tx_scale;
            }
        }
        let bytes = samples_to_bytes(&burst);
        debug!(
            samples = burst.len(),
            power_db = linear_to_db(signal_power(&burst)),
            "serving tx burst"
        );
        match self.socket.send(&bytes, 0) {
            Ok(()) => {
                let mut stats = self.stats.lock().expect("stats lock");
                stats.tx_samples += burst.len() as u64;
                Ok(true)
            }
            Err(zmq::Error::EAGAIN) => {
                // Peer asked but stopped reading; count it against the
                // link and drop the burst.
                warn!("tx send timed out, dropping burst");
                let mut stats = self.stats.lock().expect("stats lock");
                stats.tx_underruns += 1;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl SampleSink for ZmqSink {
    fn send_burst(&mut self, samples: Vec<Sample>) -> Result<(), InterfaceError> {
        self.pending.push_back(samples);
        // Opportunistically drain any requests that are already
        // waiting, without blocking the caller.
        while self.serve_one(false)? {}
        Ok(())
    }

    fn send_burst_sync(&mut self, samples: Vec<Sample>) -> Result<(), InterfaceError> {
        self.pending.push_back(samples);
        while !self.pending.is_empty() {
            self.serve_one(true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_roundtrip() {
        let samples = vec![
            Sample::new(0.5, -0.25),
            Sample::new(-1.0, 0.0),
            Sample::new(0.0, 1.0),
        ];
        let bytes = samples_to_bytes(&samples);
        assert_eq!(bytes.len(), 24);
        let back = bytes_to_samples(&bytes).unwrap();
        for (a, b) in samples.iter().zip(back.iter()) {
            assert!((a.re - b.re).abs() < 1e-6);
            assert!((a.im - b.im).abs() < 1e-6);
        }
    }

    #[test]
    fn truncated_payload_is_rejected() {
        assert!(bytes_to_samples(&[0u8; 7]).is_err());
    }

    #[test]
    fn device_args_parsing() {
        let config = ZmqRfConfig::from_device_args(
            "tx_port=tcp://*:5555, rx_port=tcp://localhost:5556, tx_gain=10, rx_gain=-3.5",
        )
        .unwrap();
        assert_eq!(config.tx_address, "tcp://*:5555");
        assert_eq!(config.rx_address, "tcp://localhost:5556");
        assert_eq!(config.tx_gain_db, 10.0);
        assert_eq!(config.rx_gain_db, -3.5);

        assert!(ZmqRfConfig::from_device_args("bogus=1").is_err());
        assert!(ZmqRfConfig::from_device_args("tx_gain=loud").is_err());
    }
}
