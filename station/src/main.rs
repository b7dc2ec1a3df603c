//! Demo 802.11a Transceiver Station
//!
//! Three modes: transmit frames over a ZMQ soft radio, receive and
//! print decoded frames, or run a self-contained loopback simulation
//! that pushes generated frames through the full receive chain.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::RngCore;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use common::types::Sample;
use interfaces::{loopback_pair, SampleSink, SampleSource, ZmqRf, ZmqRfConfig};
use phy::{FrameBuilder, Receiver, ReceiverChain, Transmitter};

mod config;
use config::StationConfig;

/// 802.11a OFDM transceiver station
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Transmit frames over the ZMQ radio
    Tx {
        /// Payload text for every frame
        #[arg(short, long, default_value = "Hello World")]
        payload: String,
        /// Number of frames to send (0 = forever)
        #[arg(short, long, default_value_t = 10)]
        count: usize,
        /// Pause between frames in milliseconds
        #[arg(short, long, default_value_t = 100)]
        interval_ms: u64,
    },
    /// Receive frames from the ZMQ radio and print them
    Rx,
    /// Loopback simulation: frames through the receive chain in-process
    Sim {
        /// Number of frames to run
        #[arg(short, long, default_value_t = 100)]
        frames: usize,
        /// Random payload size in bytes
        #[arg(short, long, default_value_t = 1500)]
        payload_size: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StationConfig::from_yaml_file(path)?,
        None => StationConfig::default(),
    };

    let level = args.log_level.as_ref().unwrap_or(&config.log.level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.clone()));
    fmt().with_env_filter(env_filter).with_target(true).init();

    info!("station starting");
    info!("  frequency: {} MHz", config.radio.freq / 1e6);
    info!("  sample rate: {} MHz", config.radio.rate / 1e6);
    info!("  PHY rate: {:?}", config.link.phy_rate);

    match args.mode {
        Mode::Tx {
            payload,
            count,
            interval_ms,
        } => run_tx(&config, payload.into_bytes(), count, interval_ms),
        Mode::Rx => run_rx(&config),
        Mode::Sim {
            frames,
            payload_size,
        } => run_sim(&config, frames, payload_size),
    }
}

fn zmq_config(config: &StationConfig) -> Result<ZmqRfConfig> {
    let mut zmq = if config.radio.device_addr.is_empty() {
        ZmqRfConfig::default()
    } else {
        ZmqRfConfig::from_device_args(&config.radio.device_addr)?
    };
    // Gains from the radio section apply unless the device arguments
    // already set them.
    if zmq.tx_gain_db == 0.0 {
        zmq.tx_gain_db = config.radio.tx_gain;
    }
    if zmq.rx_gain_db == 0.0 {
        zmq.rx_gain_db = config.radio.rx_gain;
    }
    Ok(zmq)
}

fn run_tx(config: &StationConfig, payload: Vec<u8>, count: usize, interval_ms: u64) -> Result<()> {
    let radio = ZmqRf::new(zmq_config(config)?)?;
    let (_source, sink) = radio.split();

    let mut tx = Transmitter::new(sink, &config.radio.to_params());
    let rate = config.link.phy_rate;

    let mut sent = 0usize;
    while count == 0 || sent < count {
        tx.send_frame(&payload, rate)?;
        sent += 1;
        info!(sent, "frame transmitted");
        std::thread::sleep(Duration::from_millis(interval_ms));
    }

    let stats = tx.sink().stats();
    info!(tx_samples = stats.tx_samples, "transmit complete");
    Ok(())
}

fn run_rx(config: &StationConfig) -> Result<()> {
    let radio = ZmqRf::new(zmq_config(config)?)?;
    let (source, _sink) = radio.split();

    let _receiver = Receiver::new(
        |packets| {
            for packet in packets {
                match std::str::from_utf8(&packet) {
                    Ok(text) => info!(len = packet.len(), "received: {text}"),
                    Err(_) => info!(len = packet.len(), "received binary payload"),
                }
            }
        },
        source,
    );

    info!("receiving; stop with ctrl-c");
    // The intake loop owns the work; this thread only keeps the
    // session alive.
    loop {
        std::thread::sleep(Duration::from_secs(3600));
    }
}

fn run_sim(config: &StationConfig, frames: usize, payload_size: usize) -> Result<()> {
    let rate = config.link.phy_rate;
    info!(frames, payload_size, "running loopback simulation");

    let mut payload = vec![0u8; payload_size];
    rand::thread_rng().fill_bytes(&mut payload);

    let builder = FrameBuilder::new();
    let frame = builder.build_frame(&payload, rate)?;

    // Space the frames out and pad the tail so the pipeline drains.
    let gap = 500usize;
    let (mut sink, mut source) = loopback_pair();
    for _ in 0..frames {
        sink.send_burst(frame.clone())?;
        sink.send_burst(vec![Sample::new(0.0, 0.0); gap])?;
    }

    let mut chain = ReceiverChain::new();
    let chunk_size = 4096usize;
    let total = frames * (frame.len() + gap) + 16 * chunk_size;

    let mut received = 0usize;
    let mut intact = 0usize;
    let mut buf = Vec::new();
    let mut consumed = 0usize;
    while consumed < total {
        source.fetch(chunk_size, &mut buf)?;
        consumed += chunk_size;
        for packet in chain.process_samples(std::mem::take(&mut buf)) {
            received += 1;
            if packet == payload {
                intact += 1;
            } else {
                warn!("payload mismatch");
            }
        }
    }

    info!(frames, received, intact, "simulation finished");
    if received != frames {
        warn!(
            missing = frames.saturating_sub(received),
            "some frames were not recovered"
        );
    }
    Ok(())
}
