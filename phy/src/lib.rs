//! IEEE 802.11a OFDM Baseband PHY
//!
//! Converts payload bytes into complex baseband bursts (the transmit
//! chain) and a continuous stream of received baseband samples back
//! into verified payloads (the receive chain). The receive chain is a
//! six-stage pipeline of blocks driven by a barrier scheduler, one
//! worker thread per block:
//!
//! 1. [`blocks::FrameDetector`] — short-training-sequence detection
//! 2. [`blocks::TimingSync`] — LTS alignment and coarse CFO correction
//! 3. [`blocks::FftSymbols`] — cyclic-prefix removal and 64-point DFT
//! 4. [`blocks::ChannelEst`] — LTS channel estimation and equalization
//! 5. [`blocks::PhaseTracker`] — pilot-driven residual phase removal
//! 6. [`blocks::FrameDecoder`] — header/payload decode and CRC check
//!
//! [`Transmitter`] and [`Receiver`] wrap the chains behind the radio
//! traits from the `interfaces` crate.

pub mod blocks;
pub mod crc;
pub mod fft;
pub mod frame_builder;
pub mod interleaver;
pub mod modulator;
pub mod ppdu;
pub mod preamble;
pub mod puncturer;
pub mod qam;
pub mod receiver;
pub mod receiver_chain;
pub mod scrambler;
pub mod symbol_mapper;
pub mod tagged;
pub mod transmitter;
pub mod viterbi;

mod realtime;

pub use frame_builder::FrameBuilder;
pub use ppdu::{PlcpHeader, Ppdu};
pub use receiver::Receiver;
pub use receiver_chain::ReceiverChain;
pub use tagged::{TaggedSample, TaggedVector, VectorTag};
pub use transmitter::Transmitter;

use common::types::MAX_FRAME_SIZE;
use thiserror::Error;

/// Number of OFDM subcarriers; every DFT in the chain is this size.
pub const FFT_SIZE: usize = 64;

/// Cyclic prefix length in samples.
pub const CP_LEN: usize = 16;

/// One OFDM symbol on the air: cyclic prefix plus body.
pub const SYMBOL_LEN: usize = CP_LEN + FFT_SIZE;

/// Number of data subcarriers per symbol.
pub const NUM_DATA_SUBCARRIERS: usize = 48;

/// Number of pilot subcarriers per symbol.
pub const NUM_PILOTS: usize = 4;

/// Length of the transmitted preamble in samples.
pub const PREAMBLE_LEN: usize = 320;

/// PHY-level errors. Per-frame decode failures are not errors — they
/// are silent drops inside the receive chain — so this surface covers
/// only session setup, transmit-side validation, and radio I/O.
#[derive(Error, Debug)]
pub enum PhyError {
    #[error("payload of {0} bytes exceeds the maximum frame size of {MAX_FRAME_SIZE}")]
    PayloadTooLarge(usize),

    #[error("radio error: {0}")]
    Radio(#[from] interfaces::InterfaceError),
}
