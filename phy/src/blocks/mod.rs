//! Receive-Chain Blocks
//!
//! Each stage of the receive pipeline is a block: a stateful unit with
//! an input buffer of items of one type and an output buffer of
//! another, advanced one `work` call at a time by the scheduler. A
//! block runs to completion on whatever the scheduler has placed in
//! its input buffer, carrying whatever window state it needs across
//! calls (delay lines, phase accumulators, partial symbols).

mod channel_est;
mod fft_symbols;
mod frame_decoder;
mod frame_detector;
mod phase_tracker;
mod timing_sync;

pub use channel_est::ChannelEst;
pub use fft_symbols::FftSymbols;
pub use frame_decoder::FrameDecoder;
pub use frame_detector::FrameDetector;
pub use phase_tracker::PhaseTracker;
pub use timing_sync::TimingSync;

/// Upper bound on the number of items a stage buffer may hold. The
/// scheduler rejects larger input chunks; every downstream stage
/// produces at most one item per input item, so the bound holds along
/// the whole chain.
pub const BUFFER_MAX: usize = 65536;

/// One stage of the receive pipeline.
pub trait Block: Send {
    type In: Send + 'static;
    type Out: Send + 'static;

    /// Display name for logs.
    fn name(&self) -> &'static str;

    /// Consume the input buffer and fill the output buffer. The
    /// scheduler owns buffer hand-off; `work` must leave `output`
    /// holding exactly this call's results.
    fn work(&mut self, input: &[Self::In], output: &mut Vec<Self::Out>);
}
