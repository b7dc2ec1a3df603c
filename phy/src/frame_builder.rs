//! Frame Builder
//!
//! The transmit chain: payload bytes in, a complex baseband burst out.
//! Builds the PPDU (header + encoded payload), maps the constellation
//! points onto subcarriers, IFFTs each symbol, prepends cyclic
//! prefixes, and finally prepends the 320-sample preamble.

use crate::fft::Fft64;
use crate::ppdu::Ppdu;
use crate::{preamble, symbol_mapper, PhyError, CP_LEN, FFT_SIZE, SYMBOL_LEN};
use common::types::{Rate, Sample, MAX_FRAME_SIZE};
use tracing::debug;

/// Builds transmit bursts.
pub struct FrameBuilder {
    ifft: Fft64,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self { ifft: Fft64::new() }
    }

    /// Build the complete baseband burst for one frame.
    pub fn build_frame(&self, payload: &[u8], rate: Rate) -> Result<Vec<Sample>, PhyError> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(PhyError::PayloadTooLarge(payload.len()));
        }

        // Header, scramble, code, interleave, modulate.
        let ppdu = Ppdu::new(payload.to_vec(), rate);
        let points = ppdu.encode();

        // Insert pilots and nulls, then convert to time domain.
        let mut mapped = symbol_mapper::map(&points);
        self.ifft.inverse(&mut mapped);

        // Cyclic prefix: the last 16 samples of each symbol body come
        // first, giving 80 samples per symbol on the air.
        let num_symbols = mapped.len() / FFT_SIZE;
        let mut prefixed = Vec::with_capacity(num_symbols * SYMBOL_LEN);
        for symbol in mapped.chunks_exact(FFT_SIZE) {
            prefixed.extend_from_slice(&symbol[FFT_SIZE - CP_LEN..]);
            prefixed.extend_from_slice(symbol);
        }

        let preamble = preamble::preamble_samples();
        let mut frame = Vec::with_capacity(preamble.len() + prefixed.len());
        frame.extend_from_slice(preamble);
        frame.extend_from_slice(&prefixed);

        debug!(
            payload_len = payload.len(),
            rate = ?rate,
            samples = frame.len(),
            "built frame"
        );
        Ok(frame)
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
