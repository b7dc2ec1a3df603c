//! Pilot Phase Tracking
//!
//! Fifth stage. The equalizer removes the channel measured at the
//! preamble, but oscillator drift keeps rotating the constellation a
//! little more every symbol. The four pilot subcarriers carry known
//! BPSK values (polarity-sequenced per symbol), so comparing them
//! against their expected values yields the residual rotation, which
//! is removed from the 48 data carriers. Pilots and nulls are dropped
//! here; only data carriers flow on.

use super::Block;
use crate::symbol_mapper::{DATA_SUBCARRIERS, PILOT_POSITIONS, PILOT_VALUES, POLARITY};
use crate::tagged::{TaggedVector, VectorTag};
use crate::{FFT_SIZE, NUM_DATA_SUBCARRIERS};
use common::types::Sample;

/// Pilot-tracking block: 64-bin symbols in, 48-bin symbols out.
pub struct PhaseTracker {
    /// Position of the current symbol within its frame, indexing the
    /// pilot polarity sequence.
    symbol_count: usize,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self { symbol_count: 0 }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for PhaseTracker {
    type In = TaggedVector<FFT_SIZE>;
    type Out = TaggedVector<NUM_DATA_SUBCARRIERS>;

    fn name(&self) -> &'static str {
        "phase_tracker"
    }

    fn work(
        &mut self,
        input: &[TaggedVector<FFT_SIZE>],
        output: &mut Vec<TaggedVector<NUM_DATA_SUBCARRIERS>>,
    ) {
        output.clear();
        if input.is_empty() {
            return;
        }

        for symbol in input {
            if symbol.tag == VectorTag::StartOfFrame {
                self.symbol_count = 0;
            }

            // Average pilot rotation against the expected values.
            let polarity = POLARITY[self.symbol_count % POLARITY.len()];
            let mut phase_error = Sample::new(0.0, 0.0);
            for (p, &pos) in PILOT_POSITIONS.iter().enumerate() {
                let expected = Sample::new(PILOT_VALUES[p] * polarity, 0.0);
                phase_error += symbol.samples[pos] * expected.conj() / 4.0;
            }
            let angle = phase_error.arg();
            let correction = Sample::from_polar(1.0, -angle);

            let mut out = TaggedVector::new(symbol.tag);
            for (s, &index) in DATA_SUBCARRIERS.iter().enumerate() {
                out.samples[s] = symbol.samples[index] * correction;
            }
            output.push(out);

            self.symbol_count += 1;
        }
    }
}
