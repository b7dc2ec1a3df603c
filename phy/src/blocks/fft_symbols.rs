//! Symbol Framing and Forward DFT
//!
//! Third stage. Walks the tagged sample stream, aligns it into
//! 80-sample symbols using the LTS tags, strips each 16-sample cyclic
//! prefix, and converts the remaining 64-sample bodies to frequency
//! domain with the centered bin ordering the subcarrier map assumes.
//! The first symbol after `Lts1` is tagged `LtsStart` so the channel
//! estimator knows where training begins.

use super::Block;
use crate::fft::Fft64;
use crate::tagged::{TaggedSample, TaggedVector, VectorTag};
use crate::{CP_LEN, FFT_SIZE, SYMBOL_LEN};

/// Symbol alignment and FFT block.
pub struct FftSymbols {
    /// Position within the current 80-sample symbol.
    offset: usize,
    current: TaggedVector<FFT_SIZE>,
    fft: Fft64,
}

impl FftSymbols {
    pub fn new() -> Self {
        Self {
            offset: 0,
            current: TaggedVector::default(),
            fft: Fft64::new(),
        }
    }
}

impl Default for FftSymbols {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for FftSymbols {
    type In = TaggedSample;
    type Out = TaggedVector<FFT_SIZE>;

    fn name(&self) -> &'static str {
        "fft_symbols"
    }

    fn work(&mut self, input: &[TaggedSample], output: &mut Vec<TaggedVector<FFT_SIZE>>) {
        output.clear();
        if input.is_empty() {
            return;
        }

        for item in input {
            match item.tag {
                VectorTag::Lts1 => {
                    // Realign on the first LTS symbol; flush a partial
                    // symbol if it already held body samples.
                    if self.offset > CP_LEN - 1 {
                        output.push(self.current);
                    }
                    self.current.tag = VectorTag::LtsStart;
                    self.offset = CP_LEN;
                }
                VectorTag::Lts2 => {
                    // The second LTS starts a fresh 64-sample window
                    // with no additional prefix in between.
                    self.offset = CP_LEN;
                }
                _ => {}
            }

            if self.offset >= CP_LEN {
                self.current.samples[self.offset - CP_LEN] = item.sample;
            }

            self.offset += 1;
            if self.offset == SYMBOL_LEN {
                output.push(self.current);
                self.current.tag = VectorTag::None;
                self.offset = 0;
            }
        }

        for symbol in output.iter_mut() {
            self.fft.forward(&mut symbol.samples);
        }
    }
}
