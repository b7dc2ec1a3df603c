//! Channel Estimation and Equalization
//!
//! Fourth stage. The two received LTS symbols are compared bin by bin
//! against the known frequency-domain LTS; averaging the two gives the
//! inverse channel response, which then multiplies every subsequent
//! data symbol. The symbol after the second LTS is the SIGNAL symbol,
//! so it leaves this block tagged `StartOfFrame`.

use super::Block;
use crate::preamble;
use crate::tagged::{TaggedVector, VectorTag};
use crate::FFT_SIZE;
use common::types::Sample;
use tracing::trace;

/// LTS-driven equalizer block.
pub struct ChannelEst {
    /// Inverse channel estimate per subcarrier.
    chan_est: [Sample; FFT_SIZE],
    /// 0 outside the LTS, otherwise which LTS symbol comes next.
    lts_flag: u8,
    /// The next data symbol starts a frame.
    frame_start: bool,
}

impl ChannelEst {
    pub fn new() -> Self {
        Self {
            chan_est: [Sample::new(1.0, 0.0); FFT_SIZE],
            lts_flag: 0,
            frame_start: false,
        }
    }
}

impl Default for ChannelEst {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for ChannelEst {
    type In = TaggedVector<FFT_SIZE>;
    type Out = TaggedVector<FFT_SIZE>;

    fn name(&self) -> &'static str {
        "channel_est"
    }

    fn work(&mut self, input: &[TaggedVector<FFT_SIZE>], output: &mut Vec<TaggedVector<FFT_SIZE>>) {
        output.clear();
        if input.is_empty() {
            return;
        }

        let lts_freq = preamble::lts_freq();

        for symbol in input {
            if symbol.tag == VectorTag::LtsStart {
                self.lts_flag = 1;
                self.chan_est = [Sample::new(0.0, 0.0); FFT_SIZE];
            }

            if self.lts_flag > 0 {
                // Training symbol: accumulate half of the inverse
                // response from each LTS copy.
                for j in 0..FFT_SIZE {
                    self.chan_est[j] += lts_freq[j] / symbol.samples[j] / 2.0;
                }

                self.lts_flag += 1;
                if self.lts_flag == 3 {
                    self.lts_flag = 0;
                    self.frame_start = true;
                    trace!("channel estimate complete");
                }
            } else {
                let mut out = TaggedVector::new(VectorTag::None);
                if self.frame_start {
                    out.tag = VectorTag::StartOfFrame;
                    self.frame_start = false;
                }

                for j in 0..FFT_SIZE {
                    out.samples[j] = self.chan_est[j] * symbol.samples[j];
                }
                output.push(out);
            }
        }
    }
}
