//! Timing Synchronization
//!
//! Second stage. After the detector brackets an STS, this block
//! cross-correlates the following window against the known
//! time-domain LTS, finds the two correlation peaks exactly one
//! symbol apart, and tags the symbol boundaries. The `Lts1` tag is
//! placed 8 samples before the true LTS start on purpose: the DFT
//! window then slides into the cyclic prefix, which the circular
//! structure of the symbols tolerates, buying slack against timing
//! error.
//!
//! The two LTS copies also yield a per-sample carrier-frequency-offset
//! estimate; every output sample is rotated by the accumulated
//! correction until the next frame refreshes the estimate.

use super::Block;
use crate::preamble::{self, LTS_LEN};
use crate::tagged::{TaggedSample, VectorTag};
use common::types::Sample;
use std::f64::consts::PI;
use tracing::trace;

/// Normalized LTS correlation threshold for peak candidates.
const LTS_CORR_THRESHOLD: f64 = 0.9;

/// Look-ahead window carried between calls, one preamble half.
const CARRYOVER_LENGTH: usize = 160;

/// LTS alignment and CFO correction block.
pub struct TimingSync {
    /// Estimated per-sample phase drift.
    phase_offset: f64,
    /// Accumulated phase correction, wrapped to (-pi, pi].
    phase_acc: f64,
    carryover: Vec<TaggedSample>,
}

impl TimingSync {
    pub fn new() -> Self {
        Self {
            phase_offset: 0.0,
            phase_acc: 0.0,
            carryover: vec![TaggedSample::default(); CARRYOVER_LENGTH],
        }
    }

    /// Scan the window after an `StsEnd` at `x` for the LTS pair and
    /// tag it. Updates the CFO estimate when the pair is found.
    fn locate_lts(&mut self, input: &mut [TaggedSample], x: usize) {
        let lts = preamble::lts_time();

        // Normalized cross-correlation against the known LTS at every
        // offset the look-ahead window allows. The bound is inclusive:
        // when the detector marks the STS end exactly at the guard
        // boundary, the second LTS peak sits at the last position the
        // 160-sample look-ahead can still fully cover.
        let mut peaks: Vec<(f64, usize)> = Vec::new();
        for p in x..=x + CARRYOVER_LENGTH - LTS_LEN {
            let mut corr = Sample::new(0.0, 0.0);
            let mut power = 0.0;
            for s in 0..LTS_LEN {
                corr += input[p + s].sample * lts[s].conj();
                power += input[p + s].sample.norm_sqr();
            }
            let corr_norm = corr.norm() / power;
            if corr_norm > LTS_CORR_THRESHOLD {
                peaks.push((corr_norm, p));
            }
        }

        peaks.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        // Among the strongest candidates, the first pair of positions
        // exactly one symbol apart wins.
        for s in (0..peaks.len().min(3)).step_by(5) {
            for t in s..(s + 5).min(peaks.len()) {
                if peaks[s].1.abs_diff(peaks[t].1) != LTS_LEN {
                    continue;
                }

                let lts_offset = peaks[s].1.min(peaks[t].1) as isize - 32;
                if lts_offset < 0 {
                    return;
                }
                let lts_offset = lts_offset as usize;

                input[lts_offset + 24].tag = VectorTag::Lts1;
                input[lts_offset + 24 + LTS_LEN].tag = VectorTag::Lts2;

                // The second LTS copy is the first rotated by 64
                // samples of drift.
                let first = lts_offset + 32;
                let mut acc = Sample::new(0.0, 0.0);
                for k in first..first + LTS_LEN {
                    acc += input[k].sample.conj() * input[k + LTS_LEN].sample;
                }
                self.phase_offset = acc.arg() / LTS_LEN as f64;

                // Seed the accumulator from the last LTS sample so the
                // correction is continuous entering the frame body.
                let lts_end = lts_offset + 32 + 2 * LTS_LEN - 1;
                self.phase_acc = (input[lts_end].sample * lts[LTS_LEN - 1].conj()).arg();

                trace!(
                    lts_offset,
                    phase_offset = self.phase_offset,
                    "LTS pair located"
                );
                return;
            }
        }
    }
}

impl Default for TimingSync {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for TimingSync {
    type In = TaggedSample;
    type Out = TaggedSample;

    fn name(&self) -> &'static str {
        "timing_sync"
    }

    fn work(&mut self, input_buf: &[TaggedSample], output: &mut Vec<TaggedSample>) {
        output.clear();
        if input_buf.is_empty() {
            return;
        }
        assert!(
            input_buf.len() > CARRYOVER_LENGTH,
            "chunks must exceed the {CARRYOVER_LENGTH}-sample look-ahead"
        );

        let mut input = Vec::with_capacity(self.carryover.len() + input_buf.len());
        input.extend_from_slice(&self.carryover);
        input.extend_from_slice(input_buf);

        for x in 0..input.len() - CARRYOVER_LENGTH {
            if input[x].tag == VectorTag::StsEnd {
                self.locate_lts(&mut input, x);
            }

            self.phase_acc += self.phase_offset;
            while self.phase_acc > PI {
                self.phase_acc -= 2.0 * PI;
            }
            while self.phase_acc <= -PI {
                self.phase_acc += 2.0 * PI;
            }
            let correction = Sample::from_polar(1.0, -self.phase_acc);
            input[x].sample *= correction;
        }

        // The emitted stream lags the input by one look-ahead window;
        // the uncorrected tail becomes the next call's head.
        output.extend_from_slice(&input[..input_buf.len()]);
        self.carryover.clear();
        self.carryover.extend_from_slice(&input[input_buf.len()..]);
    }
}
