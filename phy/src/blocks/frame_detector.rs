//! Frame Detector
//!
//! First stage of the receive chain. Detects the short training
//! sequence by autocorrelating the input against itself delayed by one
//! short-symbol period: during the STS the stream is 16-periodic, so
//! the normalized autocorrelation plateaus near one. A sustained
//! plateau tags `StsStart`; falling off the plateau tags `StsEnd`,
//! which arms the LTS search downstream.

use super::Block;
use crate::preamble::STS_LEN;
use crate::tagged::{TaggedSample, VectorTag};
use common::types::Sample;
use tracing::trace;

/// Normalized correlation above which a sample counts as plateau.
const PLATEAU_THRESHOLD: f64 = 0.9;

/// Samples of sustained correlation required to call it an STS.
const STS_PLATEAU_LENGTH: usize = 16;

/// Running sum over the last `size` samples. Adding a new sample
/// evicts the oldest; NaN input is treated as zero so one radio glitch
/// cannot poison the sum.
struct CircularAccumulator<T> {
    sum: T,
    samples: Vec<T>,
    index: usize,
}

impl CircularAccumulator<Sample> {
    fn new(size: usize) -> Self {
        Self {
            sum: Sample::new(0.0, 0.0),
            samples: vec![Sample::new(0.0, 0.0); size],
            index: 0,
        }
    }

    fn add(&mut self, mut sample: Sample) {
        if sample.re.is_nan() || sample.im.is_nan() {
            sample = Sample::new(0.0, 0.0);
        }
        self.sum -= self.samples[self.index];
        self.sum += sample;
        self.samples[self.index] = sample;
        self.index = (self.index + 1) % self.samples.len();
    }
}

impl CircularAccumulator<f64> {
    fn new_real(size: usize) -> Self {
        Self {
            sum: 0.0,
            samples: vec![0.0; size],
            index: 0,
        }
    }

    fn add(&mut self, mut sample: f64) {
        if sample.is_nan() {
            sample = 0.0;
        }
        self.sum -= self.samples[self.index];
        self.sum += sample;
        self.samples[self.index] = sample;
        self.index = (self.index + 1) % self.samples.len();
    }
}

/// STS detector block: complex samples in, tagged samples out.
pub struct FrameDetector {
    corr_acc: CircularAccumulator<Sample>,
    power_acc: CircularAccumulator<f64>,
    plateau_length: usize,
    plateau_flag: bool,
    /// Last 16 input samples of the previous call, the delayed side of
    /// the autocorrelation across the chunk boundary.
    carryover: Vec<Sample>,
}

impl FrameDetector {
    pub fn new() -> Self {
        Self {
            corr_acc: CircularAccumulator::<Sample>::new(STS_LEN),
            power_acc: CircularAccumulator::<f64>::new_real(STS_LEN),
            plateau_length: 0,
            plateau_flag: false,
            carryover: vec![Sample::new(0.0, 0.0); STS_LEN],
        }
    }
}

impl Default for FrameDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for FrameDetector {
    type In = Sample;
    type Out = TaggedSample;

    fn name(&self) -> &'static str {
        "frame_detector"
    }

    fn work(&mut self, input: &[Sample], output: &mut Vec<TaggedSample>) {
        output.clear();
        if input.is_empty() {
            return;
        }
        output.reserve(input.len());

        for (x, &sample) in input.iter().enumerate() {
            let mut tag = VectorTag::None;

            let delayed = if x < STS_LEN {
                self.carryover[x]
            } else {
                input[x - STS_LEN]
            };

            self.corr_acc.add(sample * delayed.conj());
            self.power_acc.add(sample.norm_sqr());

            let corr = self.corr_acc.sum.norm() / self.power_acc.sum;

            if corr > PLATEAU_THRESHOLD {
                self.plateau_length += 1;
                if self.plateau_length == STS_PLATEAU_LENGTH {
                    tag = VectorTag::StsStart;
                    self.plateau_flag = true;
                    trace!(offset = x, "STS plateau");
                }
            } else {
                if self.plateau_flag {
                    tag = VectorTag::StsEnd;
                    self.plateau_flag = false;
                }
                self.plateau_length = 0;
            }

            output.push(TaggedSample { sample, tag });
        }

        // Keep the last 16 input samples for the next call's delay line.
        let tail = input.len().saturating_sub(STS_LEN);
        self.carryover.clear();
        if input.len() < STS_LEN {
            self.carryover
                .resize(STS_LEN - input.len(), Sample::new(0.0, 0.0));
        }
        self.carryover.extend_from_slice(&input[tail..]);
    }
}
