//! 64-Point FFT Wrapper
//!
//! Owns the forward and inverse `rustfft` plans and the permutation
//! between natural bin order (0..63) and the centered
//! negative-then-positive frequency layout used everywhere else in the
//! chain. The transmit IFFT and the receive FFT must agree on this
//! permutation or the subcarrier map falls apart.

use crate::FFT_SIZE;
use common::types::Sample;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Centered index `s` corresponds to natural FFT bin `(s + 32) % 64`;
/// the mapping is its own inverse.
#[inline]
fn shifted(s: usize) -> usize {
    (s + FFT_SIZE / 2) % FFT_SIZE
}

/// Forward and inverse 64-point transforms with centered ordering.
pub struct Fft64 {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Fft64 {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(FFT_SIZE),
            inverse: planner.plan_fft_inverse(FFT_SIZE),
        }
    }

    /// In-place forward DFT of one symbol, reordering the output from
    /// natural to centered frequencies. Unscaled.
    pub fn forward(&self, data: &mut [Sample; FFT_SIZE]) {
        let mut natural = *data;
        self.forward.process(&mut natural);
        for s in 0..FFT_SIZE {
            data[s] = natural[shifted(s)];
        }
    }

    /// In-place inverse DFT over a buffer holding whole symbols in
    /// centered order. Scales by 1/64 so that `forward` inverts it
    /// exactly.
    ///
    /// # Panics
    /// Panics if the buffer length is not a multiple of 64.
    pub fn inverse(&self, data: &mut [Sample]) {
        assert_eq!(data.len() % FFT_SIZE, 0);

        let mut natural = [Sample::new(0.0, 0.0); FFT_SIZE];
        for symbol in data.chunks_exact_mut(FFT_SIZE) {
            for s in 0..FFT_SIZE {
                natural[s] = symbol[shifted(s)];
            }
            self.inverse.process(&mut natural);
            for s in 0..FFT_SIZE {
                symbol[s] = natural[s] / FFT_SIZE as f64;
            }
        }
    }
}

impl Default for Fft64 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_inverts_inverse() {
        let fft = Fft64::new();
        let mut symbol = [Sample::new(0.0, 0.0); FFT_SIZE];
        for (i, bin) in symbol.iter_mut().enumerate() {
            *bin = Sample::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos());
        }
        let original = symbol;

        let mut buf = symbol.to_vec();
        fft.inverse(&mut buf);
        symbol.copy_from_slice(&buf);
        fft.forward(&mut symbol);

        for (a, b) in symbol.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn single_centered_bin_is_a_complex_tone() {
        let fft = Fft64::new();
        // Centered index 33 is subcarrier +1: one cycle per symbol.
        let mut buf = vec![Sample::new(0.0, 0.0); FFT_SIZE];
        buf[33] = Sample::new(64.0, 0.0);
        fft.inverse(&mut buf);

        for (n, sample) in buf.iter().enumerate() {
            let phase = 2.0 * std::f64::consts::PI * n as f64 / FFT_SIZE as f64;
            assert!((sample.re - phase.cos()).abs() < 1e-12);
            assert!((sample.im - phase.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn dc_lands_in_the_middle() {
        let fft = Fft64::new();
        let mut symbol = [Sample::new(1.0, 0.0); FFT_SIZE];
        fft.forward(&mut symbol);
        // A constant signal has all its energy at DC, centered index 32.
        assert!((symbol[32].re - 64.0).abs() < 1e-12);
        assert!(symbol[0].norm() < 1e-12);
    }
}
