//! Common Utilities
//!
//! Small signal helpers shared by the transceiver crates and the test
//! harnesses.

use crate::types::Sample;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Average power of a complex signal.
pub fn signal_power(signal: &[Sample]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|s| s.norm_sqr()).sum::<f64>() / signal.len() as f64
}

/// Convert a dB value to a linear amplitude scale.
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear power value to dB.
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Add white Gaussian noise to a signal in place.
///
/// `snr` is a linear amplitude ratio; the per-axis noise deviation is
/// `sqrt(P_sig) / snr`. An `snr` of 0 is interpreted as "no noise" so
/// that simulations can share one code path.
pub fn add_awgn<R: Rng>(signal: &mut [Sample], snr: f64, rng: &mut R) {
    if snr == 0.0 {
        return;
    }

    let sig_pwr = signal_power(signal);
    let noise_std_dev = sig_pwr.sqrt() / snr;
    let dist = Normal::new(0.0, noise_std_dev).expect("valid deviation");
    for sample in signal.iter_mut() {
        *sample += Sample::new(dist.sample(rng), dist.sample(rng));
    }
}
