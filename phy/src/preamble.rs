//! Preamble Sequences
//!
//! The fixed 320-sample frame preamble and the training sequences it
//! is built from: ten repetitions of the 16-sample short training
//! symbol, a 32-sample guard (the long symbol's cyclic extension), and
//! two 64-sample long training symbols. The time-domain sequences are
//! generated once from the standard frequency-domain definitions using
//! the same IFFT path the transmitter uses, so transmit and receive
//! agree bit-exactly on the waveform.

use crate::fft::Fft64;
use crate::{FFT_SIZE, PREAMBLE_LEN};
use common::types::Sample;
use std::sync::OnceLock;

/// Length of one short training symbol in samples.
pub const STS_LEN: usize = 16;

/// Length of one long training symbol in samples.
pub const LTS_LEN: usize = 64;

/// Frequency-domain long training sequence in centered order:
/// ±1 on the 52 active subcarriers, 0 on DC and the band edges.
const LTS_FREQ_SIGNS: [i8; 64] = [
    0, 0, 0, 0, 0, 0, 1, 1, -1, -1, 1, 1, -1, 1, -1, 1, 1, 1, 1, 1, 1, -1, -1, 1, 1, -1, 1, -1, 1,
    1, 1, 1, 0, 1, -1, -1, 1, 1, -1, 1, -1, 1, -1, -1, -1, -1, -1, 1, 1, -1, -1, 1, -1, 1, -1, 1,
    1, 1, 1, 0, 0, 0, 0, 0,
];

/// Frequency-domain short training sequence in centered order: the
/// twelve populated subcarriers carry ±(1+j) and sit on every fourth
/// bin, which is what makes the time-domain sequence 16-periodic. The
/// √(13/6) factor equalizes preamble and data symbol power.
const STS_FREQ_SIGNS: [i8; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, -1, 0, 0, 0, 1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, 1, 0,
    0, 0, 0, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0,
    0, 0, 0,
];

struct Tables {
    lts_freq: [Sample; FFT_SIZE],
    lts_time: [Sample; LTS_LEN],
    short_time: [Sample; STS_LEN],
    preamble: [Sample; PREAMBLE_LEN],
}

fn build_tables() -> Tables {
    let fft = Fft64::new();

    let mut lts_freq = [Sample::new(0.0, 0.0); FFT_SIZE];
    for (bin, &sign) in lts_freq.iter_mut().zip(LTS_FREQ_SIGNS.iter()) {
        *bin = Sample::new(sign as f64, 0.0);
    }

    let scale = (13.0f64 / 6.0).sqrt();
    let mut sts_freq = [Sample::new(0.0, 0.0); FFT_SIZE];
    for (bin, &sign) in sts_freq.iter_mut().zip(STS_FREQ_SIGNS.iter()) {
        *bin = Sample::new(sign as f64 * scale, sign as f64 * scale);
    }

    let mut lts_time = [Sample::new(0.0, 0.0); LTS_LEN];
    let mut buf = lts_freq.to_vec();
    fft.inverse(&mut buf);
    lts_time.copy_from_slice(&buf);

    let mut buf = sts_freq.to_vec();
    fft.inverse(&mut buf);
    let mut short_time = [Sample::new(0.0, 0.0); STS_LEN];
    short_time.copy_from_slice(&buf[..STS_LEN]);

    let mut preamble = [Sample::new(0.0, 0.0); PREAMBLE_LEN];
    for (i, sample) in preamble.iter_mut().take(10 * STS_LEN).enumerate() {
        *sample = short_time[i % STS_LEN];
    }
    preamble[160..192].copy_from_slice(&lts_time[32..]);
    preamble[192..256].copy_from_slice(&lts_time);
    preamble[256..320].copy_from_slice(&lts_time);

    Tables {
        lts_freq,
        lts_time,
        short_time,
        preamble,
    }
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

/// The frequency-domain LTS, used by the channel estimator as the
/// known reference.
pub fn lts_freq() -> &'static [Sample; FFT_SIZE] {
    &tables().lts_freq
}

/// One time-domain long training symbol, used by the timing
/// synchronizer as the cross-correlation reference.
pub fn lts_time() -> &'static [Sample; LTS_LEN] {
    &tables().lts_time
}

/// One time-domain short training symbol.
pub fn short_symbol() -> &'static [Sample; STS_LEN] {
    &tables().short_time
}

/// The complete 320-sample preamble prepended to every frame.
pub fn preamble_samples() -> &'static [Sample; PREAMBLE_LEN] {
    &tables().preamble
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::signal_power;

    #[test]
    fn preamble_structure() {
        let preamble = preamble_samples();
        assert_eq!(preamble.len(), 320);

        // First 160 samples: ten periodic repeats of the short symbol.
        let short = short_symbol();
        for i in 0..160 {
            assert!((preamble[i] - short[i % STS_LEN]).norm() < 1e-12);
        }

        // Then a 32-sample guard which cyclically extends the LTS,
        // followed by the two long symbols.
        let lts = lts_time();
        for i in 0..32 {
            assert!((preamble[160 + i] - lts[32 + i]).norm() < 1e-12);
        }
        for i in 0..64 {
            assert!((preamble[192 + i] - lts[i]).norm() < 1e-12);
            assert!((preamble[256 + i] - lts[i]).norm() < 1e-12);
        }
    }

    #[test]
    fn active_subcarrier_counts() {
        let active = LTS_FREQ_SIGNS.iter().filter(|&&s| s != 0).count();
        assert_eq!(active, 52);
        assert_eq!(LTS_FREQ_SIGNS[32], 0, "DC must be null");

        let sts_active = STS_FREQ_SIGNS.iter().filter(|&&s| s != 0).count();
        assert_eq!(sts_active, 12);
        // Populated bins every fourth subcarrier keeps the time
        // sequence 16-periodic.
        for (i, &s) in STS_FREQ_SIGNS.iter().enumerate() {
            if s != 0 {
                assert_eq!(i % 4, 0);
            }
        }
    }

    #[test]
    fn preamble_power_matches_data_symbols() {
        // Data symbols carry 52 unit-power subcarriers through the
        // 1/64-scaled IFFT: average sample power 52/64².
        let target = 52.0 / (64.0 * 64.0);
        let power = signal_power(preamble_samples().as_slice());
        assert!(
            (power - target).abs() / target < 0.01,
            "preamble power {power} vs target {target}"
        );
    }

    #[test]
    fn lts_symbol_is_64_periodic_across_the_guard() {
        // The guard is a cyclic extension: sample 160+i equals sample
        // 224+i for the overlapping stretch.
        let preamble = preamble_samples();
        for i in 0..32 {
            assert!((preamble[160 + i] - preamble[224 + i]).norm() < 1e-12);
        }
    }
}
