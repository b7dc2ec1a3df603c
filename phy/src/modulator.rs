//! Bit-Level Modulator
//!
//! Maps coded bits (one bit per byte) onto complex constellation
//! points for a PHY rate, and recovers per-bit soft values from
//! received points. BPSK occupies only the real axis; the other
//! constellations split their bits evenly between the axes.

use crate::qam::Qam;
use common::types::{Rate, Sample};

/// Modulate coded bits into constellation points.
///
/// The input length must be a multiple of the rate's bits per
/// subcarrier; the output carries one sample per subcarrier.
pub fn modulate(bits: &[u8], rate: Rate) -> Vec<Sample> {
    match rate {
        Rate::Bpsk1_2 | Rate::Bpsk2_3 | Rate::Bpsk3_4 => {
            let bpsk = Qam::<1>::new(1.0);
            bits.iter()
                .map(|b| Sample::new(bpsk.encode(std::slice::from_ref(b)), 0.0))
                .collect()
        }
        Rate::Qpsk1_2 | Rate::Qpsk2_3 | Rate::Qpsk3_4 => {
            let qpsk = Qam::<1>::new(0.5);
            bits.chunks_exact(2)
                .map(|pair| Sample::new(qpsk.encode(&pair[..1]), qpsk.encode(&pair[1..])))
                .collect()
        }
        Rate::Qam16_1_2 | Rate::Qam16_2_3 | Rate::Qam16_3_4 => {
            let qam16 = Qam::<2>::new(0.5);
            bits.chunks_exact(4)
                .map(|quad| Sample::new(qam16.encode(&quad[..2]), qam16.encode(&quad[2..])))
                .collect()
        }
        Rate::Qam64_2_3 | Rate::Qam64_3_4 => {
            let qam64 = Qam::<3>::new(0.5);
            bits.chunks_exact(6)
                .map(|six| Sample::new(qam64.encode(&six[..3]), qam64.encode(&six[3..])))
                .collect()
        }
    }
}

/// Demodulate constellation points into soft bits, one byte per coded
/// bit with confidence 0..=255.
pub fn demodulate(samples: &[Sample], rate: Rate) -> Vec<u8> {
    match rate {
        Rate::Bpsk1_2 | Rate::Bpsk2_3 | Rate::Bpsk3_4 => {
            let bpsk = Qam::<1>::new(1.0);
            let mut bits = vec![0u8; samples.len()];
            for (s, out) in samples.iter().zip(bits.chunks_exact_mut(1)) {
                bpsk.decode(s.re, out);
            }
            bits
        }
        Rate::Qpsk1_2 | Rate::Qpsk2_3 | Rate::Qpsk3_4 => {
            let qpsk = Qam::<1>::new(0.5);
            let mut bits = vec![0u8; samples.len() * 2];
            for (s, out) in samples.iter().zip(bits.chunks_exact_mut(2)) {
                qpsk.decode(s.re, &mut out[..1]);
                qpsk.decode(s.im, &mut out[1..]);
            }
            bits
        }
        Rate::Qam16_1_2 | Rate::Qam16_2_3 | Rate::Qam16_3_4 => {
            let qam16 = Qam::<2>::new(0.5);
            let mut bits = vec![0u8; samples.len() * 4];
            for (s, out) in samples.iter().zip(bits.chunks_exact_mut(4)) {
                qam16.decode(s.re, &mut out[..2]);
                qam16.decode(s.im, &mut out[2..]);
            }
            bits
        }
        Rate::Qam64_2_3 | Rate::Qam64_3_4 => {
            let qam64 = Qam::<3>::new(0.5);
            let mut bits = vec![0u8; samples.len() * 6];
            for (s, out) in samples.iter().zip(bits.chunks_exact_mut(6)) {
                qam64.decode(s.re, &mut out[..3]);
                qam64.decode(s.im, &mut out[3..]);
            }
            bits
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::RateParams;

    fn hard(bits: &[u8]) -> Vec<u8> {
        bits.iter().map(|&b| (b >= 128) as u8).collect()
    }

    #[test]
    fn modulate_demodulate_roundtrip_every_rate() {
        for rate in Rate::ALL {
            let params = RateParams::from_rate(rate);
            let bits: Vec<u8> = (0..params.cbps * 2).map(|i| ((i * 7) % 3 == 0) as u8).collect();
            let samples = modulate(&bits, rate);
            assert_eq!(samples.len(), bits.len() / params.bpsc);
            let soft = demodulate(&samples, rate);
            assert_eq!(hard(&soft), bits, "rate {:?}", rate);
        }
    }

    #[test]
    fn bpsk_is_real_only() {
        let samples = modulate(&[0, 1, 1, 0], Rate::Bpsk1_2);
        for s in &samples {
            assert_eq!(s.im, 0.0);
        }
        assert!(samples[0].re < 0.0 && samples[1].re > 0.0);
    }

    #[test]
    fn average_symbol_power_is_unity() {
        for rate in [Rate::Qpsk1_2, Rate::Qam16_1_2, Rate::Qam64_2_3] {
            let params = RateParams::from_rate(rate);
            // Cycle through every bit pattern for the constellation.
            let patterns = 1usize << params.bpsc;
            let mut bits = Vec::new();
            for value in 0..patterns {
                for i in (0..params.bpsc).rev() {
                    bits.push(((value >> i) & 1) as u8);
                }
            }
            let samples = modulate(&bits, rate);
            let power: f64 =
                samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64;
            assert!((power - 1.0).abs() < 1e-9, "rate {:?}: {power}", rate);
        }
    }
}
