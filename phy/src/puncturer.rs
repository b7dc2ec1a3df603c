//! Code Puncturer
//!
//! Realizes the 2/3 and 3/4 coding rates by deleting selected bits of
//! the rate-1/2 mother code, and reinserts neutral erasures at the
//! puncture holes on the receive side. The erasure value 127 sits at
//! the midpoint of the soft-bit range so the Viterbi decoder treats
//! punctured positions as carrying no information.

use common::types::{Rate, RateParams};

/// Soft value inserted at puncture holes during depuncturing.
pub const ERASURE: u8 = 127;

/// Puncture rate-1/2 coded bits down to the target rate.
pub fn puncture(data: Vec<u8>, params: &RateParams) -> Vec<u8> {
    match params.rate {
        Rate::Bpsk1_2 | Rate::Qpsk1_2 | Rate::Qam16_1_2 => data,

        // 1/2 -> 3/4: keep bits {0, 1, 3, 5} of every 6
        Rate::Bpsk3_4 | Rate::Qpsk3_4 | Rate::Qam16_3_4 | Rate::Qam64_3_4 => {
            let count = (data.len() as f64 * params.puncture_ratio).round() as usize;
            let mut out = Vec::with_capacity(count);
            for group in data.chunks_exact(6) {
                out.push(group[0]);
                out.push(group[1]);
                out.push(group[3]);
                out.push(group[5]);
            }
            out
        }

        // 1/2 -> 2/3: keep bits {0, 2, 3} of every 4
        Rate::Bpsk2_3 | Rate::Qpsk2_3 | Rate::Qam16_2_3 | Rate::Qam64_2_3 => {
            let count = (data.len() as f64 * params.puncture_ratio).round() as usize;
            let mut out = Vec::with_capacity(count);
            for group in data.chunks_exact(4) {
                out.push(group[0]);
                out.push(group[2]);
                out.push(group[3]);
            }
            out
        }
    }
}

/// Re-expand punctured soft bits to the mother-code length, filling
/// the holes with erasures.
pub fn depuncture(data: Vec<u8>, params: &RateParams) -> Vec<u8> {
    match params.rate {
        Rate::Bpsk1_2 | Rate::Qpsk1_2 | Rate::Qam16_1_2 => data,

        // 3/4 -> 1/2: holes at positions 2 and 4 of every 6
        Rate::Bpsk3_4 | Rate::Qpsk3_4 | Rate::Qam16_3_4 | Rate::Qam64_3_4 => {
            let count = (data.len() as f64 / params.puncture_ratio).round() as usize;
            let mut out = Vec::with_capacity(count);
            for group in data.chunks_exact(4) {
                out.push(group[0]);
                out.push(group[1]);
                out.push(ERASURE);
                out.push(group[2]);
                out.push(ERASURE);
                out.push(group[3]);
            }
            out
        }

        // 2/3 -> 1/2: hole at position 1 of every 4
        Rate::Bpsk2_3 | Rate::Qpsk2_3 | Rate::Qam16_2_3 | Rate::Qam64_2_3 => {
            let count = (data.len() as f64 / params.puncture_ratio).round() as usize;
            let mut out = Vec::with_capacity(count);
            for group in data.chunks_exact(3) {
                out.push(group[0]);
                out.push(ERASURE);
                out.push(group[1]);
                out.push(group[2]);
            }
            out
        }
    }
}
