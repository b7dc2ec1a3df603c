//! Block Interleaver
//!
//! The two-permutation interleaver of 802.11a §17.3.5.6, applied per
//! OFDM symbol over `cbps` coded bits. The first permutation spreads
//! adjacent coded bits across subcarriers; the second rotates bits
//! within groups of `s = max(bpsc/2, 1)` so that neighboring coded
//! bits alternate between more and less significant constellation
//! positions. Forward and inverse tables are precomputed per
//! modulation depth.

use common::types::RateParams;
use std::sync::OnceLock;

const NUM_CHUNKS: usize = 16;

#[derive(Debug)]
struct Tables {
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

/// Interleaved position of coded bit `k` within a `cbps`-bit block.
fn index(k: usize, cbps: usize, bpsc: usize) -> usize {
    let s = (bpsc / 2).max(1);
    let i = (cbps / NUM_CHUNKS) * (k % NUM_CHUNKS) + k / NUM_CHUNKS;
    s * (i / s) + (i + cbps - (NUM_CHUNKS * i / cbps)) % s
}

fn build_tables(cbps: usize, bpsc: usize) -> Tables {
    let mut forward = vec![0usize; cbps];
    let mut inverse = vec![0usize; cbps];
    for k in 0..cbps {
        let j = index(k, cbps, bpsc);
        forward[k] = j;
        inverse[j] = k;
    }
    Tables { forward, inverse }
}

/// The four distinct (cbps, bpsc) block shapes, indexed by
/// bits-per-subcarrier.
fn tables_for(params: &RateParams) -> &'static Tables {
    static TABLES: OnceLock<[Tables; 4]> = OnceLock::new();
    let all = TABLES.get_or_init(|| {
        [
            build_tables(48, 1),
            build_tables(96, 2),
            build_tables(192, 4),
            build_tables(288, 6),
        ]
    });
    match params.bpsc {
        1 => &all[0],
        2 => &all[1],
        4 => &all[2],
        6 => &all[3],
        _ => unreachable!("no interleaver shape for bpsc {}", params.bpsc),
    }
}

/// Interleave coded bits. The input length must be a whole number of
/// `cbps` blocks.
pub fn interleave(data: &[u8], params: &RateParams) -> Vec<u8> {
    let map = &tables_for(params).forward;
    permute(data, map)
}

/// Invert the interleaver permutation.
pub fn deinterleave(data: &[u8], params: &RateParams) -> Vec<u8> {
    let map = &tables_for(params).inverse;
    permute(data, map)
}

fn permute(data: &[u8], map: &[usize]) -> Vec<u8> {
    debug_assert_eq!(data.len() % map.len(), 0);
    let mut out = vec![0u8; data.len()];
    for (block_in, block_out) in data.chunks_exact(map.len()).zip(out.chunks_exact_mut(map.len()))
    {
        for (y, &bit) in block_in.iter().enumerate() {
            block_out[map[y]] = bit;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::Rate;

    #[test]
    fn permutation_is_a_bijection() {
        for rate in Rate::ALL {
            let params = RateParams::from_rate(rate);
            let mut seen = vec![false; params.cbps];
            for k in 0..params.cbps {
                let j = index(k, params.cbps, params.bpsc);
                assert!(!seen[j], "rate {:?}: position {j} hit twice", rate);
                seen[j] = true;
            }
        }
    }

    #[test]
    fn deinterleave_inverts_interleave() {
        for rate in Rate::ALL {
            let params = RateParams::from_rate(rate);
            let data: Vec<u8> = (0..params.cbps * 3).map(|i| (i % 251) as u8).collect();
            let through = deinterleave(&interleave(&data, &params), &params);
            assert_eq!(through, data, "rate {:?}", rate);
        }
    }

    #[test]
    fn bpsk_first_block_matches_standard_equations() {
        // For cbps=48, bpsc=1 the second permutation is the identity,
        // so bit k lands at 3*(k mod 16) + floor(k/16).
        let params = RateParams::from_rate(Rate::Bpsk1_2);
        for k in 0..48 {
            assert_eq!(index(k, params.cbps, params.bpsc), 3 * (k % 16) + k / 16);
        }
    }

    #[test]
    fn qam64_uses_three_bit_rotation_groups() {
        // s = 3 for 64-QAM; each output triple is a rotation of an
        // input triple, so positions within a group of three stay in
        // the same group.
        let params = RateParams::from_rate(Rate::Qam64_2_3);
        for k in 0..params.cbps {
            let s = 3;
            let i = (params.cbps / 16) * (k % 16) + k / 16;
            let j = index(k, params.cbps, params.bpsc);
            assert_eq!(j / s, i / s);
        }
    }
}
