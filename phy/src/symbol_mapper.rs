//! Subcarrier Mapping
//!
//! The fixed 64-subcarrier layout: 48 data carriers, 4 BPSK pilots,
//! and 12 nulls (DC and the band edges). Mapping takes a stream of
//! data-carrier constellation points (a multiple of 48) and emits
//! whole 64-point frequency-domain symbols with pilots and nulls
//! inserted; the pilot polarity follows a fixed length-127 sequence
//! indexed by the symbol's position in the frame, starting at the
//! SIGNAL symbol.

use common::types::Sample;

/// Subcarrier roles in centered order. 0 = null, 1 = data, 2 = pilot.
pub const ACTIVE_MAP: [u8; 64] = [
    0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1,
    1, 0, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 0, 0, 0,
    0, 0,
];

/// Positions of the four pilot subcarriers within a symbol.
pub const PILOT_POSITIONS: [usize; 4] = [11, 25, 39, 53];

/// Nominal pilot values before the polarity sequence is applied: the
/// first three pilots are +1, the fourth is inverted.
pub const PILOT_VALUES: [f64; 4] = [1.0, 1.0, 1.0, -1.0];

/// Positions of the 48 data subcarriers within a symbol.
pub const DATA_SUBCARRIERS: [usize; 48] = [
    6, 7, 8, 9, 10, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 26, 27, 28, 29, 30, 31,
    33, 34, 35, 36, 37, 38, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 54, 55, 56, 57,
    58,
];

/// Pilot polarity per OFDM symbol, starting with the SIGNAL symbol at
/// index 0 and wrapping modulo 127. Transmit and receive share this
/// table.
pub const POLARITY: [f64; 127] = [
    1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0,
    -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0,
    1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0, 1.0, -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -1.0,
    1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0,
    -1.0, 1.0, 1.0, -1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 1.0,
    -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -1.0, -1.0, -1.0, -1.0, 1.0,
    -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, -1.0, -1.0, 1.0, 1.0,
    1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0,
];

/// Map data-carrier points into full frequency-domain symbols.
///
/// # Panics
/// Panics if the input is not a whole number of 48-point symbols.
pub fn map(data_samples: &[Sample]) -> Vec<Sample> {
    assert_eq!(data_samples.len() % DATA_SUBCARRIERS.len(), 0);

    let mut samples = Vec::with_capacity(data_samples.len() * 64 / 48);
    let mut data = data_samples.iter();

    for (symbol_count, _) in data_samples.chunks_exact(48).enumerate() {
        let polarity = POLARITY[symbol_count % POLARITY.len()];
        let mut pilot_index = 0;
        for &role in ACTIVE_MAP.iter() {
            match role {
                0 => samples.push(Sample::new(0.0, 0.0)),
                1 => samples.push(*data.next().expect("data samples")),
                _ => {
                    samples.push(Sample::new(PILOT_VALUES[pilot_index] * polarity, 0.0));
                    pilot_index += 1;
                }
            }
        }
    }

    samples
}
