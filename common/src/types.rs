//! Common Types for the 802.11a PHY
//!
//! Defines the fundamental types used throughout the transceiver: the
//! baseband sample type, the PHY rate enumeration, and the per-rate
//! parameter table that both the transmit and receive chains consult.

use serde::{Deserialize, Serialize};

/// A single baseband sample. All signal processing runs in double
/// precision.
pub type Sample = num_complex::Complex64;

/// Maximum payload length in bytes accepted by the PHY.
pub const MAX_FRAME_SIZE: usize = 2000;

/// The supported PHY data rates, named coding-rate-first.
///
/// `Rate_1_2_Bpsk` is BPSK modulation under a rate 1/2 convolutional
/// code, and so on. The set matches the SIGNAL rate fields this
/// transceiver accepts on the wire, including the non-standard BPSK
/// 2/3 and 3/4 entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rate {
    /// Rate 1/2 code, BPSK modulation (6 Mbps at 20 MHz)
    Bpsk1_2,
    /// Rate 2/3 code, BPSK modulation
    Bpsk2_3,
    /// Rate 3/4 code, BPSK modulation
    Bpsk3_4,
    /// Rate 1/2 code, QPSK modulation
    Qpsk1_2,
    /// Rate 2/3 code, QPSK modulation
    Qpsk2_3,
    /// Rate 3/4 code, QPSK modulation
    Qpsk3_4,
    /// Rate 1/2 code, 16-QAM modulation
    Qam16_1_2,
    /// Rate 2/3 code, 16-QAM modulation
    Qam16_2_3,
    /// Rate 3/4 code, 16-QAM modulation
    Qam16_3_4,
    /// Rate 2/3 code, 64-QAM modulation
    Qam64_2_3,
    /// Rate 3/4 code, 64-QAM modulation
    Qam64_3_4,
}

impl Rate {
    /// Every rate, in rate-field table order.
    pub const ALL: [Rate; 11] = [
        Rate::Bpsk1_2,
        Rate::Bpsk2_3,
        Rate::Bpsk3_4,
        Rate::Qpsk1_2,
        Rate::Qpsk2_3,
        Rate::Qpsk3_4,
        Rate::Qam16_1_2,
        Rate::Qam16_2_3,
        Rate::Qam16_3_4,
        Rate::Qam64_2_3,
        Rate::Qam64_3_4,
    ];
}

/// Per-rate PHY parameters.
///
/// Everything the PPDU encoder and decoder need for one rate: the
/// 4-bit SIGNAL rate field, coded and data bits per OFDM symbol, bits
/// per subcarrier, and the puncture survival ratio relative to the
/// mother 1/2 code (1 for rate 1/2, 3/4 for rate 2/3, 2/3 for rate
/// 3/4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateParams {
    /// 4-bit rate field carried in the SIGNAL symbol
    pub rate_field: u8,
    /// Coded bits per OFDM symbol
    pub cbps: usize,
    /// Data bits per OFDM symbol
    pub dbps: usize,
    /// Bits per subcarrier
    pub bpsc: usize,
    /// Fraction of mother-code bits surviving puncturing
    pub puncture_ratio: f64,
    /// The rate this parameter set belongs to
    pub rate: Rate,
    /// Display name
    pub name: &'static str,
}

impl RateParams {
    /// Look up the parameters for a PHY rate.
    pub fn from_rate(rate: Rate) -> RateParams {
        match rate {
            Rate::Bpsk1_2 => RateParams {
                rate_field: 0xD,
                cbps: 48,
                dbps: 24,
                bpsc: 1,
                puncture_ratio: 1.0,
                rate,
                name: "1/2 BPSK",
            },
            Rate::Bpsk2_3 => RateParams {
                rate_field: 0xE,
                cbps: 48,
                dbps: 32,
                bpsc: 1,
                puncture_ratio: 3.0 / 4.0,
                rate,
                name: "2/3 BPSK",
            },
            Rate::Bpsk3_4 => RateParams {
                rate_field: 0xF,
                cbps: 48,
                dbps: 36,
                bpsc: 1,
                puncture_ratio: 2.0 / 3.0,
                rate,
                name: "3/4 BPSK",
            },
            Rate::Qpsk1_2 => RateParams {
                rate_field: 0x5,
                cbps: 96,
                dbps: 48,
                bpsc: 2,
                puncture_ratio: 1.0,
                rate,
                name: "1/2 QPSK",
            },
            Rate::Qpsk2_3 => RateParams {
                rate_field: 0x6,
                cbps: 96,
                dbps: 64,
                bpsc: 2,
                puncture_ratio: 3.0 / 4.0,
                rate,
                name: "2/3 QPSK",
            },
            Rate::Qpsk3_4 => RateParams {
                rate_field: 0x7,
                cbps: 96,
                dbps: 72,
                bpsc: 2,
                puncture_ratio: 2.0 / 3.0,
                rate,
                name: "3/4 QPSK",
            },
            Rate::Qam16_1_2 => RateParams {
                rate_field: 0x9,
                cbps: 192,
                dbps: 96,
                bpsc: 4,
                puncture_ratio: 1.0,
                rate,
                name: "1/2 QAM16",
            },
            Rate::Qam16_2_3 => RateParams {
                rate_field: 0xA,
                cbps: 192,
                dbps: 128,
                bpsc: 4,
                puncture_ratio: 3.0 / 4.0,
                rate,
                name: "2/3 QAM16",
            },
            Rate::Qam16_3_4 => RateParams {
                rate_field: 0xB,
                cbps: 192,
                dbps: 144,
                bpsc: 4,
                puncture_ratio: 2.0 / 3.0,
                rate,
                name: "3/4 QAM16",
            },
            Rate::Qam64_2_3 => RateParams {
                rate_field: 0x1,
                cbps: 288,
                dbps: 192,
                bpsc: 6,
                puncture_ratio: 3.0 / 4.0,
                rate,
                name: "2/3 QAM64",
            },
            Rate::Qam64_3_4 => RateParams {
                rate_field: 0x3,
                cbps: 288,
                dbps: 216,
                bpsc: 6,
                puncture_ratio: 2.0 / 3.0,
                rate,
                name: "3/4 QAM64",
            },
        }
    }

    /// Look up the parameters for a received SIGNAL rate field.
    ///
    /// Returns `None` for rate fields outside the accepted set, which
    /// the header decoder treats as a corrupt header.
    pub fn from_rate_field(rate_field: u8) -> Option<RateParams> {
        let rate = match rate_field {
            0xD => Rate::Bpsk1_2,
            0xE => Rate::Bpsk2_3,
            0xF => Rate::Bpsk3_4,
            0x5 => Rate::Qpsk1_2,
            0x6 => Rate::Qpsk2_3,
            0x7 => Rate::Qpsk3_4,
            0x9 => Rate::Qam16_1_2,
            0xA => Rate::Qam16_2_3,
            0xB => Rate::Qam16_3_4,
            0x1 => Rate::Qam64_2_3,
            0x3 => Rate::Qam64_3_4,
            _ => return None,
        };
        Some(RateParams::from_rate(rate))
    }

    /// Number of OFDM data symbols needed to carry `length` payload
    /// bytes at this rate: service (16 bits) + payload + CRC-32 +
    /// 6 tail bits, rounded up to whole symbols.
    pub fn num_symbols(&self, length: usize) -> usize {
        let bits = 16 + 8 * (length + 4) + 6;
        (bits + self.dbps - 1) / self.dbps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_field_roundtrip() {
        for rate in Rate::ALL {
            let params = RateParams::from_rate(rate);
            let back = RateParams::from_rate_field(params.rate_field).unwrap();
            assert_eq!(back.rate, rate);
            assert_eq!(back, params);
        }
    }

    #[test]
    fn rejects_unknown_rate_fields() {
        for field in [0x0u8, 0x2, 0x4, 0x8, 0xC, 0x10, 0xFF] {
            assert!(RateParams::from_rate_field(field).is_none());
        }
    }

    #[test]
    fn coded_bits_follow_subcarrier_count() {
        for rate in Rate::ALL {
            let p = RateParams::from_rate(rate);
            assert_eq!(p.cbps, 48 * p.bpsc);
        }
    }

    #[test]
    fn data_bits_follow_coding_rate() {
        for rate in Rate::ALL {
            let p = RateParams::from_rate(rate);
            // dbps = cbps * coding rate, where the coding rate is
            // 1/2 divided by the puncture survival ratio.
            let coding_rate = 0.5 / p.puncture_ratio;
            assert_eq!(p.dbps as f64, p.cbps as f64 * coding_rate);
        }
    }

    #[test]
    fn symbol_count_matches_hand_calculation() {
        let p = RateParams::from_rate(Rate::Bpsk1_2);
        // 12-byte payload: 16 + 8*16 + 6 = 150 bits over 24 dbps -> 7
        assert_eq!(p.num_symbols(12), 7);
        let p = RateParams::from_rate(Rate::Qam64_3_4);
        // 1500 bytes: 16 + 8*1504 + 6 = 12054 bits over 216 -> 56
        assert_eq!(p.num_symbols(1500), 56);
    }
}
