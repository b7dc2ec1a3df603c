//! PPDU Encoding and Decoding
//!
//! A PPDU is the PLCP header plus the payload bytes. The header is a
//! single rate-1/2 BPSK SIGNAL symbol carrying the 4-bit rate field,
//! the 12-bit length, and an even-parity bit; it is convolutionally
//! coded and interleaved but never scrambled. The payload is
//! `service || payload || CRC-32` padded to whole OFDM symbols, then
//! scrambled, coded, punctured, interleaved, and modulated at the
//! header's rate.

use crate::crc::crc32;
use crate::viterbi::Viterbi;
use crate::{interleaver, modulator, puncturer, scrambler};
use common::types::{Rate, RateParams, Sample, MAX_FRAME_SIZE};
use tracing::debug;

/// Decoded PLCP header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlcpHeader {
    /// PHY rate of the payload symbols
    pub rate: Rate,
    /// Payload length in bytes
    pub length: usize,
    /// Number of payload OFDM symbols that follow the SIGNAL symbol
    pub num_symbols: usize,
    /// 16-bit service field, zero on transmit
    pub service: u16,
}

impl PlcpHeader {
    pub fn new(rate: Rate, length: usize) -> Self {
        let params = RateParams::from_rate(rate);
        Self {
            rate,
            length,
            num_symbols: params.num_symbols(length),
            service: 0,
        }
    }
}

/// A PHY frame: PLCP header plus payload.
#[derive(Debug, Clone)]
pub struct Ppdu {
    pub header: PlcpHeader,
    pub payload: Vec<u8>,
}

#[inline]
fn parity_bit(word: u32) -> u32 {
    word.count_ones() & 1
}

impl Ppdu {
    pub fn new(payload: Vec<u8>, rate: Rate) -> Self {
        let header = PlcpHeader::new(rate, payload.len());
        Self { header, payload }
    }

    /// Encode header and payload into frequency-domain constellation
    /// points: 48 header points followed by `num_symbols * 48` payload
    /// points.
    pub fn encode(&self) -> Vec<Sample> {
        let mut samples = self.encode_header();
        samples.extend(self.encode_data());
        samples
    }

    /// Encode the SIGNAL symbol: pack the header word, complete even
    /// parity, append six tail zeros, then code, interleave, and BPSK
    /// modulate.
    fn encode_header(&self) -> Vec<Sample> {
        let params = RateParams::from_rate(self.header.rate);

        let mut field =
            ((params.rate_field as u32 & 0xF) << 13) | (self.header.length as u32 & 0xFFF);
        if parity_bit(field) == 1 {
            field |= 1 << 17;
        }
        let word = field << 6;
        let header_bytes = [(word >> 16) as u8, (word >> 8) as u8, word as u8, 0];

        let viterbi = Viterbi::new();
        // The header is always 18 data bits in a single 1/2 BPSK symbol.
        let coded = viterbi.conv_encode(&header_bytes, 18);

        let bpsk = RateParams::from_rate(Rate::Bpsk1_2);
        let interleaved = interleaver::interleave(&coded, &bpsk);
        modulator::modulate(&interleaved, Rate::Bpsk1_2)
    }

    /// Encode the payload symbols at the header's rate.
    fn encode_data(&self) -> Vec<Sample> {
        let params = RateParams::from_rate(self.header.rate);
        let num_symbols = params.num_symbols(self.payload.len());
        let num_data_bits = num_symbols * params.dbps;
        let num_data_bytes = num_data_bits / 8;

        // service || payload || CRC, zero padding to the symbol
        // boundary; one spare byte absorbs a non-byte-aligned tail.
        let mut data = vec![0u8; num_data_bytes + 1];
        data[..2].copy_from_slice(&self.header.service.to_le_bytes());
        data[2..2 + self.payload.len()].copy_from_slice(&self.payload);
        let crc = crc32(&data[..2 + self.payload.len()]);
        data[2 + self.payload.len()..2 + self.payload.len() + 4]
            .copy_from_slice(&crc.to_le_bytes());

        scrambler::scramble_in_place(&mut data[..num_data_bytes]);

        let viterbi = Viterbi::new();
        let coded = viterbi.conv_encode(&data, num_data_bits - 6);
        let punctured = puncturer::puncture(coded, &params);
        let interleaved = interleaver::interleave(&punctured, &params);
        modulator::modulate(&interleaved, params.rate)
    }

    /// Decode a SIGNAL symbol. Returns the header on a parity match
    /// with a recognized rate field and a sane length.
    pub fn decode_header(samples: &[Sample]) -> Option<PlcpHeader> {
        if samples.len() != 48 {
            return None;
        }

        let bpsk = RateParams::from_rate(Rate::Bpsk1_2);
        let demodulated = modulator::demodulate(samples, Rate::Bpsk1_2);
        let deinterleaved = interleaver::deinterleave(&demodulated, &bpsk);

        let viterbi = Viterbi::new();
        let bytes = viterbi.conv_decode(&deinterleaved, 18);
        let word =
            ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;

        if parity_bit(word) == 1 {
            debug!("header parity mismatch");
            return None;
        }

        let rate_field = ((word >> 19) & 0xF) as u8;
        let length = ((word >> 6) & 0xFFF) as usize;

        let params = match RateParams::from_rate_field(rate_field) {
            Some(params) => params,
            None => {
                debug!(rate_field, "header carries an unknown rate field");
                return None;
            }
        };

        if length > MAX_FRAME_SIZE {
            debug!(length, "header length out of range");
            return None;
        }

        Some(PlcpHeader {
            rate: params.rate,
            length,
            num_symbols: params.num_symbols(length),
            service: 0,
        })
    }

    /// Decode payload symbols against a decoded header. Returns the
    /// service field and payload when the CRC verifies.
    pub fn decode_data(header: &PlcpHeader, samples: &[Sample]) -> Option<(u16, Vec<u8>)> {
        let params = RateParams::from_rate(header.rate);
        let num_data_bits = header.num_symbols * params.dbps;
        let num_data_bytes = num_data_bits / 8;

        let demodulated = modulator::demodulate(samples, header.rate);
        let deinterleaved = interleaver::deinterleave(&demodulated, &params);
        let depunctured = puncturer::depuncture(deinterleaved, &params);

        let viterbi = Viterbi::new();
        let mut decoded = viterbi.conv_decode(&depunctured, num_data_bits - 6);
        decoded.resize(num_data_bytes.max(decoded.len()), 0);

        scrambler::scramble_in_place(&mut decoded[..num_data_bytes]);

        let length = header.length;
        let computed = crc32(&decoded[..2 + length]);
        let given = u32::from_le_bytes(decoded[2 + length..2 + length + 4].try_into().ok()?);
        if given != computed {
            debug!(length, "invalid CRC");
            return None;
        }

        let service = u16::from_le_bytes([decoded[0], decoded[1]]);
        Some((service, decoded[2..2 + length].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip_every_rate() {
        for rate in Rate::ALL {
            for length in [0usize, 1, 12, 100, 1500, 2000] {
                let ppdu = Ppdu::new(vec![0xAB; length], rate);
                let samples = ppdu.encode_header();
                assert_eq!(samples.len(), 48);
                let header = Ppdu::decode_header(&samples).expect("header should decode");
                assert_eq!(header.rate, rate);
                assert_eq!(header.length, length);
                assert_eq!(header.num_symbols, ppdu.header.num_symbols);
            }
        }
    }

    #[test]
    fn odd_parity_header_is_rejected() {
        // Build the SIGNAL symbol by hand with the parity bit flipped.
        let params = RateParams::from_rate(Rate::Qpsk1_2);
        let field = ((params.rate_field as u32) << 13) | 100;
        let bad = if parity_bit(field) == 1 {
            field
        } else {
            field | (1 << 17)
        };
        let word = bad << 6;
        let bytes = [(word >> 16) as u8, (word >> 8) as u8, word as u8, 0];

        let viterbi = Viterbi::new();
        let coded = viterbi.conv_encode(&bytes, 18);
        let bpsk = RateParams::from_rate(Rate::Bpsk1_2);
        let interleaved = interleaver::interleave(&coded, &bpsk);
        let samples = modulator::modulate(&interleaved, Rate::Bpsk1_2);

        assert!(Ppdu::decode_header(&samples).is_none());
    }

    #[test]
    fn unknown_rate_field_is_rejected() {
        // 0x0 is not an assigned rate field.
        let field = 100u32; // rate bits zero, length 100
        let word = if parity_bit(field) == 1 {
            (field | (1 << 17)) << 6
        } else {
            field << 6
        };
        let bytes = [(word >> 16) as u8, (word >> 8) as u8, word as u8, 0];

        let viterbi = Viterbi::new();
        let coded = viterbi.conv_encode(&bytes, 18);
        let bpsk = RateParams::from_rate(Rate::Bpsk1_2);
        let interleaved = interleaver::interleave(&coded, &bpsk);
        let samples = modulator::modulate(&interleaved, Rate::Bpsk1_2);

        assert!(Ppdu::decode_header(&samples).is_none());
    }

    #[test]
    fn data_roundtrip_at_representative_rates() {
        for rate in [Rate::Bpsk1_2, Rate::Qpsk3_4, Rate::Qam16_2_3, Rate::Qam64_3_4] {
            let payload: Vec<u8> = (0..777u32).map(|i| (i % 256) as u8).collect();
            let ppdu = Ppdu::new(payload.clone(), rate);
            let data_samples = ppdu.encode_data();
            assert_eq!(data_samples.len(), ppdu.header.num_symbols * 48);

            let (service, decoded) =
                Ppdu::decode_data(&ppdu.header, &data_samples).expect("payload should decode");
            assert_eq!(service, 0);
            assert_eq!(decoded, payload, "rate {:?}", rate);
        }
    }

    #[test]
    fn corrupted_payload_fails_crc() {
        let ppdu = Ppdu::new(b"integrity matters".to_vec(), Rate::Qpsk1_2);
        let mut samples = ppdu.encode_data();
        // A single flipped point could still be corrected away; trash
        // a run of them well inside the payload.
        for sample in samples.iter_mut().skip(100).take(40) {
            *sample = -*sample;
        }
        assert!(Ppdu::decode_data(&ppdu.header, &samples).is_none());
    }

    #[test]
    fn full_encode_concatenates_header_and_data() {
        let ppdu = Ppdu::new(b"Hello World!".to_vec(), Rate::Bpsk1_2);
        let all = ppdu.encode();
        assert_eq!(all.len(), 48 + ppdu.header.num_symbols * 48);
        assert_eq!(&all[..48], ppdu.encode_header().as_slice());
    }
}
