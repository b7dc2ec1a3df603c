//! Frame Decoder
//!
//! Final stage. A `StartOfFrame` symbol carries the SIGNAL field;
//! decoding it yields the payload's rate and length, which size an
//! accumulator for the data symbols that follow. Once the accumulator
//! fills, the payload is demodulated, deinterleaved, depunctured,
//! Viterbi-decoded, descrambled, and checked against its CRC-32. Only
//! verified payloads leave the chain; every failure path is a silent
//! drop of that frame.

use super::Block;
use crate::ppdu::{PlcpHeader, Ppdu};
use crate::tagged::{TaggedVector, VectorTag};
use crate::NUM_DATA_SUBCARRIERS;
use common::types::Sample;
use tracing::{debug, info};

/// Receive-side accumulator for the frame being decoded.
struct FrameData {
    header: PlcpHeader,
    /// Total data-carrier bins this frame needs.
    sample_count: usize,
    samples_copied: usize,
    samples: Vec<Sample>,
}

impl FrameData {
    fn idle() -> Self {
        Self {
            header: PlcpHeader::new(common::types::Rate::Bpsk1_2, 0),
            sample_count: 0,
            samples_copied: 0,
            samples: Vec::new(),
        }
    }

    fn reset(&mut self, header: PlcpHeader) {
        self.sample_count = header.num_symbols * NUM_DATA_SUBCARRIERS;
        self.samples_copied = 0;
        self.samples.clear();
        self.samples
            .resize(self.sample_count, Sample::new(0.0, 0.0));
        self.header = header;
    }
}

/// Header/payload decoding block: 48-bin symbols in, payloads out.
pub struct FrameDecoder {
    current: FrameData,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            current: FrameData::idle(),
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for FrameDecoder {
    type In = TaggedVector<NUM_DATA_SUBCARRIERS>;
    type Out = Vec<u8>;

    fn name(&self) -> &'static str {
        "frame_decoder"
    }

    fn work(
        &mut self,
        input: &[TaggedVector<NUM_DATA_SUBCARRIERS>],
        output: &mut Vec<Vec<u8>>,
    ) {
        output.clear();
        if input.is_empty() {
            return;
        }

        for symbol in input {
            // Accumulate payload symbols for the frame in flight.
            if self.current.samples_copied < self.current.sample_count {
                let at = self.current.samples_copied;
                self.current.samples[at..at + NUM_DATA_SUBCARRIERS]
                    .copy_from_slice(&symbol.samples);
                self.current.samples_copied += NUM_DATA_SUBCARRIERS;
            }

            // Frame complete: attempt the payload decode.
            if self.current.sample_count != 0
                && self.current.samples_copied >= self.current.sample_count
            {
                match Ppdu::decode_data(&self.current.header, &self.current.samples) {
                    Some((_service, payload)) => {
                        info!(
                            length = payload.len(),
                            rate = ?self.current.header.rate,
                            "frame decoded"
                        );
                        output.push(payload);
                    }
                    None => {
                        info!(
                            length = self.current.header.length,
                            "frame dropped: payload failed verification"
                        );
                    }
                }
                self.current.sample_count = 0;
            }

            // A SIGNAL symbol may start the next frame.
            if symbol.tag == VectorTag::StartOfFrame {
                match Ppdu::decode_header(&symbol.samples) {
                    Some(header) => {
                        debug!(
                            rate = ?header.rate,
                            length = header.length,
                            num_symbols = header.num_symbols,
                            "frame header decoded"
                        );
                        self.current.reset(header);
                    }
                    None => {
                        debug!("frame dropped: header failed verification");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::Rate;

    /// Slice encoded PPDU points into 48-bin tagged symbols the way
    /// the phase tracker delivers them.
    fn to_symbols(points: &[Sample]) -> Vec<TaggedVector<NUM_DATA_SUBCARRIERS>> {
        let mut symbols = Vec::new();
        for (i, chunk) in points.chunks_exact(NUM_DATA_SUBCARRIERS).enumerate() {
            let mut v = TaggedVector::new(if i == 0 {
                VectorTag::StartOfFrame
            } else {
                VectorTag::None
            });
            v.samples.copy_from_slice(chunk);
            symbols.push(v);
        }
        symbols
    }

    #[test]
    fn decodes_a_well_formed_frame() {
        let payload = b"the quick brown fox".to_vec();
        let ppdu = Ppdu::new(payload.clone(), Rate::Qpsk1_2);
        let symbols = to_symbols(&ppdu.encode());

        let mut decoder = FrameDecoder::new();
        let mut output = Vec::new();
        decoder.work(&symbols, &mut output);
        // The final symbol completes the frame; decoding happens on
        // the next work call when the accumulator check runs.
        let mut flush = Vec::new();
        decoder.work(&[TaggedVector::default()], &mut flush);
        output.extend(flush);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0], payload);
    }

    #[test]
    fn back_to_back_frames_both_decode() {
        let first = Ppdu::new(b"frame one".to_vec(), Rate::Bpsk1_2);
        let second = Ppdu::new(b"frame two, longer".to_vec(), Rate::Bpsk1_2);
        let mut symbols = to_symbols(&first.encode());
        symbols.extend(to_symbols(&second.encode()));
        symbols.push(TaggedVector::default());

        let mut decoder = FrameDecoder::new();
        let mut output = Vec::new();
        decoder.work(&symbols, &mut output);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0], b"frame one");
        assert_eq!(output[1], b"frame two, longer");
    }

    #[test]
    fn corrupted_payload_is_dropped() {
        let ppdu = Ppdu::new(b"will not survive".to_vec(), Rate::Qam16_1_2);
        let mut points = ppdu.encode();
        for p in points.iter_mut().skip(60).take(60) {
            *p = -*p;
        }
        let mut symbols = to_symbols(&points);
        symbols.push(TaggedVector::default());

        let mut decoder = FrameDecoder::new();
        let mut output = Vec::new();
        decoder.work(&symbols, &mut output);
        assert!(output.is_empty());
    }

    #[test]
    fn garbage_header_is_ignored() {
        let mut noise = TaggedVector::<NUM_DATA_SUBCARRIERS>::new(VectorTag::StartOfFrame);
        for (i, s) in noise.samples.iter_mut().enumerate() {
            *s = Sample::new(((i * 37) % 11) as f64 - 5.0, ((i * 13) % 7) as f64 - 3.0);
        }

        let mut decoder = FrameDecoder::new();
        let mut output = Vec::new();
        decoder.work(&[noise, TaggedVector::default()], &mut output);
        assert!(output.is_empty());
    }
}
