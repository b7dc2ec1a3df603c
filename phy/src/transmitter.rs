//! Transmitter Session
//!
//! Builds frames and pushes them to a sample sink, applying the
//! configured transmit amplitude before the burst leaves the PHY.

use crate::frame_builder::FrameBuilder;
use crate::PhyError;
use common::types::Rate;
use interfaces::{RadioParams, SampleSink};
use tracing::debug;

/// One-frame-at-a-time transmit session.
pub struct Transmitter<S: SampleSink> {
    frame_builder: FrameBuilder,
    sink: S,
    tx_amp: f64,
}

impl<S: SampleSink> Transmitter<S> {
    pub fn new(sink: S, params: &RadioParams) -> Self {
        Self {
            frame_builder: FrameBuilder::new(),
            sink,
            tx_amp: params.tx_amp,
        }
    }

    /// Build one frame and transmit it, blocking until the sink has
    /// consumed the burst.
    pub fn send_frame(&mut self, payload: &[u8], rate: Rate) -> Result<(), PhyError> {
        let mut samples = self.frame_builder.build_frame(payload, rate)?;

        if self.tx_amp != 1.0 {
            for sample in samples.iter_mut() {
                *sample *= self.tx_amp;
            }
        }

        debug!(samples = samples.len(), "sending burst");
        self.sink.send_burst_sync(samples)?;
        Ok(())
    }

    /// Access the underlying sink, e.g. for driver statistics.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::Sample;
    use interfaces::{loopback_pair, SampleSource};

    #[test]
    fn burst_reaches_the_sink_scaled() {
        let (sink, mut source) = loopback_pair();
        let params = RadioParams {
            tx_amp: 0.5,
            ..RadioParams::default()
        };
        let mut tx = Transmitter::new(sink, &params);
        tx.send_frame(b"amplitude", Rate::Bpsk1_2).unwrap();

        let mut buf = Vec::new();
        source.fetch(320, &mut buf).unwrap();

        let preamble = crate::preamble::preamble_samples();
        for (got, want) in buf.iter().zip(preamble.iter()) {
            assert!((got - want * 0.5).norm() < 1e-12);
        }
    }

    #[test]
    fn oversize_payload_error_propagates() {
        let (sink, _source) = loopback_pair();
        let mut tx = Transmitter::new(sink, &RadioParams::default());
        let too_big = vec![0u8; common::types::MAX_FRAME_SIZE + 1];
        assert!(matches!(
            tx.send_frame(&too_big, Rate::Qpsk1_2),
            Err(PhyError::PayloadTooLarge(_))
        ));
    }
}
