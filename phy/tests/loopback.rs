//! Transmit-to-receive loopback tests: frames built by the transmit
//! chain are fed straight into the receive pipeline, chunked the way
//! the radio reader would deliver them. Trailing silence keeps the
//! intake running so the six-stage pipeline drains completely.

use common::types::{Rate, Sample};
use phy::receiver_chain::ReceiverChain;
use phy::FrameBuilder;

const CHUNK_SIZE: usize = 4096;

/// Feed a signal through the pipeline chunk by chunk, then silence
/// until every stage has flushed. Returns the decoded payloads in
/// arrival order.
fn run_chain(signal: Vec<Sample>) -> Vec<Vec<u8>> {
    let mut chain = ReceiverChain::new();
    let mut payloads = Vec::new();

    for chunk in signal.chunks(CHUNK_SIZE) {
        // The radio reader always delivers full chunks; pad the tail
        // with silence the way a live stream would.
        let mut chunk = chunk.to_vec();
        chunk.resize(CHUNK_SIZE, Sample::new(0.0, 0.0));
        payloads.extend(chain.process_samples(chunk));
    }
    // One extra chunk per stage covers the pipeline latency.
    for _ in 0..8 {
        payloads.extend(chain.process_samples(vec![Sample::new(0.0, 0.0); CHUNK_SIZE]));
    }

    payloads
}

#[test]
fn hello_world_bpsk_loopback() {
    let payload = b"Hello World!".to_vec();
    assert_eq!(payload.len(), 12);

    let builder = FrameBuilder::new();
    let frame = builder.build_frame(&payload, Rate::Bpsk1_2).unwrap();

    let mut signal = vec![Sample::new(0.0, 0.0); 1000];
    signal.extend(frame);
    signal.extend(vec![Sample::new(0.0, 0.0); 1000]);

    let payloads = run_chain(signal);
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0], payload);
}

#[test]
fn ten_spaced_frames_arrive_in_order() {
    let payload: Vec<u8> = (0..72u8).collect();
    let builder = FrameBuilder::new();
    let frame = builder.build_frame(&payload, Rate::Qpsk1_2).unwrap();

    let mut signal = Vec::new();
    for _ in 0..10 {
        signal.extend(frame.iter().copied());
        signal.extend(vec![Sample::new(0.0, 0.0); 500]);
    }
    signal.extend(vec![Sample::new(0.0, 0.0); 1000]);

    let payloads = run_chain(signal);
    assert_eq!(payloads.len(), 10, "expected all ten frames");
    for p in &payloads {
        assert_eq!(*p, payload);
    }
}

#[test]
fn every_rate_carries_1500_random_bytes() {
    use rand::{RngCore, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x80211a);
    let mut payload = vec![0u8; 1500];
    rng.fill_bytes(&mut payload);

    let builder = FrameBuilder::new();

    for rate in Rate::ALL {
        let frame = builder.build_frame(&payload, rate).unwrap();
        let mut signal = vec![Sample::new(0.0, 0.0); 600];
        signal.extend(frame);
        signal.extend(vec![Sample::new(0.0, 0.0); 600]);

        let payloads = run_chain(signal);
        assert_eq!(payloads.len(), 1, "rate {:?}: frame lost", rate);
        assert_eq!(payloads[0], payload, "rate {:?}: payload corrupted", rate);
    }
}

#[test]
fn corrupted_payload_yields_no_frames() {
    let payload = b"this payload will be damaged in transit".to_vec();
    let builder = FrameBuilder::new();
    let mut frame = builder.build_frame(&payload, Rate::Qpsk1_2).unwrap();

    // Damage a run of samples well inside the payload symbols, past
    // the preamble (320) and the SIGNAL symbol (80).
    for sample in frame.iter_mut().skip(550).take(200) {
        *sample = -*sample;
    }

    let mut signal = vec![Sample::new(0.0, 0.0); 800];
    signal.extend(frame);
    signal.extend(vec![Sample::new(0.0, 0.0); 800]);

    let payloads = run_chain(signal);
    assert!(payloads.is_empty(), "damaged frame must be dropped");
}

#[test]
fn back_to_back_frames_at_different_rates() {
    let builder = FrameBuilder::new();
    let first = b"first at BPSK".to_vec();
    let second = b"second at QAM64".to_vec();

    let mut signal = vec![Sample::new(0.0, 0.0); 500];
    signal.extend(builder.build_frame(&first, Rate::Bpsk1_2).unwrap());
    signal.extend(vec![Sample::new(0.0, 0.0); 400]);
    signal.extend(builder.build_frame(&second, Rate::Qam64_3_4).unwrap());
    signal.extend(vec![Sample::new(0.0, 0.0); 400]);

    let payloads = run_chain(signal);
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0], first);
    assert_eq!(payloads[1], second);
}
