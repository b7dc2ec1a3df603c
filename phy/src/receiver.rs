//! Receiver Session
//!
//! Runs the sample intake loop on its own thread: pull a chunk from
//! the radio, push it through the receive chain, hand any decoded
//! payloads to the application callback, repeat. A pause gate in
//! front of the intake blocks the loop (letting the pipeline drain
//! naturally) so the application can transmit half-duplex; `halt`
//! stops the loop and tears the pipeline down.

use crate::receiver_chain::ReceiverChain;
use interfaces::SampleSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{error, info};

/// Samples pulled from the radio per receive cycle.
pub const NUM_RX_SAMPLES: usize = 8192;

struct Shared {
    paused: Mutex<bool>,
    unpaused: Condvar,
    halt: AtomicBool,
}

/// Receive session: pipeline, intake thread, and payload callback.
pub struct Receiver {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Start receiving. The callback runs on the intake thread after
    /// every receive cycle with that cycle's decoded payloads.
    pub fn new<F, S>(callback: F, source: S) -> Self
    where
        F: FnMut(Vec<Vec<u8>>) + Send + 'static,
        S: SampleSource + 'static,
    {
        let shared = Arc::new(Shared {
            paused: Mutex::new(false),
            unpaused: Condvar::new(),
            halt: AtomicBool::new(false),
        });

        let thread = {
            let shared = shared.clone();
            std::thread::Builder::new()
                .name("rx_intake".to_string())
                .spawn(move || receiver_loop(callback, source, shared))
                .expect("spawn receiver thread")
        };

        Self {
            shared,
            thread: Some(thread),
        }
    }

    /// Block the intake loop before its next cycle. The pipeline
    /// finishes the cycle in flight and then idles.
    pub fn pause(&self) {
        let mut paused = self.shared.paused.lock().expect("pause lock");
        *paused = true;
        info!("receiver paused");
    }

    /// Release a paused intake loop.
    pub fn resume(&self) {
        let mut paused = self.shared.paused.lock().expect("pause lock");
        *paused = false;
        self.shared.unpaused.notify_all();
    }

    /// Stop the intake loop and tear down the pipeline. Safe to call
    /// more than once.
    pub fn halt(&mut self) {
        self.shared.halt.store(true, Ordering::Release);
        self.resume();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.halt();
    }
}

fn receiver_loop<F, S>(mut callback: F, mut source: S, shared: Arc<Shared>)
where
    F: FnMut(Vec<Vec<u8>>) + Send + 'static,
    S: SampleSource + 'static,
{
    let mut chain = ReceiverChain::new();
    let mut buf = Vec::with_capacity(NUM_RX_SAMPLES);

    loop {
        {
            let mut paused = shared.paused.lock().expect("pause lock");
            while *paused && !shared.halt.load(Ordering::Acquire) {
                paused = shared.unpaused.wait(paused).expect("pause wait");
            }
        }
        if shared.halt.load(Ordering::Acquire) {
            break;
        }

        if let Err(e) = source.fetch(NUM_RX_SAMPLES, &mut buf) {
            error!("sample source failed: {e}");
            break;
        }

        let packets = chain.process_samples(std::mem::take(&mut buf));
        callback(packets);
    }

    info!("receiver loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_builder::FrameBuilder;
    use common::types::{Rate, Sample};
    use interfaces::loopback_pair;
    use interfaces::SampleSink;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn loopback_frame_reaches_the_callback() {
        let (mut sink, source) = loopback_pair();

        let builder = FrameBuilder::new();
        let frame = builder.build_frame(b"over the air", Rate::Qpsk1_2).unwrap();
        let mut burst = vec![Sample::new(0.0, 0.0); 500];
        burst.extend(frame);
        burst.extend(vec![Sample::new(0.0, 0.0); 8 * NUM_RX_SAMPLES]);
        sink.send_burst(burst).unwrap();

        let (tx, rx) = mpsc::channel();
        let mut receiver = Receiver::new(
            move |packets| {
                for p in packets {
                    let _ = tx.send(p);
                }
            },
            source,
        );

        let payload = rx
            .recv_timeout(Duration::from_secs(20))
            .expect("decoded payload");
        assert_eq!(payload, b"over the air");
        receiver.halt();
    }

    #[test]
    fn halt_stops_the_loop() {
        let (_sink, source) = loopback_pair();
        let mut receiver = Receiver::new(|_| {}, source);
        std::thread::sleep(Duration::from_millis(50));
        receiver.halt();
    }
}
