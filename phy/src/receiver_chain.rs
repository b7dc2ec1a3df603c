//! Receive-Chain Scheduler
//!
//! Owns the six pipeline blocks, one worker thread each, and drives
//! one cycle per input chunk: place the chunk in the first stage's
//! input buffer, wake every stage, wait for all of them to finish,
//! then shift each stage's output buffer into the next stage's input
//! buffer. Buffers are exclusively owned by one side at a time and
//! hand-off is an O(1) swap, so a chunk propagates one stage per
//! cycle and the chain drains naturally on zero padding.

use crate::blocks::{
    Block, ChannelEst, FftSymbols, FrameDecoder, FrameDetector, PhaseTracker, TimingSync,
    BUFFER_MAX,
};
use crate::realtime;
use crate::tagged::{TaggedSample, TaggedVector};
use crate::{FFT_SIZE, NUM_DATA_SUBCARRIERS};
use common::types::Sample;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ready,
    Done,
}

/// Shared state of one pipeline stage: the rendezvous slot and the
/// stage-owned buffers.
struct Stage<I, O> {
    status: Mutex<Status>,
    condvar: Condvar,
    input: Mutex<Vec<I>>,
    output: Mutex<Vec<O>>,
}

impl<I, O> Stage<I, O> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(Status::Done),
            condvar: Condvar::new(),
            input: Mutex::new(Vec::new()),
            output: Mutex::new(Vec::new()),
        })
    }

    fn set_status(&self, status: Status) {
        {
            let mut slot = self.status.lock().expect("status lock");
            *slot = status;
        }
        self.condvar.notify_all();
    }

    fn wait_for(&self, status: Status) {
        let mut slot = self.status.lock().expect("status lock");
        while *slot != status {
            slot = self.condvar.wait(slot).expect("status wait");
        }
    }
}

/// The scheduler's uniform view of a stage, independent of its buffer
/// types.
trait StageControl: Send + Sync {
    fn wake(&self);
    fn wait_done(&self);
}

impl<I: Send, O: Send> StageControl for Stage<I, O> {
    fn wake(&self) {
        self.set_status(Status::Ready);
    }

    fn wait_done(&self) {
        self.wait_for(Status::Done);
    }
}

/// Run one block: wait for wake, work on the stage buffers, signal
/// done, forever until halt.
fn spawn_worker<B>(mut block: B, stage: Arc<Stage<B::In, B::Out>>, halt: Arc<AtomicBool>) -> JoinHandle<()>
where
    B: Block + 'static,
{
    let name = block.name();
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            if !realtime::set_realtime_priority() {
                warn!(stage = name, "real-time priority unavailable, continuing");
            }

            loop {
                stage.wait_for(Status::Ready);
                if halt.load(Ordering::Acquire) {
                    stage.set_status(Status::Done);
                    debug!(stage = name, "worker halting");
                    break;
                }

                {
                    let input = stage.input.lock().expect("input lock");
                    let mut output = stage.output.lock().expect("output lock");
                    block.work(&input, &mut output);
                }

                stage.set_status(Status::Done);
            }
        })
        .expect("spawn pipeline worker")
}

fn shift<T>(from: &Mutex<Vec<T>>, to: &Mutex<Vec<T>>) {
    let mut from = from.lock().expect("buffer lock");
    let mut to = to.lock().expect("buffer lock");
    std::mem::swap(&mut *from, &mut *to);
}

/// The six-stage receive pipeline.
pub struct ReceiverChain {
    frame_detector: Arc<Stage<Sample, TaggedSample>>,
    timing_sync: Arc<Stage<TaggedSample, TaggedSample>>,
    fft_symbols: Arc<Stage<TaggedSample, TaggedVector<FFT_SIZE>>>,
    channel_est: Arc<Stage<TaggedVector<FFT_SIZE>, TaggedVector<FFT_SIZE>>>,
    phase_tracker: Arc<Stage<TaggedVector<FFT_SIZE>, TaggedVector<NUM_DATA_SUBCARRIERS>>>,
    frame_decoder: Arc<Stage<TaggedVector<NUM_DATA_SUBCARRIERS>, Vec<u8>>>,
    stages: Vec<Arc<dyn StageControl>>,
    halt: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl ReceiverChain {
    /// Create the blocks and start one worker thread per stage.
    pub fn new() -> Self {
        let frame_detector = Stage::new();
        let timing_sync = Stage::new();
        let fft_symbols = Stage::new();
        let channel_est = Stage::new();
        let phase_tracker = Stage::new();
        let frame_decoder = Stage::new();

        let halt = Arc::new(AtomicBool::new(false));

        let threads = vec![
            spawn_worker(FrameDetector::new(), frame_detector.clone(), halt.clone()),
            spawn_worker(TimingSync::new(), timing_sync.clone(), halt.clone()),
            spawn_worker(FftSymbols::new(), fft_symbols.clone(), halt.clone()),
            spawn_worker(ChannelEst::new(), channel_est.clone(), halt.clone()),
            spawn_worker(PhaseTracker::new(), phase_tracker.clone(), halt.clone()),
            spawn_worker(FrameDecoder::new(), frame_decoder.clone(), halt.clone()),
        ];

        let stages: Vec<Arc<dyn StageControl>> = vec![
            frame_detector.clone(),
            timing_sync.clone(),
            fft_symbols.clone(),
            channel_est.clone(),
            phase_tracker.clone(),
            frame_decoder.clone(),
        ];

        Self {
            frame_detector,
            timing_sync,
            fft_symbols,
            channel_est,
            phase_tracker,
            frame_decoder,
            stages,
            halt,
            threads,
        }
    }

    /// Run one pipeline cycle over a chunk of received samples and
    /// return any payloads that completed decoding this cycle.
    ///
    /// Chunks must be longer than the 160-sample synchronization
    /// look-ahead and no larger than [`BUFFER_MAX`]; the radio reader
    /// uses 4096–8192.
    pub fn process_samples(&mut self, samples: Vec<Sample>) -> Vec<Vec<u8>> {
        assert!(
            samples.len() <= BUFFER_MAX,
            "chunk of {} samples exceeds the {BUFFER_MAX}-item stage buffer bound",
            samples.len()
        );
        {
            let mut input = self.frame_detector.input.lock().expect("input lock");
            *input = samples;
        }

        for stage in &self.stages {
            stage.wake();
        }
        for stage in &self.stages {
            stage.wait_done();
        }

        // Each stage's results become the next stage's input for the
        // coming cycle; the pipeline's latency is one cycle per stage.
        shift(&self.frame_detector.output, &self.timing_sync.input);
        shift(&self.timing_sync.output, &self.fft_symbols.input);
        shift(&self.fft_symbols.output, &self.channel_est.input);
        shift(&self.channel_est.output, &self.phase_tracker.input);
        shift(&self.phase_tracker.output, &self.frame_decoder.input);

        std::mem::take(&mut *self.frame_decoder.output.lock().expect("output lock"))
    }

    /// Stop every worker and join the threads. Safe to call twice.
    pub fn halt(&mut self) {
        if self.halt.swap(true, Ordering::AcqRel) {
            return;
        }
        for stage in &self.stages {
            stage.wake();
        }
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
        debug!("receiver chain halted");
    }
}

impl Default for ReceiverChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReceiverChain {
    fn drop(&mut self) {
        self.halt();
    }
}
