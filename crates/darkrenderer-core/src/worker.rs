//! Spawns one OS thread per tracer, taking it through its lifecycle:
//! `Init -> Armed -> Running -> ... -> Done`. `Draining`/`Reporting` are
//! phases inside `Tracer::run`'s own loop (logged, not separately
//! observable) — every tracer's run loop shape differs too much to thread a
//! single external state callback through cleanly, and nothing outside the
//! worker needs to distinguish them: the session controller only needs to
//! know a worker is done, which `JoinHandle::join` already tells it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering::Relaxed};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::debug;

use darkrenderer_protocol::{Scene, TracerSummary};

use crate::queue::QueueHandle;
use crate::tracer::{ResultSlot, Tracer, WorkerState};

/// Shared, lock-free view of a worker's coarse lifecycle state.
#[derive(Clone)]
pub struct StateTracker(Arc<AtomicU8>);

impl StateTracker {
    fn new() -> Self {
        StateTracker(Arc::new(AtomicU8::new(WorkerState::Init as u8)))
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Relaxed);
    }

    pub fn get(&self) -> WorkerState {
        match self.0.load(Relaxed) {
            0 => WorkerState::Init,
            1 => WorkerState::Armed,
            2 => WorkerState::Running,
            3 => WorkerState::Draining,
            4 => WorkerState::Reporting,
            _ => WorkerState::Done,
        }
    }
}

/// A spawned tracer worker: its thread handle and observable state.
pub struct WorkerHandle {
    join: JoinHandle<()>,
    state: StateTracker,
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Blocks until the worker thread exits. Per spec, a worker only exits
    /// after it has pushed its summary and result-channel sentinel, so a
    /// successful join here is the strongest "this worker is done" signal.
    pub fn join(self) {
        let _ = self.join.join();
    }
}

/// Spawns `tracer`'s worker thread: arms it with `scene`, then runs its
/// worker loop against `queues`, forwarding results to `result_ch` and its
/// final summary to `report_ch`.
pub fn spawn_worker(
    worker_id: usize,
    mut tracer: Box<dyn Tracer>,
    scene: Arc<Scene>,
    queues: QueueHandle,
    allow_stealing: bool,
    cloud_streaming: bool,
    result_ch: Sender<ResultSlot>,
    report_ch: Sender<TracerSummary>,
) -> WorkerHandle {
    let state = StateTracker::new();
    let state_in_thread = state.clone();

    let join = thread::spawn(move || {
        debug!(worker_id, "worker initializing");

        tracer.set_scene(&scene);
        state_in_thread.set(WorkerState::Armed);
        debug!(worker_id, "worker armed");

        state_in_thread.set(WorkerState::Running);
        tracer.run(
            &result_ch,
            queues,
            allow_stealing,
            &report_ch,
            cloud_streaming,
        );

        state_in_thread.set(WorkerState::Done);
        debug!(worker_id, "worker done");
    });

    WorkerHandle { join, state }
}
