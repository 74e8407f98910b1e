//! The tracer abstraction: a uniform contract implemented by the CPU, FPGA,
//! and cloud tracers, each run by its own worker thread.

pub mod cloud;
pub mod cpu;
pub mod fpga;

use crossbeam_channel::Sender;

use darkrenderer_protocol::{Scene, TaskResult, TracerKind, TracerSummary};

use crate::queue::QueueHandle;

/// A slot on the shared result channel: either one task's result or a
/// worker's end-of-stream marker. Tagged the same way as `QueueItem`, for
/// the same reason — the channel is shared by every worker, so closing it
/// can't signal "this one worker is done".
#[derive(Debug, Clone)]
pub enum ResultSlot {
    Result(TaskResult),
    EndOfStream,
}

/// Lifecycle of a tracer worker, `Init -> Armed -> Running -> Draining ->
/// Reporting -> Done`. Exposed mainly so the session controller and tests
/// can observe where a worker is without guessing from channel activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Init,
    Armed,
    Running,
    Draining,
    Reporting,
    Done,
}

/// The uniform tracer contract: set a scene once, compute synchronously,
/// and run a worker loop that drains the queue fabric into the shared
/// result channel.
pub trait Tracer: Send {
    fn kind(&self) -> TracerKind;

    /// Idempotent per session; uploads the scene to whatever backs this
    /// tracer (a CPU-local buffer, an accelerator, a remote peer).
    fn set_scene(&mut self, scene: &Scene);

    /// Synchronous intersection of `rays` against the scene set by
    /// `set_scene`, returning one `(triangle_id, distance)` pair per ray.
    fn compute(&mut self, rays: &[f64]) -> (Vec<i64>, Vec<f64>);

    /// Worker loop: pulls tasks per the queue fabric's routing/stealing
    /// policy, computes each, and pushes results — then pushes one summary
    /// and one sentinel. The default implementation is the CPU/FPGA shape;
    /// the cloud tracer overrides this with its SuperTask/streaming
    /// protocol (`cloud_streaming` is unused by every other tracer).
    fn run(
        &mut self,
        result_ch: &Sender<ResultSlot>,
        mut queues: QueueHandle,
        allow_stealing: bool,
        report_ch: &Sender<TracerSummary>,
        _cloud_streaming: bool,
    ) {
        let mut processed = 0u64;
        while let Some(task) = queues.get_task(allow_stealing) {
            let (triangle_ids, distances) = self.compute(&task.rays);
            let _ = result_ch.send(ResultSlot::Result(TaskResult {
                task_id: task.id,
                triangle_ids,
                distances,
            }));
            processed += 1;
        }

        let _ = report_ch.send(TracerSummary {
            kind: self.kind(),
            tasks_processed: processed,
        });
        let _ = result_ch.send(ResultSlot::EndOfStream);
    }
}
