//! Ties the queue fabric, tracer workers, and result/report channels
//! together into the one thing both session controllers actually need: feed
//! in tasks and tracers, get back an ordered-by-arrival result stream.
//!
//! The edge controller partitions a scene's rays into tasks first (see
//! [`crate::partition::Partitioner`]); the cloud controller receives
//! already-identified tasks straight off the wire and skips that step —
//! both hand their task list to [`Dispatch::start`].

use std::sync::Arc;

use crossbeam_channel::{Receiver, unbounded};

use darkrenderer_protocol::{Scene, SessionConfig, Task, TracerSummary};

use crate::queue::QueueFabric;
use crate::tracer::{ResultSlot, Tracer};
use crate::worker::{WorkerHandle, spawn_worker};

/// A running session's worker fleet plus the channels draining it.
pub struct Dispatch {
    pub result_rx: Receiver<ResultSlot>,
    pub report_rx: Receiver<TracerSummary>,
    workers: Vec<WorkerHandle>,
}

impl Dispatch {
    /// Populates the queue fabric with `tasks`, spawns one worker per
    /// tracer, and returns the handle draining their shared result/report
    /// channels. `tracers` is consumed in order: tracer `i` gets queue
    /// fabric primary index `i`.
    pub fn start(
        tasks: Vec<Task>,
        scene: Arc<Scene>,
        tracers: Vec<Box<dyn Tracer>>,
        cfg: &SessionConfig,
    ) -> Self {
        let tracer_count = tracers.len();
        let fabric = QueueFabric::new(tracer_count, cfg.multiqueue);
        fabric.fill(tasks, tracer_count);

        let (result_tx, result_rx) = unbounded();
        let (report_tx, report_rx) = unbounded();

        let mut workers = Vec::with_capacity(tracer_count);
        for (i, tracer) in tracers.into_iter().enumerate() {
            let queues = fabric.handle_for(i);
            workers.push(spawn_worker(
                i,
                tracer,
                scene.clone(),
                queues,
                cfg.task_steal,
                cfg.cloud_streaming,
                result_tx.clone(),
                report_tx.clone(),
            ));
        }

        Dispatch {
            result_rx,
            report_rx,
            workers,
        }
    }

    /// How many `ResultSlot::EndOfStream` markers to expect on `result_rx`
    /// (and `TracerSummary`s on `report_rx`) before the session is done.
    pub fn tracer_count(&self) -> usize {
        self.workers.len()
    }

    /// Blocks until every worker thread has exited. Callers normally drain
    /// `result_rx`/`report_rx` to their sentinel counts first; `join` after
    /// that should return immediately.
    pub fn join(self) {
        for worker in self.workers {
            worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partitioner;
    use crate::tracer::cpu::CpuTracer;
    use darkrenderer_protocol::MollerTrumbore;

    fn scene() -> Arc<Scene> {
        Arc::new(Scene {
            triangle_ids: vec![0],
            triangles: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            camera: None,
        })
    }

    #[test]
    fn single_cpu_tracer_processes_every_task_in_order_of_arrival() {
        let scene = scene();
        let rays: Vec<f64> = (0..10)
            .flat_map(|i| vec![0.0, 0.0, -5.0 - i as f64, 0.0, 0.0, 1.0])
            .collect();
        let mut partitioner = Partitioner::new();
        let tasks = partitioner.partition(&rays, 3);
        assert_eq!(tasks.len(), 4);

        let tracers: Vec<Box<dyn Tracer>> =
            vec![Box::new(CpuTracer::new(MollerTrumbore, false))];
        let cfg = SessionConfig::default();
        let dispatch = Dispatch::start(tasks, scene, tracers, &cfg);

        let mut results = Vec::new();
        let mut sentinels = 0;
        while sentinels < dispatch.tracer_count() {
            match dispatch.result_rx.recv().unwrap() {
                ResultSlot::Result(r) => results.push(r),
                ResultSlot::EndOfStream => sentinels += 1,
            }
        }

        let mut ids: Vec<u64> = results.iter().map(|r| r.task_id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        let summary = dispatch.report_rx.recv().unwrap();
        assert_eq!(summary.tasks_processed, 4);

        dispatch.join();
    }

    #[test]
    fn two_cpu_tracers_with_multiqueue_split_the_work() {
        let scene = scene();
        let rays: Vec<f64> = (0..12)
            .flat_map(|i| vec![0.0, 0.0, -5.0 - i as f64, 0.0, 0.0, 1.0])
            .collect();
        let mut partitioner = Partitioner::new();
        let tasks = partitioner.partition(&rays, 2);
        assert_eq!(tasks.len(), 6);

        let tracers: Vec<Box<dyn Tracer>> = vec![
            Box::new(CpuTracer::new(MollerTrumbore, false)),
            Box::new(CpuTracer::new(MollerTrumbore, false)),
        ];
        let cfg = SessionConfig {
            multiqueue: true,
            ..SessionConfig::default()
        };
        let dispatch = Dispatch::start(tasks, scene, tracers, &cfg);

        let mut total = 0;
        let mut sentinels = 0;
        while sentinels < dispatch.tracer_count() {
            match dispatch.result_rx.recv().unwrap() {
                ResultSlot::Result(_) => total += 1,
                ResultSlot::EndOfStream => sentinels += 1,
            }
        }
        assert_eq!(total, 6);

        let mut processed_total = 0;
        for _ in 0..dispatch.tracer_count() {
            processed_total += dispatch.report_rx.recv().unwrap().tasks_processed;
        }
        assert_eq!(processed_total, 6);

        dispatch.join();
    }
}
