//! The cloud tracer: acts as a tracer locally but delegates computation to
//! a remote cloud node over a single TCP session held for the worker's
//! entire run.
//!
//! Two modes, selected at session start:
//! - **Batched** — drain up to `task_chunk_size` tasks into one `SuperTask`,
//!   send one frame, block on one response, demultiplex.
//! - **Streaming** — send each pulled task on its own frame immediately,
//!   then receive one response per task sent in the burst.
//!
//! The exact `start_stealing` sequencing (stealing is only attempted once
//! the primary queue is exhausted within the *current* chunk-filling round)
//! mirrors the reference implementation's `TracerCloud.start`.

use std::net::{SocketAddr, TcpStream};

use crossbeam_channel::Sender;

use darkrenderer_protocol::codec::{decode_result, encode_cloud_scene, encode_task};
use darkrenderer_protocol::{Framed, MAX_DISTANCE, Scene, SuperTask, TracerKind, TracerSummary};

use super::{ResultSlot, Tracer};
use crate::error::Error;
use crate::queue::QueueHandle;

pub struct CloudTracer {
    framed: Framed<TcpStream>,
    compress: bool,
    task_chunk_size: usize,
    next_super_task_id: u64,
}

impl CloudTracer {
    pub fn connect(addr: SocketAddr, compress: bool, task_chunk_size: usize) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr)?;
        Ok(CloudTracer {
            framed: Framed::new(stream),
            compress,
            task_chunk_size: task_chunk_size.max(1),
            next_super_task_id: 0,
        })
    }

    pub fn from_stream(stream: TcpStream, compress: bool, task_chunk_size: usize) -> Self {
        CloudTracer {
            framed: Framed::new(stream),
            compress,
            task_chunk_size: task_chunk_size.max(1),
            next_super_task_id: 0,
        }
    }
}

impl Tracer for CloudTracer {
    fn kind(&self) -> TracerKind {
        TracerKind::Cloud
    }

    fn set_scene(&mut self, scene: &Scene) {
        let text = encode_cloud_scene(scene);
        let _ = self.framed.send(&text, self.compress);
    }

    /// A single round-trip delegation, used only when a caller wants one
    /// synchronous compute rather than the batched/streaming worker loop.
    fn compute(&mut self, rays: &[f64]) -> (Vec<i64>, Vec<f64>) {
        let text = encode_task(0, rays);
        if self.framed.send(&text, self.compress).is_err() {
            let n = rays.len() / 6;
            return (vec![-1; n], vec![MAX_DISTANCE; n]);
        }
        match self
            .framed
            .recv(self.compress)
            .ok()
            .and_then(|t| decode_result(&t).ok())
        {
            Some(result) => (result.triangle_ids, result.distances),
            None => {
                let n = rays.len() / 6;
                (vec![-1; n], vec![MAX_DISTANCE; n])
            }
        }
    }

    fn run(
        &mut self,
        result_ch: &Sender<ResultSlot>,
        mut queues: QueueHandle,
        allow_stealing: bool,
        report_ch: &Sender<TracerSummary>,
        cloud_streaming: bool,
    ) {
        let mut processed = 0u64;
        let mut start_stealing = false;
        let mut finished = false;

        while !finished {
            let mut super_task = SuperTask::new(self.next_super_task_id);
            self.next_super_task_id += 1;
            let mut task_counter = 0usize;

            for _ in 0..self.task_chunk_size {
                let Some(task) = queues.get_task(start_stealing) else {
                    if !allow_stealing || !queues.any_active() {
                        finished = true;
                    } else {
                        start_stealing = true;
                    }
                    break;
                };

                processed += 1;
                if cloud_streaming {
                    let text = encode_task(task.id, &task.rays);
                    if self.framed.send(&text, self.compress).is_err() {
                        finished = true;
                        break;
                    }
                } else {
                    super_task.add_task(&task);
                }
                task_counter += 1;
            }

            if cloud_streaming {
                for _ in 0..task_counter {
                    match self
                        .framed
                        .recv(self.compress)
                        .ok()
                        .and_then(|t| decode_result(&t).ok())
                    {
                        Some(result) => {
                            let _ = result_ch.send(ResultSlot::Result(result));
                        }
                        None => {
                            finished = true;
                            break;
                        }
                    }
                }
            } else if !super_task.is_empty() {
                let text = encode_task(super_task.id, &super_task.rays);
                match self
                    .framed
                    .send(&text, self.compress)
                    .ok()
                    .and_then(|_| self.framed.recv(self.compress).ok())
                    .and_then(|t| decode_result(&t).ok())
                {
                    Some(result) => {
                        for r in super_task.demultiplex(&result.triangle_ids, &result.distances) {
                            let _ = result_ch.send(ResultSlot::Result(r));
                        }
                    }
                    None => finished = true,
                }
            }
        }

        let _ = self.framed.send("END", self.compress);
        let _ = report_ch.send(TracerSummary {
            kind: TracerKind::Cloud,
            tasks_processed: processed,
        });
        let _ = result_ch.send(ResultSlot::EndOfStream);
    }
}
