//! One accepted edge connection: reads the cloud scene (never a camera),
//! then loops answering task/SuperTask frames against local tracers until
//! the peer sends `"END"`.
//!
//! When there is more than one local tracer, an incoming ray buffer is
//! itself split across them through the same partitioner/queue-fabric
//! dispatch the edge uses, per the queue-fabric clarification: the cloud
//! uses it internally whenever it has more than one local tracer.

use std::net::TcpStream;
use std::sync::Arc;

use darkrenderer_common::config::Config;
use darkrenderer_core::{Dispatch, Partitioner, ResultSlot};
use darkrenderer_protocol::codec::{
    ControlMessage, decode_cloud_scene, decode_task, encode_result, parse_control,
};
use darkrenderer_protocol::{Framed, Scene, SessionConfig, TaskResult};
use tracing::{info, warn};

use crate::error::CloudError;
use crate::tracers::build_local_tracers;

pub enum SessionOutcome {
    /// `"END"` or client disconnect: one session finished, keep accepting.
    Continue,
    /// `"EXIT"`: stop the accept loop and let the process exit.
    Exit,
}

pub fn run_session(stream: TcpStream, config: &Config) -> Result<SessionOutcome, CloudError> {
    let compress = config.networking.compression;
    let mut framed = Framed::new(stream);

    let first = framed.recv(compress)?;
    if let Some(ControlMessage::Exit) = parse_control(&first, SessionConfig::default()) {
        return Ok(SessionOutcome::Exit);
    }

    let scene = Arc::new(decode_cloud_scene(&first)?);
    info!(triangles = scene.triangle_count(), "cloud scene received");

    loop {
        let text = match framed.recv(compress) {
            Ok(text) => text,
            Err(e) => {
                warn!("edge peer disconnected: {e}");
                return Ok(SessionOutcome::Continue);
            }
        };

        match parse_control(&text, SessionConfig::default()) {
            Some(ControlMessage::End) => {
                info!("session ended by peer");
                return Ok(SessionOutcome::Continue);
            }
            Some(ControlMessage::Exit) => return Ok(SessionOutcome::Exit),
            _ => {
                let (task_id, rays) = decode_task(&text)?;
                let (triangle_ids, distances) = compute_locally(&rays, &scene, config);
                let result = TaskResult {
                    task_id,
                    triangle_ids,
                    distances,
                };
                if let Err(e) = framed.send(&encode_result(&result), compress) {
                    warn!("edge peer disconnected mid-session: {e}");
                    return Ok(SessionOutcome::Continue);
                }
            }
        }
    }
}

fn compute_locally(rays: &[f64], scene: &Arc<Scene>, config: &Config) -> (Vec<i64>, Vec<f64>) {
    let tracers = build_local_tracers(config);
    let tracer_count = tracers.len();

    let mut partitioner = Partitioner::new();
    let sub_task_size = (rays.len() / 6).div_ceil(tracer_count.max(1)).max(1);
    let tasks = partitioner.partition(rays, sub_task_size);

    let cfg = SessionConfig {
        multiqueue: tracer_count > 1,
        ..SessionConfig::default()
    };
    let dispatch = Dispatch::start(tasks, scene.clone(), tracers, &cfg);

    let mut by_task = Vec::new();
    let mut sentinels = 0;
    while sentinels < tracer_count {
        match dispatch.result_rx.recv() {
            Ok(ResultSlot::Result(result)) => by_task.push(result),
            Ok(ResultSlot::EndOfStream) => sentinels += 1,
            Err(_) => break,
        }
    }
    for _ in 0..tracer_count {
        let _ = dispatch.report_rx.recv();
    }
    dispatch.join();

    by_task.sort_by_key(|r| r.task_id);
    let mut triangle_ids = Vec::with_capacity(rays.len() / 6);
    let mut distances = Vec::with_capacity(rays.len() / 6);
    for result in by_task {
        triangle_ids.extend(result.triangle_ids);
        distances.extend(result.distances);
    }
    (triangle_ids, distances)
}
