//! One accepted client connection, driven start to finish: handshake, scene
//! frame, partition, dispatch, ordered result emission, report — then back
//! to the accept loop.

use std::net::TcpStream;
use std::sync::Arc;

use darkrenderer_common::config::Config;
use darkrenderer_core::{Dispatch, Partitioner, ResultSlot};
use darkrenderer_protocol::camera::generate_rays;
use darkrenderer_protocol::codec::{ControlMessage, decode_edge_scene, encode_result, parse_control};
use darkrenderer_protocol::{Framed, SessionConfig};
use tracing::{debug, info, warn};

use crate::error::EdgeError;
use crate::tracers::build_tracers;

/// What the accept loop should do after this session ends.
pub enum SessionOutcome {
    /// Ordinary session completed (or aborted mid-way); keep accepting.
    Continue,
    /// `EXIT_EDGE`: stop the accept loop, no further action.
    ExitEdge,
    /// `EXIT_ALL`: notify cloud peers, then stop the accept loop.
    ExitAll,
}

pub fn run_session(
    stream: TcpStream,
    config: &Config,
    default_cfg: SessionConfig,
) -> Result<SessionOutcome, EdgeError> {
    let compress = config.networking.compression;
    let mut framed = Framed::new(stream);

    let first = framed.recv(compress)?;
    let (cfg, scene_text) = match parse_control(&first, default_cfg) {
        Some(ControlMessage::ExitEdge) => return Ok(SessionOutcome::ExitEdge),
        Some(ControlMessage::ExitAll) => return Ok(SessionOutcome::ExitAll),
        Some(ControlMessage::Config(updated)) => {
            let scene_text = framed.recv(compress)?;
            (updated, scene_text)
        }
        _ => (default_cfg, first),
    };

    let (scene, explicit_rays) = decode_edge_scene(&scene_text)?;
    let rays = match &scene.camera {
        Some(camera) => generate_rays(camera),
        None => explicit_rays,
    };
    info!(
        triangles = scene.triangle_count(),
        rays = rays.len() / 6,
        multiqueue = cfg.multiqueue,
        task_steal = cfg.task_steal,
        "scene received"
    );

    let mut partitioner = Partitioner::new();
    let tasks = partitioner.partition(&rays, cfg.task_size.max(1));
    let task_count = tasks.len();

    let tracers = build_tracers(config, cfg.task_chunk_size);
    let tracer_count = tracers.len();
    let scene = Arc::new(scene);
    let dispatch = Dispatch::start(tasks, scene, tracers, &cfg);

    let mut emitted = 0usize;
    let mut sentinels = 0usize;
    while sentinels < tracer_count {
        match dispatch.result_rx.recv() {
            Ok(ResultSlot::Result(result)) => {
                let frame = encode_result(&result);
                if let Err(e) = framed.send(&frame, compress) {
                    warn!("client disconnected mid-session: {e}; discarding remaining results");
                    break;
                }
                emitted += 1;
            }
            Ok(ResultSlot::EndOfStream) => sentinels += 1,
            Err(_) => break,
        }
    }

    let mut report = String::new();
    for _ in 0..tracer_count {
        if let Ok(summary) = dispatch.report_rx.recv() {
            report.push_str(&summary.to_string());
            report.push('\n');
        }
    }
    let _ = framed.send(&report, compress);

    dispatch.join();
    debug!(task_count, emitted, "session complete");
    Ok(SessionOutcome::Continue)
}

/// `EXIT_ALL` handling: tells the cloud peer to shut down too. Best-effort —
/// a cloud peer that is already down or unreachable doesn't block the edge's
/// own shutdown.
pub fn notify_cloud_exit(config: &Config) {
    use std::net::ToSocketAddrs;

    let addr_str = format!("{}:{}", config.cloud.ip, config.cloud.port);
    let addr = match addr_str.to_socket_addrs().ok().and_then(|mut a| a.next()) {
        Some(addr) => addr,
        None => {
            warn!("could not resolve cloud peer {addr_str} to notify of EXIT_ALL");
            return;
        }
    };

    match TcpStream::connect(addr) {
        Ok(stream) => {
            let mut framed = Framed::new(stream);
            let _ = framed.send("EXIT", config.networking.compression);
        }
        Err(e) => warn!("could not notify cloud peer at {addr} of EXIT_ALL: {e}"),
    }
}
