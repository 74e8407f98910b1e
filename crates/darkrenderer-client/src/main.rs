//! Command-line client: drives one DarkRenderer session end to end —
//! handshake, scene send, ordered result collection, report — or sends one
//! of the shutdown control messages instead.

mod args;
mod error;

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use clap::Parser;
use darkrenderer_common::config::Config;
use darkrenderer_protocol::codec::{decode_result, encode_edge_scene_camera, encode_edge_scene_rays};
use darkrenderer_protocol::{Camera, Framed, Scene};
use tracing::{debug, error, info, warn};

use args::{Args, Mode};
use error::ClientError;

fn main() {
    let args = Args::parse();
    enable_logging(&args);
    debug!("{args:?}");

    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ClientError> {
    let config = load_config(args);
    let (host, port) = edge_address(args, config.as_ref());
    let compress = args.compress || config.as_ref().is_some_and(|c| c.networking.compression);

    let addr = resolve(&format!("{host}:{port}"))?;
    let stream = TcpStream::connect(addr)?;
    let mut framed = Framed::new(stream);

    match args.mode {
        Mode::ShutdownEdge => {
            framed.send("EXIT_EDGE", compress)?;
            info!("sent EXIT_EDGE to {addr}");
            return Ok(());
        }
        Mode::ShutdownAll => {
            framed.send("EXIT_ALL", compress)?;
            info!("sent EXIT_ALL to {addr}");
            return Ok(());
        }
        Mode::Client => {}
    }

    if let Some(config_line) = build_config_line(args) {
        framed.send(&config_line, compress)?;
    }

    let (scene_text, num_rays) = build_scene_frame(args)?;
    let task_size = args
        .task_size
        .or(config.as_ref().map(|c| c.processing.task_size))
        .unwrap_or(1024)
        .max(1);
    framed.send(&scene_text, compress)?;
    info!(num_rays, task_size, "scene sent");

    let expected_tasks = num_rays.div_ceil(task_size);
    let mut results = Vec::with_capacity(expected_tasks);
    for _ in 0..expected_tasks {
        let frame = framed.recv(compress)?;
        results.push(decode_result(&frame)?);
    }
    results.sort_by_key(|r| r.task_id);

    let report = framed.recv(compress)?;
    info!("session report:\n{report}");

    let total_rays: usize = results.iter().map(|r| r.ray_count()).sum();
    info!(tasks = results.len(), total_rays, "received all results");

    Ok(())
}

/// Loads the shared config when `--config` is given; a missing or
/// unparsable file only disables the defaults it would have supplied,
/// since every value it covers can also come from a CLI flag.
fn load_config(args: &Args) -> Option<Config> {
    let path = args.config.as_ref()?;
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("loading config {}: {e}; falling back to CLI defaults", path.display());
            None
        }
    }
}

fn edge_address(args: &Args, config: Option<&Config>) -> (String, u16) {
    let host = args
        .edge_host
        .clone()
        .or_else(|| config.map(|c| c.edge.ip.clone()))
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = args
        .edge_port
        .or_else(|| config.map(|c| c.edge.port))
        .unwrap_or(9000);
    (host, port)
}

fn resolve(addr: &str) -> Result<SocketAddr, ClientError> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| ClientError::DnsLookupFailed(addr.to_string()))
}

fn build_config_line(args: &Args) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(n) = args.task_size {
        parts.push(format!("TSIZE {n}"));
    }
    if let Some(n) = args.task_chunk_size {
        parts.push(format!("TCHUNKSIZE {n}"));
    }
    if args.multiqueue {
        parts.push("MULTIQUEUE 1".to_string());
    }
    if args.task_stealing {
        parts.push("STEAL 1".to_string());
    }
    if args.cloud_streaming {
        parts.push("STREAM".to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("CONFIG {}", parts.join(" ")))
    }
}

/// Builds the edge scene frame. `--scene` points at a file already holding
/// the wire-format scene text — parsing a real mesh/camera description file
/// is out of scope here, same as for the edge. Without `--scene`, sends a
/// small built-in demo scene so the client is runnable out of the box.
fn build_scene_frame(args: &Args) -> Result<(String, usize), ClientError> {
    if let Some(path) = &args.scene {
        let text = std::fs::read_to_string(path)?;
        let num_rays = text
            .split_whitespace()
            .nth(1)
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        return Ok((text, num_rays));
    }

    Ok(demo_scene(args.send_cam))
}

fn demo_scene(send_cam: bool) -> (String, usize) {
    let scene = Scene {
        triangle_ids: vec![0],
        triangles: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
        camera: None,
    };

    if send_cam {
        let camera = Camera {
            hres: 4,
            vres: 4,
            eye: [0.0, 0.0, 5.0],
            look: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            distance: 1.0,
            pixel_size: 0.02,
        };
        let num_rays = camera.hres as usize * camera.vres as usize;
        (encode_edge_scene_camera(&scene, &camera), num_rays)
    } else {
        let rays: Vec<f64> = (0..8)
            .flat_map(|i| vec![0.0, 0.0, -5.0 - i as f64, 0.0, 0.0, 1.0])
            .collect();
        let num_rays = rays.len() / 6;
        (encode_edge_scene_rays(&scene, &rays), num_rays)
    }
}

fn enable_logging(args: &Args) {
    let mut builder = tracing_subscriber::fmt().compact();

    if args.quiet {
        builder = builder.with_max_level(tracing::Level::ERROR);
    } else {
        match args.verbose {
            2.. => builder = builder.with_max_level(tracing::Level::TRACE),
            1 => builder = builder.with_max_level(tracing::Level::DEBUG),
            _ => builder = builder.with_max_level(tracing::Level::INFO),
        }
    }

    builder.init();
}
