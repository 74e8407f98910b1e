//! Builds the tracer fleet for a session from the JSON config: CPU is
//! always present, FPGA and cloud are conditional on `processing.*.active`.
//!
//! Replaces the reference implementation's runtime capability sniffing
//! (presence of FPGA-overlay attributes) with an explicit config-driven
//! factory, per the "dynamic tracer list" note: FPGA and cloud become
//! conditional variants selected by config rather than probed hardware.

use std::net::ToSocketAddrs;

use darkrenderer_common::config::Config;
use darkrenderer_core::Error as CoreError;
use darkrenderer_core::Tracer;
use darkrenderer_core::tracer::cloud::CloudTracer;
use darkrenderer_core::tracer::cpu::CpuTracer;
use darkrenderer_core::tracer::fpga::FpgaTracer;
use darkrenderer_protocol::MollerTrumbore;
use tracing::warn;

pub fn build_tracers(config: &Config, fallback_chunk_size: usize) -> Vec<Box<dyn Tracer>> {
    let mut tracers: Vec<Box<dyn Tracer>> = Vec::new();

    if config.processing.cpu.active {
        let use_multicore = config.processing.cpu.mode.as_deref() == Some("multicore");
        tracers.push(Box::new(CpuTracer::new(MollerTrumbore, use_multicore)));
    }

    if config.processing.fpga.active {
        let n_accel = config.processing.fpga.factor.unwrap_or(1.0).max(1.0) as usize;
        let use_multi_fpga = config.processing.fpga.mode.as_deref() == Some("multi");
        tracers.push(Box::new(FpgaTracer::new(n_accel, use_multi_fpga)));
    }

    if config.processing.cloud.active {
        match connect_cloud(config, fallback_chunk_size) {
            Ok(cloud) => tracers.push(Box::new(cloud)),
            Err(e) => warn!("could not reach cloud peer: {e}; continuing without it"),
        }
    }

    tracers
}

fn connect_cloud(config: &Config, fallback_chunk_size: usize) -> Result<CloudTracer, CoreError> {
    let addr_str = format!("{}:{}", config.cloud.ip, config.cloud.port);
    let addr = addr_str
        .to_socket_addrs()
        .map_err(CoreError::Io)?
        .next()
        .ok_or_else(|| {
            CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address for cloud peer {addr_str}"),
            ))
        })?;

    let chunk_size = config
        .processing
        .cloud
        .task_chunk_size
        .unwrap_or(fallback_chunk_size);

    CloudTracer::connect(addr, config.networking.compression, chunk_size)
}
