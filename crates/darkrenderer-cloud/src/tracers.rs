//! Builds the cloud's own local tracer fleet: CPU always, FPGA conditional
//! on config. The cloud never recurses into another cloud tracer.

use darkrenderer_common::config::Config;
use darkrenderer_core::Tracer;
use darkrenderer_core::tracer::cpu::CpuTracer;
use darkrenderer_core::tracer::fpga::FpgaTracer;
use darkrenderer_protocol::MollerTrumbore;

pub fn build_local_tracers(config: &Config) -> Vec<Box<dyn Tracer>> {
    let mut tracers: Vec<Box<dyn Tracer>> = Vec::new();

    let use_multicore = config.processing.cpu.mode.as_deref() == Some("multicore");
    tracers.push(Box::new(CpuTracer::new(MollerTrumbore, use_multicore)));

    if config.processing.fpga.active {
        let n_accel = config.processing.fpga.factor.unwrap_or(1.0).max(1.0) as usize;
        let use_multi_fpga = config.processing.fpga.mode.as_deref() == Some("multi");
        tracers.push(Box::new(FpgaTracer::new(n_accel, use_multi_fpga)));
    }

    tracers
}
