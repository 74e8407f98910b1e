//! The FPGA tracer: partitions rays across one or more accelerator
//! instances, kicks each off non-blocking, polls for completion, then
//! concatenates results in accelerator order.
//!
//! The register-level driver (`XIntersectFPGA` in the original source) is
//! out of scope; `SimulatedAccelerator` honors the same
//! `set_scene`/`compute`/`is_done`/`get_results` contract in software so the
//! partition/poll/concatenate logic above it is fully exercised without
//! real hardware.

use std::time::Duration;

use darkrenderer_protocol::{IntersectionKernel, MollerTrumbore, Scene, TracerKind};

use super::Tracer;

/// Interval the FPGA tracer sleeps between `is_done` polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Register offsets of the `XIntersectFPGA` IP core, documented here for
/// fidelity to the hardware driver even though `SimulatedAccelerator` never
/// touches real registers.
pub mod registers {
    pub const ADDR_AP_CTRL: u32 = 0x00;
    pub const ADDR_I_TNUMBER_DATA: u32 = 0x10;
    pub const ADDR_I_TDATA_DATA: u32 = 0x18;
    pub const ADDR_I_TIDS_DATA: u32 = 0x20;
    pub const ADDR_I_RNUMBER_DATA: u32 = 0x28;
    pub const ADDR_I_RDATA_DATA: u32 = 0x30;
    pub const ADDR_O_TIDS_DATA: u32 = 0x38;
    pub const ADDR_O_TINTERSECTS_DATA: u32 = 0x40;
}

/// Software stand-in for one `XIntersectFPGA` accelerator instance.
pub struct SimulatedAccelerator {
    name: String,
    triangle_ids: Vec<i64>,
    triangles: Vec<f64>,
    result: Option<(Vec<i64>, Vec<f64>)>,
}

impl SimulatedAccelerator {
    pub fn new(name: impl Into<String>) -> Self {
        SimulatedAccelerator {
            name: name.into(),
            triangle_ids: Vec::new(),
            triangles: Vec::new(),
            result: None,
        }
    }

    pub fn set_scene(&mut self, triangle_ids: &[i64], triangles: &[f64]) {
        self.triangle_ids = triangle_ids.to_vec();
        self.triangles = triangles.to_vec();
    }

    /// Non-blocking kick-off: computes immediately (there is no real DMA
    /// transfer to wait on) but defers the result behind `is_done` so
    /// callers exercise the real poll contract.
    pub fn compute(&mut self, rays: &[f64]) {
        self.result = Some(MollerTrumbore.intersect(rays, &self.triangle_ids, &self.triangles));
    }

    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    pub fn get_results(&mut self) -> (Vec<i64>, Vec<f64>) {
        self.result.take().unwrap_or_default()
    }
}

/// Wraps one or more `SimulatedAccelerator`s. With `use_multi_fpga`, the ray
/// buffer is split into `n_accel` equal shares (last gets the remainder),
/// each accelerator computes its share independently, and results are
/// concatenated back in accelerator order.
pub struct FpgaTracer {
    accelerators: Vec<SimulatedAccelerator>,
    use_multi_fpga: bool,
}

impl FpgaTracer {
    pub fn new(num_accelerators: usize, use_multi_fpga: bool) -> Self {
        let count = num_accelerators.max(1);
        let accelerators = (0..count)
            .map(|i| SimulatedAccelerator::new(format!("accel_{i}")))
            .collect();
        FpgaTracer {
            accelerators,
            use_multi_fpga,
        }
    }

    pub fn num_accelerators(&self) -> usize {
        self.accelerators.len()
    }

    /// Splits `rays` into `self.accelerators.len()` shares of
    /// `ceil(num_rays / n_accel)` rays each, the last share taking whatever
    /// remains.
    fn split_rays(&self, rays: &[f64]) -> Vec<Vec<f64>> {
        let n_accel = self.accelerators.len();
        let num_rays = rays.len() / 6;
        let share = num_rays.div_ceil(n_accel);

        let mut shares = Vec::with_capacity(n_accel);
        for i in 0..n_accel {
            let start = (i * share * 6).min(rays.len());
            let end = ((i + 1) * share * 6).min(rays.len());
            shares.push(rays[start..end].to_vec());
        }
        shares
    }
}

impl Tracer for FpgaTracer {
    fn kind(&self) -> TracerKind {
        TracerKind::Fpga
    }

    fn set_scene(&mut self, scene: &Scene) {
        for accel in &mut self.accelerators {
            accel.set_scene(&scene.triangle_ids, &scene.triangles);
        }
    }

    fn compute(&mut self, rays: &[f64]) -> (Vec<i64>, Vec<f64>) {
        if self.use_multi_fpga && self.accelerators.len() > 1 {
            let shares = self.split_rays(rays);
            for (accel, share) in self.accelerators.iter_mut().zip(shares) {
                accel.compute(&share);
            }
        } else {
            self.accelerators[0].compute(rays);
        }

        while !self.accelerators.iter().all(|a| a.is_done()) {
            std::thread::sleep(POLL_INTERVAL);
        }

        let mut ids = Vec::new();
        let mut dists = Vec::new();
        for accel in &mut self.accelerators {
            let (accel_ids, accel_dists) = accel.get_results();
            ids.extend(accel_ids);
            dists.extend(accel_dists);
        }
        (ids, dists)
    }
}
