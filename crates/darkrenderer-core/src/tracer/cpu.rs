//! The CPU tracer: calls the intersection kernel directly, no additional
//! scheduling of its own.

use darkrenderer_protocol::{IntersectionKernel, Scene, TracerKind};

use super::Tracer;

/// Wraps an [`IntersectionKernel`]; `use_multicore` is kept only as a
/// passthrough flag for kernels that branch on it (the reference kernel
/// ignores it — it is single-threaded either way).
pub struct CpuTracer<K: IntersectionKernel> {
    kernel: K,
    use_multicore: bool,
    triangle_ids: Vec<i64>,
    triangles: Vec<f64>,
}

impl<K: IntersectionKernel> CpuTracer<K> {
    pub fn new(kernel: K, use_multicore: bool) -> Self {
        CpuTracer {
            kernel,
            use_multicore,
            triangle_ids: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn use_multicore(&self) -> bool {
        self.use_multicore
    }
}

impl<K: IntersectionKernel> Tracer for CpuTracer<K> {
    fn kind(&self) -> TracerKind {
        TracerKind::Cpu
    }

    fn set_scene(&mut self, scene: &Scene) {
        self.triangle_ids = scene.triangle_ids.clone();
        self.triangles = scene.triangles.clone();
    }

    fn compute(&mut self, rays: &[f64]) -> (Vec<i64>, Vec<f64>) {
        self.kernel.intersect(rays, &self.triangle_ids, &self.triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkrenderer_protocol::MollerTrumbore;

    #[test]
    fn set_scene_then_compute_produces_one_result_per_ray() {
        let mut tracer = CpuTracer::new(MollerTrumbore, false);
        tracer.set_scene(&Scene {
            triangle_ids: vec![0],
            triangles: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            camera: None,
        });

        let rays = vec![0.0, 0.0, -5.0, 0.0, 0.0, 1.0, 10.0, 10.0, -5.0, 0.0, 0.0, 1.0];
        let (ids, dists) = tracer.compute(&rays);
        assert_eq!(ids, vec![0, -1]);
        assert_eq!(dists.len(), 2);
    }
}
