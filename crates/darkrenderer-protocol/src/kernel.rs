//! The ray-triangle intersection kernel seam.
//!
//! The arithmetic itself sits outside the dispatcher's scope, but a real,
//! deterministic implementation (Möller–Trumbore) is provided so the CPU
//! tracer — and any test exercising the dispatcher end to end — has
//! something non-trivial to call.

use crate::model::MAX_DISTANCE;

const EPSILON: f64 = 1.0e-5;

/// A pluggable ray-triangle intersection kernel. `CpuTracer` calls this once
/// per task; the FPGA and cloud tracers never call it directly, they
/// delegate to an accelerator or a remote peer instead.
pub trait IntersectionKernel: Send + Sync {
    /// Intersects every ray in `rays` (flat `(origin.xyz, direction.xyz)`
    /// sextuples) against the triangle soup described by `triangle_ids` and
    /// `triangles` (flat 9-float vertex triples), returning one
    /// `(triangle_id, distance)` pair per ray. `-1` / `MAX_DISTANCE` mark a
    /// miss.
    fn intersect(
        &self,
        rays: &[f64],
        triangle_ids: &[i64],
        triangles: &[f64],
    ) -> (Vec<i64>, Vec<f64>);
}

/// Reference single-threaded Möller–Trumbore kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct MollerTrumbore;

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Returns the ray parameter `t` at which `origin + t*dir` hits the triangle
/// `(v0, v1, v2)`, or `None` on a miss or a hit behind the ray origin.
fn intersect_triangle(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f64> {
    let edge1 = sub(v1, v0);
    let edge2 = sub(v2, v0);
    let pvec = cross(dir, edge2);
    let det = dot(edge1, pvec);

    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = sub(origin, v0);
    let u = dot(tvec, pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = cross(tvec, edge1);
    let v = dot(dir, qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = dot(edge2, qvec) * inv_det;
    if t > EPSILON { Some(t) } else { None }
}

impl IntersectionKernel for MollerTrumbore {
    fn intersect(
        &self,
        rays: &[f64],
        triangle_ids: &[i64],
        triangles: &[f64],
    ) -> (Vec<i64>, Vec<f64>) {
        let num_rays = rays.len() / 6;
        let num_tris = triangle_ids.len();

        let mut out_ids = Vec::with_capacity(num_rays);
        let mut out_dist = Vec::with_capacity(num_rays);

        for r in 0..num_rays {
            let base = r * 6;
            let origin = [rays[base], rays[base + 1], rays[base + 2]];
            let dir = [rays[base + 3], rays[base + 4], rays[base + 5]];

            let mut best_id = -1i64;
            let mut best_t = MAX_DISTANCE;

            for t in 0..num_tris {
                let tb = t * 9;
                let v0 = [triangles[tb], triangles[tb + 1], triangles[tb + 2]];
                let v1 = [triangles[tb + 3], triangles[tb + 4], triangles[tb + 5]];
                let v2 = [triangles[tb + 6], triangles[tb + 7], triangles[tb + 8]];

                if let Some(hit_t) = intersect_triangle(origin, dir, v0, v1, v2)
                    && hit_t < best_t
                {
                    best_t = hit_t;
                    best_id = triangle_ids[t];
                }
            }

            out_ids.push(best_id);
            out_dist.push(best_t);
        }

        (out_ids, out_dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<i64>, Vec<f64>) {
        let ids = vec![7];
        let tris = vec![
            -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        (ids, tris)
    }

    #[test]
    fn ray_through_triangle_hits() {
        let (ids, tris) = single_triangle();
        let rays = vec![0.0, 0.0, -5.0, 0.0, 0.0, 1.0];
        let (out_ids, out_dist) = MollerTrumbore.intersect(&rays, &ids, &tris);
        assert_eq!(out_ids, vec![7]);
        assert!((out_dist[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn ray_missing_triangle_reports_no_hit() {
        let (ids, tris) = single_triangle();
        let rays = vec![10.0, 10.0, -5.0, 0.0, 0.0, 1.0];
        let (out_ids, out_dist) = MollerTrumbore.intersect(&rays, &ids, &tris);
        assert_eq!(out_ids, vec![-1]);
        assert_eq!(out_dist, vec![MAX_DISTANCE]);
    }

    #[test]
    fn nearer_triangle_wins_over_farther_one() {
        let ids = vec![1, 2];
        let tris = vec![
            -1.0, -1.0, -2.0, 1.0, -1.0, -2.0, 0.0, 1.0, -2.0, // far
            -1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0, // near
        ];
        let rays = vec![0.0, 0.0, -5.0, 0.0, 0.0, 1.0];
        let (out_ids, out_dist) = MollerTrumbore.intersect(&rays, &ids, &tris);
        assert_eq!(out_ids, vec![2]);
        assert!((out_dist[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_scene_is_always_a_miss() {
        let rays = vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let (out_ids, out_dist) = MollerTrumbore.intersect(&rays, &[], &[]);
        assert_eq!(out_ids, vec![-1]);
        assert_eq!(out_dist, vec![MAX_DISTANCE]);
    }
}
