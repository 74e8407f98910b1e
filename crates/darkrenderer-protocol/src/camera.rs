//! Expands a `Camera` into the ray buffer it implies.
//!
//! A direct port of the reference renderer's `Camera.get_rays`: every pixel
//! of the image plane becomes one ray, raster order (row-major, origin top
//! row first).

use crate::model::Camera;

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn norm(a: [f64; 3]) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

fn normalized(a: [f64; 3]) -> [f64; 3] {
    let n = norm(a);
    scale(a, 1.0 / n)
}

/// Expands a camera into a flat `(origin.xyz, direction.xyz)` ray buffer, one
/// ray per pixel, `vres` rows of `hres` columns each.
pub fn generate_rays(camera: &Camera) -> Vec<f64> {
    let w = normalized(sub(camera.eye, camera.look));
    let u = normalized(scale(cross(camera.up, w), -1.0));
    let v = cross(w, u);

    let hres = camera.hres as f64;
    let vres = camera.vres as f64;

    let mut rays = Vec::with_capacity((camera.hres as usize) * (camera.vres as usize) * 6);
    for r in 0..camera.vres {
        for c in 0..camera.hres {
            let xv = camera.pixel_size * (c as f64 - hres / 2.0);
            let yv = camera.pixel_size * (r as f64 - vres / 2.0);
            let dir = sub(add(scale(u, xv), scale(v, yv)), scale(w, camera.distance));
            let dir = normalized(dir);

            rays.extend_from_slice(&camera.eye);
            rays.extend_from_slice(&dir);
        }
    }
    rays
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera {
            hres: 4,
            vres: 2,
            eye: [0.0, 0.0, 0.0],
            look: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            distance: 1.0,
            pixel_size: 0.01,
        }
    }

    #[test]
    fn produces_one_ray_per_pixel() {
        let rays = generate_rays(&camera());
        assert_eq!(rays.len(), 4 * 2 * 6);
    }

    #[test]
    fn rays_originate_at_the_eye() {
        let cam = camera();
        let rays = generate_rays(&cam);
        for chunk in rays.chunks(6) {
            assert_eq!(&chunk[0..3], &cam.eye);
        }
    }

    #[test]
    fn ray_directions_are_unit_length() {
        let rays = generate_rays(&camera());
        for chunk in rays.chunks(6) {
            let dir = [chunk[3], chunk[4], chunk[5]];
            assert!((norm(dir) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn central_pixel_looks_straight_down_the_view_axis() {
        // hres=2, vres=2 has no exact center pixel, but with an odd pixel
        // count the middle ray should point almost exactly along -w.
        let mut cam = camera();
        cam.hres = 1;
        cam.vres = 1;
        let rays = generate_rays(&cam);
        assert!((rays[3] - 0.0).abs() < 1e-9);
        assert!((rays[4] - 0.0).abs() < 1e-9);
        assert!((rays[5] - (-1.0)).abs() < 1e-9);
    }
}
