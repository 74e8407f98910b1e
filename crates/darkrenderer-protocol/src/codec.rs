//! Text codecs for every whitespace-tokenized message on the wire: control
//! messages, the two scene message variants (edge and cloud), task/result
//! messages, and the `CONFIG` session options.

use darkrenderer_common::text::{Tokens, push_f64s, push_i64s};

use crate::error::Error;
use crate::model::{Camera, Scene, SessionConfig, Task, TaskResult};

/// A parsed handshake/control message, read as the first frame of a session
/// (edge) or as any frame outside of task/result exchange (cloud).
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    ExitEdge,
    ExitAll,
    Exit,
    End,
    Config(SessionConfig),
}

/// Parses a control message, applying any `CONFIG` key/value pairs on top of
/// `base` (so a session's running config can be threaded through repeated
/// `CONFIG` frames, though in practice there is exactly one per session).
pub fn parse_control(text: &str, base: SessionConfig) -> Option<ControlMessage> {
    let trimmed = text.trim();
    if trimmed.starts_with("EXIT_EDGE") {
        return Some(ControlMessage::ExitEdge);
    }
    if trimmed.starts_with("EXIT_ALL") {
        return Some(ControlMessage::ExitAll);
    }
    if trimmed == "EXIT" {
        return Some(ControlMessage::Exit);
    }
    if trimmed == "END" {
        return Some(ControlMessage::End);
    }
    if trimmed.starts_with("CONFIG") {
        return Some(ControlMessage::Config(parse_config(trimmed, base)));
    }
    None
}

/// Parses `CONFIG [TSIZE n] [TCHUNKSIZE n] [MULTIQUEUE 0|1] [STEAL 0|1]
/// [STREAM]`. Unknown keys are ignored per the edge's error-handling
/// contract; a key with a missing or non-numeric value is likewise ignored
/// rather than aborting the whole session over one bad flag.
fn parse_config(text: &str, mut cfg: SessionConfig) -> SessionConfig {
    let mut words = text.split_whitespace().peekable();
    words.next(); // "CONFIG"

    while let Some(key) = words.next() {
        match key {
            "TSIZE" => {
                if let Some(v) = words.next().and_then(|w| w.parse::<usize>().ok()) {
                    cfg.task_size = v;
                }
            }
            "TCHUNKSIZE" => {
                if let Some(v) = words.next().and_then(|w| w.parse::<usize>().ok()) {
                    cfg.task_chunk_size = v;
                }
            }
            "MULTIQUEUE" => {
                if let Some(v) = words.next().and_then(|w| w.parse::<u8>().ok()) {
                    cfg.multiqueue = v != 0;
                }
            }
            "STEAL" => {
                if let Some(v) = words.next().and_then(|w| w.parse::<u8>().ok()) {
                    cfg.task_steal = v != 0;
                }
            }
            "STREAM" => {
                cfg.cloud_streaming = true;
            }
            _ => {} // unknown CONFIG key: ignored silently
        }
    }

    cfg
}

/// Decodes the edge's scene message: `num_tris num_rays` then IDs, triangle
/// vertices, then either a `CAM ...` block or explicit rays.
pub fn decode_edge_scene(text: &str) -> Result<(Scene, Vec<f64>), Error> {
    let mut tokens = Tokens::new(text);
    let num_tris = tokens.next_usize()?;
    let num_rays = tokens.next_usize()?;

    let triangle_ids = tokens.take_i64s(num_tris)?;
    let triangles = tokens.take_f64s(num_tris * 9)?;

    let next = tokens.peek();
    let (camera, rays) = if next == Some("CAM") {
        tokens.next_token()?;
        let hres = tokens.next_usize()? as u32;
        let vres = tokens.next_usize()? as u32;
        let floats = tokens.take_f64s(11)?;
        let camera = Camera {
            hres,
            vres,
            eye: [floats[0], floats[1], floats[2]],
            look: [floats[3], floats[4], floats[5]],
            up: [floats[6], floats[7], floats[8]],
            distance: floats[9],
            pixel_size: floats[10],
        };
        (Some(camera), Vec::new())
    } else {
        let rays = tokens.take_f64s(num_rays * 6)?;
        (None, rays)
    };

    Ok((
        Scene {
            triangle_ids,
            triangles,
            camera,
        },
        rays,
    ))
}

/// Encodes the edge scene message from explicit rays (no camera).
pub fn encode_edge_scene_rays(scene: &Scene, rays: &[f64]) -> String {
    let mut out = format!("{} {}\n", scene.triangle_ids.len(), rays.len() / 6);
    push_i64s(&mut out, &scene.triangle_ids);
    push_f64s(&mut out, &scene.triangles);
    push_f64s(&mut out, rays);
    out
}

/// Encodes the edge scene message using a `CAM` block instead of explicit
/// rays. `num_rays` in the header is the camera's full resolution-derived ray
/// count, written uniformly before the sender knows which branch a reader
/// will take (the `CAM` decode path never reads it back).
pub fn encode_edge_scene_camera(scene: &Scene, camera: &Camera) -> String {
    let num_rays = camera.hres as usize * camera.vres as usize;
    let mut out = format!("{} {}\n", scene.triangle_ids.len(), num_rays);
    push_i64s(&mut out, &scene.triangle_ids);
    push_f64s(&mut out, &scene.triangles);
    out.push_str("CAM ");
    out.push_str(&format!("{} {} ", camera.hres, camera.vres));
    push_f64s(&mut out, &camera.eye);
    push_f64s(&mut out, &camera.look);
    push_f64s(&mut out, &camera.up);
    push_f64s(&mut out, &[camera.distance, camera.pixel_size]);
    out
}

/// Decodes the cloud's scene message: `num_tris` then IDs and triangle
/// vertices. Never carries a camera or a ray count.
pub fn decode_cloud_scene(text: &str) -> Result<Scene, Error> {
    let mut tokens = Tokens::new(text);
    let num_tris = tokens.next_usize()?;
    let triangle_ids = tokens.take_i64s(num_tris)?;
    let triangles = tokens.take_f64s(num_tris * 9)?;
    Ok(Scene {
        triangle_ids,
        triangles,
        camera: None,
    })
}

/// Encodes the cloud's scene message.
pub fn encode_cloud_scene(scene: &Scene) -> String {
    let mut out = format!("{}\n", scene.triangle_ids.len());
    push_i64s(&mut out, &scene.triangle_ids);
    push_f64s(&mut out, &scene.triangles);
    out
}

/// Encodes a task (or a SuperTask's concatenated rays) as `id\n rays...`.
/// The receiving peer treats this as one opaque ray buffer; SuperTask member
/// boundaries are never sent on the wire, only kept by the sender so it can
/// demultiplex the response.
pub fn encode_task(id: u64, rays: &[f64]) -> String {
    let mut out = format!("{id}\n");
    push_f64s(&mut out, rays);
    out
}

pub fn encode_task_message(task: &Task) -> String {
    encode_task(task.id, &task.rays)
}

/// Decodes a task message into `(id, rays)`.
pub fn decode_task(text: &str) -> Result<(u64, Vec<f64>), Error> {
    let mut tokens = Tokens::new(text);
    let id = tokens.next_i64()? as u64;
    let remaining = tokens.remaining();
    let rays = tokens.take_f64s(remaining)?;
    Ok((id, rays))
}

/// Encodes a result message: `task_id n_rays tid... dist...`.
pub fn encode_result(result: &TaskResult) -> String {
    let mut out = format!("{} {} ", result.task_id, result.ray_count());
    push_i64s(&mut out, &result.triangle_ids);
    push_f64s(&mut out, &result.distances);
    out
}

/// Decodes a result message.
pub fn decode_result(text: &str) -> Result<TaskResult, Error> {
    let mut tokens = Tokens::new(text);
    let task_id = tokens.next_i64()? as u64;
    let n_rays = tokens.next_usize()?;
    let triangle_ids = tokens.take_i64s(n_rays)?;
    let distances = tokens.take_f64s(n_rays)?;
    Ok(TaskResult {
        task_id,
        triangle_ids,
        distances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_only_named_keys() {
        let base = SessionConfig::default();
        let ControlMessage::Config(cfg) =
            parse_control("CONFIG TSIZE 64 STEAL 1 STREAM", base).unwrap()
        else {
            panic!("expected Config");
        };
        assert_eq!(cfg.task_size, 64);
        assert!(cfg.task_steal);
        assert!(cfg.cloud_streaming);
        assert_eq!(cfg.task_chunk_size, base.task_chunk_size);
        assert!(!cfg.multiqueue);
    }

    #[test]
    fn unknown_config_key_is_ignored() {
        let base = SessionConfig::default();
        let ControlMessage::Config(cfg) =
            parse_control("CONFIG BOGUS 5 TSIZE 10", base).unwrap()
        else {
            panic!("expected Config");
        };
        assert_eq!(cfg.task_size, 10);
    }

    #[test]
    fn recognizes_exit_variants() {
        let base = SessionConfig::default();
        assert_eq!(
            parse_control("EXIT_EDGE", base),
            Some(ControlMessage::ExitEdge)
        );
        assert_eq!(
            parse_control("EXIT_ALL", base),
            Some(ControlMessage::ExitAll)
        );
        assert_eq!(parse_control("EXIT", base), Some(ControlMessage::Exit));
        assert_eq!(parse_control("END", base), Some(ControlMessage::End));
    }

    #[test]
    fn edge_scene_round_trips_with_explicit_rays() {
        let scene = Scene {
            triangle_ids: vec![0, 1],
            triangles: vec![0.0; 18],
            camera: None,
        };
        let rays = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let text = encode_edge_scene_rays(&scene, &rays);
        let (decoded_scene, decoded_rays) = decode_edge_scene(&text).unwrap();
        assert_eq!(decoded_scene.triangle_ids, scene.triangle_ids);
        assert_eq!(decoded_scene.triangles, scene.triangles);
        assert_eq!(decoded_rays, rays);
    }

    #[test]
    fn edge_scene_round_trips_with_camera() {
        let text = "1 16\n0 0.0 0.0 0.0 1.0 0.0 0.0 1.0 0.0 \
                     CAM 4 4 0.0 0.0 5.0 0.0 0.0 0.0 0.0 1.0 0.0 1.0 0.01";
        let (scene, rays) = decode_edge_scene(text).unwrap();
        assert!(scene.camera.is_some());
        assert!(rays.is_empty());
        let camera = scene.camera.unwrap();
        assert_eq!(camera.hres, 4);
        assert_eq!(camera.eye, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn edge_scene_with_camera_round_trips_through_both_encoders() {
        let scene = Scene {
            triangle_ids: vec![0],
            triangles: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
            camera: None,
        };
        let camera = Camera {
            hres: 4,
            vres: 4,
            eye: [0.0, 0.0, 5.0],
            look: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            distance: 1.0,
            pixel_size: 0.01,
        };
        let text = encode_edge_scene_camera(&scene, &camera);
        let (decoded, rays) = decode_edge_scene(&text).unwrap();
        assert_eq!(decoded.triangle_ids, scene.triangle_ids);
        assert!(rays.is_empty());
        assert_eq!(decoded.camera.unwrap().hres, 4);
    }

    #[test]
    fn cloud_scene_round_trips() {
        let scene = Scene {
            triangle_ids: vec![0, 1, 2],
            triangles: vec![1.0; 27],
            camera: None,
        };
        let text = encode_cloud_scene(&scene);
        let decoded = decode_cloud_scene(&text).unwrap();
        assert_eq!(decoded, scene);
    }

    #[test]
    fn task_message_round_trips() {
        let task = Task::new(5, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let text = encode_task_message(&task);
        let (id, rays) = decode_task(&text).unwrap();
        assert_eq!(id, 5);
        assert_eq!(rays, task.rays);
    }

    #[test]
    fn result_message_round_trips() {
        let result = TaskResult {
            task_id: 3,
            triangle_ids: vec![1, -1, 2],
            distances: vec![1.5, 1e9, 2.5],
        };
        let text = encode_result(&result);
        let decoded = decode_result(&text).unwrap();
        assert_eq!(decoded, result);
    }
}
