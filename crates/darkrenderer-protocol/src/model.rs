//! The task/result/scene data model (spec-ambient terminology: a "task" is a
//! batch of rays, a "tracer" intersects them against a scene).

pub const MAX_DISTANCE: f64 = 1e9;

/// Per-session options negotiated by the `CONFIG` control message, with
/// defaults matching the JSON config's `processing.*` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub task_size: usize,
    pub task_chunk_size: usize,
    pub multiqueue: bool,
    pub task_steal: bool,
    pub cloud_streaming: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            task_size: 1024,
            task_chunk_size: 8,
            multiqueue: false,
            task_steal: false,
            cloud_streaming: false,
        }
    }
}

/// An immutable batch of rays to intersect, identified by a session-dense ID.
///
/// `rays` is a flat sequence of `(origin.xyz, direction.xyz)` sextuples.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub rays: Vec<f64>,
}

impl Task {
    pub fn new(id: u64, rays: Vec<f64>) -> Self {
        debug_assert_eq!(rays.len() % 6, 0, "ray buffer must be a multiple of 6");
        Task { id, rays }
    }

    pub fn ray_count(&self) -> usize {
        self.rays.len() / 6
    }
}

/// One member of a `SuperTask`: which task contributed how many rays, in the
/// order they were concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperTaskMember {
    pub task_id: u64,
    pub ray_count: usize,
}

/// A batching envelope the cloud tracer uses to amortize network round
/// trips: several tasks' ray buffers concatenated into one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuperTask {
    pub id: u64,
    pub members: Vec<SuperTaskMember>,
    pub rays: Vec<f64>,
}

impl SuperTask {
    pub fn new(id: u64) -> Self {
        SuperTask {
            id,
            members: Vec::new(),
            rays: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add_task(&mut self, task: &Task) {
        self.members.push(SuperTaskMember {
            task_id: task.id,
            ray_count: task.ray_count(),
        });
        self.rays.extend_from_slice(&task.rays);
    }

    /// Splits a combined `(triangle_ids, distances)` pair — the cloud's
    /// answer to this whole `SuperTask` — back into one `TaskResult` per
    /// member, preserving member order.
    pub fn demultiplex(&self, triangle_ids: &[i64], distances: &[f64]) -> Vec<TaskResult> {
        let mut results = Vec::with_capacity(self.members.len());
        let mut offset = 0;
        for member in &self.members {
            let end = offset + member.ray_count;
            results.push(TaskResult {
                task_id: member.task_id,
                triangle_ids: triangle_ids[offset..end].to_vec(),
                distances: distances[offset..end].to_vec(),
            });
            offset = end;
        }
        results
    }
}

/// Output of intersecting one `Task`: one `(triangle_id, distance)` pair per
/// ray, in ray order. `-1` / `MAX_DISTANCE` mark a miss.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub task_id: u64,
    pub triangle_ids: Vec<i64>,
    pub distances: Vec<f64>,
}

impl TaskResult {
    pub fn ray_count(&self) -> usize {
        self.triangle_ids.len()
    }
}

/// Resolution, eye/look/up vectors, focal distance, and pixel size for a
/// scene that was described by a camera rather than explicit rays.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub hres: u32,
    pub vres: u32,
    pub eye: [f64; 3],
    pub look: [f64; 3],
    pub up: [f64; 3],
    pub distance: f64,
    pub pixel_size: f64,
}

/// The scene held by the edge for the duration of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub triangle_ids: Vec<i64>,
    pub triangles: Vec<f64>,
    pub camera: Option<Camera>,
}

impl Scene {
    pub fn triangle_count(&self) -> usize {
        self.triangle_ids.len()
    }
}

/// Which kind of tracer processed a set of tasks, for the end-of-session
/// diagnostic summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerKind {
    Cpu,
    Fpga,
    Cloud,
}

impl std::fmt::Display for TracerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TracerKind::Cpu => "TracerCPU",
            TracerKind::Fpga => "TracerFPGA",
            TracerKind::Cloud => "TracerCloud",
        };
        f.write_str(name)
    }
}

/// Per-worker diagnostic, pushed to the report channel once at the end of a
/// tracer's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracerSummary {
    pub kind: TracerKind,
    pub tasks_processed: u64,
}

impl std::fmt::Display for TracerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} processed {} tasks", self.kind, self.tasks_processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_task_demultiplex_preserves_member_order() {
        let t0 = Task::new(0, vec![0.0; 12]);
        let t1 = Task::new(1, vec![0.0; 6]);
        let mut st = SuperTask::new(0);
        st.add_task(&t0);
        st.add_task(&t1);

        let ids = vec![1, 2, -1];
        let dists = vec![1.0, 2.0, MAX_DISTANCE];
        let results = st.demultiplex(&ids, &dists);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].task_id, 0);
        assert_eq!(results[0].triangle_ids, vec![1, 2]);
        assert_eq!(results[1].task_id, 1);
        assert_eq!(results[1].triangle_ids, vec![-1]);
        assert_eq!(results[1].distances, vec![MAX_DISTANCE]);
    }
}
