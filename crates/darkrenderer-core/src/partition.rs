//! Chops a ray buffer into fixed-size tasks with session-dense, monotonic
//! IDs.
//!
//! The source used a process-global counter reset at the start of every
//! session; ID assignment here is a plain counter owned by the
//! `Partitioner` instance instead, so nothing survives across sessions and
//! nothing is shared between concurrent edge instances.

use darkrenderer_protocol::Task;

/// Splits ray buffers into `Task`s, assigning dense IDs starting at 0.
///
/// One `Partitioner` is created per session and discarded with it; it holds
/// no state beyond the next ID to assign, which is exactly the "reset
/// `Task.next_id` to 0" step of the edge session controller.
#[derive(Debug, Default)]
pub struct Partitioner {
    next_id: u64,
}

impl Partitioner {
    pub fn new() -> Self {
        Partitioner { next_id: 0 }
    }

    /// Splits `rays` (a flat multiple-of-6 buffer) into tasks of at most
    /// `task_size` rays each; only the last task may be shorter.
    ///
    /// Panics if `rays.len()` is not a multiple of 6 or `task_size` is zero
    /// — both are caller invariants enforced before partitioning, not
    /// recoverable per-session conditions.
    pub fn partition(&mut self, rays: &[f64], task_size: usize) -> Vec<Task> {
        assert_eq!(rays.len() % 6, 0, "ray buffer must be a multiple of 6");
        assert!(task_size > 0, "task_size must be positive");

        let num_rays = rays.len() / 6;
        let num_tasks = num_rays.div_ceil(task_size);

        let mut tasks = Vec::with_capacity(num_tasks);
        for i in 0..num_tasks {
            let start = i * task_size * 6;
            let end = ((i + 1) * task_size * 6).min(rays.len());
            let id = self.next_id;
            self.next_id += 1;
            tasks.push(Task::new(id, rays[start..end].to_vec()));
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_ceil_division_task_count_with_ids_from_zero() {
        let mut p = Partitioner::new();
        let rays = vec![0.0; 10 * 6];
        let tasks = p.partition(&rays, 3);

        assert_eq!(tasks.len(), 4);
        assert_eq!(
            tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            tasks.iter().map(|t| t.ray_count()).collect::<Vec<_>>(),
            vec![3, 3, 3, 1]
        );
    }

    #[test]
    fn every_ray_appears_in_exactly_one_task() {
        let mut p = Partitioner::new();
        let rays: Vec<f64> = (0..(17 * 6)).map(|i| i as f64).collect();
        let tasks = p.partition(&rays, 5);

        let mut reassembled = Vec::new();
        for t in &tasks {
            reassembled.extend_from_slice(&t.rays);
        }
        assert_eq!(reassembled, rays);
    }

    #[test]
    fn id_counter_is_session_scoped_not_global() {
        let mut p1 = Partitioner::new();
        let _ = p1.partition(&vec![0.0; 60], 3);

        let mut p2 = Partitioner::new();
        let tasks = p2.partition(&vec![0.0; 18], 3);
        assert_eq!(tasks[0].id, 0);
    }

    #[test]
    fn exact_multiple_has_no_short_final_task() {
        let mut p = Partitioner::new();
        let tasks = p.partition(&vec![0.0; 36], 3);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.ray_count() == 3));
    }
}
