//! The queue fabric: one or many task queues feeding the tracer workers,
//! plus the routing and work-stealing policy.
//!
//! Termination uses a tagged `EndOfStream` variant rather than closing the
//! channel (each queue can carry more than one sentinel, one per tracer, so
//! closing it after the first reader drains it would strand the others).

use crossbeam_channel::{Receiver, Sender, unbounded};

use darkrenderer_protocol::Task;

/// One slot on a queue: either real work or an end-of-stream marker.
#[derive(Debug, Clone)]
pub enum QueueItem {
    Task(Task),
    EndOfStream,
}

/// Owns the send side of every queue in the fabric; built once per session
/// by the session controller and consumed while partitioning.
pub struct QueueFabric {
    senders: Vec<Sender<QueueItem>>,
    receivers: Vec<Receiver<QueueItem>>,
    multiqueue: bool,
}

impl QueueFabric {
    /// `tracer_count` is `K` in spec terms: how many tracers will drain this
    /// fabric, and therefore how many sentinels each queue needs.
    pub fn new(tracer_count: usize, multiqueue: bool) -> Self {
        let queue_count = if multiqueue { tracer_count.max(1) } else { 1 };
        let mut senders = Vec::with_capacity(queue_count);
        let mut receivers = Vec::with_capacity(queue_count);
        for _ in 0..queue_count {
            let (tx, rx) = unbounded();
            senders.push(tx);
            receivers.push(rx);
        }
        QueueFabric {
            senders,
            receivers,
            multiqueue,
        }
    }

    pub fn queue_count(&self) -> usize {
        self.senders.len()
    }

    /// Routes `tasks` round-robin across queues (`task k -> queue k mod K`
    /// under multiqueue, or all into the single queue otherwise), then
    /// appends `tracer_count` sentinels to every queue.
    pub fn fill(&self, tasks: impl IntoIterator<Item = Task>, tracer_count: usize) {
        if self.multiqueue {
            for (i, task) in tasks.into_iter().enumerate() {
                let queue = i % self.senders.len();
                let _ = self.senders[queue].send(QueueItem::Task(task));
            }
        } else {
            for task in tasks {
                let _ = self.senders[0].send(QueueItem::Task(task));
            }
        }

        for sender in &self.senders {
            for _ in 0..tracer_count {
                let _ = sender.send(QueueItem::EndOfStream);
            }
        }
    }

    /// A handle suitable for one tracer worker: its own clone of every
    /// queue's receiver (crossbeam channels are multi-consumer) plus which
    /// index is its primary queue.
    pub fn handle_for(&self, primary: usize) -> QueueHandle {
        QueueHandle::new(self.receivers.clone(), primary % self.receivers.len())
    }
}

/// A tracer worker's view of the queue fabric: its own traversal state
/// (`active`) over every queue's receiver.
///
/// Mirrors the source's `active_queues` boolean array exactly: a queue is
/// marked inactive for this tracer the moment it pulls a sentinel (or the
/// channel closes) from it, never reactivated.
pub struct QueueHandle {
    receivers: Vec<Receiver<QueueItem>>,
    primary: usize,
    active: Vec<bool>,
}

impl QueueHandle {
    fn new(receivers: Vec<Receiver<QueueItem>>, primary: usize) -> Self {
        let active = vec![true; receivers.len()];
        QueueHandle {
            receivers,
            primary,
            active,
        }
    }

    fn drain_one(&mut self, index: usize) -> Option<Task> {
        if !self.active[index] {
            return None;
        }
        match self.receivers[index].recv() {
            Ok(QueueItem::Task(task)) => Some(task),
            Ok(QueueItem::EndOfStream) | Err(_) => {
                self.active[index] = false;
                None
            }
        }
    }

    /// Scans every queue in index order (including an already-inactive
    /// primary, which is a no-op), returning the first task found and
    /// marking any newly-exhausted queue inactive along the way.
    fn steal(&mut self) -> Option<Task> {
        for i in 0..self.receivers.len() {
            if let Some(task) = self.drain_one(i) {
                return Some(task);
            }
        }
        None
    }

    /// Pulls the next task: primary queue first, then (if `allow_stealing`
    /// and the primary just went inactive) every other active queue in
    /// index order. Returns `None` once there is nothing left to pull.
    pub fn get_task(&mut self, allow_stealing: bool) -> Option<Task> {
        if let Some(task) = self.drain_one(self.primary) {
            return Some(task);
        }
        if allow_stealing { self.steal() } else { None }
    }

    /// Whether any queue (including the primary) is still active for this
    /// tracer. Used by the cloud tracer to decide whether `get_task`
    /// returning `None` means "try stealing next round" or "truly done".
    pub fn any_active(&self) -> bool {
        self.active.iter().any(|&a| a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64) -> Task {
        Task::new(id, vec![0.0; 6])
    }

    #[test]
    fn single_queue_every_tracer_sees_its_own_sentinel() {
        let fabric = QueueFabric::new(2, false);
        fabric.fill(vec![task(0), task(1), task(2)], 2);

        let mut h0 = fabric.handle_for(0);
        let mut h1 = fabric.handle_for(0);

        let mut seen = Vec::new();
        while let Some(t) = h0.get_task(false) {
            seen.push(t.id);
        }
        while let Some(t) = h1.get_task(false) {
            seen.push(t.id);
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn multiqueue_routes_round_robin() {
        let fabric = QueueFabric::new(2, true);
        fabric.fill((0..6).map(task), 2);

        let mut h0 = fabric.handle_for(0);
        let mut h1 = fabric.handle_for(1);

        let mut q0 = Vec::new();
        while let Some(t) = h0.get_task(false) {
            q0.push(t.id);
        }
        let mut q1 = Vec::new();
        while let Some(t) = h1.get_task(false) {
            q1.push(t.id);
        }

        assert_eq!(q0, vec![0, 2, 4]);
        assert_eq!(q1, vec![1, 3, 5]);
    }

    #[test]
    fn stealing_consumes_every_task_exactly_once() {
        let fabric = QueueFabric::new(2, true);
        fabric.fill((0..10).map(task), 2);

        let mut h0 = fabric.handle_for(0);
        let mut h1 = fabric.handle_for(1);

        let mut all = Vec::new();
        loop {
            let a = h0.get_task(true);
            let b = h1.get_task(true);
            if let Some(t) = a {
                all.push(t.id);
            }
            if let Some(t) = b {
                all.push(t.id);
            }
            if a.is_none() && b.is_none() && !h0.any_active() && !h1.any_active() {
                break;
            }
        }
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn tracer_never_reactivates_an_exhausted_queue() {
        let fabric = QueueFabric::new(1, true);
        fabric.fill(vec![task(0)], 1);
        let mut handle = fabric.handle_for(0);
        assert_eq!(handle.get_task(true).unwrap().id, 0);
        assert!(handle.get_task(true).is_none());
        assert!(!handle.any_active());
        assert!(handle.get_task(true).is_none());
    }
}
