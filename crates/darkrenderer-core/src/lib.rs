//! The heterogeneous task dispatcher: partitions a ray buffer into tasks,
//! routes them through a queue fabric to CPU/FPGA/Cloud tracer workers, and
//! collects their results.

pub mod dispatch;
pub mod error;
pub mod partition;
pub mod queue;
pub mod tracer;
pub mod worker;

pub use dispatch::Dispatch;
pub use error::Error;
pub use partition::Partitioner;
pub use queue::{QueueFabric, QueueHandle, QueueItem};
pub use tracer::{ResultSlot, Tracer, WorkerState};
pub use worker::{WorkerHandle, spawn_worker};
