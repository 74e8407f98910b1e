//! Wire framing, the task/result/scene data model, and the text codecs that
//! every DarkRenderer process (client, edge, cloud) speaks.

pub mod camera;
pub mod codec;
pub mod error;
pub mod framing;
pub mod kernel;
pub mod model;

pub use error::Error;
pub use framing::{CHUNK_SIZE, Framed};
pub use kernel::{IntersectionKernel, MollerTrumbore};
pub use model::{
    Camera, MAX_DISTANCE, Scene, SessionConfig, SuperTask, SuperTaskMember, Task, TaskResult,
    TracerKind, TracerSummary,
};
