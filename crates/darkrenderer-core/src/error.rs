#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("tracer compute failed: {0}")]
    ComputeFailed(String),

    #[error("cloud tracer network error: {0}")]
    CloudNetwork(#[from] darkrenderer_protocol::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
