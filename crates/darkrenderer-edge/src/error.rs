use std::io;

use darkrenderer_common::config::ConfigError;
use darkrenderer_protocol::Error as ProtocolError;

#[derive(thiserror::Error, Debug)]
pub enum EdgeError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}
