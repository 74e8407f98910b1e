use std::io;

use darkrenderer_protocol::Error as ProtocolError;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    #[error("could not resolve edge address {0}")]
    DnsLookupFailed(String),
}
