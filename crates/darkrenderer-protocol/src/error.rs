use darkrenderer_common::text::TextError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("peer closed the connection")]
    PeerClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed message: {0}")]
    Malformed(#[from] TextError),

    #[error("malformed message: {0}")]
    MalformedMessage(String),
}
