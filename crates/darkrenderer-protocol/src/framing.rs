//! Length-prefixed, optionally deflate-compressed message framing.
//!
//! A frame on the wire is `[length: u32 big-endian][payload: length bytes]`.
//! `payload` is the zlib-compressed form of a UTF-8 message when compression
//! is enabled for the session, otherwise the raw UTF-8 bytes. Every tier
//! (client, edge, cloud) speaks this same framing over its own TCP
//! connection.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use tracing::trace;

use crate::error::Error;

/// Bytes read per `recv` loop iteration while gathering a frame's payload.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// A framed transport over any bidirectional byte stream.
///
/// `TcpStream` is the only real-world implementor; tests commonly frame over
/// an in-memory pipe instead, which is why this takes `R: Read, W: Write`
/// rather than hard-coding a socket type.
pub struct Framed<S> {
    stream: S,
}

impl<S: Read + Write> Framed<S> {
    pub fn new(stream: S) -> Self {
        Framed { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Sends `message` as one frame, compressing the payload first when
    /// `compress` is set.
    pub fn send(&mut self, message: &str, compress: bool) -> Result<(), Error> {
        let payload = if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(message.as_bytes())?;
            encoder.finish()?
        } else {
            message.as_bytes().to_vec()
        };

        trace!(bytes = payload.len(), compress, "sending frame");

        let len = u32::try_from(payload.len()).expect("message too large to frame");
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(&payload)?;
        Ok(())
    }

    /// Receives one frame and returns its decoded UTF-8 message, inflating
    /// the payload first when `decompress` is set.
    pub fn recv(&mut self, decompress: bool) -> Result<String, Error> {
        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf).map_err(map_eof)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        let mut payload = Vec::with_capacity(len);
        while payload.len() < len {
            let remaining = len - payload.len();
            let want = remaining.min(CHUNK_SIZE);
            let mut chunk = vec![0u8; want];
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(Error::PeerClosed);
            }
            payload.extend_from_slice(&chunk[..n]);
        }

        trace!(bytes = payload.len(), decompress, "received frame");

        let decoded = if decompress {
            let mut decoder = ZlibDecoder::new(payload.as_slice());
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            out
        } else {
            String::from_utf8(payload)?
        };

        Ok(decoded)
    }
}

fn map_eof(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::PeerClosed
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A single in-memory buffer that supports both reads and writes, so a
    /// `send` followed by a `recv` can be exercised against the same frame
    /// without a real socket.
    struct LoopbackPipe {
        buf: Cursor<Vec<u8>>,
    }

    impl LoopbackPipe {
        fn new() -> Self {
            LoopbackPipe {
                buf: Cursor::new(Vec::new()),
            }
        }
    }

    impl Read for LoopbackPipe {
        fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
            self.buf.read(out)
        }
    }

    impl Write for LoopbackPipe {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.buf.write(data)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            self.buf.flush()
        }
    }

    fn round_trip(message: &str, compress: bool) -> String {
        let mut framed = Framed::new(LoopbackPipe::new());
        framed.send(message, compress).unwrap();
        framed.stream.buf.set_position(0);
        framed.recv(compress).unwrap()
    }

    #[test]
    fn round_trips_uncompressed() {
        assert_eq!(round_trip("hello world", false), "hello world");
    }

    #[test]
    fn round_trips_compressed() {
        let message = "1 2 3 4 5 6 7 8 9 10".repeat(1000);
        assert_eq!(round_trip(&message, true), message);
    }

    #[test]
    fn round_trips_empty_message() {
        assert_eq!(round_trip("", false), "");
    }

    #[test]
    fn recv_reports_peer_close_on_truncated_frame() {
        let mut framed = Framed::new(LoopbackPipe::new());
        // Declare a 10-byte payload but never write it.
        framed.stream.buf.get_mut().extend_from_slice(&10u32.to_be_bytes());
        framed.stream.buf.set_position(0);
        assert!(matches!(framed.recv(false), Err(Error::PeerClosed)));
    }

    #[test]
    fn frame_spanning_multiple_chunk_reads() {
        let message = "x".repeat(CHUNK_SIZE * 2 + 17);
        assert_eq!(round_trip(&message, false), message);
    }
}
