use super::read::ReadStream;
use futures_util::StreamExt;
use std::fmt::Display;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader, WriteHalf};
use tokio_stream::wrappers::LinesStream;

/// A line-framed connection to the chat server.
///
/// All writes go through [`Transport::send`], and the transport is owned by
/// exactly one task at a time, so writes never interleave.
pub struct Transport<S> {
  pub(super) reader: ReadStream<S>,
  pub(super) writer: WriteHalf<S>,
  pub(super) scratch: String,
}

impl<S> Transport<S>
where
  S: AsyncRead + AsyncWrite,
{
  pub fn new(stream: S) -> Self {
    let (reader, writer) = io::split(stream);
    Self {
      reader: LinesStream::new(BufReader::new(reader).lines()).fuse(),
      writer,
      scratch: String::with_capacity(512),
    }
  }
}

/// The connection to the chat server failed mid-session.
#[derive(Debug)]
pub enum TransportError {
  /// The underlying I/O operation failed.
  Io(io::Error),

  /// The stream was closed.
  StreamClosed,
}

impl TransportError {
  /// Returns `true` if this failure was caused by a disconnect of some kind.
  pub fn is_disconnect(&self) -> bool {
    match self {
      TransportError::StreamClosed => true,
      TransportError::Io(e) => matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
          | io::ErrorKind::ConnectionAborted
          | io::ErrorKind::ConnectionReset
          | io::ErrorKind::BrokenPipe
          | io::ErrorKind::TimedOut
      ),
    }
  }
}

impl From<io::Error> for TransportError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl Display for TransportError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TransportError::Io(e) => write!(f, "transport error: {e}"),
      TransportError::StreamClosed => write!(f, "transport error: stream closed"),
    }
  }
}

impl std::error::Error for TransportError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      TransportError::Io(e) => Some(e),
      TransportError::StreamClosed => None,
    }
  }
}
