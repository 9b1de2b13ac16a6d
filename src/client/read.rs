use super::transport::{Transport, TransportError};
use futures_util::stream::Fuse;
use tokio::io::{self, AsyncRead, AsyncWrite, BufReader, ReadHalf};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

pub type ReadStream<S> = Fuse<LinesStream<BufReader<ReadHalf<S>>>>;

impl<S> Transport<S>
where
  S: AsyncRead + AsyncWrite,
{
  /// Read a single line from the underlying stream, without its terminator.
  ///
  /// Both `\r\n` and `\n` terminators are accepted. Lines which are not
  /// valid UTF-8 are skipped.
  pub async fn recv_line(&mut self) -> Result<String, TransportError> {
    loop {
      match self.reader.next().await {
        Some(Ok(line)) => return Ok(line),
        Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
          warn!(error = %e, "discarding line");
        }
        Some(Err(e)) => return Err(e.into()),
        None => return Err(TransportError::StreamClosed),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::AsyncWriteExt;

  #[tokio::test]
  async fn lines_are_unframed() {
    let (client, mut server) = tokio::io::duplex(64);
    let mut transport = Transport::new(client);

    server.write_all(b"PING :tmi.twitch.tv\r\nsecond\nthi").await.unwrap();
    server.write_all(b"rd\r\n").await.unwrap();

    assert_eq!(transport.recv_line().await.unwrap(), "PING :tmi.twitch.tv");
    assert_eq!(transport.recv_line().await.unwrap(), "second");
    assert_eq!(transport.recv_line().await.unwrap(), "third");
  }

  #[tokio::test]
  async fn invalid_utf8_line_is_skipped() {
    let (client, mut server) = tokio::io::duplex(64);
    let mut transport = Transport::new(client);

    server.write_all(b"@display-name=\xff :a PRIVMSG #a :hi\r\n").await.unwrap();
    server.write_all(b"PING :alive\r\n").await.unwrap();

    assert_eq!(transport.recv_line().await.unwrap(), "PING :alive");
  }

  #[tokio::test]
  async fn eof_is_stream_closed() {
    let (client, server) = tokio::io::duplex(64);
    let mut transport = Transport::new(client);
    drop(server);

    let err = transport.recv_line().await.unwrap_err();
    assert!(matches!(err, TransportError::StreamClosed));
    assert!(err.is_disconnect());
  }
}
