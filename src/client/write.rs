use super::transport::{Transport, TransportError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Bound on the graceful shutdown of the stream, e.g. a TLS `close_notify`.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(3);

impl<S> Transport<S>
where
  S: AsyncRead + AsyncWrite,
{
  /// Send a single line, appending the `\r\n` terminator.
  ///
  /// The line is written with a single `write_all`.
  pub async fn send(&mut self, line: &str) -> Result<(), TransportError> {
    self.scratch.clear();
    self.scratch.push_str(line);
    self.scratch.push_str("\r\n");
    self.writer.write_all(self.scratch.as_bytes()).await?;
    self.writer.flush().await?;
    self.scratch.clear();
    Ok(())
  }

  /// Shut down the write side and drop the stream.
  ///
  /// Gives up on a graceful shutdown after [`CLOSE_TIMEOUT`].
  pub async fn close(mut self) {
    match tokio::time::timeout(CLOSE_TIMEOUT, self.writer.shutdown()).await {
      Ok(Ok(())) => {}
      Ok(Err(e)) => trace!(error = %e, "failed to shut down stream"),
      Err(_) => trace!("stream shutdown timed out"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::pin::Pin;
  use std::task::{Context, Poll};
  use tokio::io::{AsyncReadExt, ReadBuf};

  #[tokio::test]
  async fn send_appends_terminator() {
    let (client, mut server) = tokio::io::duplex(64);
    let mut transport = Transport::new(client);

    transport.send("PONG :tmi.twitch.tv").await.unwrap();
    transport.send("JOIN #coolstreamer").await.unwrap();
    transport.close().await;

    let mut received = String::new();
    server.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, "PONG :tmi.twitch.tv\r\nJOIN #coolstreamer\r\n");
  }

  /// Accepts writes, but never completes a shutdown.
  struct Stalled;

  impl AsyncRead for Stalled {
    fn poll_read(
      self: Pin<&mut Self>,
      _: &mut Context<'_>,
      _: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
      Poll::Pending
    }
  }

  impl AsyncWrite for Stalled {
    fn poll_write(
      self: Pin<&mut Self>,
      _: &mut Context<'_>,
      buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
      Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
      Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<std::io::Result<()>> {
      Poll::Pending
    }
  }

  #[tokio::test(start_paused = true)]
  async fn close_gives_up_on_stalled_shutdown() {
    let mut transport = Transport::new(Stalled);
    transport.send("PONG").await.unwrap();

    let started = tokio::time::Instant::now();
    tokio::time::timeout(Duration::from_secs(60), transport.close())
      .await
      .unwrap();
    assert!(started.elapsed() >= CLOSE_TIMEOUT);
  }

  #[tokio::test]
  async fn send_after_peer_closed_fails() {
    let (client, server) = tokio::io::duplex(64);
    let mut transport = Transport::new(client);
    drop(server);

    assert!(transport.send("PONG").await.is_err());
  }
}
