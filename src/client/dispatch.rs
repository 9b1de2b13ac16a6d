use crate::msg::ChatMessage;
use std::fmt::Display;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Create the two ends of a connection's message queue.
pub(super) fn queue() -> (Dispatcher, Messages) {
  let (sender, receiver) = mpsc::unbounded_channel();
  (Dispatcher { sender }, Messages { receiver })
}

/// The read loop's end of the message queue.
///
/// Dispatching never waits on the consumer.
pub(super) struct Dispatcher {
  sender: mpsc::UnboundedSender<ChatMessage>,
}

impl Dispatcher {
  pub(super) fn dispatch(&self, msg: ChatMessage) {
    if self.sender.send(msg).is_err() {
      trace!("consumer is gone, dropping message");
    }
  }
}

/// The consumer's end of the message queue.
///
/// Messages arrive in the order they were received on the wire. The queue
/// ends once the connection is closed and every queued message was received.
pub struct Messages {
  receiver: mpsc::UnboundedReceiver<ChatMessage>,
}

impl Messages {
  /// Receive the next message.
  ///
  /// Returns `None` once the connection is closed and the queue is drained.
  pub async fn recv(&mut self) -> Option<ChatMessage> {
    self.receiver.recv().await
  }

  /// Convert into a [`Stream`][futures_util::Stream].
  pub fn into_stream(self) -> UnboundedReceiverStream<ChatMessage> {
    UnboundedReceiverStream::new(self.receiver)
  }
}

/// Receives chat messages.
///
/// Implemented for any `FnMut(ChatMessage) -> impl Future<Output = ()>`.
pub trait Handler: Send + 'static {
  fn handle(&mut self, msg: ChatMessage) -> impl Future<Output = ()> + Send;
}

impl<F, Fut> Handler for F
where
  F: FnMut(ChatMessage) -> Fut + Send + 'static,
  Fut: Future<Output = ()> + Send,
{
  async fn handle(&mut self, msg: ChatMessage) {
    (*self)(msg).await
  }
}

/// Drain `messages` into `handler` on a separate task.
///
/// Each call to the handler completes before the next message is handed over.
pub(super) fn spawn_consumer<H: Handler>(mut messages: Messages, mut handler: H) -> JoinHandle<()> {
  tokio::spawn(async move {
    while let Some(msg) = messages.recv().await {
      handler.handle(msg).await;
    }
    trace!("message queue closed");
  })
}

/// A consumer was already registered on this connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlreadyRegistered;

impl Display for AlreadyRegistered {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("a message consumer is already registered")
  }
}

impl std::error::Error for AlreadyRegistered {}

static_assert_send!(Messages);

#[cfg(test)]
mod tests {
  use super::*;
  use crate::msg::macros::_parse_chat;
  use std::time::Duration;

  fn chat(text: &str) -> ChatMessage {
    let line = format!(":bob!bob@bob.tmi.twitch.tv PRIVMSG #chan :{text}");
    _parse_chat(&line, "ann", "chan")
  }

  #[tokio::test]
  async fn queued_before_registration() {
    let (dispatcher, mut messages) = queue();
    dispatcher.dispatch(chat("a"));
    dispatcher.dispatch(chat("b"));
    drop(dispatcher);

    assert_eq!(messages.recv().await.unwrap().text(), "a");
    assert_eq!(messages.recv().await.unwrap().text(), "b");
    assert!(messages.recv().await.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn slow_handler_keeps_order() {
    let (dispatcher, messages) = queue();
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();

    let consumer = spawn_consumer(messages, move |msg: ChatMessage| {
      let seen_tx = seen_tx.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = seen_tx.send(msg.text().to_owned());
      }
    });

    for text in ["one", "two", "three"] {
      dispatcher.dispatch(chat(text));
    }
    drop(dispatcher);
    consumer.await.unwrap();

    let mut seen = vec![];
    while let Ok(text) = seen_rx.try_recv() {
      seen.push(text);
    }
    assert_eq!(seen, ["one", "two", "three"]);
  }

  #[test]
  fn dispatch_without_consumer_does_not_fail() {
    let (dispatcher, messages) = queue();
    drop(messages);
    dispatcher.dispatch(chat("lost"));
  }
}
