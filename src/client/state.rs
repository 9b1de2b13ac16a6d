use crate::common::Channel;
use crate::msg::{ChatEvent, ChatMessage};

/// Lifecycle of a [`Connection`][crate::Connection].
///
/// States only ever advance in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
  /// The stream is open, the handshake has not been written yet.
  Connecting,
  /// The handshake was written, waiting for the server's welcome.
  Authenticating,
  /// `JOIN` was written, waiting for the server to confirm membership.
  Joining,
  /// Joined to the target channel.
  Active,
  /// The connection is gone, either due to a transport error or `disconnect`.
  Closed,
}

/// A side effect requested by [`Machine::step`].
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
  /// Write a line to the server.
  Send(String),
  /// Hand a message to the consumer.
  Dispatch(ChatMessage),
}

/// The protocol state machine of one connection.
///
/// It performs no I/O: feeding it events yields the [`Action`]s to perform.
#[derive(Debug)]
pub struct Machine {
  state: State,
  channel: Channel,
}

impl Machine {
  pub fn new(channel: Channel) -> Self {
    Self {
      state: State::Connecting,
      channel,
    }
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn channel(&self) -> &Channel {
    &self.channel
  }

  /// The handshake lines were written.
  pub fn handshake_sent(&mut self) {
    if self.state == State::Connecting {
      self.transition(State::Authenticating);
    }
  }

  /// Advance the machine by one event.
  pub fn step(&mut self, event: ChatEvent) -> Option<Action> {
    if self.state == State::Closed {
      return None;
    }

    match event {
      ChatEvent::Welcome => match self.state {
        State::Connecting | State::Authenticating => {
          self.transition(State::Joining);
          Some(Action::Send(format!("JOIN {}", self.channel.irc())))
        }
        _ => {
          trace!(state = ?self.state, "ignoring repeated welcome");
          None
        }
      },
      ChatEvent::ChannelJoined => match self.state {
        State::Joining => {
          self.transition(State::Active);
          None
        }
        _ => {
          trace!(state = ?self.state, "ignoring unexpected end of names");
          None
        }
      },
      ChatEvent::KeepaliveProbe(ping) => {
        trace!("recv PING");
        Some(Action::Send(ping.pong()))
      }
      ChatEvent::ChatMessage(msg) => Some(Action::Dispatch(msg)),
      ChatEvent::Unrecognized => None,
    }
  }

  /// Enter the terminal state.
  pub fn close(&mut self) {
    if self.state != State::Closed {
      self.transition(State::Closed);
    }
  }

  fn transition(&mut self, to: State) {
    debug!(channel = %self.channel, from = ?self.state, ?to, "state transition");
    self.state = to;
  }
}
