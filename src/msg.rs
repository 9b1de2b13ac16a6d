//! ## Chat events
//!
//! The entrypoint to this module is [`parse`], which classifies one
//! protocol line relative to the logged-in user and the target channel.
//!
//! ```rust
//! use tmichat::{Channel, ChatEvent};
//!
//! let channel = Channel::parse("coolstreamer").unwrap();
//! let event = tmichat::parse("PING :tmi.twitch.tv", "ann", &channel).unwrap();
//! assert!(matches!(event, ChatEvent::KeepaliveProbe(_)));
//! ```

#[macro_use]
pub(crate) mod macros;

mod ping;
mod privmsg;

pub use ping::Ping;
pub use privmsg::ChatMessage;

use crate::common::Channel;
use crate::irc::{Command, IrcLine};
use std::fmt::Display;

/// The classified result of one incoming line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
  /// The server accepted our credentials (`001`).
  Welcome,

  /// The server confirmed membership in the target channel (`366`).
  ChannelJoined,

  /// A keepalive probe which must be answered with [`Ping::pong`].
  KeepaliveProbe(Ping),

  /// A message sent by some user to the target channel.
  ChatMessage(ChatMessage),

  /// Anything else. These lines are dropped.
  Unrecognized,
}

/// Classify `line`.
///
/// `login` is the login of the authenticated user, and `channel` is the
/// channel the connection is scoped to. Both are matched case-insensitively.
///
/// Classification order, first match wins:
/// 1. `001` addressed to `login` → [`ChatEvent::Welcome`]
/// 2. `366` addressed to `login` for `#channel` → [`ChatEvent::ChannelJoined`]
/// 3. `PING` → [`ChatEvent::KeepaliveProbe`]
/// 4. `PRIVMSG #channel` → [`ChatEvent::ChatMessage`]
/// 5. anything else → [`ChatEvent::Unrecognized`]
pub fn parse(line: &str, login: &str, channel: &Channel) -> Result<ChatEvent, MalformedTagError> {
  let Some(line) = IrcLine::parse(line) else {
    return Ok(ChatEvent::Unrecognized);
  };

  let addressed_to_us = || {
    line
      .middle(0)
      .is_some_and(|target| target.eq_ignore_ascii_case(login))
  };

  Ok(match line.command() {
    Command::RplWelcome if addressed_to_us() => ChatEvent::Welcome,
    Command::RplEndOfNames
      if addressed_to_us()
        && line
          .middle(1)
          .is_some_and(|target| target.starts_with('#') && channel.matches(target)) =>
    {
      ChatEvent::ChannelJoined
    }
    Command::Ping => ChatEvent::KeepaliveProbe(Ping::from_irc(&line)),
    Command::Privmsg => match ChatMessage::from_irc(&line, channel)? {
      Some(msg) => ChatEvent::ChatMessage(msg),
      None => ChatEvent::Unrecognized,
    },
    _ => ChatEvent::Unrecognized,
  })
}

/// A recognized tag had a value which could not be interpreted.
///
/// Only the message carrying the tag is affected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedTagError {
  /// Name of the offending tag.
  pub tag: String,

  /// The raw value of the tag.
  pub value: String,
}

impl Display for MalformedTagError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "failed to parse message: malformed `{}` tag value `{}`",
      self.tag, self.value
    )
  }
}

impl std::error::Error for MalformedTagError {}

static_assert_send!(ChatEvent);
static_assert_sync!(ChatEvent);

#[cfg(test)]
mod tests {
  use super::*;

  fn channel() -> Channel {
    Channel::parse("CoolStreamer").unwrap()
  }

  fn classify(line: &str) -> ChatEvent {
    parse(line, "Ann", &channel()).unwrap()
  }

  #[test]
  fn welcome_for_our_login() {
    assert_eq!(
      classify(":tmi.twitch.tv 001 ann :Welcome, GLHF!"),
      ChatEvent::Welcome
    );
    assert_eq!(
      classify(":tmi.twitch.tv 001 bob :Welcome, GLHF!"),
      ChatEvent::Unrecognized
    );
  }

  #[test]
  fn end_of_names_for_target_channel() {
    assert_eq!(
      classify(":ann.tmi.twitch.tv 366 ann #coolstreamer :End of /NAMES list"),
      ChatEvent::ChannelJoined
    );
    assert_eq!(
      classify(":ann.tmi.twitch.tv 366 ann #otherstreamer :End of /NAMES list"),
      ChatEvent::Unrecognized
    );
    assert_eq!(
      classify(":ann.tmi.twitch.tv 353 ann = #coolstreamer :ann"),
      ChatEvent::Unrecognized
    );
  }

  #[test]
  fn ping_carries_payload() {
    let ChatEvent::KeepaliveProbe(ping) = classify("PING :tmi.twitch.tv") else {
      panic!("expected a keepalive probe");
    };
    assert_eq!(ping.pong(), "PONG :tmi.twitch.tv");
  }

  #[test]
  fn ping_inside_chat_text_is_a_chat_message() {
    let event = classify(":bob!bob@bob.tmi.twitch.tv PRIVMSG #coolstreamer :PING me later");
    let ChatEvent::ChatMessage(msg) = event else {
      panic!("expected a chat message");
    };
    assert_eq!(msg.text(), "PING me later");
  }

  #[test]
  fn privmsg_for_other_channel_is_unrecognized() {
    assert_eq!(
      classify("@display-name=Bob :bob!bob@bob.tmi.twitch.tv PRIVMSG #otherstreamer :hi"),
      ChatEvent::Unrecognized
    );
  }

  #[test]
  fn other_lines_are_unrecognized() {
    assert_eq!(classify(""), ChatEvent::Unrecognized);
    assert_eq!(
      classify(":tmi.twitch.tv CAP * ACK :twitch.tv/membership twitch.tv/tags twitch.tv/commands"),
      ChatEvent::Unrecognized
    );
    assert_eq!(
      classify(":ann!ann@ann.tmi.twitch.tv JOIN #coolstreamer"),
      ChatEvent::Unrecognized
    );
    assert_eq!(classify(":tmi.twitch.tv 002 ann :Your host is tmi.twitch.tv"), ChatEvent::Unrecognized);
  }

  #[test]
  fn malformed_badge_info_is_an_error() {
    let err = parse(
      "@badge-info=subscriber/abc :bob!bob@bob.tmi.twitch.tv PRIVMSG #coolstreamer :hi",
      "ann",
      &channel(),
    )
    .unwrap_err();
    assert_eq!(err.tag, "badge-info");
    assert_eq!(err.value, "subscriber/abc");
    assert_eq!(
      err.to_string(),
      "failed to parse message: malformed `badge-info` tag value `subscriber/abc`"
    );
  }
}
