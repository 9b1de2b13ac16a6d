//! Represents a basic Twitch chat message sent by some user to the target channel.

use super::MalformedTagError;
use crate::common::{maybe_unescape, Channel};
use crate::irc::{Command, IrcLine, Tag};

/// Represents a basic Twitch chat message sent by some user to the target channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatMessage {
  sender: String,
  login: String,
  text: String,
  subscriber: bool,
  sub_length: u64,
  moderator: bool,
  user_id: String,
  channel: Channel,
}

generate_getters! {
  for ChatMessage as self {
    /// Display name of the sender.
    ///
    /// Empty if the line carried no `display-name` tag.
    sender -> &str = self.sender.as_ref(),

    /// Login of the sender, taken from the line prefix.
    login -> &str = self.login.as_ref(),

    /// Text content of the message.
    text -> &str = self.text.as_ref(),

    /// Whether the sender is subscribed to the channel.
    subscriber -> bool,

    /// Number of months the sender has been subscribed.
    ///
    /// Only meaningful if [`ChatMessage::subscriber`] is `true`.
    sub_length -> u64,

    /// Whether the sender is a moderator of the channel.
    moderator -> bool,

    /// Platform ID of the sender, empty if unknown.
    user_id -> &str = self.user_id.as_ref(),

    /// Channel in which this message was sent.
    channel -> &Channel = &self.channel,
  }
}

impl ChatMessage {
  /// Returns `Ok(None)` if `line` is not a `PRIVMSG` to `#channel`.
  pub(super) fn from_irc(
    line: &IrcLine<'_>,
    channel: &Channel,
  ) -> Result<Option<Self>, MalformedTagError> {
    if line.command() != Command::Privmsg {
      return Ok(None);
    }
    match line.middle(0) {
      Some(target) if target.starts_with('#') && channel.matches(target) => {}
      _ => return Ok(None),
    }

    let sub_length = match line.tag(Tag::BadgeInfo) {
      Some(badge_info) => parse_sub_length(badge_info)?,
      None => 0,
    };

    Ok(Some(ChatMessage {
      sender: line
        .tag(Tag::DisplayName)
        .map(|name| maybe_unescape(name).into_owned())
        .unwrap_or_default(),
      login: line
        .prefix()
        .and_then(|prefix| prefix.nick)
        .unwrap_or_default()
        .into(),
      text: line.rest_after(0).unwrap_or_default().into(),
      subscriber: line.tag(Tag::Subscriber) == Some("1"),
      sub_length,
      moderator: line.tag(Tag::Mod) == Some("1"),
      user_id: line.tag(Tag::UserId).unwrap_or_default().into(),
      channel: channel.clone(),
    }))
  }
}

/// `subscriber/<months>[,<badge>/<version>...]`
///
/// Only a value whose first badge is `subscriber` yields a length.
fn parse_sub_length(badge_info: &str) -> Result<u64, MalformedTagError> {
  let malformed = || MalformedTagError {
    tag: Tag::BadgeInfo.as_str().into(),
    value: badge_info.into(),
  };

  let (name, months) = match badge_info.split_once('/') {
    Some((name, rest)) => (name, Some(rest)),
    None => (badge_info, None),
  };
  if name != "subscriber" {
    return Ok(0);
  }

  let months = months.ok_or_else(malformed)?;
  let months = months.split(',').next().unwrap_or(months);
  months.parse().map_err(|_| malformed())
}
