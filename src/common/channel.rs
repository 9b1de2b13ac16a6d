use std::fmt::Display;

/// Name of a chat channel, stored without the `#` prefix.
///
/// Matching against names received on the wire is ASCII case-insensitive,
/// but the original casing is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Channel(String);

impl Channel {
  /// Parse a channel name.
  ///
  /// A leading `#` is accepted and stripped. The remaining name must be
  /// non-empty and must not contain whitespace.
  pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidChannelName> {
    let s = s.as_ref();
    let name = s.strip_prefix('#').unwrap_or(s);
    if name.is_empty() || name.contains(char::is_whitespace) {
      return Err(InvalidChannelName(s.to_owned()));
    }
    Ok(Self(name.to_owned()))
  }

  /// The channel name without the `#` prefix, in its original casing.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The channel name as it appears on the wire, `#name`.
  pub fn irc(&self) -> String {
    format!("#{}", self.0)
  }

  /// Whether `other` names this channel.
  ///
  /// `other` may carry a `#` prefix.
  pub fn matches(&self, other: &str) -> bool {
    let other = other.strip_prefix('#').unwrap_or(other);
    self.0.eq_ignore_ascii_case(other)
  }
}

impl AsRef<str> for Channel {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl Display for Channel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::str::FromStr for Channel {
  type Err = InvalidChannelName;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

/// Failed to parse a channel name.
#[derive(Debug)]
pub struct InvalidChannelName(String);

impl Display for InvalidChannelName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "invalid channel name `{}`", self.0)
  }
}

impl std::error::Error for InvalidChannelName {}

static_assert_send!(Channel);
static_assert_sync!(Channel);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_strips_prefix_and_keeps_casing() {
    let channel = Channel::parse("#CoolStreamer").unwrap();
    assert_eq!(channel.as_str(), "CoolStreamer");
    assert_eq!(channel.to_string(), "CoolStreamer");
    assert_eq!(channel.irc(), "#CoolStreamer");
  }

  #[test]
  fn parse_rejects_empty_and_whitespace() {
    assert!(Channel::parse("").is_err());
    assert!(Channel::parse("#").is_err());
    assert!(Channel::parse("cool streamer").is_err());
  }

  #[test]
  fn matches_is_case_insensitive() {
    let channel = Channel::parse("CoolStreamer").unwrap();
    assert!(channel.matches("coolstreamer"));
    assert!(channel.matches("#COOLSTREAMER"));
    assert!(!channel.matches("#coolstreamer2"));
  }
}
