//! ## IRC line splitter
//!
//! The entrypoint to this module is [`IrcLine`].
//!
//! ```rust
//! let line = tmichat::IrcLine::parse(":tmi.twitch.tv 001 ann :Welcome, GLHF!").unwrap();
//! assert_eq!(line.command(), tmichat::irc::Command::RplWelcome);
//! ```
//!
//! ⚠ This splitter is _not_ compliant with the IRCv3 spec!
//! It only understands the subset of the protocol that Twitch chat sends.

mod command;
mod prefix;
mod tags;

pub use command::Command;
pub use prefix::Prefix;
pub use tags::{Tag, Tags};

/// A single protocol line, split into its parts.
///
/// ```text,ignore
/// @tags :prefix COMMAND params
/// ```
///
/// Every part borrows from the original line.
#[derive(Clone)]
pub struct IrcLine<'src> {
  src: &'src str,
  tags: Tags<'src>,
  prefix: Option<Prefix<'src>>,
  command: Command<'src>,
  params: Option<&'src str>,
}

impl<'src> IrcLine<'src> {
  /// Split a single line.
  ///
  /// Returns `None` if the line has no command.
  pub fn parse(src: &'src str) -> Option<Self> {
    let mut pos = 0usize;

    let tags = tags::parse(src, &mut pos).unwrap_or_default();
    let prefix = prefix::parse(src, &mut pos);
    let command = command::parse(src, &mut pos)?;
    let params = Some(&src[pos..]).filter(|params| !params.is_empty());

    Some(Self {
      src,
      tags,
      prefix,
      command,
      params,
    })
  }

  /// Get the string from which this line was split.
  pub fn raw(&self) -> &'src str {
    self.src
  }

  /// Get the line's metadata tags.
  pub fn tags(&self) -> &Tags<'src> {
    &self.tags
  }

  /// Retrieve the value of `tag`.
  ///
  /// If the tag occurs more than once, the last occurrence wins.
  pub fn tag<'a>(&self, tag: impl Into<Tag<'a>>) -> Option<&'src str> {
    self.tags.get(tag)
  }

  /// Get the line [`Prefix`].
  pub fn prefix(&self) -> Option<Prefix<'src>> {
    self.prefix
  }

  /// Get the line [`Command`].
  pub fn command(&self) -> Command<'src> {
    self.command
  }

  /// Get everything after the command.
  pub fn params(&self) -> Option<&'src str> {
    self.params
  }

  /// Get the `n`th space-separated parameter before the trailing one.
  ///
  /// ```text,ignore
  /// 366 ann #coolstreamer :End of /NAMES list
  ///     ^0  ^1
  /// ```
  pub fn middle(&self, n: usize) -> Option<&'src str> {
    self
      .params?
      .split(' ')
      .take_while(|param| !param.starts_with(':'))
      .filter(|param| !param.is_empty())
      .nth(n)
  }

  /// Get the remainder of the line following the `n`th middle parameter.
  ///
  /// A leading `:` is stripped.
  pub fn rest_after(&self, n: usize) -> Option<&'src str> {
    let mut rest = self.params?;
    for _ in 0..=n {
      if rest.starts_with(':') {
        return None;
      }
      match rest.split_once(' ') {
        Some((_, tail)) => rest = tail.trim_start_matches(' '),
        None => return None,
      }
    }
    Some(rest.strip_prefix(':').unwrap_or(rest))
  }
}

impl<'src> std::fmt::Debug for IrcLine<'src> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IrcLine")
      .field("tags", &self.tags)
      .field("prefix", &self.prefix)
      .field("command", &self.command)
      .field("params", &self.params)
      .finish()
  }
}

static_assert_send!(IrcLine<'static>);
static_assert_sync!(IrcLine<'static>);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_tagged_privmsg() {
    let line = IrcLine::parse(
      "@display-name=Ann;mod=0 :ann!ann@ann.tmi.twitch.tv PRIVMSG #coolstreamer :hello world",
    )
    .unwrap();
    assert_eq!(line.tag(Tag::DisplayName), Some("Ann"));
    assert_eq!(line.tag("mod"), Some("0"));
    assert_eq!(line.prefix().and_then(|p| p.nick), Some("ann"));
    assert_eq!(line.command(), Command::Privmsg);
    assert_eq!(line.middle(0), Some("#coolstreamer"));
    assert_eq!(line.rest_after(0), Some("hello world"));
  }

  #[test]
  fn split_untagged_numeric() {
    let line = IrcLine::parse(":ann.tmi.twitch.tv 366 ann #coolstreamer :End of /NAMES list").unwrap();
    assert!(line.tags().is_empty());
    assert_eq!(line.command(), Command::RplEndOfNames);
    assert_eq!(line.middle(0), Some("ann"));
    assert_eq!(line.middle(1), Some("#coolstreamer"));
    assert_eq!(line.middle(2), None);
    assert_eq!(line.rest_after(1), Some("End of /NAMES list"));
  }

  #[test]
  fn split_bare_command() {
    let line = IrcLine::parse("PING :tmi.twitch.tv").unwrap();
    assert!(line.prefix().is_none());
    assert_eq!(line.command(), Command::Ping);
    assert_eq!(line.params(), Some(":tmi.twitch.tv"));
    assert_eq!(line.middle(0), None);

    let line = IrcLine::parse("PING").unwrap();
    assert_eq!(line.params(), None);
  }

  #[test]
  fn split_text_containing_colons() {
    let line = IrcLine::parse(":a!a@a.tmi.twitch.tv PRIVMSG #chan :see: https://example.com :)").unwrap();
    assert_eq!(line.rest_after(0), Some("see: https://example.com :)"));
  }

  #[test]
  fn split_empty_line() {
    assert!(IrcLine::parse("").is_none());
    assert!(IrcLine::parse("@a=b ").is_none());
  }
}
