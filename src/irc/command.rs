/// An IRC command, as sent by Twitch chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Command<'src> {
  /// Ping the peer
  Ping,
  /// Send a message to a channel
  Privmsg,
  // Numeric commands
  /// `001`
  RplWelcome,
  /// `366`
  RplEndOfNames,
  /// Any other command
  Other(&'src str),
}

impl<'src> Command<'src> {
  /// Get the string value of the [`Command`].
  pub fn as_str(&self) -> &'src str {
    use Command::*;
    match self {
      Ping => "PING",
      Privmsg => "PRIVMSG",
      RplWelcome => "001",
      RplEndOfNames => "366",
      Other(cmd) => *cmd,
    }
  }

  fn from_token(token: &'src str) -> Self {
    use Command::*;
    match token {
      "PING" => Ping,
      "PRIVMSG" => Privmsg,
      "001" => RplWelcome,
      "366" => RplEndOfNames,
      other => Other(other),
    }
  }
}

impl<'src> std::fmt::Display for Command<'src> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// `COMMAND <rest>`
#[inline(always)]
pub(super) fn parse<'src>(src: &'src str, pos: &mut usize) -> Option<Command<'src>> {
  let rest = &src[*pos..];
  let (token, advance) = match rest.find(' ') {
    Some(end) => (&rest[..end], end + 1),
    None => (rest, rest.len()),
  };
  if token.is_empty() {
    return None;
  }
  *pos += advance;
  Some(Command::from_token(token))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn command_with_rest() {
    let data = "PRIVMSG #chan :hi";
    let mut pos = 0;
    assert_eq!(parse(data, &mut pos), Some(Command::Privmsg));
    assert_eq!(&data[pos..], "#chan :hi");
  }

  #[test]
  fn command_alone() {
    let data = "RECONNECT";
    let mut pos = 0;
    assert_eq!(parse(data, &mut pos), Some(Command::Other("RECONNECT")));
    assert_eq!(pos, data.len());
  }

  #[test]
  fn numeric_and_unknown_commands() {
    let mut pos = 0;
    assert_eq!(parse("001 ann", &mut pos), Some(Command::RplWelcome));
    let mut pos = 0;
    assert_eq!(parse("USERSTATE #a", &mut pos), Some(Command::Other("USERSTATE")));
    assert_eq!(Command::Other("USERSTATE").as_str(), "USERSTATE");
  }

  #[test]
  fn command_is_case_sensitive() {
    let mut pos = 0;
    assert_eq!(parse("ping", &mut pos), Some(Command::Other("ping")));
  }
}
