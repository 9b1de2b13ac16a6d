/// A message prefix.
///
/// ```text,ignore
/// :nick!user@host
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Prefix<'src> {
  /// The `nick` part of the prefix.
  pub nick: Option<&'src str>,
  /// The `user` part of the prefix.
  pub user: Option<&'src str>,
  /// The `host` part of the prefix.
  pub host: &'src str,
}

impl<'src> std::fmt::Display for Prefix<'src> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match (self.nick, self.user, self.host) {
      (Some(nick), Some(user), host) => write!(f, "{nick}!{user}@{host}"),
      (Some(nick), None, host) => write!(f, "{nick}@{host}"),
      (None, None, host) => write!(f, "{host}"),
      _ => Ok(()),
    }
  }
}

/// `:nick!user@host <rest>`
#[inline(always)]
pub(super) fn parse<'src>(src: &'src str, pos: &mut usize) -> Option<Prefix<'src>> {
  let rest = src[*pos..].strip_prefix(':')?;

  // :host <rest>
  // :nick@host <rest>
  // :nick!user@host <rest>
  let end = rest.find(' ')?;
  let prefix = &rest[..end];
  *pos += 1 + end + 1;

  let (nick_user, host) = match prefix.rsplit_once('@') {
    Some((nick_user, host)) => (Some(nick_user), host),
    None => (None, prefix),
  };
  let (nick, user) = match nick_user {
    Some(nick_user) => match nick_user.split_once('!') {
      Some((nick, user)) => (Some(nick), Some(user)),
      None => (Some(nick_user), None),
    },
    None => (None, None),
  };

  Some(Prefix { nick, user, host })
}
