use smallvec::SmallVec;
use std::fmt::Display;

macro_rules! tags_def {
  (
    $tag:ident;
    $($(#[$meta:meta])* $key:literal = $name:ident),* $(,)?
  ) => {
    /// A metadata tag key.
    #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
    #[non_exhaustive]
    pub enum $tag<'src> {
      $(
        $(#[$meta])*
        $name,
      )*
      Unknown(&'src str),
    }

    impl<'src> $tag<'src> {
      #[doc = concat!("Get the string value of the [`", stringify!($tag), "`].")]
      #[inline]
      pub fn as_str(&self) -> &'src str {
        match self {
          $(Self::$name => $key,)*
          Self::Unknown(key) => *key,
        }
      }

      #[doc = concat!("Parse a [`", stringify!($tag), "`] from a string.")]
      #[inline]
      pub fn parse(src: &'src str) -> Self {
        match src {
          $($key => Self::$name,)*
          _ => Self::Unknown(src),
        }
      }
    }
  }
}

tags_def! {
  Tag;
  /// Sender's display name, which may differ from their login in casing or script.
  "display-name" = DisplayName,
  /// `1` if the sender is subscribed to the channel.
  "subscriber" = Subscriber,
  /// Extra badge data, e.g. `subscriber/12` for the number of months subscribed.
  "badge-info" = BadgeInfo,
  /// `1` if the sender is a moderator of the channel.
  "mod" = Mod,
  /// Sender's platform user ID.
  "user-id" = UserId,
}

impl<'src> From<&'src str> for Tag<'src> {
  fn from(value: &'src str) -> Self {
    Tag::parse(value)
  }
}

impl<'src> Display for Tag<'src> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The `key=value` pairs of a line's tag block, in wire order.
#[derive(Clone, Default)]
pub struct Tags<'src>(SmallVec<[(&'src str, &'src str); 16]>);

impl<'src> Tags<'src> {
  /// Retrieve the raw value of `tag`.
  ///
  /// `tag` can be a [`Tag`] variant or the kebab-case tag name.
  /// Duplicate keys resolve to the last occurrence.
  pub fn get<'a>(&self, tag: impl Into<Tag<'a>>) -> Option<&'src str> {
    let tag = tag.into();
    self
      .0
      .iter()
      .rev()
      .find(|(key, _)| *key == tag.as_str())
      .map(|(_, value)| *value)
  }

  /// Iterate over the pairs in wire order, duplicates included.
  pub fn iter(&self) -> impl Iterator<Item = (&'src str, &'src str)> + '_ {
    self.0.iter().copied()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'src> std::fmt::Debug for Tags<'src> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}

/// `@key=value;key=value <rest>`
///
/// Each pair is split on its first `=`. A pair without `=` has an empty value.
#[inline(always)]
pub(super) fn parse<'src>(src: &'src str, pos: &mut usize) -> Option<Tags<'src>> {
  let rest = src[*pos..].strip_prefix('@')?;

  let (block, advance) = match rest.find(' ') {
    Some(end) => (&rest[..end], 1 + end + 1),
    None => (rest, 1 + rest.len()),
  };
  *pos += advance;

  let pairs = block
    .split(';')
    .filter(|pair| !pair.is_empty())
    .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    .collect();

  Some(Tags(pairs))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tags_block() {
    let data = "@display-name=Ann;mod=0;emotes= :rest";
    let mut pos = 0;
    let tags = parse(data, &mut pos).unwrap();
    assert_eq!(&data[pos..], ":rest");
    assert_eq!(tags.len(), 3);
    assert_eq!(tags.get(Tag::DisplayName), Some("Ann"));
    assert_eq!(tags.get("mod"), Some("0"));
    assert_eq!(tags.get(Tag::Unknown("emotes")), Some(""));
    assert_eq!(tags.get(Tag::UserId), None);
  }

  #[test]
  fn value_is_split_on_first_equals() {
    let mut pos = 0;
    let tags = parse("@key=a=b :rest", &mut pos).unwrap();
    assert_eq!(tags.get("key"), Some("a=b"));
  }

  #[test]
  fn pair_without_equals_has_empty_value() {
    let mut pos = 0;
    let tags = parse("@flag;mod=1 :rest", &mut pos).unwrap();
    assert_eq!(tags.get("flag"), Some(""));
    assert_eq!(tags.get(Tag::Mod), Some("1"));
  }

  #[test]
  fn duplicate_keys_last_wins() {
    let mut pos = 0;
    let tags = parse("@mod=0;mod=1 :rest", &mut pos).unwrap();
    assert_eq!(tags.get(Tag::Mod), Some("1"));
    assert_eq!(tags.iter().count(), 2);
  }

  #[test]
  fn no_tags() {
    let mut pos = 0;
    assert!(parse(":rest", &mut pos).is_none());
    assert_eq!(pos, 0);
  }

  #[test]
  fn tag_names_roundtrip() {
    assert_eq!(Tag::parse("badge-info"), Tag::BadgeInfo);
    assert_eq!(Tag::BadgeInfo.as_str(), "badge-info");
    assert_eq!(Tag::parse("vip"), Tag::Unknown("vip"));
  }
}
