//! ## Credentials
//!
//! The chat engine needs two things from the outside world: an access token
//! and the login of the user it belongs to. How they are obtained (OAuth code
//! exchange, the Helix users endpoint, a config file) is up to the caller,
//! who supplies them through [`TokenProvider`] and [`LoginResolver`].
//!
//! [`Credentials`] implements both and covers the common case of already
//! knowing the values.

use chrono::{DateTime, Utc};

/// An OAuth access token.
///
/// The engine treats the secret as opaque and never refreshes it.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessToken {
  secret: String,
  #[cfg_attr(feature = "serde", serde(default))]
  expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
  /// A token with no known expiry.
  ///
  /// An `oauth:` prefix on `secret` is stripped, it is added back when
  /// the token is sent.
  pub fn new(secret: impl Into<String>) -> Self {
    let secret: String = secret.into();
    let secret = match secret.strip_prefix("oauth:") {
      Some(stripped) => stripped.to_owned(),
      None => secret,
    };
    Self {
      secret,
      expires_at: None,
    }
  }

  /// Set the time at which the token stops being valid.
  pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
    self.expires_at = Some(expires_at);
    self
  }

  /// The raw token, without any `oauth:` prefix.
  pub fn secret(&self) -> &str {
    &self.secret
  }

  pub fn expiry(&self) -> Option<DateTime<Utc>> {
    self.expires_at
  }

  /// Whether the token is known to have expired at `now`.
  ///
  /// A token without an expiry is never considered expired.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|expires_at| expires_at <= now)
  }

  pub fn is_expired(&self) -> bool {
    self.is_expired_at(Utc::now())
  }
}

impl std::fmt::Debug for AccessToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AccessToken")
      .field("expires_at", &self.expires_at)
      .finish_non_exhaustive()
  }
}

/// Supplies the access token used in `PASS`.
pub trait TokenProvider {
  fn access_token(&self) -> AccessToken;
}

impl TokenProvider for AccessToken {
  fn access_token(&self) -> AccessToken {
    self.clone()
  }
}

/// Supplies the login of the authenticated user.
///
/// It is sent in `NICK`, and used to recognize the server's welcome.
pub trait LoginResolver {
  fn login(&self) -> String;
}

/// Credentials used to authenticate to Twitch chat.
#[derive(Clone)]
pub struct Credentials {
  /// The _login_ of the user.
  pub login: String,

  /// The oauth2 token.
  pub token: AccessToken,
}

impl Credentials {
  #[cfg(feature = "client")]
  const ANON_RANGE: std::ops::Range<u32> = 10000..99999;

  /// Instantiate credentials from a `login` and `token`.
  pub fn new(login: impl ToString, token: impl Into<String>) -> Self {
    Self {
      login: login.to_string(),
      token: AccessToken::new(token),
    }
  }

  /// Capture the values of a token provider and login resolver.
  pub fn from_providers(tokens: &impl TokenProvider, logins: &impl LoginResolver) -> Self {
    Self {
      login: logins.login(),
      token: tokens.access_token(),
    }
  }

  /// An anonymous login.
  ///
  /// Twitch allows logging in using any username in the form `justinfan?????`
  /// where `?` is any digit. Anonymous users can read chat, but not send
  /// messages.
  #[cfg(feature = "client")]
  pub fn anon() -> Self {
    use rand::Rng as _;

    Self {
      login: format!(
        "justinfan{}",
        rand::thread_rng().gen_range(Self::ANON_RANGE)
      ),
      token: AccessToken::new("just_a_lil_guy"),
    }
  }

  #[cfg(feature = "client")]
  pub fn is_anon(&self) -> bool {
    let Some(digits) = self.login.strip_prefix("justinfan") else {
      return false;
    };
    let Some(digits) = digits.parse::<u32>().ok() else {
      return false;
    };
    Self::ANON_RANGE.contains(&digits)
  }
}

impl TokenProvider for Credentials {
  fn access_token(&self) -> AccessToken {
    self.token.clone()
  }
}

impl LoginResolver for Credentials {
  fn login(&self) -> String {
    self.login.clone()
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("login", &self.login)
      .finish_non_exhaustive()
  }
}

static_assert_send!(Credentials);
static_assert_sync!(Credentials);

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn oauth_prefix_is_stripped() {
    assert_eq!(AccessToken::new("oauth:abc").secret(), "abc");
    assert_eq!(AccessToken::new("abc").secret(), "abc");
  }

  #[test]
  fn expiry() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let token = AccessToken::new("abc");
    assert!(!token.is_expired_at(now));

    let token = token.expires_at(Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
    assert!(token.is_expired_at(now));

    let token = token.expires_at(Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap());
    assert!(!token.is_expired_at(now));
  }

  #[test]
  fn debug_does_not_leak_secret() {
    let credentials = Credentials::new("ann", "oauth:supersecret");
    let debug = format!("{credentials:?} {:?}", credentials.token);
    assert!(debug.contains("ann"));
    assert!(!debug.contains("supersecret"));
  }

  #[test]
  fn from_providers() {
    struct Lookup;
    impl LoginResolver for Lookup {
      fn login(&self) -> String {
        "twitchdev".into()
      }
    }

    let credentials = Credentials::from_providers(&AccessToken::new("abc"), &Lookup);
    assert_eq!(credentials.login, "twitchdev");
    assert_eq!(credentials.token.secret(), "abc");
  }

  #[cfg(feature = "client")]
  #[test]
  fn anon_credentials() {
    let credentials = Credentials::anon();
    assert!(credentials.is_anon());
    assert!(!Credentials::new("ann", "abc").is_anon());
    assert!(!Credentials::new("justinfan1", "abc").is_anon());
  }
}
