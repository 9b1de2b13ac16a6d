use crate::irc::IrcLine;

/// Sent regularly by TMI to ensure clients are still live.
/// You must respond to TMI pings with [`Ping::pong`], or the server
/// will eventually close the connection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ping {
  payload: Option<String>,
}

generate_getters! {
  for Ping as self {
    /// Everything after the `PING` command, echoed back verbatim.
    payload -> Option<&str> = self.payload.as_deref(),
  }
}

impl Ping {
  pub(super) fn from_irc(line: &IrcLine<'_>) -> Self {
    Ping {
      payload: line.params().map(String::from),
    }
  }

  /// The line which answers this ping.
  pub fn pong(&self) -> String {
    match &self.payload {
      Some(payload) => format!("PONG {payload}"),
      None => "PONG".into(),
    }
  }
}
