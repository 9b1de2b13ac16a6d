use super::Config;
use std::fmt::Display;
use std::io;
use tokio::net::TcpStream;

#[cfg(feature = "tls")]
pub use self::tls::*;

pub const HOST: &str = "irc.chat.twitch.tv";

/// Plain-text port.
pub const PORT: u16 = 6667;

/// TLS port.
pub const TLS_PORT: u16 = 6697;

pub async fn open_plain(config: &Config) -> Result<TcpStream, OpenStreamError> {
  let (host, port) = config.addr();
  trace!(host, port, "opening tcp stream to twitch");
  Ok(TcpStream::connect((host, port)).await?)
}

/// Failed to open a stream.
#[derive(Debug)]
pub enum OpenStreamError {
  /// The underlying I/O operation failed.
  Io(io::Error),
}

impl From<io::Error> for OpenStreamError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl Display for OpenStreamError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OpenStreamError::Io(e) => write!(f, "failed to open stream: {e}"),
    }
  }
}

impl std::error::Error for OpenStreamError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      OpenStreamError::Io(e) => Some(e),
    }
  }
}

#[cfg(feature = "tls")]
mod tls {
  use super::{open_plain, Config, OpenStreamError};
  use std::fmt::Display;
  use std::io;
  use std::sync::Arc;
  use tokio::net::TcpStream;
  use tokio_rustls::client::TlsStream;
  use tokio_rustls::rustls::{ClientConfig, RootCertStore, ServerName};
  use tokio_rustls::{rustls, TlsConnector};

  pub type Stream = TlsStream<TcpStream>;

  pub async fn open_tls(config: &Config, tls: TlsConfig) -> Result<Stream, OpenStreamError> {
    let tcp = open_plain(config).await?;
    trace!(?tls, "performing tls handshake");
    Ok(
      TlsConnector::from(tls.client())
        .connect(tls.server_name(), tcp)
        .await?,
    )
  }

  #[derive(Debug, Clone)]
  pub struct TlsConfig {
    config: Arc<ClientConfig>,
    server_name: ServerName,
  }

  impl TlsConfig {
    pub fn load(server_name: ServerName) -> Result<Self, TlsConfigError> {
      trace!("loading native certificates");
      let mut root_store = RootCertStore::empty();
      let native_certs = rustls_native_certs::load_native_certs()?;
      for cert in native_certs {
        root_store.add(&rustls::Certificate(cert.0))?;
      }
      let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth();
      Ok(Self {
        config: Arc::new(config),
        server_name,
      })
    }

    pub fn client(&self) -> Arc<ClientConfig> {
      self.config.clone()
    }

    pub fn server_name(&self) -> ServerName {
      self.server_name.clone()
    }
  }

  /// Failed to load the TLS config.
  #[derive(Debug)]
  pub enum TlsConfigError {
    /// The underlying I/O operation failed.
    Io(io::Error),
    /// Failed to load certificates.
    Tls(rustls::Error),
  }

  impl From<io::Error> for TlsConfigError {
    fn from(value: io::Error) -> Self {
      Self::Io(value)
    }
  }

  impl From<rustls::Error> for TlsConfigError {
    fn from(value: rustls::Error) -> Self {
      Self::Tls(value)
    }
  }

  impl Display for TlsConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      match self {
        TlsConfigError::Io(e) => write!(f, "tls config error: {e}"),
        TlsConfigError::Tls(e) => write!(f, "tls config error: {e}"),
      }
    }
  }

  impl std::error::Error for TlsConfigError {}
}
