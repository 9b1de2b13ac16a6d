//! ## Twitch chat connection
//!
//! This is the main interface for reading a channel's chat.
//! The entrypoint to this module is [`Connection::connect`].
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use tmichat::{Channel, Config, Connection, Credentials};
//!
//! let channel = Channel::parse("#coolstreamer")?;
//! let mut conn = Connection::connect(channel, &Credentials::anon(), Config::default()).await?;
//! conn.on_message(|msg: tmichat::ChatMessage| async move {
//!   println!("{}: {}", msg.sender(), msg.text());
//! })?;
//! conn.closed().await?;
//! # Ok(())
//! # }
//! ```
//!
//! A connection performs the handshake (capability negotiation, authentication),
//! joins its single target channel once the server welcomes it, and answers
//! keepalive probes. Chat messages are handed to the consumer through a queue,
//! so a slow consumer never delays the read loop.
//!
//! ⚠ Note: a [`Connection`] does not reconnect. If the stream fails, the
//! connection moves to [`State::Closed`], and it is up to the caller to
//! connect again.

pub mod conn;
pub mod dispatch;
pub mod read;
pub mod state;
pub mod transport;
pub mod write;

pub use self::dispatch::{AlreadyRegistered, Handler, Messages};
pub use self::state::State;
pub use self::transport::{Transport, TransportError};

use self::conn::OpenStreamError;
use self::dispatch::Dispatcher;
use self::state::{Action, Machine};
use crate::auth::Credentials;
use crate::common::Channel;
use crate::msg;
use std::fmt::Display;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// The default timeout used when connecting to Twitch chat.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The capabilities requested during the handshake.
pub const DEFAULT_CAPABILITIES: &str = "twitch.tv/membership twitch.tv/tags twitch.tv/commands";

/// Connection configuration.
#[derive(Clone, Debug)]
pub struct Config {
  host: String,
  port: Option<u16>,
  #[cfg(feature = "tls")]
  secure: bool,
  timeout: Duration,
  capabilities: String,
}

impl Config {
  pub fn new() -> Self {
    Self {
      host: conn::HOST.into(),
      port: None,
      #[cfg(feature = "tls")]
      secure: true,
      timeout: DEFAULT_TIMEOUT,
      capabilities: DEFAULT_CAPABILITIES.into(),
    }
  }

  /// Connect to a different server.
  pub fn server(mut self, host: impl Into<String>, port: u16) -> Self {
    self.host = host.into();
    self.port = Some(port);
    self
  }

  /// Whether to use TLS. Enabled by default.
  #[cfg(feature = "tls")]
  pub fn secure(mut self, secure: bool) -> Self {
    self.secure = secure;
    self
  }

  /// Bound on dialing and writing the handshake.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Space-separated list of capabilities to request.
  pub fn capabilities(mut self, capabilities: impl Into<String>) -> Self {
    self.capabilities = capabilities.into();
    self
  }

  pub(crate) fn addr(&self) -> (&str, u16) {
    (self.host.as_str(), self.port.unwrap_or_else(|| self.default_port()))
  }

  #[cfg(feature = "tls")]
  fn default_port(&self) -> u16 {
    if self.secure {
      conn::TLS_PORT
    } else {
      conn::PORT
    }
  }

  #[cfg(not(feature = "tls"))]
  fn default_port(&self) -> u16 {
    conn::PORT
  }
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

/// A chat session scoped to one channel.
///
/// The read loop runs on its own task from the moment [`Connection::connect`]
/// returns until the stream fails or [`Connection::disconnect`] is called.
/// Dropping the connection also stops the read loop.
pub struct Connection {
  channel: Channel,
  login: String,
  state: watch::Receiver<State>,
  shutdown: Option<oneshot::Sender<()>>,
  read_loop: Option<JoinHandle<Result<(), TransportError>>>,
  messages: Option<Messages>,
  consumer: Option<JoinHandle<()>>,
}

impl Connection {
  /// Dial the chat server, perform the handshake and start the read loop.
  ///
  /// Returns as soon as the handshake is written. The server's reply is
  /// handled by the read loop, observe it through [`Connection::state`].
  pub async fn connect(
    channel: Channel,
    credentials: &Credentials,
    config: Config,
  ) -> Result<Connection, ConnectError> {
    trace!(%channel, "connecting");

    #[cfg(feature = "tls")]
    if config.secure {
      let server_name = tokio_rustls::rustls::ServerName::try_from(config.addr().0)?;
      let tls = conn::TlsConfig::load(server_name)?;
      let stream = tokio::time::timeout(config.timeout, conn::open_tls(&config, tls)).await??;
      return Self::connect_with(stream, channel, credentials, config).await;
    }

    let stream = tokio::time::timeout(config.timeout, conn::open_plain(&config)).await??;
    Self::connect_with(stream, channel, credentials, config).await
  }

  /// Perform the handshake over an already open `stream`, and start the read loop.
  pub async fn connect_with<S>(
    stream: S,
    channel: Channel,
    credentials: &Credentials,
    config: Config,
  ) -> Result<Connection, ConnectError>
  where
    S: AsyncRead + AsyncWrite + Send + 'static,
  {
    let mut transport = Transport::new(stream);
    let mut machine = Machine::new(channel.clone());
    let login = credentials.login.clone();

    if credentials.token.is_expired() {
      warn!(%login, "access token has expired, authentication will likely fail");
    }

    tokio::time::timeout(
      config.timeout,
      handshake(&mut transport, credentials, &config),
    )
    .await??;
    machine.handshake_sent();

    let (state_tx, state) = watch::channel(machine.state());
    let (shutdown_tx, shutdown) = oneshot::channel();
    let (dispatcher, messages) = dispatch::queue();

    let read_loop = tokio::spawn(run(ReadLoop {
      transport,
      machine,
      login: login.clone(),
      dispatcher,
      state: state_tx,
      shutdown,
    }));

    Ok(Connection {
      channel,
      login,
      state,
      shutdown: Some(shutdown_tx),
      read_loop: Some(read_loop),
      messages: Some(messages),
      consumer: None,
    })
  }

  /// Register the consumer of chat messages.
  ///
  /// The handler runs on its own task and is called once per message, in wire
  /// order. Messages received before registration are delivered first.
  ///
  /// Only one consumer may be registered, a second registration is rejected.
  pub fn on_message<H: Handler>(&mut self, handler: H) -> Result<(), AlreadyRegistered> {
    let messages = self.messages.take().ok_or(AlreadyRegistered)?;
    self.consumer = Some(dispatch::spawn_consumer(messages, handler));
    Ok(())
  }

  /// Take the message queue to consume it directly.
  ///
  /// This counts as the connection's single registration.
  pub fn messages(&mut self) -> Result<Messages, AlreadyRegistered> {
    self.messages.take().ok_or(AlreadyRegistered)
  }

  /// Close the stream and wait for the read loop to stop.
  ///
  /// If a handler was registered through [`Connection::on_message`], this also
  /// waits until it has processed every message received before the stream
  /// was closed.
  ///
  /// Returns the error which stopped the read loop, if it had already failed.
  /// Calling this more than once is a no-op.
  pub async fn disconnect(&mut self) -> Result<(), TransportError> {
    if let Some(shutdown) = self.shutdown.take() {
      trace!(channel = %self.channel, "disconnecting");
      let _ = shutdown.send(());
    }
    let result = self.join().await;
    if let Some(consumer) = self.consumer.take() {
      if let Err(e) = consumer.await {
        if e.is_panic() {
          std::panic::resume_unwind(e.into_panic());
        }
      }
    }
    result
  }

  /// Wait for the read loop to stop on its own.
  ///
  /// Returns the error which stopped it.
  pub async fn closed(&mut self) -> Result<(), TransportError> {
    self.join().await
  }

  async fn join(&mut self) -> Result<(), TransportError> {
    let Some(read_loop) = self.read_loop.take() else {
      return Ok(());
    };
    match read_loop.await {
      Ok(result) => result,
      Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
      Err(_) => Ok(()),
    }
  }

  /// The current lifecycle state.
  pub fn state(&self) -> State {
    *self.state.borrow()
  }

  /// Wait until the connection reaches `state`, or any later one.
  ///
  /// Returns the state which was reached. Waiting for [`State::Active`]
  /// returns [`State::Closed`] if the connection failed first.
  pub async fn wait_for(&mut self, state: State) -> State {
    match self.state.wait_for(|current| *current >= state).await {
      Ok(current) => *current,
      Err(_) => State::Closed,
    }
  }

  #[inline]
  pub fn channel(&self) -> &Channel {
    &self.channel
  }

  #[inline]
  pub fn login(&self) -> &str {
    &self.login
  }
}

impl std::fmt::Debug for Connection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Connection")
      .field("channel", &self.channel)
      .field("login", &self.login)
      .field("state", &self.state())
      .finish_non_exhaustive()
  }
}

async fn handshake<S>(
  transport: &mut Transport<S>,
  credentials: &Credentials,
  config: &Config,
) -> Result<(), TransportError>
where
  S: AsyncRead + AsyncWrite,
{
  trace!(
    "CAP REQ {:?}; NICK {:?}; PASS ***",
    config.capabilities,
    credentials.login
  );
  transport
    .send(&format!("CAP REQ :{}", config.capabilities))
    .await?;
  transport
    .send(&format!("PASS oauth:{}", credentials.token.secret()))
    .await?;
  transport
    .send(&format!("NICK {}", credentials.login))
    .await?;
  Ok(())
}

struct ReadLoop<S> {
  transport: Transport<S>,
  machine: Machine,
  login: String,
  dispatcher: Dispatcher,
  state: watch::Sender<State>,
  shutdown: oneshot::Receiver<()>,
}

async fn run<S>(mut ctx: ReadLoop<S>) -> Result<(), TransportError>
where
  S: AsyncRead + AsyncWrite,
{
  let result = loop {
    let line = tokio::select! {
      _ = &mut ctx.shutdown => break Ok(()),
      line = ctx.transport.recv_line() => match line {
        Ok(line) => line,
        Err(e) => break Err(e),
      },
    };

    let event = match msg::parse(&line, &ctx.login, ctx.machine.channel()) {
      Ok(event) => event,
      Err(e) => {
        warn!(error = %e, %line, "discarding message");
        continue;
      }
    };

    match ctx.machine.step(event) {
      Some(Action::Send(reply)) => {
        if let Err(e) = ctx.transport.send(&reply).await {
          break Err(e);
        }
      }
      Some(Action::Dispatch(msg)) => ctx.dispatcher.dispatch(msg),
      None => {}
    }

    let current = ctx.machine.state();
    ctx.state.send_if_modified(|state| {
      let changed = *state != current;
      *state = current;
      changed
    });
  };

  match &result {
    Ok(()) => trace!(channel = %ctx.machine.channel(), "read loop stopped"),
    Err(e) => debug!(channel = %ctx.machine.channel(), error = %e, "read loop failed"),
  }
  ctx.machine.close();
  ctx.state.send_replace(State::Closed);
  ctx.transport.close().await;
  result
}

/// An error which occurred while attempting to connect to Twitch chat.
#[derive(Debug)]
pub enum ConnectError {
  /// Failed to perform an IO operation on the stream.
  Io(io::Error),

  /// The host is not a valid DNS name.
  #[cfg(feature = "tls")]
  Dns(tokio_rustls::rustls::client::InvalidDnsNameError),

  /// Failed to establish TLS connection.
  #[cfg(feature = "tls")]
  Tls(conn::TlsConfigError),

  /// Connection timed out.
  Timeout,

  /// Failed to write the handshake.
  Handshake(TransportError),
}

impl From<io::Error> for ConnectError {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}

impl From<OpenStreamError> for ConnectError {
  fn from(value: OpenStreamError) -> Self {
    match value {
      OpenStreamError::Io(e) => Self::Io(e),
    }
  }
}

#[cfg(feature = "tls")]
impl From<tokio_rustls::rustls::client::InvalidDnsNameError> for ConnectError {
  fn from(value: tokio_rustls::rustls::client::InvalidDnsNameError) -> Self {
    Self::Dns(value)
  }
}

#[cfg(feature = "tls")]
impl From<conn::TlsConfigError> for ConnectError {
  fn from(value: conn::TlsConfigError) -> Self {
    Self::Tls(value)
  }
}

impl From<TransportError> for ConnectError {
  fn from(value: TransportError) -> Self {
    Self::Handshake(value)
  }
}

impl From<tokio::time::error::Elapsed> for ConnectError {
  fn from(_: tokio::time::error::Elapsed) -> Self {
    Self::Timeout
  }
}

impl Display for ConnectError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConnectError::Io(e) => write!(f, "failed to connect: {e}"),
      #[cfg(feature = "tls")]
      ConnectError::Dns(e) => write!(f, "failed to connect: {e}"),
      #[cfg(feature = "tls")]
      ConnectError::Tls(e) => write!(f, "failed to connect: {e}"),
      ConnectError::Timeout => write!(f, "failed to connect: connection timed out"),
      ConnectError::Handshake(e) => write!(f, "failed to connect: {e}"),
    }
  }
}

impl std::error::Error for ConnectError {}

static_assert_send!(Connection);
