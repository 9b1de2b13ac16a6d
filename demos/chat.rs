//! Print a channel's chat to stdout.
//!
//! ```text,ignore
//! $ cargo run --example chat -- --channel forsen --anon
//! $ cargo run --example chat -- --channel forsen --config credentials.json
//! ```
//!
//! The config file holds the login and token:
//!
//! ```text,ignore
//! { "login": "ann", "token": "oauth:yfvzjqb705z12hrhy1zkwa9xt7v662" }
//! ```

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use tmichat::{Channel, ChatMessage, Config, Connection, Credentials, State};

#[derive(Parser)]
#[command(author, version)]
struct Args {
  /// Channel to read
  #[arg(long)]
  channel: String,

  /// Path to a JSON file with `login` and `token`
  #[arg(long, required_unless_present = "anon", conflicts_with = "anon")]
  config: Option<PathBuf>,

  /// Log in anonymously
  #[arg(long)]
  anon: bool,

  /// Connect without TLS
  #[arg(long)]
  plain: bool,
}

#[derive(serde::Deserialize)]
struct FileConfig {
  login: String,
  token: String,
}

fn credentials(args: &Args) -> Result<Credentials> {
  if args.anon {
    return Ok(Credentials::anon());
  }
  let path = args
    .config
    .as_ref()
    .context("either --config or --anon is required")?;
  let contents = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let config: FileConfig = serde_json::from_str(&contents).context("invalid config file")?;
  Ok(Credentials::new(config.login, config.token))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  let channel = Channel::parse(&args.channel)?;
  let credentials = credentials(&args)?;
  let config = Config::new().secure(!args.plain);

  println!("Connecting as {}", credentials.login);
  let mut conn = Connection::connect(channel, &credentials, config).await?;
  conn.on_message(on_msg)?;

  if conn.wait_for(State::Active).await == State::Active {
    println!("Joined {}", conn.channel().irc());
  }

  let interrupted = tokio::select! {
    _ = tokio::signal::ctrl_c() => true,
    result = conn.closed() => {
      result?;
      false
    }
  };
  if interrupted {
    conn.disconnect().await?;
  }

  Ok(())
}

async fn on_msg(msg: ChatMessage) {
  let badge = match (msg.moderator(), msg.subscriber()) {
    (true, _) => "[mod] ".to_owned(),
    (false, true) => format!("[sub {}] ", msg.sub_length()),
    _ => String::new(),
  };
  println!("{badge}{}: {}", msg.sender(), msg.text());
}
