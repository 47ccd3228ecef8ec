//! trolley server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the cart-recovery engine over
//! HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `operator_password_hash` in
//! config.toml:
//!
//! ```
//! cargo run -p trolley-http --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trolley_http::{AppState, ServerConfig, auth::AuthConfig};
use trolley_notify::{AnyMailer, HttpMailer, LogMailer};
use trolley_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "trolley cart-recovery server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_from_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration. Operator credentials have no default; the server
  // refuses to start without them.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8380)?
    .set_default("store_path", "trolley.db")?
    .set_default("mail_from", "no-reply@localhost")?
    .set_default("store_name", "Trolley")?
    .set_default("store_url", "http://localhost:3000")?
    .set_default("discount_code", "COMEBACK15")?
    .set_default("discount_percent", 15)?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TROLLEY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Pick the mail transport.
  let mailer = match &server_cfg.mail_endpoint {
    Some(endpoint) => AnyMailer::Http(HttpMailer::new(
      endpoint.clone(),
      server_cfg.mail_from.clone(),
    )),
    None => {
      tracing::warn!("no mail_endpoint configured; recovery emails are logged only");
      AnyMailer::Log(LogMailer)
    }
  };

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    mailer: Arc::new(mailer),
    auth:   Arc::new(AuthConfig {
      username:      server_cfg.operator_username.clone(),
      password_hash: server_cfg.operator_password_hash.clone(),
    }),
    config: Arc::new(server_cfg.clone()),
  };

  let app = trolley_http::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
