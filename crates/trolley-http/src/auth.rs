//! Authorization for the two privileged surfaces.
//!
//! Operators (manual resolution) authenticate with HTTP Basic against an
//! argon2 PHC hash. Scheduler-triggered endpoints accept either a
//! trusted-platform header asserted by the scheduling infrastructure or a
//! shared secret via query parameter or dedicated header. Both checks run
//! before any data access.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use trolley_core::{catalog::Catalog, mail::Mailer, store::CartStore};

use crate::{AppState, ServerConfig, error::Error};

/// Dedicated header alternative to the `?secret=` query parameter.
pub const SCHEDULER_SECRET_HEADER: &str = "x-scheduler-secret";

/// Operator credentials accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

// ─── Operator auth ───────────────────────────────────────────────────────────

/// Zero-size marker: present in a handler means the request carried valid
/// operator credentials.
pub struct Operator;

/// Verify operator Basic-auth credentials directly from headers.
pub fn verify_operator(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), Error> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::OperatorUnauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::OperatorUnauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::OperatorUnauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| Error::OperatorUnauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(Error::OperatorUnauthorized)?;

  if username != config.username {
    return Err(Error::OperatorUnauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::OperatorUnauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::OperatorUnauthorized)?;

  Ok(())
}

impl<S, M> FromRequestParts<AppState<S, M>> for Operator
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    verify_operator(&parts.headers, &state.auth)?;
    Ok(Operator)
  }
}

// ─── Scheduler auth ──────────────────────────────────────────────────────────

/// Verify that a sweep/recovery invocation comes from the scheduling
/// infrastructure: either the configured trusted header is present, or
/// the shared secret matches (query parameter or dedicated header).
pub fn verify_scheduler(
  headers: &HeaderMap,
  query_secret: Option<&str>,
  config: &ServerConfig,
) -> Result<(), Error> {
  if let Some(name) = &config.trusted_scheduler_header
    && headers.contains_key(name.as_str())
  {
    return Ok(());
  }

  if let Some(secret) = &config.scheduler_secret {
    let header_secret = headers
      .get(SCHEDULER_SECRET_HEADER)
      .and_then(|v| v.to_str().ok());
    if query_secret == Some(secret.as_str())
      || header_secret == Some(secret.as_str())
    {
      return Ok(());
    }
  }

  Err(Error::Unauthorized)
}
