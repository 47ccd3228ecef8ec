//! Session identity resolution.
//!
//! Every cart signal is keyed by an opaque session identifier carried in
//! the `cart_session` cookie. When no cookie is present a fresh UUIDv4 is
//! minted; minting cannot fail, so session resolution never blocks a
//! request. Authenticated identity arrives separately, as a trusted
//! header injected by the upstream auth layer.

use axum::http::{HeaderMap, HeaderValue, header};
use trolley_core::lifecycle::UserProfile;
use uuid::Uuid;

use crate::error::Error;

pub const SESSION_COOKIE: &str = "cart_session";

/// Header carrying the authenticated user profile as JSON, set by the
/// out-of-scope auth layer. Never trusted from the open internet; the
/// deployment strips it at the edge.
pub const USER_HEADER: &str = "x-authenticated-user";

const SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Resolve `(session_id, is_new_session)` from the request headers.
pub fn resolve_session(headers: &HeaderMap) -> (String, bool) {
  if let Some(cookie_header) =
    headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
  {
    for pair in cookie_header.split(';') {
      if let Some((name, value)) = pair.trim().split_once('=')
        && name == SESSION_COOKIE
        && !value.is_empty()
      {
        return (value.to_owned(), false);
      }
    }
  }
  (Uuid::new_v4().to_string(), true)
}

/// `Set-Cookie` value for a freshly-minted session identifier.
///
/// Deliberately NOT HttpOnly: the storefront script reads the cookie to
/// echo the session id into heartbeat payloads.
pub fn session_cookie(session_id: &str) -> Result<HeaderValue, Error> {
  HeaderValue::from_str(&format!(
    "{SESSION_COOKIE}={session_id}; Max-Age={SESSION_TTL_SECONDS}; Path=/; SameSite=Lax"
  ))
  .map_err(|e| Error::Internal(Box::new(e)))
}

/// Parse the trusted identity header, if present. A malformed header is a
/// boundary rejection, not something to propagate inward.
pub fn authenticated_user(
  headers: &HeaderMap,
) -> Result<Option<UserProfile>, Error> {
  let Some(value) = headers.get(USER_HEADER) else {
    return Ok(None);
  };
  let raw = value.to_str().map_err(|_| {
    Error::BadRequest(format!("{USER_HEADER} header is not valid UTF-8"))
  })?;
  serde_json::from_str(raw).map(Some).map_err(|e| {
    Error::BadRequest(format!("malformed {USER_HEADER} header: {e}"))
  })
}
