//! The `Mailer` collaborator trait.
//!
//! Outbound email delivery is an external transport. The engine hands a
//! fully-rendered message to the transport and records success or failure;
//! it never retries internally.

use std::future::Future;

use serde::Serialize;

/// A rendered, ready-to-send message.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
  pub to:        String,
  pub subject:   String,
  pub text_body: String,
  pub html_body: Option<String>,
}

/// Abstraction over the email delivery transport.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    email: &'a OutboundEmail,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
