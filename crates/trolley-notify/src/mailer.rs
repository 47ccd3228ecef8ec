//! `Mailer` implementations.
//!
//! The real transport is an HTTP webhook: the engine never speaks SMTP
//! itself, it hands rendered messages to the storefront's delivery
//! service. `LogMailer` keeps development deployments working without a
//! transport, and `MemoryMailer` records messages for assertions in
//! tests.

use std::sync::{Arc, Mutex};

use serde_json::json;
use trolley_core::mail::{Mailer, OutboundEmail};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
}

// ─── HttpMailer ──────────────────────────────────────────────────────────────

/// Posts rendered messages as JSON to a configured delivery endpoint.
#[derive(Clone)]
pub struct HttpMailer {
  client:   reqwest::Client,
  endpoint: String,
  from:     String,
}

impl HttpMailer {
  pub fn new(endpoint: impl Into<String>, from: impl Into<String>) -> Self {
    Self {
      client:   reqwest::Client::new(),
      endpoint: endpoint.into(),
      from:     from.into(),
    }
  }
}

impl Mailer for HttpMailer {
  type Error = MailError;

  async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
    self
      .client
      .post(&self.endpoint)
      .json(&json!({
        "from": self.from,
        "to": email.to,
        "subject": email.subject,
        "text": email.text_body,
        "html": email.html_body,
      }))
      .send()
      .await?
      .error_for_status()?;
    Ok(())
  }
}

// ─── LogMailer ───────────────────────────────────────────────────────────────

/// Logs messages instead of delivering them. The default when no
/// transport endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  type Error = std::convert::Infallible;

  async fn send(&self, email: &OutboundEmail) -> Result<(), Self::Error> {
    tracing::info!(to = %email.to, subject = %email.subject, "mail transport disabled; dropping message");
    Ok(())
  }
}

// ─── AnyMailer ───────────────────────────────────────────────────────────────

/// Runtime selection between the configured transports.
#[derive(Clone)]
pub enum AnyMailer {
  Http(HttpMailer),
  Log(LogMailer),
}

impl Mailer for AnyMailer {
  type Error = MailError;

  async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
    match self {
      Self::Http(m) => m.send(email).await,
      Self::Log(m) => {
        let _ = m.send(email).await;
        Ok(())
      }
    }
  }
}

// ─── MemoryMailer ────────────────────────────────────────────────────────────

/// Records every message in memory. Clones share the same buffer, so a
/// handle kept by a test sees messages sent through application state.
#[derive(Clone, Default)]
pub struct MemoryMailer {
  sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl MemoryMailer {
  pub fn new() -> Self { Self::default() }

  /// Messages sent so far, in dispatch order.
  pub fn sent(&self) -> Vec<OutboundEmail> {
    self.sent.lock().expect("mailer lock poisoned").clone()
  }
}

impl Mailer for MemoryMailer {
  type Error = std::convert::Infallible;

  async fn send(&self, email: &OutboundEmail) -> Result<(), Self::Error> {
    self
      .sent
      .lock()
      .expect("mailer lock poisoned")
      .push(email.clone());
    Ok(())
  }
}
