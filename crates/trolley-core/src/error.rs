//! Error taxonomy for the engine operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed request fields, rejected at the boundary.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// No tracking record exists for the referenced session or id.
  #[error("no cart is tracked for this session")]
  NotFound,

  /// Business rejection: the record exists but is terminally recovered.
  #[error("cart is no longer active")]
  NotActive,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("mail dispatch error: {0}")]
  Mail(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("catalog error: {0}")]
  Catalog(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn mail<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Mail(Box::new(e))
  }

  pub fn catalog<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Catalog(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
