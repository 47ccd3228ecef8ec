//! HTTP surface for the trolley cart-recovery engine.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`CartStore`] and [`Catalog`], plus a [`Mailer`] transport. The sweep
//! and recovery batch jobs are plain handlers invoked by an external time
//! trigger; nothing in this process keeps its own timer.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use trolley_core::{catalog::Catalog, mail::Mailer, store::CartStore};
use trolley_engine::RecoverySettings;
use trolley_notify::Discount;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged
/// with `TROLLEY_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  pub operator_username:      String,
  pub operator_password_hash: String,

  /// Shared secret for scheduler-triggered endpoints.
  pub scheduler_secret:         Option<String>,
  /// Name of a header the scheduling platform asserts on its own calls.
  pub trusted_scheduler_header: Option<String>,

  /// Delivery webhook for recovery emails; absent means log-only.
  pub mail_endpoint: Option<String>,
  pub mail_from:     String,

  /// Storefront display name used in recovery emails.
  pub store_name: String,
  /// Storefront base URL; cart-resume links are derived from it.
  pub store_url:  String,

  /// Stage-3 win-back incentive.
  pub discount_code:    String,
  pub discount_percent: u8,
}

impl ServerConfig {
  pub fn recovery_settings(&self) -> RecoverySettings {
    RecoverySettings {
      store_name: self.store_name.clone(),
      store_url:  self.store_url.clone(),
      discount:   Discount {
        code:    self.discount_code.clone(),
        percent: self.discount_percent,
      },
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the engine's HTTP surface.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  Router::new()
    // client signals
    .route("/cart/activity", post(handlers::activity::handler::<S, M>))
    .route("/cart/heartbeat", post(handlers::heartbeat::handler::<S, M>))
    // scheduler-triggered batch jobs
    .route(
      "/tasks/sweep",
      post(handlers::sweep::run::<S, M>).patch(handlers::sweep::run::<S, M>),
    )
    .route("/tasks/sweep/status", get(handlers::sweep::status::<S, M>))
    .route("/tasks/recovery", post(handlers::recovery::handler::<S, M>))
    // operator surface
    .route(
      "/admin/carts/{id}",
      get(handlers::resolve::get_one::<S, M>)
        .patch(handlers::resolve::mark_recovered::<S, M>)
        .delete(handlers::resolve::remove::<S, M>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
