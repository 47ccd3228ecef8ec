//! `POST /tasks/recovery` — the scheduler-invoked recovery run.

use axum::{
  Json,
  extract::{Query, State},
  http::HeaderMap,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trolley_core::{
  catalog::Catalog, lifecycle::RECOVERY_BATCH_LIMIT, mail::Mailer,
  store::CartStore,
};

use crate::{AppState, auth::verify_scheduler, error::Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryParams {
  pub limit:  Option<u32>,
  pub secret: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecoveryResponse {
  success:     bool,
  message:     String,
  processed:   usize,
  emails_sent: usize,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  errors:      Vec<String>,
}

pub async fn handler<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<RecoveryParams>,
  headers: HeaderMap,
) -> Result<Json<RecoveryResponse>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  verify_scheduler(&headers, params.secret.as_deref(), &state.config)?;

  let settings = state.config.recovery_settings();
  let outcome = trolley_engine::run_recovery(
    state.store.as_ref(),
    state.store.as_ref(),
    state.mailer.as_ref(),
    &settings,
    Utc::now(),
    params.limit.unwrap_or(RECOVERY_BATCH_LIMIT),
  )
  .await?;

  Ok(Json(RecoveryResponse {
    success:     true,
    message:     format!(
      "{} of {} candidates notified",
      outcome.emails_sent, outcome.processed
    ),
    processed:   outcome.processed,
    emails_sent: outcome.emails_sent,
    errors:      outcome.errors,
  }))
}
