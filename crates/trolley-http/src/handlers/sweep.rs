//! `POST|PATCH /tasks/sweep` and `GET /tasks/sweep/status` — the
//! scheduler-invoked abandonment sweep and its read-only companion.

use axum::{
  Json,
  extract::{Query, State},
  http::HeaderMap,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trolley_core::{
  catalog::Catalog,
  lifecycle::{DEFAULT_SWEEP_BATCH, DEFAULT_TTL_MINUTES, clamp_ttl},
  mail::Mailer,
  store::CartStore,
};

use crate::{AppState, auth::verify_scheduler, error::Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepParams {
  pub ttl_minutes: Option<i64>,
  pub limit:       Option<u32>,
  pub secret:      Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SweepResponse {
  success:       bool,
  updated:       usize,
  total_checked: usize,
  cutoff:        DateTime<Utc>,
  ttl_minutes:   i64,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  errors:        Vec<String>,
}

pub async fn run<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<SweepParams>,
  headers: HeaderMap,
) -> Result<Json<SweepResponse>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  verify_scheduler(&headers, params.secret.as_deref(), &state.config)?;

  let outcome = trolley_engine::sweep(
    state.store.as_ref(),
    Utc::now(),
    params.ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES),
    params.limit.unwrap_or(DEFAULT_SWEEP_BATCH),
  )
  .await?;

  Ok(Json(SweepResponse {
    success:       true,
    updated:       outcome.updated,
    total_checked: outcome.total_checked,
    cutoff:        outcome.cutoff,
    ttl_minutes:   outcome.ttl_minutes,
    errors:        outcome.errors,
  }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SweepStatusResponse {
  success:       bool,
  active:        u64,
  abandoned:     u64,
  recovered:     u64,
  /// Records a sweep with this TTL would transition right now.
  pending_sweep: u64,
  ttl_minutes:   i64,
}

pub async fn status<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<SweepParams>,
  headers: HeaderMap,
) -> Result<Json<SweepStatusResponse>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  verify_scheduler(&headers, params.secret.as_deref(), &state.config)?;

  let now = Utc::now();
  let ttl = clamp_ttl(params.ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES));

  let counts = state
    .store
    .status_counts()
    .await
    .map_err(trolley_core::Error::store)?;
  let pending =
    trolley_engine::pending_sweep(state.store.as_ref(), now, ttl).await?;

  Ok(Json(SweepStatusResponse {
    success:       true,
    active:        counts.active,
    abandoned:     counts.abandoned,
    recovered:     counts.recovered,
    pending_sweep: pending,
    ttl_minutes:   ttl,
  }))
}
