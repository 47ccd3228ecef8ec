//! `/admin/carts/{id}` — operator-only manual resolution.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use trolley_core::{
  catalog::Catalog, mail::Mailer, record::CartRecord, store::CartStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Operator, error::Error};

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  pub notes: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ResolveResponse {
  success: bool,
  id:      Uuid,
}

/// `PATCH /admin/carts/{id}` — mark recovered, unconditionally.
pub async fn mark_recovered<S, M>(
  _operator: Operator,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  body: Option<Json<ResolveBody>>,
) -> Result<Json<ResolveResponse>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  let notes = body.as_ref().and_then(|b| b.notes.as_deref());
  let record = trolley_engine::resolve::mark_recovered(
    state.store.as_ref(),
    Utc::now(),
    id,
    notes,
  )
  .await?;

  Ok(Json(ResolveResponse { success: true, id: record.cart_id }))
}

/// `DELETE /admin/carts/{id}` — hard delete.
pub async fn remove<S, M>(
  _operator: Operator,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  trolley_engine::resolve::delete(state.store.as_ref(), id).await?;
  Ok(Json(json!({ "success": true })))
}

/// `GET /admin/carts/{id}` — read one tracking record.
pub async fn get_one<S, M>(
  _operator: Operator,
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CartRecord>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  let record = state
    .store
    .get(id)
    .await
    .map_err(trolley_core::Error::store)?
    .ok_or(Error::NotFound)?;
  Ok(Json(record))
}
