//! `POST /cart/heartbeat` — liveness pings from an open storefront tab.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trolley_core::{catalog::Catalog, mail::Mailer, store::CartStore};
use trolley_engine::HeartbeatOutcome;
use uuid::Uuid;

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatBody {
  pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeartbeatResponse {
  success: bool,
  id:      Uuid,
  #[serde(skip_serializing_if = "Option::is_none")]
  last_activity_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  notice:  Option<&'static str>,
}

pub async fn handler<S, M>(
  State(state): State<AppState<S, M>>,
  Json(body): Json<HeartbeatBody>,
) -> Result<Json<HeartbeatResponse>, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  let session_id = body.session_id.unwrap_or_default();
  let outcome = trolley_engine::heartbeat(
    state.store.as_ref(),
    Utc::now(),
    &session_id,
  )
  .await?;

  let response = match outcome {
    HeartbeatOutcome::Refreshed { id, last_activity_at } => HeartbeatResponse {
      success: true,
      id,
      last_activity_at: Some(last_activity_at),
      notice: None,
    },
    HeartbeatOutcome::AlreadyAbandoned { id } => HeartbeatResponse {
      success: true,
      id,
      last_activity_at: None,
      notice: Some("cart already marked abandoned"),
    },
  };
  Ok(Json(response))
}
