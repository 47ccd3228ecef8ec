//! `POST /cart/activity` — the cart activity recorder endpoint.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trolley_core::{
  catalog::Catalog,
  lifecycle::{ContactFields, RawCartItem},
  mail::Mailer,
  store::CartStore,
};
use trolley_engine::{ActivityInput, RecordOutcome};
use uuid::Uuid;

use crate::{AppState, error::Error, session};

/// Activity payload as sent by the storefront client. Item ids may be
/// numbers or numeric strings; anything unparsable is dropped during
/// normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBody {
  pub items: Option<Vec<RawCartItem>>,
  pub total: Option<f64>,
  pub customer_email: Option<String>,
  pub customer_name: Option<String>,
  /// Phone number; the field name matches the storefront client.
  pub customer_number: Option<String>,
  #[serde(default)]
  pub is_final_update: bool,
  #[serde(default)]
  pub is_potential_abandonment: bool,
}

#[derive(Serialize)]
struct ActivityResponse {
  success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  id:      Option<Uuid>,
}

pub async fn handler<S, M>(
  State(state): State<AppState<S, M>>,
  headers: HeaderMap,
  Json(body): Json<ActivityBody>,
) -> Result<Response, Error>
where
  S: CartStore + Catalog + Clone + 'static,
  M: Mailer + Clone + 'static,
{
  let user = session::authenticated_user(&headers)?;
  let (session_id, is_new) = session::resolve_session(&headers);

  let outcome = trolley_engine::record(state.store.as_ref(), Utc::now(), ActivityInput {
    session_id: session_id.clone(),
    user,
    items: body.items,
    total: body.total,
    contact: ContactFields {
      email: body.customer_email,
      name:  body.customer_name,
      phone: body.customer_number,
    },
    is_final_update: body.is_final_update,
    is_potential_abandonment: body.is_potential_abandonment,
  })
  .await?;

  let payload = match outcome {
    RecordOutcome::Persisted { id, .. } => {
      ActivityResponse { success: true, id: Some(id) }
    }
    RecordOutcome::Discarded => ActivityResponse { success: true, id: None },
  };

  let mut response = Json(payload).into_response();
  if is_new {
    response
      .headers_mut()
      .insert(header::SET_COOKIE, session::session_cookie(&session_id)?);
  }
  Ok(response)
}
