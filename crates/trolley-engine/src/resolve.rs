//! Manual resolution: operator overrides for individual records.

use chrono::{DateTime, Utc};
use trolley_core::{
  Error, Result,
  lifecycle::audit_note,
  record::{CartPatch, CartRecord, CartStatus},
  store::CartStore,
};
use uuid::Uuid;

/// Mark a record recovered, unconditionally. Terminal: no further
/// reminders will ever be sent for it.
pub async fn mark_recovered<S: CartStore>(
  store: &S,
  now: DateTime<Utc>,
  id: Uuid,
  notes: Option<&str>,
) -> Result<CartRecord> {
  let message = match notes {
    Some(n) if !n.trim().is_empty() => {
      format!("manually marked recovered: {}", n.trim())
    }
    _ => "manually marked recovered".to_owned(),
  };

  let patch = CartPatch {
    status: Some(CartStatus::Recovered),
    note: Some(audit_note(now, &message)),
    ..Default::default()
  };

  store
    .apply(id, patch)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)
}

/// Hard-delete a record. Administrative cleanup only.
pub async fn delete<S: CartStore>(store: &S, id: Uuid) -> Result<()> {
  if store.delete(id).await.map_err(Error::store)? {
    Ok(())
  } else {
    Err(Error::NotFound)
  }
}
