//! Cart activity recording — the only operation that creates tracking
//! records.
//!
//! Upserts are keyed on `(session_id, status != recovered)`. Two policies
//! gate persistence: a cart that empties out is deleted rather than
//! tracked, and a cart with no resolvable contact information is deleted
//! because it can never be recovered.

use chrono::{DateTime, Utc};
use trolley_core::{
  Error, Result,
  lifecycle::{
    ContactFields, RawCartItem, UserProfile, audit_note, normalize_items,
    resolve_contact,
  },
  record::{CartItem, CartPatch, CartRecord, CartStatus, NewCartRecord},
  store::CartStore,
};
use uuid::Uuid;

/// One activity signal from the storefront client.
#[derive(Debug, Clone, Default)]
pub struct ActivityInput {
  pub session_id: String,
  /// Authenticated identity, as asserted by the external auth layer.
  pub user:       Option<UserProfile>,
  /// `None` means "not supplied", which keeps the stored items; an empty
  /// list is an explicit empty cart.
  pub items:      Option<Vec<RawCartItem>>,
  pub total:      Option<f64>,
  pub contact:    ContactFields,
  /// Client-signalled pre-emptive abandonment (e.g. checkout exit).
  pub is_final_update:          bool,
  /// Client-signalled pre-emptive abandonment (e.g. page unload).
  pub is_potential_abandonment: bool,
}

/// What the recorder did with the signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
  Persisted {
    id:      Uuid,
    created: bool,
  },
  /// The cart was empty, valueless, or uncontactable; any existing record
  /// was deleted. This is a success, not an error.
  Discarded,
}

pub async fn record<S: CartStore>(
  store: &S,
  now: DateTime<Utc>,
  input: ActivityInput,
) -> Result<RecordOutcome> {
  if input.items.is_none() && input.total.is_none() {
    return Err(Error::InvalidInput(
      "either items or total must be provided".to_owned(),
    ));
  }

  let normalized: Option<Vec<CartItem>> =
    input.items.as_deref().map(normalize_items);

  let existing = store
    .find_open(&input.session_id)
    .await
    .map_err(Error::store)?;

  // Zero-cart policy: evaluate the record as it would look after the
  // merge. Emptied carts must not stay tracked.
  let effective_items = normalized
    .clone()
    .or_else(|| existing.as_ref().map(|r| r.items.clone()))
    .unwrap_or_default();
  let effective_total = input
    .total
    .or(existing.as_ref().map(|r| r.cart_total))
    .unwrap_or(0.0);

  if effective_total <= 0.0 || effective_items.is_empty() {
    return discard(store, existing, "cart emptied").await;
  }

  // Contact-info gate: an uncontactable cart cannot be recovered, so it
  // is not tracked at all.
  let user_id = input.user.as_ref().map(|u| u.id.clone());
  let contact = resolve_contact(input.contact, input.user.as_ref());
  if contact.is_empty() {
    return discard(store, existing, "no resolvable contact info").await;
  }

  let (status, abandon_reason) = if input.is_final_update {
    (CartStatus::Abandoned, Some("marked abandoned on final update"))
  } else if input.is_potential_abandonment {
    (
      CartStatus::Abandoned,
      Some("marked abandoned on potential-abandonment signal (page unload)"),
    )
  } else {
    (CartStatus::Active, None)
  };

  if let Some(record) = existing {
    let patch = CartPatch {
      status: Some(status),
      items: normalized,
      cart_total: input.total,
      user_id: user_id.clone(),
      customer_email: contact.email.clone(),
      customer_name: contact.name.clone(),
      customer_phone: contact.phone.clone(),
      last_activity_at: Some(now),
      // An active cart always restarts the reminder clock.
      reminder_stage: Some(0),
      recovery_email_sent_at: None,
      note: abandon_reason.map(|r| audit_note(now, r)),
    };

    if let Some(updated) =
      store.apply(record.cart_id, patch).await.map_err(Error::store)?
    {
      tracing::debug!(cart = %updated.cart_id, session = %updated.session_id, "activity recorded");
      return Ok(RecordOutcome::Persisted { id: updated.cart_id, created: false });
    }
    // The record vanished between lookup and write; fall through and
    // treat the signal as fresh.
  }

  let record = store
    .create(NewCartRecord {
      session_id: input.session_id,
      user_id,
      status,
      items: effective_items,
      cart_total: effective_total,
      customer_email: contact.email,
      customer_name: contact.name,
      customer_phone: contact.phone,
      last_activity_at: now,
      note: abandon_reason.map(|r| audit_note(now, r)),
    })
    .await
    .map_err(Error::store)?;

  tracing::debug!(cart = %record.cart_id, session = %record.session_id, "tracking record created");
  Ok(RecordOutcome::Persisted { id: record.cart_id, created: true })
}

async fn discard<S: CartStore>(
  store: &S,
  existing: Option<CartRecord>,
  reason: &str,
) -> Result<RecordOutcome> {
  if let Some(record) = existing {
    store.delete(record.cart_id).await.map_err(Error::store)?;
    tracing::debug!(cart = %record.cart_id, session = %record.session_id, reason, "tracking record deleted");
  }
  Ok(RecordOutcome::Discarded)
}
