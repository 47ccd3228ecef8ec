//! The abandonment sweep: promote stale active carts to abandoned.
//!
//! Time-triggered, bounded, and overlap-safe: the selection filter
//! (`status == active AND last_activity_at < cutoff`) is self-excluding
//! once a record flips, so concurrent invocations converge. Per-record
//! failures are collected and never abort the batch.

use chrono::{DateTime, Duration, Utc};
use trolley_core::{
  Error, Result,
  lifecycle::{audit_note, clamp_sweep_limit, clamp_ttl},
  record::{CartPatch, CartStatus},
  store::CartStore,
};

/// Aggregate result of one sweep invocation.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
  /// The TTL actually used, after clamping.
  pub ttl_minutes:   i64,
  pub cutoff:        DateTime<Utc>,
  /// Records selected for this batch.
  pub total_checked: usize,
  /// Records successfully transitioned to abandoned.
  pub updated:       usize,
  pub errors:        Vec<String>,
}

pub async fn sweep<S: CartStore>(
  store: &S,
  now: DateTime<Utc>,
  ttl_minutes: i64,
  limit: u32,
) -> Result<SweepOutcome> {
  let ttl = clamp_ttl(ttl_minutes);
  let limit = clamp_sweep_limit(limit);
  let cutoff = now - Duration::minutes(ttl);

  let batch = store.stale_active(cutoff, limit).await.map_err(Error::store)?;

  let mut outcome = SweepOutcome {
    ttl_minutes:   ttl,
    cutoff,
    total_checked: batch.len(),
    updated:       0,
    errors:        Vec::new(),
  };

  for record in batch {
    let patch = CartPatch {
      status: Some(CartStatus::Abandoned),
      note: Some(audit_note(
        now,
        &format!("auto-abandoned after {ttl} minutes of inactivity"),
      )),
      ..Default::default()
    };

    match store.apply(record.cart_id, patch).await {
      Ok(Some(_)) => outcome.updated += 1,
      // Deleted out from under us (e.g. an activity write emptied the
      // cart). Nothing to sweep any more.
      Ok(None) => {
        tracing::debug!(cart = %record.cart_id, "record gone before sweep write");
      }
      Err(e) => {
        tracing::warn!(cart = %record.cart_id, error = %e, "sweep update failed");
        outcome.errors.push(format!("cart {}: {e}", record.cart_id));
      }
    }
  }

  tracing::info!(
    checked = outcome.total_checked,
    updated = outcome.updated,
    errors = outcome.errors.len(),
    ttl_minutes = ttl,
    "abandonment sweep complete"
  );
  Ok(outcome)
}

/// How many records a sweep with this TTL would transition right now.
/// Read-only observability companion to [`sweep`].
pub async fn pending_sweep<S: CartStore>(
  store: &S,
  now: DateTime<Utc>,
  ttl_minutes: i64,
) -> Result<u64> {
  let cutoff = now - Duration::minutes(clamp_ttl(ttl_minutes));
  store.count_stale_active(cutoff).await.map_err(Error::store)
}
