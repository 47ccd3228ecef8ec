//! The recovery run: send staged reminder emails for abandoned carts.
//!
//! Candidates are pre-filtered by the store (abandoned, email present,
//! stage < 3, outside the minimum notification gap); this module decides
//! per record whether the next stage is due, rebuilds the displayable
//! line items from the catalog, dispatches exactly one email, and advances
//! the stage counter. Duplicate suppression rests on `reminder_stage` and
//! the gap check; two overlapping runs can in principle both read the
//! same stage before either writes, which is an accepted, documented risk.

use chrono::{DateTime, Duration, Utc};
use trolley_core::{
  Error, Result,
  catalog::Catalog,
  lifecycle::{
    MAX_REMINDER_STAGE, MIN_NOTIFICATION_GAP_MINUTES, RECOVERY_BATCH_LIMIT,
    audit_note, next_due_stage,
  },
  mail::Mailer,
  record::{CartPatch, CartRecord},
  store::CartStore,
};
use trolley_notify::{Discount, RecoveryContext, RecoveryLine, render_recovery_email};

/// Storefront-level settings threaded into every rendered email.
#[derive(Debug, Clone)]
pub struct RecoverySettings {
  pub store_name: String,
  pub store_url:  String,
  /// The stage-3 win-back incentive.
  pub discount:   Discount,
}

/// Aggregate result of one recovery invocation.
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
  /// Candidate records examined.
  pub processed:   usize,
  pub emails_sent: usize,
  /// Candidates whose next stage is not yet due, or with nothing
  /// displayable to show. Re-evaluated on the next invocation.
  pub skipped:     usize,
  pub errors:      Vec<String>,
}

pub async fn run_recovery<S, C, M>(
  store: &S,
  catalog: &C,
  mailer: &M,
  settings: &RecoverySettings,
  now: DateTime<Utc>,
  limit: u32,
) -> Result<RecoveryOutcome>
where
  S: CartStore,
  C: Catalog,
  M: Mailer,
{
  let limit = limit.min(RECOVERY_BATCH_LIMIT);
  let sent_cutoff = now - Duration::minutes(MIN_NOTIFICATION_GAP_MINUTES);

  let candidates = store
    .recovery_candidates(sent_cutoff, limit)
    .await
    .map_err(Error::store)?;

  let mut outcome = RecoveryOutcome {
    processed:   candidates.len(),
    emails_sent: 0,
    skipped:     0,
    errors:      Vec::new(),
  };

  for record in candidates {
    match send_for_record(store, catalog, mailer, settings, now, &record).await
    {
      Ok(SendResult::Sent) => outcome.emails_sent += 1,
      Ok(SendResult::NotDue) | Ok(SendResult::NothingToShow) => {
        outcome.skipped += 1;
      }
      Err(e) => {
        tracing::warn!(cart = %record.cart_id, error = %e, "recovery dispatch failed");
        outcome.errors.push(format!("cart {}: {e}", record.cart_id));
      }
    }
  }

  tracing::info!(
    processed = outcome.processed,
    sent = outcome.emails_sent,
    skipped = outcome.skipped,
    errors = outcome.errors.len(),
    "recovery run complete"
  );
  Ok(outcome)
}

enum SendResult {
  Sent,
  NotDue,
  NothingToShow,
}

async fn send_for_record<S, C, M>(
  store: &S,
  catalog: &C,
  mailer: &M,
  settings: &RecoverySettings,
  now: DateTime<Utc>,
  record: &CartRecord,
) -> Result<SendResult>
where
  S: CartStore,
  C: Catalog,
  M: Mailer,
{
  let minutes_since_abandonment = record.minutes_since_activity(now);
  let Some(target) =
    next_due_stage(record.reminder_stage, minutes_since_abandonment)
  else {
    return Ok(SendResult::NotDue);
  };

  // The store filter guarantees an email; guard anyway so a racing write
  // cannot send to an empty address.
  let Some(email_addr) =
    record.customer_email.as_deref().filter(|e| !e.trim().is_empty())
  else {
    return Ok(SendResult::NothingToShow);
  };

  let ids: Vec<i64> = record.items.iter().map(|i| i.product_id).collect();
  let products = catalog.resolve(&ids).await.map_err(Error::catalog)?;

  let lines: Vec<RecoveryLine> = record
    .items
    .iter()
    .filter_map(|item| {
      products
        .iter()
        .find(|p| p.product_id == item.product_id)
        .map(|p| RecoveryLine { product: p.clone(), quantity: item.quantity })
    })
    .collect();

  if lines.is_empty() {
    // Every stored reference dropped out of the catalog; there is nothing
    // useful to show.
    return Ok(SendResult::NothingToShow);
  }

  let email = render_recovery_email(&RecoveryContext {
    stage:           target,
    recipient_email: email_addr,
    recipient_name:  record.customer_name.as_deref(),
    lines:           &lines,
    cart_total:      record.cart_total,
    store_name:      &settings.store_name,
    store_url:       &settings.store_url,
    discount:        (target == MAX_REMINDER_STAGE)
      .then_some(&settings.discount),
  });

  mailer.send(&email).await.map_err(Error::mail)?;

  let patch = CartPatch {
    reminder_stage: Some(target),
    recovery_email_sent_at: Some(now),
    note: Some(audit_note(
      now,
      &format!("stage {target} recovery email sent to {email_addr}"),
    )),
    ..Default::default()
  };
  store.apply(record.cart_id, patch).await.map_err(Error::store)?;

  tracing::debug!(cart = %record.cart_id, stage = target, "recovery email sent");
  Ok(SendResult::Sent)
}
