//! Behavioural tests for the engine operations against an in-memory
//! SQLite store.

use chrono::{Duration, Utc};
use trolley_core::{
  Error,
  catalog::{CatalogProduct, StaticCatalog},
  lifecycle::{ContactFields, ProductKey, RawCartItem, UserProfile},
  record::{CartItem, CartPatch, CartStatus},
  store::CartStore,
};
use trolley_notify::{Discount, MemoryMailer};
use trolley_store_sqlite::SqliteStore;

use crate::{
  ActivityInput, HeartbeatOutcome, RecordOutcome, RecoverySettings, heartbeat,
  record, resolve, run_recovery, pending_sweep, sweep,
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn catalog() -> StaticCatalog {
  StaticCatalog::new([
    CatalogProduct {
      product_id: 7,
      name:       "Enamel mug".into(),
      price:      250.0,
      image_url:  None,
    },
    CatalogProduct {
      product_id: 12,
      name:       "Wool socks".into(),
      price:      120.0,
      image_url:  None,
    },
  ])
}

fn settings() -> RecoverySettings {
  RecoverySettings {
    store_name: "Trolley Goods".into(),
    store_url:  "https://shop.example.com".into(),
    discount:   Discount { code: "COMEBACK15".into(), percent: 15 },
  }
}

fn raw_items(pairs: &[(i64, i64)]) -> Vec<RawCartItem> {
  pairs
    .iter()
    .map(|(id, q)| RawCartItem { id: ProductKey::Number(*id), quantity: *q })
    .collect()
}

fn activity(session: &str, email: Option<&str>) -> ActivityInput {
  ActivityInput {
    session_id: session.to_owned(),
    items: Some(raw_items(&[(7, 2)])),
    total: Some(500.0),
    contact: ContactFields {
      email: email.map(str::to_owned),
      ..Default::default()
    },
    ..Default::default()
  }
}

// ─── Recorder ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_activity_creates_an_active_record() {
  let s = store().await;
  let now = Utc::now();

  let outcome = record(&s, now, activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();
  let RecordOutcome::Persisted { id, created } = outcome else {
    panic!("expected persisted outcome");
  };
  assert!(created);

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Active);
  assert_eq!(saved.reminder_stage, 0);
  assert_eq!(saved.items, vec![CartItem { product_id: 7, quantity: 2 }]);
  assert_eq!(saved.cart_total, 500.0);
  assert_eq!(saved.customer_email.as_deref(), Some("a@x.com"));
  assert_eq!(saved.last_activity_at, now);
}

#[tokio::test]
async fn activity_requires_items_or_total() {
  let s = store().await;
  let input = ActivityInput {
    session_id: "sess-1".into(),
    contact: ContactFields {
      email: Some("a@x.com".into()),
      ..Default::default()
    },
    ..Default::default()
  };
  let err = record(&s, Utc::now(), input).await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn repeat_activity_updates_in_place() {
  let s = store().await;
  let first = record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();
  let RecordOutcome::Persisted { id: first_id, .. } = first else {
    panic!("expected persisted outcome");
  };

  let mut update = activity("sess-1", None);
  update.contact.phone = Some("555-0100".into());
  update.items = Some(raw_items(&[(7, 1), (12, 3)]));
  update.total = Some(610.0);
  let second = record(&s, Utc::now(), update).await.unwrap();
  let RecordOutcome::Persisted { id: second_id, created } = second else {
    panic!("expected persisted outcome");
  };

  // same record, merged fields, stored contact survives the partial write
  assert_eq!(second_id, first_id);
  assert!(!created);
  let saved = s.get(first_id).await.unwrap().unwrap();
  assert_eq!(saved.items.len(), 2);
  assert_eq!(saved.cart_total, 610.0);
  assert_eq!(saved.customer_email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn activity_resets_the_reminder_clock() {
  let s = store().await;
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  s.apply(id, CartPatch {
    status: Some(CartStatus::Abandoned),
    reminder_stage: Some(2),
    ..Default::default()
  })
  .await
  .unwrap();

  record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Active);
  assert_eq!(saved.reminder_stage, 0);
}

#[tokio::test]
async fn final_update_marks_the_record_abandoned() {
  let s = store().await;
  let mut input = activity("sess-1", Some("a@x.com"));
  input.is_final_update = true;

  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), input).await.unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Abandoned);
  assert!(saved.notes.contains("final update"));
}

#[tokio::test]
async fn page_unload_signal_marks_abandoned_with_note() {
  let s = store().await;
  record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let mut input = activity("sess-1", Some("a@x.com"));
  input.is_potential_abandonment = true;
  record(&s, Utc::now(), input).await.unwrap();

  let saved = s.find_open("sess-1").await.unwrap();
  // the record is abandoned, not deleted
  let saved = saved.unwrap();
  assert_eq!(saved.status, CartStatus::Abandoned);
  assert!(saved.notes.contains("page unload"));
}

#[tokio::test]
async fn emptied_cart_deletes_the_record() {
  let s = store().await;
  record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let mut input = activity("sess-1", Some("a@x.com"));
  input.items = Some(Vec::new());
  input.total = Some(0.0);
  let outcome = record(&s, Utc::now(), input).await.unwrap();

  assert_eq!(outcome, RecordOutcome::Discarded);
  assert!(s.find_open("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn zero_total_deletes_even_with_items() {
  let s = store().await;
  record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let mut input = activity("sess-1", Some("a@x.com"));
  input.total = Some(0.0);
  let outcome = record(&s, Utc::now(), input).await.unwrap();

  assert_eq!(outcome, RecordOutcome::Discarded);
  assert!(s.find_open("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn emptied_cart_discard_is_idempotent() {
  let s = store().await;

  let mut input = activity("sess-1", Some("a@x.com"));
  input.items = Some(Vec::new());
  input.total = Some(0.0);

  // no record existed; discard twice is still success
  assert_eq!(
    record(&s, Utc::now(), input.clone()).await.unwrap(),
    RecordOutcome::Discarded
  );
  assert_eq!(
    record(&s, Utc::now(), input).await.unwrap(),
    RecordOutcome::Discarded
  );
}

#[tokio::test]
async fn contactless_cart_is_never_tracked() {
  let s = store().await;

  let outcome = record(&s, Utc::now(), activity("sess-1", None))
    .await
    .unwrap();
  assert_eq!(outcome, RecordOutcome::Discarded);
  assert!(s.find_open("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn contactless_write_deletes_an_existing_record() {
  let s = store().await;
  record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  record(&s, Utc::now(), activity("sess-1", None)).await.unwrap();
  assert!(s.find_open("sess-1").await.unwrap().is_none());
}

#[tokio::test]
async fn profile_contact_fills_missing_fields() {
  let s = store().await;

  let mut input = activity("sess-1", None);
  input.user = Some(UserProfile {
    id:    "user-9".into(),
    email: Some("profile@x.com".into()),
    name:  Some("Alice".into()),
    phone: None,
  });
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), input).await.unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.customer_email.as_deref(), Some("profile@x.com"));
  assert_eq!(saved.customer_name.as_deref(), Some("Alice"));
  assert_eq!(saved.user_id.as_deref(), Some("user-9"));
}

#[tokio::test]
async fn explicit_contact_overrides_profile() {
  let s = store().await;

  let mut input = activity("sess-1", Some("explicit@x.com"));
  input.user = Some(UserProfile {
    id:    "user-9".into(),
    email: Some("profile@x.com".into()),
    name:  None,
    phone: None,
  });
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), input).await.unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.customer_email.as_deref(), Some("explicit@x.com"));
}

#[tokio::test]
async fn unparsable_items_are_dropped_silently() {
  let s = store().await;

  let mut input = activity("sess-1", Some("a@x.com"));
  input.items = Some(vec![
    RawCartItem { id: ProductKey::Text("7".into()), quantity: 2 },
    RawCartItem { id: ProductKey::Text("garbage".into()), quantity: 5 },
    RawCartItem { id: ProductKey::Number(12), quantity: 0 },
  ]);
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), input).await.unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.items, vec![CartItem { product_id: 7, quantity: 2 }]);
}

// ─── Heartbeat ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn heartbeat_refreshes_an_active_record() {
  let s = store().await;
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let later = Utc::now() + Duration::minutes(5);
  let outcome = heartbeat(&s, later, "sess-1").await.unwrap();
  assert_eq!(
    outcome,
    HeartbeatOutcome::Refreshed { id, last_activity_at: later }
  );

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.last_activity_at, later);
  assert!(saved.notes.contains("heartbeat"));
}

#[tokio::test]
async fn heartbeat_requires_a_session_id() {
  let s = store().await;
  let err = heartbeat(&s, Utc::now(), "  ").await.unwrap_err();
  assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn heartbeat_without_record_is_not_found() {
  let s = store().await;
  let err = heartbeat(&s, Utc::now(), "sess-ghost").await.unwrap_err();
  assert!(matches!(err, Error::NotFound));
  // a heartbeat never fabricates a record
  assert!(s.find_open("sess-ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn heartbeat_after_sweep_is_idempotent_success() {
  let s = store().await;
  let now = Utc::now();
  let RecordOutcome::Persisted { id, .. } =
    record(&s, now - Duration::minutes(45), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  sweep(&s, now, 30, 100).await.unwrap();

  let outcome = heartbeat(&s, now, "sess-1").await.unwrap();
  assert_eq!(outcome, HeartbeatOutcome::AlreadyAbandoned { id });

  // no mutation happened
  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Abandoned);
}

#[tokio::test]
async fn heartbeat_against_recovered_cart_is_rejected() {
  let s = store().await;
  let now = Utc::now();
  let RecordOutcome::Persisted { id, .. } =
    record(&s, now, activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };
  resolve::mark_recovered(&s, now, id, None).await.unwrap();

  let err = heartbeat(&s, now, "sess-1").await.unwrap_err();
  assert!(matches!(err, Error::NotActive));
}

// ─── Sweeper ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sweep_transitions_stale_active_records() {
  let s = store().await;
  let now = Utc::now();

  let RecordOutcome::Persisted { id, .. } =
    record(&s, now - Duration::minutes(45), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let outcome = sweep(&s, now, 30, 100).await.unwrap();
  assert_eq!(outcome.total_checked, 1);
  assert_eq!(outcome.updated, 1);
  assert!(outcome.errors.is_empty());
  assert_eq!(outcome.ttl_minutes, 30);

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Abandoned);
  assert!(saved.notes.contains("30 minutes"));
}

#[tokio::test]
async fn sweep_never_touches_fresh_records() {
  let s = store().await;
  let now = Utc::now();

  let RecordOutcome::Persisted { id, .. } =
    record(&s, now - Duration::minutes(20), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let outcome = sweep(&s, now, 30, 100).await.unwrap();
  assert_eq!(outcome.total_checked, 0);
  assert_eq!(outcome.updated, 0);

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Active);
}

#[tokio::test]
async fn sweep_clamps_the_ttl() {
  let s = store().await;
  let now = Utc::now();

  // 10 minutes idle: a raw TTL of 1 would catch it, the clamped floor of
  // 5 still does; a raw TTL of 100000 clamps to 1440 and does not.
  record(&s, now - Duration::minutes(10), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let outcome = sweep(&s, now, 1, 100).await.unwrap();
  assert_eq!(outcome.ttl_minutes, 5);
  assert_eq!(outcome.updated, 1);

  record(&s, now - Duration::minutes(10), activity("sess-2", Some("b@x.com")))
    .await
    .unwrap();
  let outcome = sweep(&s, now, 100_000, 100).await.unwrap();
  assert_eq!(outcome.ttl_minutes, 1440);
  assert_eq!(outcome.total_checked, 0);
  let saved = s.find_open("sess-2").await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Active);
}

#[tokio::test]
async fn sweep_is_idempotent_across_invocations() {
  let s = store().await;
  let now = Utc::now();

  record(&s, now - Duration::hours(1), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();

  let first = sweep(&s, now, 30, 100).await.unwrap();
  assert_eq!(first.updated, 1);

  // already abandoned: the selection filter excludes it
  let second = sweep(&s, now, 30, 100).await.unwrap();
  assert_eq!(second.total_checked, 0);
  assert_eq!(second.updated, 0);
}

#[tokio::test]
async fn pending_sweep_counts_without_mutating() {
  let s = store().await;
  let now = Utc::now();

  record(&s, now - Duration::hours(1), activity("sess-1", Some("a@x.com")))
    .await
    .unwrap();
  record(&s, now - Duration::minutes(5), activity("sess-2", Some("b@x.com")))
    .await
    .unwrap();

  assert_eq!(pending_sweep(&s, now, 30).await.unwrap(), 1);

  // still active afterwards
  let saved = s.find_open("sess-1").await.unwrap().unwrap();
  assert_eq!(saved.status, CartStatus::Active);
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

async fn abandoned_at(
  s: &SqliteStore,
  session: &str,
  email: &str,
  minutes_ago: i64,
) -> uuid::Uuid {
  let now = Utc::now();
  let RecordOutcome::Persisted { id, .. } = record(
    s,
    now - Duration::minutes(minutes_ago),
    activity(session, Some(email)),
  )
  .await
  .unwrap() else {
    panic!("expected persisted outcome");
  };
  sweep(s, now, 5, 100).await.unwrap();
  id
}

#[tokio::test]
async fn recovery_sends_stage_one_when_due() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  let id = abandoned_at(&s, "sess-1", "a@x.com", 35).await;

  let outcome =
    run_recovery(&s, &catalog(), &mailer, &settings(), Utc::now(), 50)
      .await
      .unwrap();
  assert_eq!(outcome.processed, 1);
  assert_eq!(outcome.emails_sent, 1);
  assert!(outcome.errors.is_empty());

  let sent = mailer.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, "a@x.com");
  assert!(sent[0].text_body.contains("Enamel mug"));

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.reminder_stage, 1);
  assert!(saved.recovery_email_sent_at.is_some());
  assert!(saved.notes.contains("stage 1 recovery email"));
}

#[tokio::test]
async fn recovery_skips_records_not_yet_due() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  abandoned_at(&s, "sess-1", "a@x.com", 10).await;

  let outcome =
    run_recovery(&s, &catalog(), &mailer, &settings(), Utc::now(), 50)
      .await
      .unwrap();
  assert_eq!(outcome.processed, 1);
  assert_eq!(outcome.emails_sent, 0);
  assert_eq!(outcome.skipped, 1);
  assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn recovery_gap_suppresses_back_to_back_sends() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  let now = Utc::now();
  let id = abandoned_at(&s, "sess-1", "a@x.com", 300).await;

  // stage 1 went out twenty minutes ago
  s.apply(id, CartPatch {
    reminder_stage: Some(1),
    recovery_email_sent_at: Some(now - Duration::minutes(20)),
    ..Default::default()
  })
  .await
  .unwrap();

  // stage 2 is due by elapsed time, but the gap check holds it back
  let outcome = run_recovery(&s, &catalog(), &mailer, &settings(), now, 50)
    .await
    .unwrap();
  assert_eq!(outcome.processed, 0);
  assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn recovery_advances_through_stages() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  let now = Utc::now();
  let id = abandoned_at(&s, "sess-1", "a@x.com", 200).await;

  // stage 1 long enough ago that the gap is clear; 200 min elapsed makes
  // stage 2 (120 min) due
  s.apply(id, CartPatch {
    reminder_stage: Some(1),
    recovery_email_sent_at: Some(now - Duration::minutes(90)),
    ..Default::default()
  })
  .await
  .unwrap();

  let outcome = run_recovery(&s, &catalog(), &mailer, &settings(), now, 50)
    .await
    .unwrap();
  assert_eq!(outcome.emails_sent, 1);

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.reminder_stage, 2);
}

#[tokio::test]
async fn recovery_stage_three_attaches_the_discount() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  let now = Utc::now();
  let id = abandoned_at(&s, "sess-1", "a@x.com", 2000).await;

  s.apply(id, CartPatch {
    reminder_stage: Some(2),
    recovery_email_sent_at: Some(now - Duration::hours(5)),
    ..Default::default()
  })
  .await
  .unwrap();

  run_recovery(&s, &catalog(), &mailer, &settings(), now, 50)
    .await
    .unwrap();

  let sent = mailer.sent();
  assert_eq!(sent.len(), 1);
  assert!(sent[0].text_body.contains("COMEBACK15"));

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.reminder_stage, 3);
}

#[tokio::test]
async fn recovery_never_exceeds_stage_three() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  let now = Utc::now();
  let id = abandoned_at(&s, "sess-1", "a@x.com", 10_000).await;

  s.apply(id, CartPatch {
    reminder_stage: Some(3),
    recovery_email_sent_at: Some(now - Duration::days(2)),
    ..Default::default()
  })
  .await
  .unwrap();

  let outcome = run_recovery(&s, &catalog(), &mailer, &settings(), now, 50)
    .await
    .unwrap();
  assert_eq!(outcome.processed, 0);
  assert!(mailer.sent().is_empty());

  let saved = s.get(id).await.unwrap().unwrap();
  assert_eq!(saved.reminder_stage, 3);
}

#[tokio::test]
async fn recovery_skips_records_with_nothing_displayable() {
  let s = store().await;
  let mailer = MemoryMailer::new();
  abandoned_at(&s, "sess-1", "a@x.com", 35).await;

  // the stored product reference no longer exists in the catalog
  let empty_catalog = StaticCatalog::default();
  let outcome =
    run_recovery(&s, &empty_catalog, &mailer, &settings(), Utc::now(), 50)
      .await
      .unwrap();
  assert_eq!(outcome.processed, 1);
  assert_eq!(outcome.skipped, 1);
  assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn recovery_dispatch_failure_does_not_abort_the_batch() {
  #[derive(Debug, thiserror::Error)]
  #[error("transport down")]
  struct Down;

  struct FailingMailer;
  impl trolley_core::mail::Mailer for FailingMailer {
    type Error = Down;
    async fn send(
      &self,
      _email: &trolley_core::mail::OutboundEmail,
    ) -> Result<(), Down> {
      Err(Down)
    }
  }

  let s = store().await;
  abandoned_at(&s, "sess-1", "a@x.com", 35).await;
  abandoned_at(&s, "sess-2", "b@x.com", 40).await;

  let outcome =
    run_recovery(&s, &catalog(), &FailingMailer, &settings(), Utc::now(), 50)
      .await
      .unwrap();
  assert_eq!(outcome.processed, 2);
  assert_eq!(outcome.emails_sent, 0);
  assert_eq!(outcome.errors.len(), 2);

  // failed dispatch must not advance the stage
  let saved = s.find_open("sess-1").await.unwrap().unwrap();
  assert_eq!(saved.reminder_stage, 0);
  assert!(saved.recovery_email_sent_at.is_none());
}

// ─── Manual resolution ───────────────────────────────────────────────────────

#[tokio::test]
async fn mark_recovered_is_terminal() {
  let s = store().await;
  let now = Utc::now();
  let RecordOutcome::Persisted { id, .. } =
    record(&s, now, activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  let updated =
    resolve::mark_recovered(&s, now, id, Some("customer called in"))
      .await
      .unwrap();
  assert_eq!(updated.status, CartStatus::Recovered);
  assert!(updated.notes.contains("customer called in"));

  // terminal: no longer a recovery candidate even after a long wait
  let mailer = MemoryMailer::new();
  let outcome = run_recovery(
    &s,
    &catalog(),
    &mailer,
    &settings(),
    now + Duration::days(7),
    50,
  )
  .await
  .unwrap();
  assert_eq!(outcome.processed, 0);
}

#[tokio::test]
async fn mark_recovered_missing_record_is_not_found() {
  let s = store().await;
  let err = resolve::mark_recovered(&s, Utc::now(), uuid::Uuid::new_v4(), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn delete_removes_and_reports_missing() {
  let s = store().await;
  let RecordOutcome::Persisted { id, .. } =
    record(&s, Utc::now(), activity("sess-1", Some("a@x.com")))
      .await
      .unwrap()
  else {
    panic!("expected persisted outcome");
  };

  resolve::delete(&s, id).await.unwrap();
  assert!(s.get(id).await.unwrap().is_none());

  let err = resolve::delete(&s, id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound));
}
