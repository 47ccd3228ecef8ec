//! Recovery-notification rendering and delivery transports.
//!
//! Rendering is pure: a [`RecoveryContext`] in, an
//! [`OutboundEmail`](trolley_core::mail::OutboundEmail) out. Delivery goes
//! through the [`Mailer`](trolley_core::mail::Mailer) trait; this crate
//! ships an HTTP-webhook transport, a tracing-only transport, and an
//! in-memory recorder for tests.

pub mod mailer;
pub mod render;

pub use mailer::{AnyMailer, HttpMailer, LogMailer, MailError, MemoryMailer};
pub use render::{Discount, RecoveryContext, RecoveryLine, render_recovery_email};
