//! Usage analytics for the Educ-CI backend.
//!
//! - [`EventBus`] is an in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`UsageEvent`] is the event envelope published by mutation and AI
//!   handlers after their work succeeded.
//! - [`EventPersistence`] is the background service writing every event to
//!   the `analytics_events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, UsageEvent};
pub use persistence::EventPersistence;
