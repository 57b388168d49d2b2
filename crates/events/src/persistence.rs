//! Durable usage-event persistence.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every received [`UsageEvent`] to `analytics_events`. It runs
//! as a long-lived background task and returns when the bus is dropped.

use tokio::sync::broadcast;
use educ_core::types::DbId;
use educ_db::repositories::AnalyticsEventRepo;
use educ_db::DbPool;

use crate::bus::UsageEvent;

pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    ///
    /// Write failures and lag are logged; neither stops the loop.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<UsageEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist usage event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Usage event persistence lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &UsageEvent) -> Result<DbId, sqlx::Error> {
        AnalyticsEventRepo::insert(
            pool,
            &event.event_type,
            event.actor_id,
            event.etablissement_id,
            &event.payload,
            event.timestamp,
        )
        .await
    }
}
