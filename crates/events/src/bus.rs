//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the application state.
//! Publishing never blocks and never fails a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use educ_core::types::DbId;

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const ATTENDANCE_DECLARED: &str = "attendance.declared";
pub const ATTENDANCE_JUSTIFIED: &str = "attendance.justified";
pub const ATTENDANCE_DECIDED: &str = "attendance.decided";
pub const GRADES_UPSERTED: &str = "grades.upserted";
pub const GRADES_PERIOD_LOCKED: &str = "grades.period_locked";
pub const REPORT_CARD_GENERATED: &str = "report_card.generated";
pub const SUBMISSION_GRADED: &str = "submission.graded";
pub const QCM_GENERATED: &str = "ai.qcm_generated";
pub const RAG_QUERIED: &str = "ai.rag_queried";
pub const SCHEDULE_EXPORTED: &str = "schedule.exported";

// ---------------------------------------------------------------------------
// UsageEvent
// ---------------------------------------------------------------------------

/// Something a user did that is worth counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Dot-separated event name, e.g. `"grades.upserted"`.
    pub event_type: String,
    pub actor_id: Option<DbId>,
    pub etablissement_id: Option<DbId>,
    /// Free-form JSON payload.
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            actor_id: None,
            etablissement_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_id = Some(user_id);
        self
    }

    pub fn with_etablissement(mut self, etablissement_id: Option<DbId>) -> Self {
        self.etablissement_id = etablissement_id;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<UsageEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscriber the event is dropped.
    pub fn publish(&self, event: UsageEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UsageEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
