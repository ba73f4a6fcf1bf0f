// roamwatch-core: reconciliation engine, persistent store, and notifier.
//
// The engine is the writer; everything else reads. One tick = fetch the
// live association snapshot, diff it against tracked state, commit the
// resulting mutations atomically, publish the transitions.

pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod store;
pub mod threats;

// ── Primary re-exports ──────────────────────────────────────────────
pub use engine::{Engine, EngineConfig, EngineStatus, TickSummary};
pub use error::CoreError;
pub use notify::{Notifier, WebhookDispatcher};
pub use reconcile::{DeviceChange, HistoryOp, TickPlan};
pub use store::Store;
pub use threats::{ThreatFeed, ThreatMonitor, ThreatMonitorConfig};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ApRef, ConnectionHistoryEntry, MacAddress, NewThreatEvent, ThreatAction, ThreatEvent,
    TrackedDevice, Transition, TransitionKind, WebhookConfig, WebhookProvider,
};
