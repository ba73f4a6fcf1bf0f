// ── Domain model ──

mod device;
mod history;
mod mac;
mod threat;
mod transition;
mod webhook;

pub use device::TrackedDevice;
pub use history::ConnectionHistoryEntry;
pub use mac::MacAddress;
pub use threat::{NewThreatEvent, ThreatAction, ThreatEvent};
pub use transition::{ApRef, Transition, TransitionKind};
pub use webhook::{WebhookConfig, WebhookProvider};
