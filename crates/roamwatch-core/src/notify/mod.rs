// ── Change notifier ──
//
// Consumes the engine's transition stream and fans each event out to
// the webhook targets that asked for it. Side-effect only: nothing here
// ever writes device or history state. Delivery order across targets is
// unspecified and failures are logged, not retried -- the dispatcher's
// HTTP client policy is the only retry there is.

mod dispatch;

pub use dispatch::WebhookDispatcher;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::Transition;
use crate::store::Store;

/// Translates transitions into webhook deliveries.
pub struct Notifier {
    store: Store,
    dispatcher: WebhookDispatcher,
}

impl Notifier {
    pub fn new(store: Store, dispatcher: WebhookDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Spawn the notifier loop on the given transition stream.
    pub fn spawn(
        self,
        rx: broadcast::Receiver<Arc<Transition>>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(rx, cancel))
    }

    async fn run(
        self,
        mut rx: broadcast::Receiver<Arc<Transition>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(transition) => self.handle(&transition).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Dropped transitions mean dropped notifications,
                        // not corrupted state -- the store already has the
                        // authoritative history.
                        warn!(skipped, "notifier lagged behind transition stream");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        debug!("notifier stopped");
    }

    async fn handle(&self, transition: &Transition) {
        let hooks = match self.store.enabled_webhooks_for(transition.kind).await {
            Ok(hooks) => hooks,
            Err(e) => {
                warn!(error = %e, "webhook lookup failed, dropping notification");
                return;
            }
        };

        for hook in hooks {
            match self.dispatcher.deliver(&hook, transition).await {
                Ok(()) => {
                    debug!(webhook = %hook.name, kind = %transition.kind, "webhook delivered");
                    if let Err(e) = self.store.touch_webhook(hook.id, Utc::now()).await {
                        warn!(webhook = %hook.name, error = %e, "failed to record delivery time");
                    }
                }
                Err(e) => {
                    warn!(webhook = %hook.name, error = %e, "webhook delivery failed");
                }
            }
        }
    }
}
