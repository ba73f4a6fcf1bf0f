// ── Reconciliation engine ──
//
// One explicitly-passed context owns everything a tick needs: config,
// store handle, association source. Ticks run inline in the scheduler
// loop, so a new tick can never start before the previous one finished,
// and shutdown lets an in-flight tick complete its commit.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roamwatch_api::AssociationSource;

use crate::error::CoreError;
use crate::model::Transition;
use crate::reconcile;
use crate::store::Store;

const TRANSITION_CHANNEL_SIZE: usize = 256;

/// Engine tuning. Built by the config layer; the engine never reads
/// files or environment itself.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Site the engine reconciles.
    pub site: String,
    /// How often a tick fires.
    pub refresh_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site: "default".into(),
            refresh_interval: Duration::from_secs(60),
        }
    }
}

/// Observable engine health, published on a watch channel so the UI can
/// surface "last refresh" staleness without polling the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineStatus {
    pub last_refresh: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub ticks_completed: u64,
}

/// What one tick did, for logging and the one-shot `refresh` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickSummary {
    pub tracked: usize,
    pub associated: usize,
    pub transitions: usize,
}

/// The device-presence reconciliation engine.
///
/// Cheaply cloneable via `Arc`. [`start`](Self::start) runs an immediate
/// first tick and then spawns the interval loop; [`shutdown`](Self::shutdown)
/// cancels between ticks and joins the loop task.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    store: Store,
    source: Arc<dyn AssociationSource>,
    transition_tx: broadcast::Sender<Arc<Transition>>,
    status: watch::Sender<EngineStatus>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(config: EngineConfig, store: Store, source: Arc<dyn AssociationSource>) -> Self {
        let (transition_tx, _) = broadcast::channel(TRANSITION_CHANNEL_SIZE);
        let (status, _) = watch::channel(EngineStatus::default());

        Self {
            inner: Arc::new(EngineInner {
                config,
                store,
                source,
                transition_tx,
                status,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Cancellation token shared by the engine's background tasks.
    /// Companion tasks (notifier, threat monitor) hook onto it so one
    /// shutdown call quiesces everything.
    pub fn cancel_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to transition events. Any number of consumers -- UI
    /// session handlers, the webhook notifier -- can hold a receiver.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<Arc<Transition>> {
        self.inner.transition_tx.subscribe()
    }

    /// Watch engine status (last refresh, last error, tick count).
    pub fn status(&self) -> watch::Receiver<EngineStatus> {
        self.inner.status.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run an immediate first tick, then spawn the interval loop.
    ///
    /// A failing first tick is logged, not fatal: per-tick errors never
    /// escalate past the tick that hit them.
    pub async fn start(&self) {
        if let Err(e) = self.run_tick().await {
            warn!(error = %e, "initial tick failed");
        }

        let engine = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(tick_loop(engine, cancel));
        self.inner.task_handles.lock().await.push(handle);

        info!(
            site = %self.inner.config.site,
            interval_secs = self.inner.config.refresh_interval.as_secs(),
            "engine started"
        );
    }

    /// Stop the interval loop and wait for any in-flight tick to finish
    /// its atomic commit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        debug!("engine stopped");
    }

    // ── The tick ─────────────────────────────────────────────────────

    /// Execute one reconciliation cycle for the configured site.
    ///
    /// Fetch failure aborts the tick before any state is touched; a
    /// storage failure rolls the whole tick back. Either way the next
    /// interval retries -- that is the engine's entire retry policy.
    pub async fn run_tick(&self) -> Result<TickSummary, CoreError> {
        let site = &self.inner.config.site;

        let devices = match self.inner.store.devices_for_site(site).await {
            Ok(devices) => devices,
            Err(e) => {
                self.record_failure(&e);
                return Err(e);
            }
        };

        if devices.is_empty() {
            debug!(site, "no devices tracked, skipping tick");
            self.record_success(Utc::now());
            return Ok(TickSummary::default());
        }

        let snapshot = match self.inner.source.fetch_associations(site).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let err = CoreError::from(e);
                warn!(site, error = %err, "snapshot fetch failed, skipping tick");
                self.record_failure(&err);
                return Err(err);
            }
        };

        let now = Utc::now();
        let plan = reconcile::plan(site, &devices, &snapshot, now);

        if let Err(e) = self.inner.store.apply_tick(&plan).await {
            warn!(site, error = %e, "tick rolled back");
            self.record_failure(&e);
            return Err(e);
        }

        for transition in &plan.transitions {
            info!(
                device = transition.device_label(),
                kind = %transition.kind,
                "transition"
            );
            let _ = self.inner.transition_tx.send(Arc::new(transition.clone()));
        }

        self.record_success(now);

        Ok(TickSummary {
            tracked: devices.len(),
            associated: snapshot.len(),
            transitions: plan.transitions.len(),
        })
    }

    fn record_success(&self, at: DateTime<Utc>) {
        self.inner.status.send_modify(|s| {
            s.last_refresh = Some(at);
            s.last_error = None;
            s.ticks_completed += 1;
        });
    }

    fn record_failure(&self, err: &CoreError) {
        self.inner.status.send_modify(|s| {
            s.last_error = Some(err.to_string());
        });
    }
}

/// Drive ticks on the configured interval until cancelled.
async fn tick_loop(engine: Engine, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(engine.inner.config.refresh_interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Errors were already recorded and logged inside run_tick;
                // the loop itself only cares about the next interval.
                let _ = engine.run_tick().await;
            }
        }
    }
}
