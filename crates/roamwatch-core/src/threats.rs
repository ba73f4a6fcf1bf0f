// ── Threat-event monitor ──
//
// Polls the controller's IPS/IDS feed on its own interval and persists
// anything new, deduplicating on the controller's event id. Same failure
// semantics as the device engine: a failed fetch skips the cycle and the
// next interval retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roamwatch_api::LegacyClient;
use roamwatch_api::legacy::models::IpsEventEntry;

use crate::error::CoreError;
use crate::model::{NewThreatEvent, ThreatAction, ThreatEvent};
use crate::store::Store;

const THREAT_CHANNEL_SIZE: usize = 256;

// ── Feed contract ────────────────────────────────────────────────────

/// A source of raw IPS events. The threat feed only exists on the legacy
/// API surface, so there is exactly one production implementation.
#[async_trait]
pub trait ThreatFeed: Send + Sync {
    async fn fetch_events(
        &self,
        site: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> Result<Vec<IpsEventEntry>, roamwatch_api::Error>;
}

#[async_trait]
impl ThreatFeed for LegacyClient {
    async fn fetch_events(
        &self,
        site: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> Result<Vec<IpsEventEntry>, roamwatch_api::Error> {
        self.list_threat_events(site, start_ms, end_ms, limit).await
    }
}

// ── Event parsing ────────────────────────────────────────────────────

/// Map a raw controller event into our storage shape.
///
/// Returns `None` for entries with no usable dedupe identity at all.
/// Timestamps arrive as epoch milliseconds; severity is 1 (high) through
/// 3 (low), defaulting low when absent.
pub fn parse_event(entry: &IpsEventEntry, site: &str, now: DateTime<Utc>) -> Option<NewThreatEvent> {
    let controller_event_id = entry
        .id
        .clone()
        .or_else(|| entry.unique_alertid.clone())
        .or_else(|| entry.timestamp.map(|t| t.to_string()))?;

    let occurred_at = entry
        .timestamp
        .or(entry.time)
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(now);

    let action = match entry.inner_alert_action.as_deref() {
        Some("drop" | "block" | "blocked") => ThreatAction::Block,
        _ => ThreatAction::Alert,
    };

    let signature = entry
        .inner_alert_signature
        .clone()
        .or_else(|| entry.msg.clone())
        .unwrap_or_else(|| "unknown signature".to_owned());

    Some(NewThreatEvent {
        controller_event_id,
        site: site.to_owned(),
        occurred_at,
        signature,
        category: entry.inner_alert_category.clone(),
        severity: entry.inner_alert_severity.unwrap_or(3).clamp(1, 3),
        action,
        src_ip: entry.src_ip.clone(),
        src_port: entry.src_port,
        dest_ip: entry.dest_ip.clone(),
        dest_port: entry.dest_port,
        protocol: entry.proto.clone(),
        message: entry.msg.clone(),
    })
}

// ── Monitor ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ThreatMonitorConfig {
    pub site: String,
    /// How often the feed is polled.
    pub poll_interval: Duration,
    /// Window to fetch on the very first cycle (no stored watermark).
    pub lookback: Duration,
    /// Per-poll fetch cap passed to the controller.
    pub fetch_limit: u32,
}

impl Default for ThreatMonitorConfig {
    fn default() -> Self {
        Self {
            site: "default".into(),
            poll_interval: Duration::from_secs(300),
            lookback: Duration::from_secs(24 * 60 * 60),
            fetch_limit: 500,
        }
    }
}

/// Polls and persists intrusion-detection events.
#[derive(Clone)]
pub struct ThreatMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: ThreatMonitorConfig,
    store: Store,
    feed: Arc<dyn ThreatFeed>,
    event_tx: broadcast::Sender<Arc<ThreatEvent>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreatMonitor {
    pub fn new(config: ThreatMonitorConfig, store: Store, feed: Arc<dyn ThreatFeed>) -> Self {
        let (event_tx, _) = broadcast::channel(THREAT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(MonitorInner {
                config,
                store,
                feed,
                event_tx,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribe to newly-persisted threat events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Arc<ThreatEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Run an immediate first cycle, then spawn the interval loop.
    pub async fn start(&self) {
        if let Err(e) = self.run_cycle().await {
            warn!(error = %e, "initial threat poll failed");
        }

        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_loop(monitor, cancel));
        self.inner.task_handles.lock().await.push(handle);

        info!(
            site = %self.inner.config.site,
            interval_secs = self.inner.config.poll_interval.as_secs(),
            "threat monitor started"
        );
    }

    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        debug!("threat monitor stopped");
    }

    /// One poll cycle: fetch since the stored watermark, parse, insert
    /// whatever is new, publish it.
    pub async fn run_cycle(&self) -> Result<usize, CoreError> {
        let site = &self.inner.config.site;
        let now = Utc::now();

        let lookback = TimeDelta::from_std(self.inner.config.lookback)
            .unwrap_or_else(|_| TimeDelta::hours(24));

        let since_ms = match self.inner.store.latest_threat_timestamp(site).await? {
            // +1ms past the watermark; the UNIQUE constraint catches
            // anything the controller re-reports at the same instant.
            Some(latest) => latest.timestamp_millis() + 1,
            None => (now - lookback).timestamp_millis(),
        };

        let entries = self
            .inner
            .feed
            .fetch_events(site, since_ms, now.timestamp_millis(), self.inner.config.fetch_limit)
            .await
            .map_err(CoreError::from)?;

        let parsed: Vec<NewThreatEvent> = entries
            .iter()
            .filter_map(|e| parse_event(e, site, now))
            .collect();

        let inserted = self.inner.store.insert_threat_events(&parsed).await?;

        for event in &inserted {
            if event.severity == 1 {
                warn!(
                    signature = %event.signature,
                    src = event.src_ip.as_deref().unwrap_or("?"),
                    dest = event.dest_ip.as_deref().unwrap_or("?"),
                    "high-severity threat detected"
                );
            } else {
                debug!(signature = %event.signature, severity = event.severity, "threat recorded");
            }
            let _ = self.inner.event_tx.send(Arc::new(event.clone()));
        }

        Ok(inserted.len())
    }
}

async fn poll_loop(monitor: ThreatMonitor, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.config.poll_interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = monitor.run_cycle().await {
                    warn!(error = %e, "threat poll failed");
                }
            }
        }
    }
}
