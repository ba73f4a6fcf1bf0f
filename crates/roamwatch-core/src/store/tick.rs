// Atomic tick application.
//
// A whole `TickPlan` commits or none of it does: a storage failure
// mid-tick leaves every row exactly as the previous tick left it, so
// the next interval can retry cleanly.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use super::Store;
use crate::error::CoreError;
use crate::model::ConnectionHistoryEntry;
use crate::reconcile::{DeviceChange, HistoryOp, TickPlan};

impl Store {
    /// Apply every device and history mutation from one tick in a single
    /// transaction.
    pub async fn apply_tick(&self, plan: &TickPlan) -> Result<(), CoreError> {
        if plan.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        for change in &plan.changes {
            apply_device_change(&mut tx, change, plan.now).await?;
        }

        tx.commit().await?;

        debug!(
            site = %plan.site,
            devices = plan.changes.len(),
            transitions = plan.transitions.len(),
            "tick committed"
        );
        Ok(())
    }
}

async fn apply_device_change(
    tx: &mut Transaction<'_, Sqlite>,
    change: &DeviceChange,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let fields = &change.fields;

    sqlx::query(
        "UPDATE tracked_devices SET \
         is_connected = ?, current_ap_mac = ?, current_ap_name = ?, \
         current_ip = ?, current_signal_dbm = ?, last_seen = ? \
         WHERE id = ?",
    )
    .bind(fields.is_connected)
    .bind(&fields.ap_mac)
    .bind(&fields.ap_name)
    .bind(&fields.ip)
    .bind(fields.signal_dbm)
    .bind(fields.last_seen)
    .bind(change.device_id)
    .execute(&mut **tx)
    .await?;

    for op in &change.history {
        match op {
            HistoryOp::CloseOpen => close_open_entry(tx, change.device_id, now).await?,
            HistoryOp::Open {
                ap_mac,
                ap_name,
                signal_dbm,
            } => {
                sqlx::query(
                    "INSERT INTO connection_history \
                     (device_id, ap_mac, ap_name, connected_at, signal_dbm) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(change.device_id)
                .bind(ap_mac)
                .bind(ap_name)
                .bind(now)
                .bind(signal_dbm)
                .execute(&mut **tx)
                .await?;
            }
        }
    }

    Ok(())
}

/// Close the device's open history entry, if one exists, computing its
/// duration from wall-clock timestamps.
async fn close_open_entry(
    tx: &mut Transaction<'_, Sqlite>,
    device_id: i64,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    let open: Option<ConnectionHistoryEntry> = sqlx::query_as(
        "SELECT * FROM connection_history \
         WHERE device_id = ? AND disconnected_at IS NULL",
    )
    .bind(device_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some(entry) = open else {
        return Ok(());
    };

    let duration_secs = (now - entry.connected_at).num_seconds().max(0);

    sqlx::query(
        "UPDATE connection_history SET disconnected_at = ?, duration_secs = ? WHERE id = ?",
    )
    .bind(now)
    .bind(duration_secs)
    .bind(entry.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
