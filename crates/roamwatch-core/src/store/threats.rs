// Threat-event persistence. Inserts are idempotent on the controller's
// own event id, so re-polling an overlapping window is harmless.

use chrono::{DateTime, Utc};

use super::Store;
use crate::error::CoreError;
use crate::model::{NewThreatEvent, ThreatEvent};

impl Store {
    /// Insert parsed threat events, skipping any already stored.
    /// Returns the rows that were actually inserted.
    pub async fn insert_threat_events(
        &self,
        events: &[NewThreatEvent],
    ) -> Result<Vec<ThreatEvent>, CoreError> {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool().begin().await?;
        let mut inserted_ids = Vec::new();
        let now = Utc::now();

        for event in events {
            let done = sqlx::query(
                "INSERT INTO threat_events \
                 (controller_event_id, site, occurred_at, signature, category, severity, \
                  action, src_ip, src_port, dest_ip, dest_port, protocol, message, inserted_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (controller_event_id) DO NOTHING",
            )
            .bind(&event.controller_event_id)
            .bind(&event.site)
            .bind(event.occurred_at)
            .bind(&event.signature)
            .bind(&event.category)
            .bind(event.severity)
            .bind(event.action)
            .bind(&event.src_ip)
            .bind(event.src_port)
            .bind(&event.dest_ip)
            .bind(event.dest_port)
            .bind(&event.protocol)
            .bind(&event.message)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if done.rows_affected() > 0 {
                inserted_ids.push(done.last_insert_rowid());
            }
        }

        let mut inserted = Vec::with_capacity(inserted_ids.len());
        for id in inserted_ids {
            let row: ThreatEvent = sqlx::query_as("SELECT * FROM threat_events WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// The newest event time stored for a site, to bound the next poll.
    pub async fn latest_threat_timestamp(
        &self,
        site: &str,
    ) -> Result<Option<DateTime<Utc>>, CoreError> {
        let latest = sqlx::query_scalar(
            "SELECT occurred_at FROM threat_events WHERE site = ? \
             ORDER BY occurred_at DESC LIMIT 1",
        )
        .bind(site)
        .fetch_optional(self.pool())
        .await?;
        Ok(latest)
    }

    /// Recent threat events for a site, newest first.
    pub async fn threats_for_site(
        &self,
        site: &str,
        limit: i64,
    ) -> Result<Vec<ThreatEvent>, CoreError> {
        let events = sqlx::query_as(
            "SELECT * FROM threat_events WHERE site = ? \
             ORDER BY occurred_at DESC LIMIT ?",
        )
        .bind(site)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(events)
    }
}
