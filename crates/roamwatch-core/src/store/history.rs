// Connection-history reads. Writes happen only inside `apply_tick`.

use super::Store;
use crate::error::CoreError;
use crate::model::ConnectionHistoryEntry;

impl Store {
    /// The device's open entry, if it currently has one.
    pub async fn open_entry(
        &self,
        device_id: i64,
    ) -> Result<Option<ConnectionHistoryEntry>, CoreError> {
        let entry = sqlx::query_as(
            "SELECT * FROM connection_history \
             WHERE device_id = ? AND disconnected_at IS NULL",
        )
        .bind(device_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(entry)
    }

    /// History entries for a device, newest association first.
    pub async fn history_for_device(
        &self,
        device_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ConnectionHistoryEntry>, CoreError> {
        let entries = sqlx::query_as(
            "SELECT * FROM connection_history WHERE device_id = ? \
             ORDER BY connected_at DESC LIMIT ? OFFSET ?",
        )
        .bind(device_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;
        Ok(entries)
    }

    pub async fn history_count(&self, device_id: i64) -> Result<i64, CoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM connection_history WHERE device_id = ?")
            .bind(device_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}
