// Device CRUD. All user-driven, all outside the tick; the engine only
// touches devices through `apply_tick`.

use chrono::Utc;
use tracing::debug;

use super::{Store, is_unique_violation};
use crate::error::CoreError;
use crate::model::{MacAddress, TrackedDevice};

impl Store {
    /// Start tracking a device. Fails with [`CoreError::DeviceExists`] if
    /// the (mac, site) pair is already tracked.
    pub async fn add_device(
        &self,
        mac: &MacAddress,
        name: Option<&str>,
        site: &str,
    ) -> Result<TrackedDevice, CoreError> {
        let result = sqlx::query(
            "INSERT INTO tracked_devices (mac, name, site, is_connected, added_at) \
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(mac)
        .bind(name)
        .bind(site)
        .bind(Utc::now())
        .execute(self.pool())
        .await;

        let done = match result {
            Ok(done) => done,
            Err(e) if is_unique_violation(&e) => {
                return Err(CoreError::DeviceExists {
                    mac: mac.to_string(),
                    site: site.to_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        debug!(%mac, site, "device added");

        self.device_by_id(done.last_insert_rowid())
            .await?
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: mac.to_string(),
            })
    }

    pub async fn device_by_id(&self, id: i64) -> Result<Option<TrackedDevice>, CoreError> {
        let device = sqlx::query_as("SELECT * FROM tracked_devices WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(device)
    }

    pub async fn device_by_mac(
        &self,
        site: &str,
        mac: &MacAddress,
    ) -> Result<Option<TrackedDevice>, CoreError> {
        let device = sqlx::query_as("SELECT * FROM tracked_devices WHERE site = ? AND mac = ?")
            .bind(site)
            .bind(mac)
            .fetch_optional(self.pool())
            .await?;
        Ok(device)
    }

    /// Resolve a CLI-style identifier: numeric row id or hardware address.
    pub async fn find_device(&self, site: &str, ident: &str) -> Result<TrackedDevice, CoreError> {
        let found = if let Ok(id) = ident.parse::<i64>() {
            self.device_by_id(id).await?
        } else {
            self.device_by_mac(site, &MacAddress::new(ident)).await?
        };

        found.ok_or_else(|| CoreError::DeviceNotFound {
            identifier: ident.to_owned(),
        })
    }

    /// All tracked devices for a site, newest first.
    pub async fn devices_for_site(&self, site: &str) -> Result<Vec<TrackedDevice>, CoreError> {
        let devices =
            sqlx::query_as("SELECT * FROM tracked_devices WHERE site = ? ORDER BY added_at DESC")
                .bind(site)
                .fetch_all(self.pool())
                .await?;
        Ok(devices)
    }

    pub async fn rename_device(&self, id: i64, name: Option<&str>) -> Result<(), CoreError> {
        let done = sqlx::query("UPDATE tracked_devices SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(CoreError::DeviceNotFound {
                identifier: id.to_string(),
            });
        }
        Ok(())
    }

    /// Stop tracking a device. Its history goes with it (FK cascade).
    pub async fn delete_device(&self, id: i64) -> Result<(), CoreError> {
        let done = sqlx::query("DELETE FROM tracked_devices WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(CoreError::DeviceNotFound {
                identifier: id.to_string(),
            });
        }

        debug!(id, "device deleted");
        Ok(())
    }

    /// (total, connected) counts for a site's status summary.
    pub async fn device_counts(&self, site: &str) -> Result<(i64, i64), CoreError> {
        let counts = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(is_connected), 0) \
             FROM tracked_devices WHERE site = ?",
        )
        .bind(site)
        .fetch_one(self.pool())
        .await?;
        Ok(counts)
    }
}
