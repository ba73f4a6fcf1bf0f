// Webhook configuration CRUD, plus the enabled-and-interested lookup
// the notifier runs per transition.

use chrono::{DateTime, Utc};

use super::Store;
use crate::error::CoreError;
use crate::model::{TransitionKind, WebhookConfig, WebhookProvider};

impl Store {
    pub async fn add_webhook(
        &self,
        name: &str,
        url: &str,
        provider: WebhookProvider,
        on_connected: bool,
        on_disconnected: bool,
        on_roamed: bool,
    ) -> Result<WebhookConfig, CoreError> {
        let done = sqlx::query(
            "INSERT INTO webhooks \
             (name, url, provider, enabled, on_connected, on_disconnected, on_roamed) \
             VALUES (?, ?, ?, 1, ?, ?, ?)",
        )
        .bind(name)
        .bind(url)
        .bind(provider)
        .bind(on_connected)
        .bind(on_disconnected)
        .bind(on_roamed)
        .execute(self.pool())
        .await?;

        let id = done.last_insert_rowid();
        self.webhook_by_id(id)
            .await?
            .ok_or(CoreError::WebhookNotFound { id })
    }

    pub async fn webhook_by_id(&self, id: i64) -> Result<Option<WebhookConfig>, CoreError> {
        let hook = sqlx::query_as("SELECT * FROM webhooks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(hook)
    }

    pub async fn list_webhooks(&self) -> Result<Vec<WebhookConfig>, CoreError> {
        let hooks = sqlx::query_as("SELECT * FROM webhooks ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(hooks)
    }

    /// Enabled webhooks whose event-kind flag matches `kind`.
    pub async fn enabled_webhooks_for(
        &self,
        kind: TransitionKind,
    ) -> Result<Vec<WebhookConfig>, CoreError> {
        let hooks: Vec<WebhookConfig> =
            sqlx::query_as("SELECT * FROM webhooks WHERE enabled = 1 ORDER BY id")
                .fetch_all(self.pool())
                .await?;

        Ok(hooks.into_iter().filter(|h| h.wants(kind)).collect())
    }

    pub async fn set_webhook_enabled(&self, id: i64, enabled: bool) -> Result<(), CoreError> {
        let done = sqlx::query("UPDATE webhooks SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(CoreError::WebhookNotFound { id });
        }
        Ok(())
    }

    pub async fn delete_webhook(&self, id: i64) -> Result<(), CoreError> {
        let done = sqlx::query("DELETE FROM webhooks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if done.rows_affected() == 0 {
            return Err(CoreError::WebhookNotFound { id });
        }
        Ok(())
    }

    /// Record a successful delivery.
    pub async fn touch_webhook(&self, id: i64, at: DateTime<Utc>) -> Result<(), CoreError> {
        sqlx::query("UPDATE webhooks SET last_triggered = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
