//! `SQLite` implementation of [`PreferenceRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::errors::DomainResult;
use crate::domain::models::UserTemplatePreference;
use crate::domain::ports::PreferenceRepository;

#[derive(Clone)]
pub struct SqlitePreferenceRepository {
    pool: SqlitePool,
}

impl SqlitePreferenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_preference(row: &sqlx::sqlite::SqliteRow) -> UserTemplatePreference {
    let last_used_at: Option<String> = row.get("last_used_at");
    UserTemplatePreference {
        user_id: row.get("user_id"),
        template_name: row.get("template_name"),
        enabled: row.get::<i64, _>("enabled") != 0,
        usage_count: u32::try_from(row.get::<i64, _>("usage_count")).unwrap_or(0),
        last_used_at: last_used_at.and_then(|s| s.parse::<DateTime<Utc>>().ok()),
    }
}

#[async_trait]
impl PreferenceRepository for SqlitePreferenceRepository {
    async fn get(&self, user_id: &str, template_name: &str) -> DomainResult<Option<UserTemplatePreference>> {
        let row = sqlx::query(
            "SELECT * FROM user_template_preferences WHERE user_id = ? AND template_name = ?",
        )
        .bind(user_id)
        .bind(template_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_preference))
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<UserTemplatePreference>> {
        let rows = sqlx::query("SELECT * FROM user_template_preferences WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_preference).collect())
    }

    async fn upsert(&self, preference: UserTemplatePreference) -> DomainResult<()> {
        sqlx::query(
            r"INSERT INTO user_template_preferences (user_id, template_name, enabled, usage_count, last_used_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (user_id, template_name) DO UPDATE SET
                 enabled = excluded.enabled,
                 usage_count = excluded.usage_count,
                 last_used_at = excluded.last_used_at",
        )
        .bind(&preference.user_id)
        .bind(&preference.template_name)
        .bind(i64::from(preference.enabled))
        .bind(i64::from(preference.usage_count))
        .bind(preference.last_used_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_usage(&self, user_id: &str, template_name: &str) -> DomainResult<()> {
        sqlx::query(
            r"INSERT INTO user_template_preferences (user_id, template_name, enabled, usage_count, last_used_at)
               VALUES (?, ?, 1, 1, ?)
               ON CONFLICT (user_id, template_name) DO UPDATE SET
                 usage_count = usage_count + 1,
                 last_used_at = excluded.last_used_at",
        )
        .bind(user_id)
        .bind(template_name)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::connection::open_in_memory;

    #[tokio::test]
    async fn upsert_is_idempotent_and_latest_call_wins() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqlitePreferenceRepository::new(pool);
        repo.upsert(UserTemplatePreference::new("alice", "t1", true)).await.unwrap();
        repo.upsert(UserTemplatePreference::new("alice", "t1", false)).await.unwrap();

        let pref = repo.get("alice", "t1").await.unwrap().unwrap();
        assert!(!pref.enabled);
    }

    #[tokio::test]
    async fn record_usage_increments_count() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqlitePreferenceRepository::new(pool);
        repo.upsert(UserTemplatePreference::new("alice", "t1", true)).await.unwrap();
        repo.record_usage("alice", "t1").await.unwrap();
        repo.record_usage("alice", "t1").await.unwrap();

        let pref = repo.get("alice", "t1").await.unwrap().unwrap();
        assert_eq!(pref.usage_count, 2);
        assert!(pref.last_used_at.is_some());
    }
}
