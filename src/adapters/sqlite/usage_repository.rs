//! `SQLite` implementation of [`UsageRepository`].

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CreditTier, UsageRecord, UsageSummary};
use crate::domain::ports::UsageRepository;

#[derive(Clone)]
pub struct SqliteUsageRepository {
    pool: SqlitePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn tier_to_str(tier: CreditTier) -> &'static str {
    match tier {
        CreditTier::Tier1 => "tier1",
        CreditTier::Tier2 => "tier2",
        CreditTier::Tier3 => "tier3",
        CreditTier::Tier4 => "tier4",
        CreditTier::Tier5 => "tier5",
    }
}

#[async_trait]
impl UsageRepository for SqliteUsageRepository {
    async fn insert(&self, record: &UsageRecord) -> DomainResult<()> {
        sqlx::query(
            r"INSERT INTO usage_records
               (user_id, session_id, agent_name, model, tier, prompt_tokens, completion_tokens, credits_charged, cost, recorded_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.user_id)
        .bind(&record.session_id)
        .bind(&record.agent_name)
        .bind(&record.model)
        .bind(tier_to_str(record.tier))
        .bind(record.prompt_tokens)
        .bind(record.completion_tokens)
        .bind(record.credits_charged)
        .bind(record.cost)
        .bind(record.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn summary_for_user(&self, user_id: &str) -> DomainResult<UsageSummary> {
        let row = sqlx::query(
            r"SELECT COUNT(*) as call_count,
                     COALESCE(SUM(prompt_tokens), 0) as prompt_tokens,
                     COALESCE(SUM(completion_tokens), 0) as completion_tokens,
                     COALESCE(SUM(credits_charged), 0) as credits,
                     COALESCE(SUM(cost), 0.0) as cost
               FROM usage_records WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UsageSummary {
            call_count: u32::try_from(row.get::<i64, _>("call_count")).unwrap_or(0),
            total_prompt_tokens: u64::try_from(row.get::<i64, _>("prompt_tokens")).unwrap_or(0),
            total_completion_tokens: u64::try_from(row.get::<i64, _>("completion_tokens")).unwrap_or(0),
            total_credits: u64::try_from(row.get::<i64, _>("credits")).unwrap_or(0),
            total_cost: row.get("cost"),
        })
    }
}
