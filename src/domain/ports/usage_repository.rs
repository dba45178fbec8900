//! Port for persisted usage/credit records.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{UsageRecord, UsageSummary};

#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn insert(&self, record: &UsageRecord) -> DomainResult<()>;

    async fn summary_for_user(&self, user_id: &str) -> DomainResult<UsageSummary>;
}
