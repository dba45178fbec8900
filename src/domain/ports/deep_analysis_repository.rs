//! Port for persisted deep analysis reports.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::DeepAnalysisReport;

#[async_trait]
pub trait DeepAnalysisRepository: Send + Sync {
    async fn insert(&self, report: &DeepAnalysisReport) -> DomainResult<()>;

    async fn update(&self, report: &DeepAnalysisReport) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<DeepAnalysisReport>>;

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<DeepAnalysisReport>>;
}
