//! Port for agent template persistence.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::AgentTemplate;

/// Repository interface for agent template storage.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn insert(&self, template: AgentTemplate) -> DomainResult<()>;

    async fn get(&self, name: &str) -> DomainResult<Option<AgentTemplate>>;

    /// All active templates, regardless of per-user preference.
    async fn list_active(&self) -> DomainResult<Vec<AgentTemplate>>;

    async fn update(&self, template: AgentTemplate) -> DomainResult<()>;
}
