//! Port for per-user template preference and usage tracking.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::UserTemplatePreference;

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn get(&self, user_id: &str, template_name: &str) -> DomainResult<Option<UserTemplatePreference>>;

    /// All preference rows for a user, enabled and disabled alike.
    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<UserTemplatePreference>>;

    /// Insert or replace the preference row wholesale (spec §4.4's
    /// idempotent toggle invariant: the latest call always wins).
    async fn upsert(&self, preference: UserTemplatePreference) -> DomainResult<()>;

    /// Bump `usage_count`/`last_used_at` for an already-enabled template.
    async fn record_usage(&self, user_id: &str, template_name: &str) -> DomainResult<()>;
}
