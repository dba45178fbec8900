//! Agent Registry: resolves the set of templates visible to a user, in both
//! the individual (`@agent`) and planner views (spec §4.1).
//!
//! Grounded on the teacher's repository-backed services
//! (`SessionService`/`TemplateRepository`-shaped dependency injection) and
//! on `templates_routes.py`'s `get_user_enabled_templates_for_planner`,
//! which caps the planner view at ten templates ordered by
//! `(usage_count desc, last_used_at desc)` and always prepends the four
//! core agents.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AgentSignature, AgentTemplate, AgentVariant, SignatureMode, UserTemplatePreference, BASIC_QA_AGENT,
    CORE_AGENT_NAMES,
};
use crate::domain::ports::{PreferenceRepository, TemplateRepository};

/// Maximum number of non-core templates surfaced to the planner per user.
pub const MAX_PLANNER_TEMPLATES: usize = 10;

pub struct AgentRegistry {
    templates: Arc<dyn TemplateRepository>,
    preferences: Arc<dyn PreferenceRepository>,
}

impl AgentRegistry {
    pub fn new(templates: Arc<dyn TemplateRepository>, preferences: Arc<dyn PreferenceRepository>) -> Self {
        Self { templates, preferences }
    }

    /// Templates usable via `@agent` individual invocation: every active
    /// template whose variant allows it, regardless of per-user preference
    /// (spec §4.1: individual mode ignores the enabled/disabled toggle).
    #[instrument(skip(self), err)]
    pub async fn individual_templates(&self) -> DomainResult<Vec<AgentTemplate>> {
        let all = self.templates.list_active().await?;
        Ok(all.into_iter().filter(|t| t.variant.usable_individually()).collect())
    }

    /// Templates visible to the planner for `user_id`: the four core agents
    /// plus up to `MAX_PLANNER_TEMPLATES` user-enabled non-core templates,
    /// ordered by usage (most-used, most-recent first).
    #[instrument(skip(self), err)]
    pub async fn planner_templates(&self, user_id: &str) -> DomainResult<Vec<AgentTemplate>> {
        let all = self.templates.list_active().await?;
        let preferences = self.preferences.list_for_user(user_id).await?;

        let enabled: HashSet<String> =
            preferences.iter().filter(|p| p.enabled).map(|p| p.template_name.clone()).collect();

        let mut core: Vec<AgentTemplate> = Vec::new();
        let mut non_core: Vec<(AgentTemplate, u32, Option<chrono::DateTime<chrono::Utc>>)> = Vec::new();

        for template in all {
            if !template.variant.usable_in_planner() {
                continue;
            }
            if AgentTemplate::is_core(&template.name) {
                core.push(template);
                continue;
            }
            // Non-core templates default to disabled until a preference row
            // says otherwise (spec §4.4).
            if !enabled.contains(&template.name) {
                continue;
            }
            let pref = preferences.iter().find(|p| p.template_name == template.name);
            let (usage_count, last_used_at) =
                pref.map_or((0, None), |p| (p.usage_count, p.last_used_at));
            non_core.push((template, usage_count, last_used_at));
        }

        non_core.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.cmp(&a.2)));
        non_core.truncate(MAX_PLANNER_TEMPLATES);

        core.extend(non_core.into_iter().map(|(t, _, _)| t));
        Ok(core)
    }

    /// All agent names usable in planner plans for `user_id`, including the
    /// `basic_qa_agent` sentinel (spec §4.3's fallback for unrelated queries).
    #[instrument(skip(self), err)]
    pub async fn planner_agent_names(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let mut names: Vec<String> =
            self.planner_templates(user_id).await?.into_iter().map(|t| t.name).collect();
        names.push(BASIC_QA_AGENT.to_string());
        Ok(names)
    }

    /// Resolve a single agent by name, for the individual-invocation path.
    /// Falls back to the four core agents if the registry cannot supply any
    /// templates at all (spec §4.1's "failure fallback").
    #[instrument(skip(self), err)]
    pub async fn resolve(&self, name: &str) -> DomainResult<AgentTemplate> {
        if let Some(template) = self.templates.get(name).await? {
            return Ok(template);
        }
        if CORE_AGENT_NAMES.contains(&name) {
            return Ok(AgentTemplate::new(name, AgentVariant::Both));
        }
        Err(DomainError::UnknownAgent {
            name: name.to_string(),
            available: CORE_AGENT_NAMES.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    pub fn signature_for(template: &AgentTemplate, mode: SignatureMode) -> AgentSignature {
        template.signature(mode)
    }

    /// Set a user's enabled/disabled preference for a non-core template,
    /// unconditionally. Idempotent: the latest call always wins.
    #[instrument(skip(self), err)]
    pub async fn toggle(&self, user_id: &str, template_name: &str, enabled: bool) -> DomainResult<()> {
        let mut pref = self
            .preferences
            .get(user_id, template_name)
            .await?
            .unwrap_or_else(|| UserTemplatePreference::new(user_id, template_name, enabled));
        pref.enabled = enabled;
        self.preferences.upsert(pref).await
    }

    /// Same as [`Self::toggle`], but refuses to disable the last enabled
    /// planner agent for this user (spec §4.1's "cannot disable the last
    /// enabled planner agent" guard).
    #[instrument(skip(self), err)]
    pub async fn toggle_preference_checked(
        &self,
        user_id: &str,
        template_name: &str,
        enabled: bool,
    ) -> DomainResult<()> {
        if !enabled {
            let current = self.planner_templates(user_id).await?;
            let remaining = current.iter().filter(|t| t.name != template_name).count();
            if remaining == 0 {
                return Err(DomainError::ValidationFailed(format!(
                    "cannot disable '{template_name}': it is the last enabled planner agent"
                )));
            }
        }
        self.toggle(user_id, template_name, enabled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{connection::open_in_memory, preference_repository::SqlitePreferenceRepository, template_repository::SqliteTemplateRepository};
    use crate::domain::models::{AgentCategory, UserTemplatePreference};

    async fn seeded_registry() -> AgentRegistry {
        let pool = open_in_memory().await.unwrap();
        let templates = Arc::new(SqliteTemplateRepository::new(pool.clone()));
        let preferences = Arc::new(SqlitePreferenceRepository::new(pool));

        for name in CORE_AGENT_NAMES {
            templates
                .insert(AgentTemplate::new(*name, AgentVariant::Both))
                .await
                .unwrap();
        }
        templates
            .insert(
                AgentTemplate::new("custom_plot_agent", AgentVariant::Both)
                    .with_category(AgentCategory::DataVisualization),
            )
            .await
            .unwrap();

        AgentRegistry::new(templates, preferences)
    }

    #[tokio::test]
    async fn planner_view_always_includes_core_agents() {
        let registry = seeded_registry().await;
        let templates = registry.planner_templates("alice").await.unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.name.as_str()).collect();
        for core in CORE_AGENT_NAMES {
            assert!(names.contains(core));
        }
        assert!(!names.contains(&"custom_plot_agent"));
    }

    #[tokio::test]
    async fn enabling_a_template_surfaces_it_in_planner_view() {
        let registry = seeded_registry().await;
        registry
            .preferences
            .upsert(UserTemplatePreference::new("alice", "custom_plot_agent", true))
            .await
            .unwrap();
        let templates = registry.planner_templates("alice").await.unwrap();
        assert!(templates.iter().any(|t| t.name == "custom_plot_agent"));
    }

    #[tokio::test]
    async fn resolve_falls_back_to_core_definition_when_unregistered() {
        let registry = seeded_registry().await;
        let resolved = registry.resolve("preprocessing_agent").await.unwrap();
        assert_eq!(resolved.name, "preprocessing_agent");
    }

    #[tokio::test]
    async fn resolve_unknown_agent_errors() {
        let registry = seeded_registry().await;
        let err = registry.resolve("nonexistent_agent").await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownAgent { .. }));
    }
}
