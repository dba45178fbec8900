//! `SQLite` implementation of [`TemplateRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentCategory, AgentTemplate, AgentVariant};
use crate::domain::ports::TemplateRepository;

#[derive(Clone)]
pub struct SqliteTemplateRepository {
    pool: SqlitePool,
}

impl SqliteTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn variant_to_str(variant: AgentVariant) -> &'static str {
    match variant {
        AgentVariant::Individual => "individual",
        AgentVariant::Planner => "planner",
        AgentVariant::Both => "both",
    }
}

fn variant_from_str(s: &str) -> AgentVariant {
    match s {
        "individual" => AgentVariant::Individual,
        "planner" => AgentVariant::Planner,
        _ => AgentVariant::Both,
    }
}

fn row_to_template(row: &sqlx::sqlite::SqliteRow) -> AgentTemplate {
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let category: Option<String> = row.get("category");
    AgentTemplate {
        name: row.get("name"),
        display_name: row.get("display_name"),
        description: row.get("description"),
        prompt_template: row.get("prompt_template"),
        category: category.map(|c| AgentCategory::parse(&c)),
        variant: variant_from_str(&row.get::<String, _>("variant")),
        base_agent: row.get("base_agent"),
        premium: row.get::<i64, _>("premium") != 0,
        active: row.get::<i64, _>("active") != 0,
        icon_url: row.get("icon_url"),
        created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        updated_at: updated_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
    }
}

#[async_trait]
impl TemplateRepository for SqliteTemplateRepository {
    async fn insert(&self, template: AgentTemplate) -> DomainResult<()> {
        let category = template.category.as_ref().map(|c| match c {
            AgentCategory::DataManipulation => "data manipulation".to_string(),
            AgentCategory::DataModelling => "data modelling".to_string(),
            AgentCategory::DataVisualization => "data visualization".to_string(),
            AgentCategory::Other(s) => s.clone(),
        });

        sqlx::query(
            r"INSERT OR REPLACE INTO agent_templates
               (name, display_name, description, prompt_template, category, variant,
                base_agent, premium, active, icon_url, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.name)
        .bind(&template.display_name)
        .bind(&template.description)
        .bind(&template.prompt_template)
        .bind(category)
        .bind(variant_to_str(template.variant))
        .bind(&template.base_agent)
        .bind(i64::from(template.premium))
        .bind(i64::from(template.active))
        .bind(&template.icon_url)
        .bind(template.created_at.to_rfc3339())
        .bind(template.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> DomainResult<Option<AgentTemplate>> {
        let row = sqlx::query("SELECT * FROM agent_templates WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_template))
    }

    async fn list_active(&self) -> DomainResult<Vec<AgentTemplate>> {
        let rows = sqlx::query("SELECT * FROM agent_templates WHERE active = 1").fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_template).collect())
    }

    async fn update(&self, template: AgentTemplate) -> DomainResult<()> {
        self.insert(template).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::connection::open_in_memory;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqliteTemplateRepository::new(pool);
        let template = AgentTemplate::new("preprocessing_agent", AgentVariant::Both)
            .with_display_name("Preprocessing Agent")
            .with_category(AgentCategory::DataManipulation);
        repo.insert(template.clone()).await.unwrap();

        let fetched = repo.get("preprocessing_agent").await.unwrap().unwrap();
        assert_eq!(fetched.name, template.name);
        assert_eq!(fetched.display_name, "Preprocessing Agent");
        assert!(matches!(fetched.category, Some(AgentCategory::DataManipulation)));
    }

    #[tokio::test]
    async fn list_active_excludes_inactive_templates() {
        let pool = open_in_memory().await.unwrap();
        let repo = SqliteTemplateRepository::new(pool);
        repo.insert(AgentTemplate::new("a", AgentVariant::Both)).await.unwrap();
        repo.insert(AgentTemplate::new("b", AgentVariant::Both).inactive()).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "a");
    }
}
