//! `SQLite` implementation of [`DeepAnalysisRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DeepAnalysisReport, DeepAnalysisStatus, StageOutput};
use crate::domain::ports::DeepAnalysisRepository;

#[derive(Clone)]
pub struct SqliteDeepAnalysisRepository {
    pool: SqlitePool,
}

impl SqliteDeepAnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn status_to_str(status: DeepAnalysisStatus) -> &'static str {
    match status {
        DeepAnalysisStatus::Pending => "pending",
        DeepAnalysisStatus::Running => "running",
        DeepAnalysisStatus::Completed => "completed",
        DeepAnalysisStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> DeepAnalysisStatus {
    match s {
        "running" => DeepAnalysisStatus::Running,
        "completed" => DeepAnalysisStatus::Completed,
        "failed" => DeepAnalysisStatus::Failed,
        _ => DeepAnalysisStatus::Pending,
    }
}

fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> DomainResult<DeepAnalysisReport> {
    let id: String = row.get("id");
    let stages_json: String = row.get("stages");
    let started_at: String = row.get("started_at");
    let finished_at: Option<String> = row.get("finished_at");
    let stages: Vec<StageOutput> = serde_json::from_str(&stages_json)?;

    Ok(DeepAnalysisReport {
        id: Uuid::parse_str(&id).map_err(|e| crate::domain::errors::DomainError::InvalidIdentifier(e.to_string()))?,
        user_id: row.get("user_id"),
        session_id: row.get("session_id"),
        goal: row.get("goal"),
        status: status_from_str(&row.get::<String, _>("status")),
        progress_percentage: row.get::<i64, _>("progress_percentage") as u8,
        stages,
        final_report: row.get("final_report"),
        error: row.get("error"),
        started_at: started_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        finished_at: finished_at.and_then(|s| s.parse::<DateTime<Utc>>().ok()),
        duration_seconds: row.get::<Option<i64>, _>("duration_seconds"),
        credits_consumed: row.get::<i64, _>("credits_consumed") as u32,
        total_tokens_used: row.get::<i64, _>("total_tokens_used") as u64,
        estimated_cost: row.get("estimated_cost"),
        steps_completed: row.get::<i64, _>("steps_completed") as u32,
    })
}

#[async_trait]
impl DeepAnalysisRepository for SqliteDeepAnalysisRepository {
    async fn insert(&self, report: &DeepAnalysisReport) -> DomainResult<()> {
        let stages_json = serde_json::to_string(&report.stages)?;
        sqlx::query(
            r"INSERT INTO deep_analysis_reports
               (id, user_id, session_id, goal, status, progress_percentage, stages, final_report, error,
                started_at, finished_at, duration_seconds, credits_consumed, total_tokens_used,
                estimated_cost, steps_completed)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(report.id.to_string())
        .bind(&report.user_id)
        .bind(&report.session_id)
        .bind(&report.goal)
        .bind(status_to_str(report.status))
        .bind(i64::from(report.progress_percentage))
        .bind(stages_json)
        .bind(&report.final_report)
        .bind(&report.error)
        .bind(report.started_at.to_rfc3339())
        .bind(report.finished_at.map(|t| t.to_rfc3339()))
        .bind(report.duration_seconds)
        .bind(i64::from(report.credits_consumed))
        .bind(report.total_tokens_used as i64)
        .bind(report.estimated_cost)
        .bind(i64::from(report.steps_completed))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, report: &DeepAnalysisReport) -> DomainResult<()> {
        let stages_json = serde_json::to_string(&report.stages)?;
        sqlx::query(
            r"UPDATE deep_analysis_reports SET
               status = ?, progress_percentage = ?, stages = ?, final_report = ?, error = ?, finished_at = ?,
               duration_seconds = ?, credits_consumed = ?, total_tokens_used = ?, estimated_cost = ?,
               steps_completed = ?
               WHERE id = ?",
        )
        .bind(status_to_str(report.status))
        .bind(i64::from(report.progress_percentage))
        .bind(stages_json)
        .bind(&report.final_report)
        .bind(&report.error)
        .bind(report.finished_at.map(|t| t.to_rfc3339()))
        .bind(report.duration_seconds)
        .bind(i64::from(report.credits_consumed))
        .bind(report.total_tokens_used as i64)
        .bind(report.estimated_cost)
        .bind(i64::from(report.steps_completed))
        .bind(report.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<DeepAnalysisReport>> {
        let row = sqlx::query("SELECT * FROM deep_analysis_reports WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_report).transpose()
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<DeepAnalysisReport>> {
        let rows = sqlx::query("SELECT * FROM deep_analysis_reports WHERE user_id = ? ORDER BY started_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_report).collect()
    }
}
