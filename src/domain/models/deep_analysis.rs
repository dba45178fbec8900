//! Deep analysis report: the persisted record of a multi-stage analysis run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a deep analysis run (spec §3). `Pending` is the
/// initial state before the first stage starts running; status advances
/// monotonically `pending -> running -> {completed, failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepAnalysisStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Output of one of the seven fixed pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: String,
    pub content: String,
    /// Value of `progress_percentage` this stage's completion advances the
    /// report to (spec §4.7's table).
    pub progress_percentage: u8,
    pub completed_at: DateTime<Utc>,
}

impl StageOutput {
    pub fn new(stage: impl Into<String>, content: impl Into<String>, progress_percentage: u8) -> Self {
        Self { stage: stage.into(), content: content.into(), progress_percentage, completed_at: Utc::now() }
    }
}

/// The seven fixed stages, in execution order, paired with the
/// `progress_percentage` their completion advances the report to (spec §4.7).
pub const DEEP_ANALYSIS_STAGES: &[(&str, u8)] = &[
    ("initialization", 5),
    ("questions", 20),
    ("planning", 40),
    ("analysis", 85),
    ("synthesis", 90),
    ("conclusion", 95),
    ("report", 100),
];

/// Persisted record of one deep analysis run (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepAnalysisReport {
    pub id: Uuid,
    pub user_id: String,
    pub session_id: String,
    pub goal: String,
    pub status: DeepAnalysisStatus,
    pub progress_percentage: u8,
    pub stages: Vec<StageOutput>,
    pub final_report: Option<String>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub credits_consumed: u32,
    pub total_tokens_used: u64,
    pub estimated_cost: f64,
    pub steps_completed: u32,
}

impl DeepAnalysisReport {
    /// Create a new report in the `pending` state — the report row exists
    /// but no stage has run yet (spec §4.7's `initialization` stage is what
    /// first moves it to `running`).
    pub fn start(id: Uuid, user_id: impl Into<String>, session_id: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            session_id: session_id.into(),
            goal: goal.into(),
            status: DeepAnalysisStatus::Pending,
            progress_percentage: 0,
            stages: Vec::new(),
            final_report: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            duration_seconds: None,
            credits_consumed: 0,
            total_tokens_used: 0,
            estimated_cost: 0.0,
            steps_completed: 0,
        }
    }

    /// Advance `pending -> running`. A no-op once already running or past it.
    pub fn begin_running(&mut self) {
        if self.status == DeepAnalysisStatus::Pending {
            self.status = DeepAnalysisStatus::Running;
        }
    }

    pub fn push_stage(&mut self, output: StageOutput) {
        self.progress_percentage = self.progress_percentage.max(output.progress_percentage);
        self.steps_completed += 1;
        self.stages.push(output);
    }

    /// Fold one stage's LM usage into the report's running accounting
    /// (spec §3's `credits_consumed`/`total_tokens_used`/`estimated_cost`).
    pub fn add_usage(&mut self, credits: u32, tokens: u64, cost: f64) {
        self.credits_consumed += credits;
        self.total_tokens_used += tokens;
        self.estimated_cost += cost;
    }

    pub fn complete(&mut self, final_report: impl Into<String>) {
        self.status = DeepAnalysisStatus::Completed;
        self.final_report = Some(final_report.into());
        self.progress_percentage = 100;
        self.finish_at_now();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = DeepAnalysisStatus::Failed;
        self.error = Some(error.into());
        self.finish_at_now();
    }

    fn finish_at_now(&mut self) {
        let finished_at = Utc::now();
        self.duration_seconds = Some((finished_at - self.started_at).num_seconds());
        self.finished_at = Some(finished_at);
    }

    /// Name and target `progress_percentage` of the next stage to run, or
    /// `None` once all seven have completed.
    pub fn next_stage(&self) -> Option<(&'static str, u8)> {
        DEEP_ANALYSIS_STAGES.get(self.stages.len()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stage_advances_through_the_fixed_sequence() {
        let mut report = DeepAnalysisReport::start(Uuid::nil(), "u1", "s1", "find outliers");
        assert_eq!(report.status, DeepAnalysisStatus::Pending);
        assert_eq!(report.next_stage(), Some(("initialization", 5)));
        report.push_stage(StageOutput::new("initialization", "...", 5));
        assert_eq!(report.next_stage(), Some(("questions", 20)));
    }

    #[test]
    fn begin_running_only_transitions_from_pending() {
        let mut report = DeepAnalysisReport::start(Uuid::nil(), "u1", "s1", "goal");
        report.begin_running();
        assert_eq!(report.status, DeepAnalysisStatus::Running);
        report.fail("boom");
        report.begin_running();
        assert_eq!(report.status, DeepAnalysisStatus::Failed);
    }

    #[test]
    fn completing_all_stages_exhausts_next_stage_and_sets_full_progress() {
        let mut report = DeepAnalysisReport::start(Uuid::nil(), "u1", "s1", "goal");
        report.begin_running();
        for (stage, progress) in DEEP_ANALYSIS_STAGES {
            report.push_stage(StageOutput::new(*stage, "output", *progress));
        }
        assert_eq!(report.next_stage(), None);
        assert_eq!(report.progress_percentage, 100);
        report.complete("final summary");
        assert_eq!(report.status, DeepAnalysisStatus::Completed);
        assert_eq!(report.progress_percentage, 100);
        assert!(report.duration_seconds.is_some());
    }

    #[test]
    fn add_usage_accumulates_across_stages() {
        let mut report = DeepAnalysisReport::start(Uuid::nil(), "u1", "s1", "goal");
        report.add_usage(5, 100, 0.01);
        report.add_usage(3, 50, 0.005);
        assert_eq!(report.credits_consumed, 8);
        assert_eq!(report.total_tokens_used, 150);
        assert!((report.estimated_cost - 0.015).abs() < 1e-9);
    }
}
