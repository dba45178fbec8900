//! Usage Tracker: token estimation, per-model credit tiers, and persisted
//! accounting (spec §4.7). Structurally modeled on the teacher's
//! `CostTracker`/`CostSummary` pair, generalized from USD pricing to the
//! flat credit-tier charge model.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CreditTier, UsageRecord, UsageSummary};
use crate::domain::ports::UsageRepository;

/// Known model -> credit tier table (mirrors the source's `MODEL_TIERS`).
const TIER_TABLE: &[(&str, CreditTier)] = &[
    ("claude-3-5-haiku-latest", CreditTier::Tier1),
    ("gpt-oss-20b", CreditTier::Tier1),
    ("o1-mini", CreditTier::Tier2),
    ("o3-mini", CreditTier::Tier2),
    ("gpt-5-nano", CreditTier::Tier2),
    ("o3", CreditTier::Tier3),
    ("claude-3-7-sonnet-latest", CreditTier::Tier3),
    ("claude-3-5-sonnet-latest", CreditTier::Tier3),
    ("claude-sonnet-4-20250514", CreditTier::Tier3),
    ("deepseek-r1-distill-llama-70b", CreditTier::Tier3),
    ("gpt-oss-120b", CreditTier::Tier3),
    ("gemini-2.5-pro-preview-03-25", CreditTier::Tier3),
    ("gpt-5-mini", CreditTier::Tier3),
    ("gpt-4.5-preview", CreditTier::Tier4),
    ("o1", CreditTier::Tier4),
    ("o1-pro", CreditTier::Tier4),
    ("claude-3-opus-latest", CreditTier::Tier4),
    ("claude-opus-4-20250514", CreditTier::Tier4),
    ("gpt-5", CreditTier::Tier5),
    ("claude-opus-4-1", CreditTier::Tier5),
];

/// Resolve a model name to its credit tier. Unknown models fall back to
/// `Tier3` (the source's "Premium" default) rather than erroring, since a
/// newly released model should still be chargeable.
pub fn resolve_tier(model: &str) -> CreditTier {
    let lower = model.to_lowercase();
    TIER_TABLE
        .iter()
        .find(|(name, _)| lower == *name)
        .map_or(CreditTier::Tier3, |(_, tier)| *tier)
}

/// Per-model dollar rate, in USD per 1,000 tokens, as `(input_rate,
/// output_rate)`. Separate from the flat credit-tier charge in
/// [`TIER_TABLE`] (spec §4.8).
const RATE_TABLE: &[(&str, f64, f64)] = &[
    ("claude-3-5-haiku-latest", 0.0008, 0.004),
    ("gpt-oss-20b", 0.0003, 0.0003),
    ("o1-mini", 0.0011, 0.0044),
    ("o3-mini", 0.0011, 0.0044),
    ("gpt-5-nano", 0.00005, 0.0004),
    ("o3", 0.002, 0.008),
    ("claude-3-7-sonnet-latest", 0.003, 0.015),
    ("claude-3-5-sonnet-latest", 0.003, 0.015),
    ("claude-sonnet-4-20250514", 0.003, 0.015),
    ("deepseek-r1-distill-llama-70b", 0.00075, 0.00099),
    ("gpt-oss-120b", 0.0005, 0.0005),
    ("gemini-2.5-pro-preview-03-25", 0.00125, 0.01),
    ("gpt-5-mini", 0.00025, 0.002),
    ("gpt-4.5-preview", 0.075, 0.15),
    ("o1", 0.015, 0.06),
    ("o1-pro", 0.15, 0.6),
    ("claude-3-opus-latest", 0.015, 0.075),
    ("claude-opus-4-20250514", 0.015, 0.075),
    ("gpt-5", 0.00125, 0.01),
    ("claude-opus-4-1", 0.015, 0.075),
];

/// Dollar cost of one invocation: `(input_tokens/1000) * input_rate +
/// (output_tokens/1000) * output_rate` against [`RATE_TABLE`] (spec §4.8).
/// Models absent from the table cost nothing and log a warning rather than
/// erroring the call.
pub fn compute_cost(model: &str, prompt_tokens: u32, completion_tokens: u32) -> f64 {
    let lower = model.to_lowercase();
    match RATE_TABLE.iter().find(|(name, _, _)| lower == *name) {
        Some((_, input_rate, output_rate)) => {
            (f64::from(prompt_tokens) / 1000.0) * input_rate + (f64::from(completion_tokens) / 1000.0) * output_rate
        }
        None => {
            tracing::warn!(model, "no rate table entry for model; charging zero cost");
            0.0
        }
    }
}

/// Token estimate from word count, used when a provider response doesn't
/// report usage (spec §4.8: `ceil(word_count * 1.5)` per side).
pub fn estimate_tokens(text: &str) -> u32 {
    let word_count = text.split_whitespace().count();
    u32::try_from((word_count as f64 * 1.5).ceil() as u64).unwrap_or(u32::MAX)
}

/// Accounts LM usage across sessions and persists it.
#[derive(Clone)]
pub struct UsageTracker {
    repository: Arc<dyn UsageRepository>,
    running_totals: Arc<RwLock<UsageSummary>>,
}

impl UsageTracker {
    pub fn new(repository: Arc<dyn UsageRepository>) -> Self {
        Self { repository, running_totals: Arc::new(RwLock::new(UsageSummary::default())) }
    }

    /// Record one LM invocation's usage, persisting it and folding it into
    /// the in-process running total.
    #[instrument(skip(self), fields(user_id, agent_name, model), err)]
    pub async fn record(
        &self,
        user_id: &str,
        session_id: &str,
        agent_name: &str,
        model: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> DomainResult<UsageRecord> {
        let tier = resolve_tier(model);
        let cost = compute_cost(model, prompt_tokens, completion_tokens);
        let record = UsageRecord::new(
            user_id,
            session_id,
            agent_name,
            model,
            tier,
            prompt_tokens,
            completion_tokens,
            cost,
        );
        self.repository.insert(&record).await?;
        self.running_totals.write().await.record(&record);
        Ok(record)
    }

    pub async fn summary_for_user(&self, user_id: &str) -> DomainResult<UsageSummary> {
        self.repository.summary_for_user(user_id).await
    }

    /// Snapshot of everything this tracker instance has recorded so far,
    /// independent of persistence (useful for a single process run / demo).
    pub async fn running_total(&self) -> UsageSummary {
        self.running_totals.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_models_to_documented_tiers() {
        assert_eq!(resolve_tier("claude-3-5-haiku-latest"), CreditTier::Tier1);
        assert_eq!(resolve_tier("gpt-5-mini"), CreditTier::Tier3);
        assert_eq!(resolve_tier("gpt-5"), CreditTier::Tier5);
    }

    #[test]
    fn unknown_model_defaults_to_tier3() {
        assert_eq!(resolve_tier("some-new-model-2099"), CreditTier::Tier3);
    }

    #[test]
    fn token_estimate_is_one_and_a_half_tokens_per_word() {
        let text = "one two three four";
        assert_eq!(estimate_tokens(text), 6);
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("one two three"), 5); // ceil(3 * 1.5) = 5
    }

    #[test]
    fn compute_cost_uses_rate_table_for_known_models() {
        let cost = compute_cost("gpt-5-mini", 1000, 1000);
        assert!((cost - 0.00225).abs() < 1e-9);
    }

    #[test]
    fn compute_cost_is_zero_for_unknown_models() {
        assert_eq!(compute_cost("some-new-model-2099", 1000, 1000), 0.0);
    }
}
