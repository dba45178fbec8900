//! Usage and credit accounting records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pricing tier an LM model is bucketed into (original source's
/// `MODEL_TIERS`), driving the flat per-call credit charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
}

impl CreditTier {
    /// Flat credits charged per call at this tier.
    pub fn credits(&self) -> u32 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 3,
            Self::Tier3 => 5,
            Self::Tier4 => 20,
            Self::Tier5 => 50,
        }
    }
}

/// One accounted LM invocation (spec §4.7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub session_id: String,
    pub agent_name: String,
    pub model: String,
    pub tier: CreditTier,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub credits_charged: u32,
    /// Dollar cost per spec §4.8's rate-table formula, separate from the
    /// flat `credits_charged` tier charge.
    pub cost: f64,
    pub recorded_at: DateTime<Utc>,
}

impl UsageRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        agent_name: impl Into<String>,
        model: impl Into<String>,
        tier: CreditTier,
        prompt_tokens: u32,
        completion_tokens: u32,
        cost: f64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            agent_name: agent_name.into(),
            model: model.into(),
            tier,
            prompt_tokens,
            completion_tokens,
            credits_charged: tier.credits(),
            cost,
            recorded_at: Utc::now(),
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Aggregate of usage across a window, mirroring the teacher's
/// `CostSummary` rollup shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub call_count: u32,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_credits: u64,
    pub total_cost: f64,
}

impl UsageSummary {
    pub fn record(&mut self, usage: &UsageRecord) {
        self.call_count += 1;
        self.total_prompt_tokens += u64::from(usage.prompt_tokens);
        self.total_completion_tokens += u64::from(usage.completion_tokens);
        self.total_credits += u64::from(usage.credits_charged);
        self.total_cost += usage.cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_credits_match_five_tier_table() {
        assert_eq!(CreditTier::Tier1.credits(), 1);
        assert_eq!(CreditTier::Tier2.credits(), 3);
        assert_eq!(CreditTier::Tier3.credits(), 5);
        assert_eq!(CreditTier::Tier4.credits(), 20);
        assert_eq!(CreditTier::Tier5.credits(), 50);
    }

    #[test]
    fn summary_accumulates_across_records() {
        let mut summary = UsageSummary::default();
        summary.record(&UsageRecord::new(
            "u1", "s1", "preprocessing_agent", "gpt-5-mini", CreditTier::Tier1, 100, 50, 0.01,
        ));
        summary.record(&UsageRecord::new(
            "u1", "s1", "data_viz_agent", "gpt-5", CreditTier::Tier3, 200, 80, 0.05,
        ));
        assert_eq!(summary.call_count, 2);
        assert_eq!(summary.total_credits, 6);
        assert_eq!(summary.total_prompt_tokens, 300);
        assert!((summary.total_cost - 0.06).abs() < 1e-9);
    }
}
